// Sat Oct 17 2026 - Alex

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address {
    value: u64,
}

impl Address {
    pub const fn new(value: u64) -> Self {
        Self { value }
    }

    pub const fn zero() -> Self {
        Self { value: 0 }
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }

    pub fn is_aligned(&self, alignment: usize) -> bool {
        alignment <= 1 || self.value & (alignment as u64 - 1) == 0
    }

    pub fn padding_to(&self, alignment: usize) -> u64 {
        if alignment <= 1 {
            return 0;
        }
        let rem = self.value & (alignment as u64 - 1);
        if rem == 0 {
            0
        } else {
            alignment as u64 - rem
        }
    }

    pub fn align_up(&self, alignment: usize) -> Option<Self> {
        self.value.checked_add(self.padding_to(alignment)).map(Self::new)
    }

    pub fn checked_add(&self, rhs: u64) -> Option<Self> {
        self.value.checked_add(rhs).map(Self::new)
    }

    pub fn saturating_add(&self, rhs: u64) -> Self {
        Self::new(self.value.saturating_add(rhs))
    }

    pub fn is_within_range(&self, start: Self, end: Self) -> bool {
        self.value >= start.value && self.value < end.value
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.value)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.value, f)
    }
}

impl Add<u64> for Address {
    type Output = Self;
    fn add(self, rhs: u64) -> Self::Output {
        Self { value: self.value + rhs }
    }
}

impl Sub<Address> for Address {
    type Output = u64;
    fn sub(self, rhs: Address) -> Self::Output {
        self.value - rhs.value
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> Self {
        addr.value
    }
}

impl FromStr for Address {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16)?,
            None => s.replace('_', "").parse::<u64>()?,
        };
        Ok(Self::new(value))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{:x}", self.value))
    }
}

struct AddressVisitor;

impl<'de> Visitor<'de> for AddressVisitor {
    type Value = Address;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an address as an integer or a hex string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Address, E> {
        Ok(Address::new(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Address, E> {
        u64::try_from(value)
            .map(Address::new)
            .map_err(|_| E::custom(format!("negative address: {}", value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Address, E> {
        value
            .parse()
            .map_err(|e| E::custom(format!("invalid address {:?}: {}", value, e)))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AddressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_helpers() {
        let addr = Address::new(0x1003);
        assert!(!addr.is_aligned(4));
        assert!(addr.is_aligned(1));
        assert_eq!(addr.padding_to(4), 1);
        assert_eq!(addr.padding_to(16), 13);
        assert_eq!(addr.align_up(8), Some(Address::new(0x1008)));
        assert_eq!(Address::new(0x1000).padding_to(8), 0);
        assert_eq!(Address::new(u64::MAX).align_up(8), None);
    }

    #[test]
    fn test_parse_hex_and_decimal() {
        assert_eq!("0x7fff_ffff_ffff".parse::<Address>().unwrap(), Address::new(0x7FFF_FFFF_FFFF));
        assert_eq!("4096".parse::<Address>().unwrap(), Address::new(4096));
        assert!("0xzz".parse::<Address>().is_err());
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let a: Address = serde_json::from_str("\"0x1000\"").unwrap();
        let b: Address = serde_json::from_str("4096").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"0x1000\"");
    }
}
