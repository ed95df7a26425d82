// Sat Oct 17 2026 - Alex

use crate::pattern::{compile, CompileError};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternByte {
    pub value: u8,
    pub wildcard: bool,
}

impl PatternByte {
    pub const WILDCARD: Self = Self {
        value: 0,
        wildcard: true,
    };

    pub const fn exact(value: u8) -> Self {
        Self {
            value,
            wildcard: false,
        }
    }

    #[inline]
    pub fn matches(&self, byte: u8) -> bool {
        self.wildcard || self.value == byte
    }
}

/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    elements: Box<[PatternByte]>,
}

impl Pattern {
    pub(crate) fn from_elements(elements: Vec<PatternByte>) -> Result<Self, CompileError> {
        if elements.is_empty() {
            return Err(CompileError::Empty);
        }
        Ok(Self {
            elements: elements.into_boxed_slice(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompileError> {
        Self::from_elements(bytes.iter().copied().map(PatternByte::exact).collect())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[PatternByte] {
        &self.elements
    }

    #[inline]
    pub fn matches(&self, data: &[u8]) -> bool {
        if data.len() < self.elements.len() {
            return false;
        }
        self.elements
            .iter()
            .zip(data)
            .all(|(element, &byte)| element.matches(byte))
    }

    pub fn significant_byte_count(&self) -> usize {
        self.elements.iter().filter(|e| !e.wildcard).count()
    }

    pub fn wildcard_byte_count(&self) -> usize {
        self.elements.iter().filter(|e| e.wildcard).count()
    }

    pub fn to_hex_string(&self) -> String {
        self.elements
            .iter()
            .map(|e| {
                if e.wildcard {
                    "??".to_string()
                } else {
                    format!("{:02X}", e.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl FromStr for Pattern {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_with_wildcards() {
        let pattern: Pattern = "48 8B ?? 00".parse().unwrap();
        assert!(pattern.matches(&[0x48, 0x8B, 0x05, 0x00]));
        assert!(pattern.matches(&[0x48, 0x8B, 0xFF, 0x00, 0x99]));
        assert!(!pattern.matches(&[0x48, 0x8B, 0x05, 0x01]));
        assert!(!pattern.matches(&[0x48, 0x8B, 0x05]));
    }

    #[test]
    fn test_counts_and_hex() {
        let pattern: Pattern = "E8 ?? ?? ?? ?? C3".parse().unwrap();
        assert_eq!(pattern.len(), 6);
        assert_eq!(pattern.significant_byte_count(), 2);
        assert_eq!(pattern.wildcard_byte_count(), 4);
        assert_eq!(pattern.to_string(), "E8 ?? ?? ?? ?? C3");
    }

    #[test]
    fn test_from_bytes() {
        let pattern = Pattern::from_bytes(&[0xDE, 0xAD]).unwrap();
        assert_eq!(pattern.elements()[1], PatternByte::exact(0xAD));
        assert_eq!(Pattern::from_bytes(&[]), Err(CompileError::Empty));
    }
}
