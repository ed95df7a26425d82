// Sat Oct 17 2026 - Alex

use crate::memory::Address;
use crate::pattern::Pattern;
use crate::scan::ScanError;
use serde::Serialize;
use std::fmt;

/// Pushing past `budget` fails the same way an exhausted allocator does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchSet {
    addresses: Vec<Address>,
    #[serde(skip)]
    budget: usize,
}

impl Default for MatchSet {
    fn default() -> Self {
        Self::with_budget(usize::MAX)
    }
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(budget: usize) -> Self {
        Self {
            addresses: Vec::new(),
            budget,
        }
    }

    pub fn try_push(&mut self, address: Address) -> Result<(), ScanError> {
        if self.addresses.len() >= self.budget {
            return Err(ScanError::AllocationFailed);
        }
        self.addresses
            .try_reserve(1)
            .map_err(|_| ScanError::AllocationFailed)?;
        self.addresses.push(address);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn first(&self) -> Option<Address> {
        self.addresses.first().copied()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.addresses
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Address> {
        self.addresses.iter()
    }

    pub fn into_vec(self) -> Vec<Address> {
        self.addresses
    }

    pub fn release(self) {}
}

impl IntoIterator for MatchSet {
    type Item = Address;
    type IntoIter = std::vec::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.into_iter()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.iter()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub regions_visited: usize,
    pub regions_scanned: usize,
    pub windows_read: usize,
    pub windows_skipped: usize,
    pub bytes_read: u64,
    pub read_failures: usize,
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} regions visited, {} scanned, {} windows ({} skipped), {} bytes, {} read failures",
            self.regions_visited,
            self.regions_scanned,
            self.windows_read,
            self.windows_skipped,
            self.bytes_read,
            self.read_failures
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub pattern: Pattern,
    pub matches: MatchSet,
    pub stats: ScanStats,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ScanError>,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

fn serialize_error<S: serde::Serializer>(error: &Option<ScanError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}
