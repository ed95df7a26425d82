// Sat Oct 17 2026 - Alex

use crate::memory::{Address, PageProtection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Highest user-mode address on the host.
#[cfg(target_pointer_width = "64")]
pub const USER_SPACE_END: u64 = 0x7FFF_FFFF_FFFF;
#[cfg(not(target_pointer_width = "64"))]
pub const USER_SPACE_END: u64 = 0xFFFF_FFFF;

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Start {start} must be below end {end}")]
    EmptyRange { start: Address, end: Address },
    #[error("Alignment {0} must be a non-zero power of two")]
    BadAlignment(usize),
    #[error("Protection filter is empty")]
    EmptyFilter,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid options file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Bounds and filters for one scan. `start` is inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub start: Address,
    pub end: Address,
    pub alignment: usize,
    pub protection: PageProtection,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            start: Address::zero(),
            end: Address::new(USER_SPACE_END),
            alignment: 1,
            protection: PageProtection::DEFAULT_FILTER,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, start: Address, end: Address) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_start(mut self, start: Address) -> Self {
        self.start = start;
        self
    }

    pub fn with_end(mut self, end: Address) -> Self {
        self.end = end;
        self
    }

    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_protection(mut self, protection: PageProtection) -> Self {
        self.protection = protection;
        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.start >= self.end {
            return Err(OptionsError::EmptyRange {
                start: self.start,
                end: self.end,
            });
        }
        if !self.alignment.is_power_of_two() {
            return Err(OptionsError::BadAlignment(self.alignment));
        }
        if self.protection.is_empty() {
            return Err(OptionsError::EmptyFilter);
        }
        Ok(())
    }
}
