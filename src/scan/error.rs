// Sat Oct 17 2026 - Alex

use crate::config::OptionsError;
use crate::pattern::CompileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan options were not supplied")]
    MissingOptions,
    #[error("Invalid scan options: {0}")]
    InvalidOptions(#[from] OptionsError),
    #[error("Pattern compilation failed: {0}")]
    Compile(#[from] CompileError),
    #[error("Out of memory while scanning")]
    AllocationFailed,
    #[error("Scan cancelled")]
    Cancelled,
}

impl ScanError {
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::AllocationFailed | Self::Cancelled)
    }
}
