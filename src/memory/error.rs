// Sat Oct 17 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Process not found: {0}")]
    ProcessNotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Invalid memory range")]
    InvalidRange,
    #[error("Not supported: {0}")]
    NotSupported(String),
}

/// `Inaccessible` is the expected result for pages that are reserved, guarded
/// or unmapped inside an otherwise eligible region and is never reported.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Range at 0x{0:x} is inaccessible")]
    Inaccessible(u64),
    #[error("Read failed at 0x{address:x}: {source}")]
    Failed {
        address: u64,
        #[source]
        source: std::io::Error,
    },
}

impl ReadError {
    pub fn failed(address: u64, source: std::io::Error) -> Self {
        Self::Failed { address, source }
    }

    pub fn is_inaccessible(&self) -> bool {
        matches!(self, Self::Inaccessible(_))
    }
}
