// Sat Oct 17 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Pattern has no elements")]
    Empty,
    #[error("Malformed token {token:?} at position {index}")]
    MalformedToken { index: usize, token: String },
    #[error("Failed to allocate pattern storage")]
    AllocationFailed,
}
