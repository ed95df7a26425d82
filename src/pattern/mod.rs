// Sat Oct 17 2026 - Alex

pub mod compiler;
pub mod error;
pub mod pattern;

pub use compiler::{compile, PatternCompiler};
pub use error::CompileError;
pub use pattern::{Pattern, PatternByte};
