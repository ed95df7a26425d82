// Sat Oct 17 2026 - Alex

//! Wildcard signature scanning over the address space of a running process.
//!
//! ```no_run
//! use sigscan::{ProcessMemory, ScanOptions, Scanner};
//!
//! let process = ProcessMemory::attach(1234)?;
//! let report = Scanner::new(process).scan("48 8B ?? 00", Some(&ScanOptions::default()))?;
//! for address in &report.matches {
//!     println!("{}", address);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod memory;
pub mod pattern;
pub mod scan;
pub mod ui;

pub use config::{OptionsError, ScanOptions};
pub use memory::{
    Address, BufferSource, MemoryError, MemoryRegion, MemorySource, PageProtection, ProcessMemory,
    ReadError, RegionEnumerator,
};
pub use pattern::{compile, CompileError, Pattern, PatternCompiler};
pub use scan::{CancelToken, MatchSet, ScanError, ScanReport, ScanStats, Scanner};
