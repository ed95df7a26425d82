// Sat Oct 17 2026 - Alex

pub mod address;
pub mod buffer;
pub mod enumerator;
pub mod error;
pub mod mmap;
pub mod process;
pub mod protection;
pub mod region;
pub mod traits;

pub use address::Address;
pub use buffer::BufferSource;
pub use enumerator::RegionEnumerator;
pub use error::{MemoryError, ReadError};
pub use mmap::{map_file, MappedFileSource};
pub use process::ProcessMemory;
pub use protection::{CommitState, PageProtection, ProtectionParseError};
pub use region::MemoryRegion;
pub use traits::MemorySource;
