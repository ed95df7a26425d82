// Sat Oct 17 2026 - Alex

use crate::memory::{Address, MemoryRegion, ReadError};

/// Read-only view of another address space.
pub trait MemorySource: Send + Sync {
    /// Called once at the start of every enumeration pass. Sources that
    /// snapshot the target layout re-read it here.
    fn refresh_layout(&self) {}

    /// Describes the region containing `cursor`, or the next region above it
    /// when the cursor sits in a gap. `None` once nothing is left.
    fn query_region(&self, cursor: Address) -> Option<MemoryRegion>;

    fn read(&self, address: Address, buf: &mut [u8]) -> Result<usize, ReadError>;
}

impl<T: MemorySource + ?Sized> MemorySource for &T {
    fn refresh_layout(&self) {
        (**self).refresh_layout()
    }

    fn query_region(&self, cursor: Address) -> Option<MemoryRegion> {
        (**self).query_region(cursor)
    }

    fn read(&self, address: Address, buf: &mut [u8]) -> Result<usize, ReadError> {
        (**self).read(address, buf)
    }
}

impl<T: MemorySource + ?Sized> MemorySource for Box<T> {
    fn refresh_layout(&self) {
        (**self).refresh_layout()
    }

    fn query_region(&self, cursor: Address) -> Option<MemoryRegion> {
        (**self).query_region(cursor)
    }

    fn read(&self, address: Address, buf: &mut [u8]) -> Result<usize, ReadError> {
        (**self).read(address, buf)
    }
}
