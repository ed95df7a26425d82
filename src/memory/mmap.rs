// Sat Oct 17 2026 - Alex

use crate::memory::{Address, BufferSource, MemoryError, PageProtection};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

pub type MappedFileSource = BufferSource<Mmap>;

pub fn map_file<P: AsRef<Path>>(
    path: P,
    base: Address,
    protection: PageProtection,
) -> Result<MappedFileSource, MemoryError> {
    let file = File::open(path.as_ref())?;
    if file.metadata()?.len() == 0 {
        return Err(MemoryError::InvalidRange);
    }
    let mmap = unsafe { Mmap::map(&file) }?;
    log::debug!(
        "Mapped {} ({} bytes) at {}",
        path.as_ref().display(),
        mmap.len(),
        base
    );
    Ok(BufferSource::with_protection(base, mmap, protection))
}
