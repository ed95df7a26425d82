// Sat Oct 17 2026 - Alex

use crate::memory::region::locate_region;
use crate::memory::{Address, CommitState, MemoryRegion, MemorySource, PageProtection, ReadError};
use parking_lot::Mutex;

/// With no explicit layout the whole buffer is one committed read-write region.
pub struct BufferSource<B = Vec<u8>> {
    base: Address,
    data: B,
    regions: Vec<MemoryRegion>,
    explicit_layout: bool,
    holes: Vec<(u64, u64)>,
    faults: Vec<(u64, u64)>,
    reads: Mutex<Vec<(Address, usize)>>,
}

impl<B: AsRef<[u8]>> BufferSource<B> {
    pub fn new(base: Address, data: B) -> Self {
        Self::with_protection(base, data, PageProtection::READWRITE)
    }

    pub fn with_protection(base: Address, data: B, protection: PageProtection) -> Self {
        let len = data.as_ref().len() as u64;
        let regions = if len > 0 {
            vec![MemoryRegion::committed(base, len, protection)]
        } else {
            Vec::new()
        };
        Self {
            base,
            data,
            regions,
            explicit_layout: false,
            holes: Vec::new(),
            faults: Vec::new(),
            reads: Mutex::new(Vec::new()),
        }
    }

    /// Adds a region at `offset` bytes from the base. The first call replaces the
    /// implicit whole-buffer region.
    pub fn with_region(mut self, offset: u64, size: u64, state: CommitState, protection: PageProtection) -> Self {
        if !self.explicit_layout {
            self.regions.clear();
            self.explicit_layout = true;
        }
        self.regions
            .push(MemoryRegion::new(self.base + offset, size, state, protection));
        self.regions.sort_by_key(|r| r.base());
        self
    }

    pub fn with_inaccessible(mut self, offset: u64, len: u64) -> Self {
        let start = self.base.as_u64() + offset;
        self.holes.push((start, start + len));
        self
    }

    pub fn with_fault(mut self, offset: u64, len: u64) -> Self {
        let start = self.base.as_u64() + offset;
        self.faults.push((start, start + len));
        self
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.as_ref().is_empty()
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    pub fn read_log(&self) -> Vec<(Address, usize)> {
        self.reads.lock().clone()
    }
}

impl<B: AsRef<[u8]> + Send + Sync> MemorySource for BufferSource<B> {
    fn query_region(&self, cursor: Address) -> Option<MemoryRegion> {
        locate_region(&self.regions, cursor)
    }

    fn read(&self, address: Address, buf: &mut [u8]) -> Result<usize, ReadError> {
        self.reads.lock().push((address, buf.len()));

        let data = self.data.as_ref();
        let start = self.base.as_u64();
        let end = start + data.len() as u64;
        let addr = address.as_u64();
        if addr < start || addr >= end {
            return Err(ReadError::Inaccessible(addr));
        }

        let requested_end = addr.saturating_add(buf.len() as u64);
        if self
            .faults
            .iter()
            .any(|&(lo, hi)| lo < requested_end && hi > addr)
        {
            return Err(ReadError::failed(
                addr,
                std::io::Error::new(std::io::ErrorKind::Other, "injected read fault"),
            ));
        }

        let mut available = requested_end.min(end);
        for &(lo, hi) in &self.holes {
            if lo <= addr && addr < hi {
                return Err(ReadError::Inaccessible(addr));
            }
            if addr < lo && lo < available {
                available = lo;
            }
        }

        let count = (available - addr) as usize;
        let offset = (addr - start) as usize;
        buf[..count].copy_from_slice(&data[offset..offset + count]);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_region_covers_buffer() {
        let source = BufferSource::new(Address::new(0x4000), vec![0xAAu8; 0x100]);
        let region = source.query_region(Address::new(0x4010)).unwrap();
        assert_eq!(region.base(), Address::new(0x4000));
        assert_eq!(region.size(), 0x100);
        assert!(region.is_committed());
        assert!(source.query_region(Address::new(0x4100)).is_none());
    }

    #[test]
    fn test_gap_reported_as_free_region() {
        let source = BufferSource::new(Address::new(0x4000), vec![0u8; 0x100]);
        let gap = source.query_region(Address::new(0x1000)).unwrap();
        assert_eq!(gap.state(), CommitState::Free);
        assert_eq!(gap.base(), Address::new(0x1000));
        assert_eq!(gap.end(), Address::new(0x4000));
    }

    #[test]
    fn test_partial_read_stops_at_hole() {
        let data: Vec<u8> = (0..=255).collect();
        let source = BufferSource::new(Address::new(0x1000), data).with_inaccessible(0x80, 0x10);

        let mut buf = [0u8; 0x100];
        let read = source.read(Address::new(0x1070), &mut buf).unwrap();
        assert_eq!(read, 0x10);
        assert_eq!(buf[0], 0x70);

        let err = source.read(Address::new(0x1084), &mut buf).unwrap_err();
        assert!(err.is_inaccessible());
    }

    #[test]
    fn test_read_clipped_to_buffer_end() {
        let source = BufferSource::new(Address::new(0x1000), vec![7u8; 0x20]);
        let mut buf = [0u8; 0x40];
        assert_eq!(source.read(Address::new(0x1010), &mut buf).unwrap(), 0x10);
        assert!(source.read(Address::new(0x1020), &mut buf).unwrap_err().is_inaccessible());
        assert_eq!(source.read_log().len(), 2);
    }

    #[test]
    fn test_fault_is_not_inaccessible() {
        let source = BufferSource::new(Address::new(0x1000), vec![0u8; 0x100]).with_fault(0x40, 1);
        let mut buf = [0u8; 0x80];
        let err = source.read(Address::new(0x1000), &mut buf).unwrap_err();
        assert!(!err.is_inaccessible());
    }
}
