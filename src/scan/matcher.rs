// Sat Oct 17 2026 - Alex

use crate::memory::{MemoryRegion, MemorySource, ReadError};
use crate::pattern::Pattern;
use crate::scan::window::{Window, WindowPlan, DEFAULT_WINDOW_SIZE};
use crate::scan::{CancelToken, MatchSet, ScanError, ScanStats};

pub struct ChunkedMatcher<'p> {
    pattern: &'p Pattern,
    alignment: usize,
    window_size: usize,
    limit: usize,
    buffer: Vec<u8>,
}

impl<'p> ChunkedMatcher<'p> {
    pub fn new(pattern: &'p Pattern) -> Self {
        Self {
            pattern,
            alignment: 1,
            window_size: DEFAULT_WINDOW_SIZE,
            limit: usize::MAX,
            buffer: Vec::new(),
        }
    }

    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment.max(1);
        self
    }

    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size.max(self.pattern.len());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Returns `true` once the match limit is reached.
    pub fn scan_region<S: MemorySource + ?Sized>(
        &mut self,
        source: &S,
        region: &MemoryRegion,
        matches: &mut MatchSet,
        stats: &mut ScanStats,
        cancel: &CancelToken,
    ) -> Result<bool, ScanError> {
        self.allocate_buffer()?;

        let plan = WindowPlan::new(region.base(), region.size(), self.window_size, self.pattern.len());
        for window in plan {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let Some(read) = self.read_window(source, &window, stats) else {
                continue;
            };

            if self.scan_window(&window, read, matches)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn allocate_buffer(&mut self) -> Result<(), ScanError> {
        if self.buffer.len() >= self.window_size {
            return Ok(());
        }
        self.buffer
            .try_reserve_exact(self.window_size - self.buffer.len())
            .map_err(|_| ScanError::AllocationFailed)?;
        self.buffer.resize(self.window_size, 0);
        Ok(())
    }

    fn read_window<S: MemorySource + ?Sized>(
        &mut self,
        source: &S,
        window: &Window,
        stats: &mut ScanStats,
    ) -> Option<usize> {
        log::trace!(
            "Reading {} bytes at {} ({} carried over)",
            window.len,
            window.address,
            window.overlap
        );
        match source.read(window.address, &mut self.buffer[..window.len]) {
            Ok(read) => {
                let read = read.min(window.len);
                stats.windows_read += 1;
                stats.bytes_read += read as u64;
                if read < self.pattern.len() {
                    stats.windows_skipped += 1;
                    return None;
                }
                Some(read)
            }
            Err(ReadError::Inaccessible(_)) => {
                log::trace!("Window at {} is inaccessible", window.address);
                stats.windows_skipped += 1;
                None
            }
            Err(e) => {
                log::warn!("Skipping window at {} ({} bytes): {}", window.address, window.len, e);
                stats.read_failures += 1;
                stats.windows_skipped += 1;
                None
            }
        }
    }

    fn scan_window(&self, window: &Window, read: usize, matches: &mut MatchSet) -> Result<bool, ScanError> {
        let data = &self.buffer[..read];
        let last = read - self.pattern.len();
        let mut offset = window.scan_start;

        while offset <= last {
            let address = window.address + offset as u64;
            let padding = address.padding_to(self.alignment) as usize;
            if padding != 0 {
                offset += padding;
                continue;
            }

            if self.pattern.matches(&data[offset..]) {
                log::trace!("Match at {}", address);
                matches.try_push(address)?;
                if matches.len() >= self.limit {
                    return Ok(true);
                }
            }
            offset += self.alignment;
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Address, BufferSource};
    use crate::pattern::compile;

    const BASE: u64 = 0x20000;

    fn run(source: &BufferSource, pattern: &Pattern, alignment: usize) -> (MatchSet, ScanStats) {
        let region = source.regions()[0];
        let mut matcher = ChunkedMatcher::new(pattern).with_alignment(alignment);
        let mut matches = MatchSet::new();
        let mut stats = ScanStats::default();
        matcher
            .scan_region(source, &region, &mut matches, &mut stats, &CancelToken::new())
            .unwrap();
        (matches, stats)
    }

    #[test]
    fn test_match_straddling_window_boundary_found_once() {
        let pattern = compile("DE AD BE EF").unwrap();
        for start in 65530..=65536u64 {
            let mut data = vec![0u8; 70000];
            data[start as usize..start as usize + 4].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
            let source = BufferSource::new(Address::new(BASE), data);

            let (matches, stats) = run(&source, &pattern, 1);
            assert_eq!(matches.as_slice(), &[Address::new(BASE + start)], "offset {}", start);
            assert_eq!(stats.windows_read, 2);
        }
    }

    #[test]
    fn test_second_window_position() {
        let pattern = compile("01 02 03 04").unwrap();
        let source = BufferSource::new(Address::new(BASE), vec![0u8; 70000]);
        run(&source, &pattern, 1);
        assert_eq!(
            source.read_log(),
            vec![
                (Address::new(BASE), 65536),
                (Address::new(BASE + 65533), 70000 - 65533)
            ]
        );
    }

    #[test]
    fn test_alignment_filters_candidates() {
        let pattern = compile("AA BB").unwrap();
        let mut data = vec![0u8; 0x100];
        for offset in [0x03, 0x08, 0x0C, 0x11, 0x20] {
            data[offset] = 0xAA;
            data[offset + 1] = 0xBB;
        }
        let source = BufferSource::new(Address::new(BASE), data);

        let (all, _) = run(&source, &pattern, 1);
        assert_eq!(all.len(), 5);

        let (aligned, _) = run(&source, &pattern, 4);
        assert_eq!(
            aligned.into_vec(),
            vec![Address::new(BASE + 0x08), Address::new(BASE + 0x0C), Address::new(BASE + 0x20)]
        );
    }

    #[test]
    fn test_alignment_across_misaligned_window_start() {
        let pattern = compile("AA BB CC").unwrap();
        let mut data = vec![0u8; 0x300];
        for offset in (0..0x2F0).step_by(0x10) {
            data[offset..offset + 3].copy_from_slice(&[0xAA, 0xBB, 0xCC]);
        }
        let source = BufferSource::new(Address::new(BASE), data);
        let region = source.regions()[0];

        let mut matcher = ChunkedMatcher::new(&pattern)
            .with_alignment(0x10)
            .with_window_size(0x40);
        let mut matches = MatchSet::new();
        let mut stats = ScanStats::default();
        matcher
            .scan_region(&source, &region, &mut matches, &mut stats, &CancelToken::new())
            .unwrap();

        assert_eq!(matches.len(), 0x2F);
        assert!(matches.iter().all(|a| a.is_aligned(0x10)));
        assert!(stats.windows_read > 1);
    }

    #[test]
    fn test_inaccessible_window_skipped_silently() {
        let pattern = compile("11 22").unwrap();
        let mut data = vec![0u8; 0x40000];
        data[0x100] = 0x11;
        data[0x101] = 0x22;
        data[0x35000] = 0x11;
        data[0x35001] = 0x22;
        let source = BufferSource::new(Address::new(BASE), data).with_inaccessible(0x10000, 0x10000);

        let (matches, stats) = run(&source, &pattern, 1);
        assert_eq!(
            matches.into_vec(),
            vec![Address::new(BASE + 0x100), Address::new(BASE + 0x35000)]
        );
        assert_eq!(stats.read_failures, 0);
        assert!(stats.windows_skipped >= 1);
    }

    #[test]
    fn test_read_failure_counted_and_scan_continues() {
        let pattern = compile("11 22").unwrap();
        let mut data = vec![0u8; 0x20000];
        data[0x1F000] = 0x11;
        data[0x1F001] = 0x22;
        let source = BufferSource::new(Address::new(BASE), data).with_fault(0x10, 1);

        let (matches, stats) = run(&source, &pattern, 1);
        assert_eq!(matches.as_slice(), &[Address::new(BASE + 0x1F000)]);
        assert_eq!(stats.read_failures, 1);
    }

    #[test]
    fn test_limit_stops_early() {
        let pattern = compile("00").unwrap();
        let source = BufferSource::new(Address::new(BASE), vec![0u8; 0x30000]);
        let region = source.regions()[0];

        let mut matcher = ChunkedMatcher::new(&pattern).with_limit(1);
        let mut matches = MatchSet::new();
        let mut stats = ScanStats::default();
        let reached = matcher
            .scan_region(&source, &region, &mut matches, &mut stats, &CancelToken::new())
            .unwrap();

        assert!(reached);
        assert_eq!(matches.as_slice(), &[Address::new(BASE)]);
        assert_eq!(stats.windows_read, 1);
    }

    #[test]
    fn test_cancelled_before_first_window() {
        let pattern = compile("00").unwrap();
        let source = BufferSource::new(Address::new(BASE), vec![0u8; 0x100]);
        let region = source.regions()[0];
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut matcher = ChunkedMatcher::new(&pattern);
        let mut matches = MatchSet::new();
        let mut stats = ScanStats::default();
        let result = matcher.scan_region(&source, &region, &mut matches, &mut stats, &cancel);
        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert!(source.read_log().is_empty());
    }
}
