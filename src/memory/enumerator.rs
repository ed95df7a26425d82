// Sat Oct 17 2026 - Alex

use crate::memory::{Address, MemoryRegion, MemorySource, PageProtection};

/// The cursor always moves to the end of the region just queried, eligible or not.
pub struct RegionEnumerator<'a, S: MemorySource + ?Sized> {
    source: &'a S,
    cursor: Address,
    start: Address,
    end: Address,
    filter: PageProtection,
    finished: bool,
    visited: usize,
}

impl<'a, S: MemorySource + ?Sized> RegionEnumerator<'a, S> {
    pub fn new(source: &'a S, start: Address, end: Address, filter: PageProtection) -> Self {
        source.refresh_layout();
        Self {
            source,
            cursor: start,
            start,
            end,
            filter,
            finished: false,
            visited: 0,
        }
    }

    pub fn visited(&self) -> usize {
        self.visited
    }
}

impl<'a, S: MemorySource + ?Sized> Iterator for RegionEnumerator<'a, S> {
    type Item = MemoryRegion;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished || self.cursor >= self.end {
                return None;
            }

            let Some(region) = self.source.query_region(self.cursor) else {
                self.finished = true;
                return None;
            };
            self.visited += 1;

            if region.base() >= self.end {
                self.finished = true;
                return None;
            }

            match region.base().checked_add(region.size()) {
                Some(next) if next > self.cursor => self.cursor = next,
                _ => {
                    log::debug!("Enumeration stopped at {}: region does not advance", region.base());
                    self.finished = true;
                }
            }

            if !region.is_committed() || !region.protection().is_eligible(self.filter) {
                log::trace!("Skipping region {}", region);
                continue;
            }

            if let Some(clipped) = region.clip(self.start, self.end) {
                return Some(clipped);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{BufferSource, CommitState, ReadError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        inner: BufferSource,
        refreshes: AtomicUsize,
        queries: AtomicUsize,
    }

    impl MemorySource for CountingSource {
        fn refresh_layout(&self) {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
        }

        fn query_region(&self, cursor: Address) -> Option<MemoryRegion> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.inner.query_region(cursor)
        }

        fn read(&self, address: Address, buffer: &mut [u8]) -> Result<usize, ReadError> {
            self.inner.read(address, buffer)
        }
    }

    fn layout() -> BufferSource {
        BufferSource::new(Address::new(0x10000), vec![0u8; 0x6000])
            .with_region(0x0000, 0x1000, CommitState::Committed, PageProtection::READWRITE)
            .with_region(0x1000, 0x1000, CommitState::Committed, PageProtection::READONLY)
            .with_region(0x2000, 0x1000, CommitState::Reserved, PageProtection::READWRITE)
            .with_region(0x4000, 0x2000, CommitState::Committed, PageProtection::EXECUTE_READWRITE)
    }

    #[test]
    fn test_filters_state_and_protection() {
        let source = layout();
        let regions: Vec<_> = RegionEnumerator::new(
            &source,
            Address::zero(),
            Address::new(u64::MAX),
            PageProtection::DEFAULT_FILTER,
        )
        .collect();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].base(), Address::new(0x10000));
        assert_eq!(regions[0].size(), 0x1000);
        assert_eq!(regions[1].base(), Address::new(0x14000));
        assert_eq!(regions[1].protection(), PageProtection::EXECUTE_READWRITE);
    }

    #[test]
    fn test_clips_to_requested_bounds() {
        let source = layout();
        let regions: Vec<_> = RegionEnumerator::new(
            &source,
            Address::new(0x10800),
            Address::new(0x15000),
            PageProtection::all(),
        )
        .collect();

        let first = regions.first().unwrap();
        assert_eq!(first.base(), Address::new(0x10800));
        let last = regions.last().unwrap();
        assert_eq!(last.base(), Address::new(0x14000));
        assert_eq!(last.end(), Address::new(0x15000));
        assert!(regions.iter().all(|r| r.is_committed()));
    }

    #[test]
    fn test_advances_over_gaps_and_stops_at_end() {
        let source = layout();
        let mut enumerator = RegionEnumerator::new(
            &source,
            Address::zero(),
            Address::new(0x14000),
            PageProtection::all(),
        );
        let regions: Vec<_> = enumerator.by_ref().collect();

        // 0x14000 region starts at the bound and must not be yielded
        assert_eq!(regions.len(), 2);
        assert!(enumerator.visited() >= 4);
        assert!(enumerator.next().is_none());
    }

    #[test]
    fn test_empty_source_yields_nothing() {
        let source = BufferSource::new(Address::new(0x1000), Vec::<u8>::new());
        let mut enumerator = RegionEnumerator::new(
            &source,
            Address::zero(),
            Address::new(u64::MAX),
            PageProtection::all(),
        );
        assert!(enumerator.next().is_none());
    }

    #[test]
    fn test_layout_refreshed_once_per_pass() {
        let source = CountingSource {
            inner: layout(),
            refreshes: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        };

        let first = RegionEnumerator::new(&source, Address::zero(), Address::new(u64::MAX), PageProtection::all());
        assert_eq!(first.count(), 3);
        assert_eq!(source.refreshes.load(Ordering::SeqCst), 1);
        assert!(source.queries.load(Ordering::SeqCst) >= 5);

        let second = RegionEnumerator::new(&source, Address::zero(), Address::new(u64::MAX), PageProtection::all());
        assert_eq!(second.count(), 3);
        assert_eq!(source.refreshes.load(Ordering::SeqCst), 2);
    }
}
