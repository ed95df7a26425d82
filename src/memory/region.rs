// Sat Oct 17 2026 - Alex

use crate::memory::{Address, CommitState, PageProtection};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    base: Address,
    size: u64,
    state: CommitState,
    protection: PageProtection,
}

impl MemoryRegion {
    pub fn new(base: Address, size: u64, state: CommitState, protection: PageProtection) -> Self {
        Self {
            base,
            size,
            state,
            protection,
        }
    }

    pub fn committed(base: Address, size: u64, protection: PageProtection) -> Self {
        Self::new(base, size, CommitState::Committed, protection)
    }

    pub fn free(base: Address, size: u64) -> Self {
        Self::new(base, size, CommitState::Free, PageProtection::NOACCESS)
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    pub fn protection(&self) -> PageProtection {
        self.protection
    }

    pub fn end(&self) -> Address {
        self.base.saturating_add(self.size)
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.is_within_range(self.base, self.end())
    }

    pub fn is_committed(&self) -> bool {
        self.state == CommitState::Committed
    }

    pub fn clip(&self, start: Address, end: Address) -> Option<Self> {
        let lo = self.base.max(start);
        let hi = self.end().min(end);
        if lo >= hi {
            return None;
        }
        Some(Self {
            base: lo,
            size: hi - lo,
            ..*self
        })
    }
}

/// Region of a sorted, non-overlapping layout that contains `cursor`, or a free
/// region spanning the gap up to the next one.
pub fn locate_region(regions: &[MemoryRegion], cursor: Address) -> Option<MemoryRegion> {
    for region in regions {
        if region.contains(cursor) {
            return Some(*region);
        }
        if region.base() > cursor {
            return Some(MemoryRegion::free(cursor, region.base() - cursor));
        }
    }
    None
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {:>8} {} {}",
            self.base,
            self.end(),
            self.size,
            self.state,
            self.protection
        )
    }
}
