// Sat Oct 17 2026 - Alex

use crate::memory::Address;

pub const DEFAULT_WINDOW_SIZE: usize = 0x10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub address: Address,
    pub len: usize,
    pub overlap: usize,
    /// First candidate offset the previous window could not test.
    pub scan_start: usize,
}

/// Splits a region into overlapping windows.
///
/// Consecutive windows advance by `window - (pattern_len - 1)` so any match
/// crossing a window boundary lies entirely inside the next one. Every
/// candidate position of the region is assigned to exactly one window.
/// Regions shorter than the pattern produce no windows.
#[derive(Debug, Clone)]
pub struct WindowPlan {
    base: Address,
    size: u64,
    window: u64,
    pattern_len: u64,
    offset: u64,
    next_candidate: u64,
    done: bool,
}

impl WindowPlan {
    pub fn new(base: Address, size: u64, window: usize, pattern_len: usize) -> Self {
        let pattern_len = pattern_len.max(1) as u64;
        let window = (window as u64).max(pattern_len);
        Self {
            base,
            size,
            window,
            pattern_len,
            offset: 0,
            next_candidate: 0,
            done: size < pattern_len,
        }
    }

    pub fn step(&self) -> u64 {
        self.window - (self.pattern_len - 1)
    }
}

impl Iterator for WindowPlan {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.done {
            return None;
        }

        let remaining = self.size - self.offset;
        let len = remaining.min(self.window);
        let overlap = if self.offset == 0 {
            0
        } else {
            self.pattern_len - 1
        };
        let window = Window {
            address: self.base + self.offset,
            len: len as usize,
            overlap: overlap as usize,
            scan_start: self.next_candidate.saturating_sub(self.offset) as usize,
        };

        self.next_candidate = self.offset + len - self.pattern_len + 1;
        if self.offset + len >= self.size {
            self.done = true;
        } else {
            self.offset += self.step();
        }
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_windows_for_70000_bytes() {
        let windows: Vec<_> = WindowPlan::new(Address::new(0x100000), 70000, 65536, 4).collect();
        assert_eq!(windows.len(), 2);

        assert_eq!(windows[0].address, Address::new(0x100000));
        assert_eq!(windows[0].len, 65536);
        assert_eq!(windows[0].scan_start, 0);

        assert_eq!(windows[1].address, Address::new(0x100000 + 65533));
        assert_eq!(windows[1].len, 70000 - 65533);
        assert_eq!(windows[1].overlap, 3);
        assert_eq!(windows[1].scan_start, 0);
    }

    #[test]
    fn test_every_candidate_assigned_once() {
        let size = 1000u64;
        let pattern_len = 7usize;
        let mut seen = vec![0u32; size as usize - pattern_len + 1];

        for window in WindowPlan::new(Address::zero(), size, 64, pattern_len) {
            let base = window.address.as_u64() as usize;
            for offset in window.scan_start..=window.len - pattern_len {
                seen[base + offset] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn test_region_fits_single_window() {
        let windows: Vec<_> = WindowPlan::new(Address::new(0x1000), 65536, 65536, 4).collect();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].len, 65536);
    }

    #[test]
    fn test_region_shorter_than_pattern() {
        assert_eq!(WindowPlan::new(Address::new(0x1000), 3, 65536, 4).count(), 0);
        assert_eq!(WindowPlan::new(Address::new(0x1000), 4, 65536, 4).count(), 1);
    }

    #[test]
    fn test_window_never_smaller_than_pattern() {
        let plan = WindowPlan::new(Address::zero(), 100, 2, 8);
        assert_eq!(plan.step(), 1);
        let windows: Vec<_> = plan.collect();
        assert_eq!(windows.len(), 93);
        assert!(windows.iter().all(|w| w.len == 8));
    }
}
