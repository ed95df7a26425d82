// Sat Oct 17 2026 - Alex

use crate::config::ScanOptions;
use crate::memory::{Address, MemorySource, RegionEnumerator};
use crate::pattern::{Pattern, PatternCompiler};
use crate::scan::window::DEFAULT_WINDOW_SIZE;
use crate::scan::{CancelToken, ChunkedMatcher, MatchSet, ScanError, ScanReport, ScanStats};
use rayon::prelude::*;

/// Interrupted scans still return their partial matches inside the [`ScanReport`].
pub struct Scanner<S> {
    source: S,
    compiler: PatternCompiler,
    window_size: usize,
    match_budget: usize,
    cancel: CancelToken,
}

impl<S: MemorySource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            compiler: PatternCompiler::new(),
            window_size: DEFAULT_WINDOW_SIZE,
            match_budget: usize::MAX,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Most addresses one report may hold before the scan stops with
    /// `AllocationFailed`.
    pub fn with_match_budget(mut self, budget: usize) -> Self {
        self.match_budget = budget;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.compiler = self.compiler.strict(strict);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn scan(&self, pattern: &str, options: Option<&ScanOptions>) -> Result<ScanReport, ScanError> {
        let options = options.ok_or(ScanError::MissingOptions)?;
        options.validate()?;
        let pattern = self.compiler.compile(pattern)?;
        Ok(self.run(pattern, options, usize::MAX))
    }

    pub fn scan_pattern(&self, pattern: &Pattern, options: &ScanOptions) -> Result<ScanReport, ScanError> {
        options.validate()?;
        Ok(self.run(pattern.clone(), options, usize::MAX))
    }

    pub fn scan_default(&self, pattern: &str) -> Result<ScanReport, ScanError> {
        self.scan(pattern, Some(&ScanOptions::default()))
    }

    pub fn scan_until_first(&self, pattern: &str, options: &ScanOptions) -> Result<ScanReport, ScanError> {
        options.validate()?;
        let pattern = self.compiler.compile(pattern)?;
        Ok(self.run(pattern, options, 1))
    }

    pub fn scan_first(&self, pattern: &str, options: &ScanOptions) -> Result<Option<Address>, ScanError> {
        let report = self.scan_until_first(pattern, options)?;
        match (report.matches.first(), report.error) {
            (Some(address), _) => Ok(Some(address)),
            (None, Some(e)) => Err(e),
            (None, None) => Ok(None),
        }
    }

    /// Results come back in input order.
    pub fn scan_many<P>(&self, patterns: &[P], options: &ScanOptions) -> Vec<Result<ScanReport, ScanError>>
    where
        P: AsRef<str> + Sync,
    {
        patterns
            .par_iter()
            .map(|pattern| self.scan(pattern.as_ref(), Some(options)))
            .collect()
    }

    fn run(&self, pattern: Pattern, options: &ScanOptions, limit: usize) -> ScanReport {
        let mut matches = MatchSet::with_budget(self.match_budget);
        let mut stats = ScanStats::default();

        let error = self
            .scan_regions(&pattern, options, limit, &mut matches, &mut stats)
            .err();

        match &error {
            Some(e) => log::error!(
                "Scan for {} stopped after {} matches: {}",
                pattern,
                matches.len(),
                e
            ),
            None => log::debug!("Scan for {} found {} matches: {}", pattern, matches.len(), stats),
        }

        ScanReport {
            pattern,
            matches,
            stats,
            error,
        }
    }

    fn scan_regions(
        &self,
        pattern: &Pattern,
        options: &ScanOptions,
        limit: usize,
        matches: &mut MatchSet,
        stats: &mut ScanStats,
    ) -> Result<(), ScanError> {
        let mut matcher = ChunkedMatcher::new(pattern)
            .with_alignment(options.alignment)
            .with_window_size(self.window_size)
            .with_limit(limit);
        let mut regions = RegionEnumerator::new(&self.source, options.start, options.end, options.protection);

        let result = loop {
            if self.cancel.is_cancelled() {
                break Err(ScanError::Cancelled);
            }
            let Some(region) = regions.next() else {
                break Ok(());
            };

            stats.regions_scanned += 1;
            log::debug!("Scanning region {}", region);
            match matcher.scan_region(&self.source, &region, matches, stats, &self.cancel) {
                Ok(true) => break Ok(()),
                Ok(false) => {}
                Err(e) => break Err(e),
            }
        };

        stats.regions_visited = regions.visited();
        result
    }
}
