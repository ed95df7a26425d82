// Sat Oct 17 2026 - Alex

use super::args::{Args, Command, CompileArgs, FileArgs, PatternArgs, RangeArgs, RegionsArgs, ScanArgs};
use crate::config::ScanOptions;
use crate::memory::{
    map_file, Address, MappedFileSource, MemorySource, PageProtection, ProcessMemory, RegionEnumerator,
};
use crate::pattern::PatternCompiler;
use crate::scan::{ScanError, ScanReport, Scanner};
use crate::ui::progress::ProgressManager;
use crate::ui::{print_error, print_info, print_success, print_warning};
use anyhow::{bail, Context};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::json;
use std::path::Path;
use std::time::Instant;

pub struct CommandHandler {
    progress: ProgressManager,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            progress: ProgressManager::new(),
        }
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        if args.no_color {
            colored::control::set_override(false);
        }
        if args.quiet {
            self.progress = ProgressManager::new().with_enabled(false);
        }

        self.setup_logging(&args)?;

        match args.command {
            Command::Scan(scan_args) => self.handle_scan(scan_args),
            Command::File(file_args) => self.handle_file(file_args),
            Command::Regions(regions_args) => self.handle_regions(regions_args),
            Command::Compile(compile_args) => self.handle_compile(compile_args),
        }
    }

    fn setup_logging(&self, args: &Args) -> anyhow::Result<()> {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        };

        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .try_init()
            .context("Failed to install logger")?;

        Ok(())
    }

    fn handle_scan(&self, args: ScanArgs) -> anyhow::Result<()> {
        let options = build_options(&args.range)?;
        let process = ProcessMemory::attach(args.pid)
            .with_context(|| format!("Cannot attach to process {}", args.pid))?;

        if !args.pattern.json {
            print_info(&format!(
                "Scanning process {} from {} to {} ({})",
                args.pid, options.start, options.end, options.protection
            ));
        }
        self.run_scans(process, &args.pattern, &options)
    }

    fn handle_file(&self, args: FileArgs) -> anyhow::Result<()> {
        let options = build_options(&args.range)?;
        let source = map_dump(&args.path, args.base)?;

        if !args.pattern.json {
            print_info(&format!(
                "Scanning {} ({} bytes) mapped at {}",
                args.path.display(),
                source.len(),
                args.base
            ));
        }
        self.run_scans(source, &args.pattern, &options)
    }

    fn handle_regions(&self, args: RegionsArgs) -> anyhow::Result<()> {
        let options = build_options(&args.range)?;
        let process = ProcessMemory::attach(args.pid)
            .with_context(|| format!("Cannot attach to process {}", args.pid))?;

        let mut enumerator =
            RegionEnumerator::new(&process, options.start, options.end, options.protection);
        let regions: Vec<_> = enumerator.by_ref().collect();

        if args.json {
            println!("{}", serde_json::to_string_pretty(&regions)?);
            return Ok(());
        }

        println!("{}", "Eligible regions".cyan().bold());
        println!("{}", "-".repeat(72).cyan());
        for region in &regions {
            println!("  {}", region);
        }
        let total: u64 = regions.iter().map(|r| r.size()).sum();
        print_success(&format!(
            "{} of {} regions eligible, {} bytes",
            regions.len(),
            enumerator.visited(),
            total
        ));
        Ok(())
    }

    fn handle_compile(&self, args: CompileArgs) -> anyhow::Result<()> {
        let pattern = PatternCompiler::new()
            .strict(args.strict)
            .compile(&args.pattern)
            .with_context(|| format!("Cannot compile {:?}", args.pattern))?;

        print_success(&format!("{}", pattern.to_string().green()));
        println!(
            "  {} bytes, {} significant, {} wildcard",
            pattern.len(),
            pattern.significant_byte_count(),
            pattern.wildcard_byte_count()
        );
        Ok(())
    }

    fn run_scans<S: MemorySource>(
        &self,
        source: S,
        args: &PatternArgs,
        options: &ScanOptions,
    ) -> anyhow::Result<()> {
        let scanner = Scanner::new(source)
            .strict(args.strict)
            .with_match_budget(args.max_matches.unwrap_or(usize::MAX));
        let threads = args
            .threads
            .unwrap_or_else(num_cpus::get)
            .clamp(1, args.patterns.len().max(1));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to start scan workers")?;
        log::debug!("Scanning {} pattern(s) on {} thread(s)", args.patterns.len(), threads);
        let started = Instant::now();

        let results: Vec<Result<ScanReport, ScanError>> = pool.install(|| {
            args.patterns
                .par_iter()
                .map(|pattern| {
                    let spinner = self.progress.create_spinner(&format!("Scanning {}", pattern));
                    let result = if args.first {
                        scanner.scan_until_first(pattern, options)
                    } else {
                        scanner.scan(pattern, Some(options))
                    };
                    spinner.finish_and_clear();
                    result
                })
                .collect()
        });

        let failures = results
            .iter()
            .filter(|r| r.as_ref().map_or(true, |report| !report.is_complete()))
            .count();

        if args.json {
            print_json(&args.patterns, &results)?;
        } else {
            for (pattern, result) in args.patterns.iter().zip(&results) {
                print_report(pattern, result);
            }
            print_info(&format!(
                "{} pattern(s) scanned in {:.2}s",
                results.len(),
                started.elapsed().as_secs_f64()
            ));
        }

        if failures > 0 {
            bail!("{} of {} scans did not complete", failures, results.len());
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_options(args: &RangeArgs) -> anyhow::Result<ScanOptions> {
    let mut options = match &args.options {
        Some(path) => ScanOptions::from_file(path)
            .with_context(|| format!("Cannot load options from {}", path.display()))?,
        None => ScanOptions::default(),
    };

    if let Some(start) = args.start {
        options.start = start;
    }
    if let Some(end) = args.end {
        options.end = end;
    }
    if let Some(alignment) = args.alignment {
        options.alignment = alignment;
    }
    if let Some(protection) = args.protection {
        options.protection = protection;
    }

    options.validate().context("Invalid scan options")?;
    Ok(options)
}

/// Maps a dump as one region that passes both `readonly` and `readwrite` filters.
pub fn map_dump(path: &Path, base: Address) -> anyhow::Result<MappedFileSource> {
    map_file(path, base, PageProtection::READONLY | PageProtection::READWRITE)
        .with_context(|| format!("Cannot map {}", path.display()))
}

fn print_report(pattern: &str, result: &Result<ScanReport, ScanError>) {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            print_error(&format!("{}: {}", pattern, e));
            return;
        }
    };

    if report.matches.is_empty() {
        print_warning(&format!("{}: no matches", report.pattern));
    } else {
        print_success(&format!(
            "{}: {} match(es)",
            report.pattern.to_string().bold(),
            report.matches.len()
        ));
        for address in &report.matches {
            println!("    {}", address.to_string().green());
        }
    }
    log::debug!("{}: {}", report.pattern, report.stats);

    if let Some(e) = &report.error {
        print_error(&format!("{}: scan interrupted, results are partial: {}", report.pattern, e));
    }
}

fn print_json(patterns: &[String], results: &[Result<ScanReport, ScanError>]) -> anyhow::Result<()> {
    let entries = patterns
        .iter()
        .zip(results)
        .map(|(pattern, result)| match result {
            Ok(report) => serde_json::to_value(report),
            Err(e) => Ok(json!({ "pattern": pattern, "error": e.to_string() })),
        })
        .collect::<Result<Vec<_>, _>>()?;
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
