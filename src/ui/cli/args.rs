// Sat Oct 17 2026 - Alex

use crate::memory::{Address, PageProtection};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sigscan")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Wildcard signature scanner for process memory", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a running process
    Scan(ScanArgs),
    /// Scan a file mapped at a chosen base address
    File(FileArgs),
    /// List the regions a scan would visit
    Regions(RegionsArgs),
    /// Show how a pattern compiles
    Compile(CompileArgs),
}

/// Bounds shared by every subcommand that walks an address space. Flags
/// override values loaded with `--options`.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct RangeArgs {
    /// JSON file with start, end, alignment and protection
    #[arg(long)]
    pub options: Option<PathBuf>,

    #[arg(long)]
    pub start: Option<Address>,

    #[arg(long)]
    pub end: Option<Address>,

    #[arg(long)]
    pub alignment: Option<usize>,

    /// Comma separated classes, e.g. `rw,rwx` or `readable`
    #[arg(long)]
    pub protection: Option<PageProtection>,
}

#[derive(ClapArgs, Debug)]
pub struct PatternArgs {
    /// Signature such as "48 8B ?? 00"; repeat for several
    #[arg(short, long = "pattern", required = true)]
    pub patterns: Vec<String>,

    /// Reject malformed tokens instead of truncating
    #[arg(long)]
    pub strict: bool,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Stop each pattern at its first match
    #[arg(long)]
    pub first: bool,

    /// Worker threads for concurrent patterns (defaults to the CPU count)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Stop a scan once it holds this many matches
    #[arg(long)]
    pub max_matches: Option<usize>,
}

#[derive(ClapArgs, Debug)]
pub struct ScanArgs {
    #[arg(long)]
    pub pid: u32,

    #[command(flatten)]
    pub pattern: PatternArgs,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(ClapArgs, Debug)]
pub struct FileArgs {
    #[arg(long)]
    pub path: PathBuf,

    /// Address the first byte of the file is mapped at
    #[arg(long, default_value = "0x0")]
    pub base: Address,

    #[command(flatten)]
    pub pattern: PatternArgs,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(ClapArgs, Debug)]
pub struct RegionsArgs {
    #[arg(long)]
    pub pid: u32,

    #[command(flatten)]
    pub range: RangeArgs,

    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CompileArgs {
    #[arg(short, long)]
    pub pattern: String,

    #[arg(long)]
    pub strict: bool,
}
