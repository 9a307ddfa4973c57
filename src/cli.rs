//! Command-line interface for codemap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::{self, Verbosity};
use crate::processor::{parse_types, Options, Processor};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Stamp path, package, and language headers into source files.
///
/// codemap walks a directory tree and inserts (or removes) a single-line
/// comment at the top of each supported source file, e.g.
/// `// codemap: path=cmd/main.go;pkg=main;lang=Go`.
#[derive(Parser)]
#[command(name = "codemap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add annotations to files
    #[command(visible_alias = "annotate")]
    Apply(ApplyArgs),
    /// Remove annotations from files
    Clean(CleanArgs),
    /// List files that would be processed
    #[command(visible_alias = "ls")]
    List(CommonArgs),
    /// Show statistics about annotations
    Stats(StatsArgs),
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Directory to process
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Comma-separated list of file types to process (e.g. go,py,ts)
    #[arg(short, long)]
    pub types: Option<String>,

    /// Config file (default: codemap.yaml or .codemap.yaml in --dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Additional directory name to skip (repeatable)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,

    /// Additional file glob to skip (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude_files: Vec<String>,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Process files one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Only process the top-level directory
    #[arg(long)]
    pub no_recursive: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the apply command.
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Arguments for the clean command.
#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatsFormat {
    Pretty,
    Json,
}

/// Arguments for the stats command.
#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: StatsFormat,
}

/// Build run options: defaults, then the config file, then flags.
pub fn build_options(args: &CommonArgs) -> anyhow::Result<Options> {
    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => Options::discover(&args.dir),
    };

    let mut opts = match &config_path {
        Some(path) => Options::from_file(path)?,
        None => Options::default(),
    };

    opts.directory = args.dir.clone();
    if let Some(types) = &args.types {
        opts.supported_types = parse_types(types);
    }
    opts.exclude_dirs.extend(args.exclude_dirs.iter().cloned());
    opts.exclude_files.extend(args.exclude_files.iter().cloned());
    if let Some(workers) = args.workers {
        opts.max_workers = workers;
    }
    if args.sequential {
        opts.concurrent = false;
    }
    if args.no_recursive {
        opts.recursive = false;
    }

    opts.validate()?;
    Ok(opts)
}

/// Resolve options, set up logging, and build the processor.
fn prepare(args: &CommonArgs) -> anyhow::Result<Processor> {
    let opts = build_options(args)?;

    let verbosity =
        Verbosity::from_flags(args.verbose, args.quiet).with_config_verbose(opts.verbose);
    logging::init(verbosity);

    tracing::debug!("Processing directory: {}", opts.directory.display());
    tracing::debug!("Looking for file types: {:?}", opts.supported_types);

    Ok(Processor::new(opts)?)
}

fn dir_label(args: &CommonArgs) -> String {
    args.dir.to_string_lossy().to_string()
}

/// Run the apply command.
pub fn run_apply(args: &ApplyArgs) -> anyhow::Result<i32> {
    let proc = match prepare(&args.common) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: failed to initialize processor: {e:#}");
            return Ok(EXIT_ERROR);
        }
    };

    if args.dry_run {
        let files = proc.list_files()?;
        report::write_dry_run("annotate", &dir_label(&args.common), proc.root(), &files);
        return Ok(EXIT_SUCCESS);
    }

    match proc.process() {
        Ok(summary) => {
            let action = if proc.options().clean { "Cleaned" } else { "Annotated" };
            report::write_summary(action, &summary);
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: failed to process files: {e}");
            Ok(EXIT_FAILED)
        }
    }
}

/// Run the clean command.
pub fn run_clean(args: &CleanArgs) -> anyhow::Result<i32> {
    let proc = match prepare(&args.common) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: failed to initialize processor: {e:#}");
            return Ok(EXIT_ERROR);
        }
    };

    if args.dry_run {
        let files = proc.list_files()?;
        report::write_dry_run("clean", &dir_label(&args.common), proc.root(), &files);
        return Ok(EXIT_SUCCESS);
    }

    let summary = proc.clean()?;
    report::write_summary("Cleaned", &summary);
    Ok(EXIT_SUCCESS)
}

/// Run the list command.
pub fn run_list(args: &CommonArgs) -> anyhow::Result<i32> {
    let proc = match prepare(args) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: failed to initialize processor: {e:#}");
            return Ok(EXIT_ERROR);
        }
    };

    let files = proc.list_files()?;
    report::write_file_list(&dir_label(args), proc.root(), &files);
    Ok(EXIT_SUCCESS)
}

/// Run the stats command.
pub fn run_stats(args: &StatsArgs) -> anyhow::Result<i32> {
    let proc = match prepare(&args.common) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: failed to initialize processor: {e:#}");
            return Ok(EXIT_ERROR);
        }
    };

    let stats = proc.get_stats()?;
    let dir = dir_label(&args.common);
    match args.format {
        StatsFormat::Json => report::write_stats_json(&dir, &stats)?,
        StatsFormat::Pretty => report::write_stats_pretty(&dir, &stats),
    }
    Ok(EXIT_SUCCESS)
}
