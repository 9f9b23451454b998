mod terminal;

use anyhow::Context;
use chrono::{DateTime, Local};
use clap::Parser;
use rdirdiff_common::{load_config, load_config_from, AppConfig, CompareStrategy, RunStats};
use rdirdiff_core::report::{sanitize_path, BOLD, RESET};
use rdirdiff_core::{DiffOptions, JsonLinesSink, LocalVfs, Reporter, TreeDiffer};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use terminal::TerminalSink;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const SEPARATOR: &str = "------------";

#[derive(Parser)]
#[command(name = "rdirdiff")]
#[command(author = "RDirDiff Contributors")]
#[command(version)]
#[command(about = "Recursively compare two directory trees and report where they diverge", long_about = None)]
struct Cli {
    /// The first directory to process
    first: PathBuf,

    /// The second directory to process
    second: PathBuf,

    /// Comparison function: `md5`, `blake3` or `sizes_only`
    #[arg(long)]
    strategy: Option<String>,

    /// Ignore desktop metadata files such as `.DS_Store`
    #[arg(long)]
    skip_junk: bool,

    /// Compare desktop metadata files like any other file
    #[arg(long, conflicts_with = "skip_junk")]
    no_skip_junk: bool,

    /// Report files that only differ in their timestamps
    #[arg(long)]
    report_dates: bool,

    /// Don't report files that only differ in their timestamps
    #[arg(long, conflicts_with = "report_dates")]
    skip_dates: bool,

    /// Display the current directory as the comparison progresses
    #[arg(long)]
    progress: bool,

    /// Hide the progress line
    #[arg(long, conflicts_with = "progress")]
    no_progress: bool,

    /// Ignore any directory with this name (can be specified multiple times)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Configuration file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output one JSON object per divergence
    #[arg(long)]
    json: bool,

    /// Disable ANSI colors in output
    #[arg(long)]
    no_color: bool,

    /// Log the details of every checksum comparison to stderr
    #[arg(long)]
    debug: bool,
}

/// Start-up banner content, passed in rather than read from globals
struct Banner {
    version: &'static str,
    revision: Option<String>,
}

impl Banner {
    fn from_build() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            revision: option_env!("RDIRDIFF_GIT_REVISION").map(String::from),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so the report on stdout stays clean
    let default_filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(e) = run_compare(&cli, &Banner::from_build()) {
        error!("Comparison failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Merge the configuration file with command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let loaded = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    debug!("Configuration file: {} (exists: {})", loaded.path.display(), loaded.exists);
    let mut config = loaded.config;

    if let Some(name) = &cli.strategy {
        config.strategy = name.parse::<CompareStrategy>()?;
    }
    if cli.skip_junk {
        config.skip_junk = true;
    } else if cli.no_skip_junk {
        config.skip_junk = false;
    }
    if cli.report_dates {
        config.report_dates = true;
    } else if cli.skip_dates {
        config.report_dates = false;
    }
    if cli.progress {
        config.progress = true;
    } else if cli.no_progress {
        config.progress = false;
    }
    config.ignore_dirs.extend(cli.ignore.iter().cloned());

    Ok(config)
}

fn run_compare(cli: &Cli, banner: &Banner) -> anyhow::Result<()> {
    let config = resolve_config(cli)?;

    let vfs = LocalVfs::new();
    let strategy = config.strategy;
    let differ = TreeDiffer::new(&vfs, &strategy, DiffOptions::from_config(&config));
    differ.check_roots(&cli.first, &cli.second)?;

    if cli.json {
        let mut reporter = Reporter::new(JsonLinesSink::new(io::stdout()));
        differ.run(&cli.first, &cli.second, &mut reporter)?;
        return Ok(());
    }

    let use_color = !cli.no_color && io::stdout().is_terminal();
    let started_at = Local::now();
    let timer = Instant::now();

    let mut stdout = io::stdout();
    write_intro(&mut stdout, banner, started_at, &cli.first, &cli.second, &config.ignore_dirs)
        .context("writing banner")?;

    let sink = TerminalSink::stdout(use_color).with_progress(config.progress);
    let mut reporter = Reporter::new(sink);
    let stats = differ.run(&cli.first, &cli.second, &mut reporter)?;

    write_outro(&mut stdout, &stats, Local::now(), timer.elapsed(), use_color)
        .context("writing summary")?;
    Ok(())
}

fn write_intro<W: Write>(
    out: &mut W,
    banner: &Banner,
    started_at: DateTime<Local>,
    first: &Path,
    second: &Path,
    ignore_dirs: &[String],
) -> io::Result<()> {
    writeln!(out, "rdirdiff version {} (pid {})", banner.version, std::process::id())?;
    if let Some(revision) = &banner.revision {
        writeln!(out, "The exact version of the codebase is: {}", revision)?;
    }
    writeln!(out, "Start at: {}", started_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{}", SEPARATOR)?;
    writeln!(out, "First directory: \"{}\"", sanitize_path(first))?;
    writeln!(out, "Secnd directory: \"{}\"", sanitize_path(second))?;
    if !ignore_dirs.is_empty() {
        let names: Vec<String> = ignore_dirs
            .iter()
            .map(|name| format!("\"{}\"", sanitize_path(Path::new(name))))
            .collect();
        writeln!(out, "Ignoring all directories named: {}", names.join(", "))?;
    }
    writeln!(out, "{}", SEPARATOR)?;
    out.flush()
}

fn write_outro<W: Write>(
    out: &mut W,
    stats: &RunStats,
    ended_at: DateTime<Local>,
    elapsed: Duration,
    use_color: bool,
) -> io::Result<()> {
    writeln!(out, "{}", SEPARATOR)?;
    if stats.has_errors() {
        writeln!(out, "Success (with non-fatal errors).")?;
    } else {
        writeln!(out, "Success.")?;
    }

    if stats.is_identical() {
        let (bold, reset) = if use_color { (BOLD, RESET) } else { ("", "") };
        writeln!(out, "{}The two directories were perfectly identical.{}", bold, reset)?;
    } else {
        writeln!(
            out,
            "There were {} differences between the two directories.",
            stats.differences
        )?;
    }

    writeln!(out, "End at: {}", ended_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "Total elapsed: {}", format_elapsed(elapsed))?;
    out.flush()
}

/// `h:mm:ss.mmm`
fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{}:{:02}:{:02}.{:03}",
        total / 3600,
        (total / 60) % 60,
        total % 60,
        elapsed.subsec_millis()
    )
}
