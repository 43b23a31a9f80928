//! boardmerge - Merge board description files into one catalog
//!
//! Scans a directory for JSON board descriptions, merges duplicates and
//! prints the resulting catalog as JSON.

use anyhow::{bail, Context, Result};
use boardmerge_core::{
    scan_and_merge, BoardCatalog, NullReporter, Reporter, ScanOptions, TracingReporter,
    DEFAULT_MAX_DEPTH,
};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "boardmerge")]
#[command(about = "Merge JSON board descriptions into one deduplicated catalog")]
#[command(version)]
struct Args {
    /// Path to the directory containing JSON files (prompted for when omitted)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Enable recursive directory traversal
    #[arg(short, long)]
    recursive: bool,

    /// Maximum depth for directory traversal, used only when recursive is set
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    depth: usize,

    /// Enable logs
    #[arg(short = 'l', long)]
    logging: bool,

    /// Log level when logs are enabled (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print compact JSON instead of indented JSON
    #[arg(long)]
    compact: bool,

    /// Write the catalog to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn scan_options(&self) -> ScanOptions {
        if self.recursive {
            ScanOptions::recursive(self.depth)
        } else {
            ScanOptions::flat()
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if args.logging {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(parse_level(&args.log_level))
            .with_target(true)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        info!("boardmerge v{}", env!("CARGO_PKG_VERSION"));
    }

    let path = match &args.path {
        Some(path) => path.clone(),
        None => prompt_for_path(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    let reporter: &dyn Reporter = if args.logging {
        &TracingReporter
    } else {
        &NullReporter
    };

    let catalog = scan_and_merge(&path, args.scan_options(), reporter)?;
    info!(
        boards = catalog.metadata.total_boards,
        vendors = catalog.metadata.unique_vendors,
        "Merged board catalog"
    );

    let rendered = render_catalog(&catalog, args.compact)?;
    match &args.output {
        Some(output) => write_output(output, &rendered)?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", rendered)?;
        }
    }

    Ok(())
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn prompt_for_path(input: &mut impl BufRead, output: &mut impl Write) -> Result<PathBuf> {
    write!(output, "Enter the path to the directory: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read directory path")?;

    let path = line.trim();
    if path.is_empty() {
        bail!("No directory path given");
    }
    Ok(PathBuf::from(path))
}

fn render_catalog(catalog: &BoardCatalog, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(catalog)?
    } else {
        catalog.to_json_pretty()?
    };
    Ok(rendered)
}

fn write_output(path: &Path, rendered: &str) -> Result<()> {
    std::fs::write(path, format!("{}\n", rendered))
        .with_context(|| format!("Failed to write catalog to {}", path.display()))?;
    info!(path = %path.display(), "Wrote board catalog");
    Ok(())
}
