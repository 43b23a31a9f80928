//! boardmerge-web - Browser front end for the board merger
//!
//! Serves a form that takes a directory path and shows the merged boards
//! as a table. The same pipeline is available as JSON under `/api/catalog`.

mod api;
mod config;
mod render;
mod server;
mod state;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "boardmerge-web")]
#[command(about = "Web form for merging JSON board descriptions")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "boardmerge-web.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Port for web server, keeping the configured host
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("boardmerge-web v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.set_port(port);
    }

    info!(
        static_dir = %config.server.static_dir,
        default_depth = config.scan.default_depth,
        "Configuration loaded"
    );

    let state = Arc::new(state::AppState::new(config));
    server::run(state).await
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_port_override_args() {
        let args = Args::try_parse_from(["boardmerge-web", "--port", "9090"]).unwrap();
        assert_eq!(args.port, Some(9090));
        assert_eq!(args.config, PathBuf::from("boardmerge-web.toml"));
        assert!(args.bind.is_none());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("loud"), Level::INFO);
    }
}
