//! quill - a markdown static site generator.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use quill_build::{Config, Pipeline};

#[derive(Parser)]
#[command(name = "quill", version, about = "A markdown static site generator")]
struct Cli {
    /// Site directory to build
    #[arg(default_value = ".")]
    site_dir: PathBuf,

    /// Absolute URL of the site root, overriding `siteRootURL`
    #[arg(long, value_name = "URL")]
    site_root: Option<String>,

    /// Output directory (defaults to `<site-dir>/_output`)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let start = Instant::now();
    let config = Config::load(&cli.site_dir, cli.site_root.as_deref(), cli.output.as_deref())?;
    Pipeline::load(config)?.run()?;
    tracing::debug!(elapsed = ?start.elapsed(), "site built");
    Ok(())
}
