mod config;
mod loader;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::loader::{load_candidates, load_projects, write_outcome};

fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting matcher v{}", env!("CARGO_PKG_VERSION"));

    let candidates = load_candidates(&config.candidates_path)?;
    let projects = load_projects(&config.projects_path)?;

    let outcome = matcher::run_analysis(&candidates, &projects, &config.engine)
        .context("Matching run rejected its inputs")?;
    info!("Run {} complete: {}", outcome.run_id, outcome.report.summary.headline());

    write_outcome(&outcome, config.output_path.as_deref())?;

    Ok(())
}
