//! common-dts - regenerate `common.d.ts`
//!
//! Run from the project root. Packages are resolved from `node_modules`
//! and the output goes to `common.d.ts` in the root, unless
//! `common-dts.toml` names another path.
//!
//! # Environment
//!
//! - `COMMON_DTS_LOG` - tracing filter, defaults to `info`
//!
//! The process exits with status 1 when generation fails; nothing is written
//! in that case.

use anyhow::{Context, Result};
use common_dts::{Generator, GeneratorConfig};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    // Use COMMON_DTS_LOG env var for log level configuration, default to "info"
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_env("COMMON_DTS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn run() -> Result<()> {
    let root = env::current_dir().context("Failed to determine the current directory")?;
    let config = GeneratorConfig::load(&root)
        .with_context(|| format!("Failed to load configuration from {}", root.display()))?;
    let output = config.output_path();

    tracing::info!("Generating common.d.ts...");
    let report = Generator::new(config)
        .run()
        .with_context(|| format!("Failed to generate {}", output.display()))?;

    tracing::info!(
        declarations = report.emitted,
        lines = report.lines,
        "Successfully wrote to: {}",
        output.display()
    );
    Ok(())
}
