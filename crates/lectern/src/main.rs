//! Lectern - entry point
//!
//! Loads configuration, descriptor table and documentation files, then serves
//! the descriptor document until SIGTERM or SIGINT.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lectern::config::{ConfigLoader, DEFAULT_ENV_PREFIX};
use lectern::telemetry::init_telemetry;
use lectern::Application;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "lectern", version, about = "Serve enriched Swagger 2.0 descriptor documents")]
struct Args {
    /// Path to a configuration file (TOML or JSON)
    #[arg(short, long, env = "LECTERN_CONFIG")]
    config: Option<PathBuf>,

    /// Prefix for `PREFIX__SECTION__KEY` environment overrides
    #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
    env_prefix: String,

    /// Load everything, print a summary and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        // Logging may not be initialized yet.
        eprintln!("lectern: {e:#}");
        error!(error = %format!("{e:#}"), "lectern failed");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader
            .with_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }
    let config = loader
        .with_dotenv()?
        .with_env_prefix(&args.env_prefix)
        .load()
        .context("invalid configuration")?;

    if !args.check {
        init_telemetry(&config.telemetry.to_telemetry_config())
            .context("failed to initialize telemetry")?;
    }

    let app = Application::from_config(config)?;

    if args.check {
        println!("{}", app.summary());
        return Ok(());
    }

    let summary = app.summary();
    info!(
        version = lectern::VERSION,
        addr = %summary.http_addr,
        route = %summary.route,
        versions = ?summary.versions,
        types = summary.types,
        documented_members = summary.documented_members,
        "starting lectern"
    );

    app.into_server()?.run().await?;
    Ok(())
}
