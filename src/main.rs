//! ffwrap
//!
//! Command-line front end: assembles ffmpeg jobs, runs them and reports
//! progress.
//!
//! # Usage
//!
//! ```bash
//! ffwrap transcode -i input.mkv -o output.mp4 --video-codec libx264 --crf 20
//! ffwrap concat part1.mp4 part2.mp4 -o joined.mp4 --chapters
//! ffwrap inspect -i input.mkv --json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ffwrap::adapters::TracingLogAdapter;
use ffwrap::app::container::DefaultAppContainer;
use ffwrap::cli::{commands, Cli, Commands};
use ffwrap::config_initialization::initialize_settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = initialize_settings(&cli).context("Failed to load configuration")?;
    TracingLogAdapter::init(settings.log_level, settings.log_format)?;
    info!("Starting ffwrap {}", env!("CARGO_PKG_VERSION"));

    let container = DefaultAppContainer::new(&settings);

    match cli.command {
        Commands::Transcode(args) => commands::transcode(&container, &settings, args).await?,
        Commands::Concat(args) => commands::concat(&container, &settings, args).await?,
        Commands::Inspect(args) => commands::inspect(&container, args).await?,
    }

    Ok(())
}
