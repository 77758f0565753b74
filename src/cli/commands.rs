use chrono::Utc;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::processors::{AggregateReporter, CollectionProcessor};
use crate::readers::{NetatmoClient, StationReader};
use crate::utils::constants::DEFAULT_CONFIG_FILE;
use crate::utils::progress::ProgressReporter;
use crate::writers::{SinkAdapter, SinkConfig};

pub async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    setup_logging(&cli, &settings)?;

    match cli.command {
        Commands::Collect { quiet } => {
            let netatmo = settings.netatmo()?;
            let client = NetatmoClient::new(netatmo, settings.global.timeout())?;
            let sink = SinkAdapter::new(&SinkConfig::from_settings(&settings))?;
            let processor = CollectionProcessor::from_settings(&settings);

            let progress = ProgressReporter::new_spinner("Requesting weather data...", quiet);
            let now = Utc::now().timestamp();
            let result = processor.run(&client, &sink, now, Some(&progress)).await;
            progress.finish_and_clear();

            let report = result?;
            println!("{}", report.summary());
        }

        Commands::Parse { input, now } => {
            let stations = StationReader::new(&input).read_stations()?;
            let now = now.unwrap_or_else(|| Utc::now().timestamp());

            let processor = CollectionProcessor::from_settings(&settings);
            let (batch, _averages) = processor.process(&stations, now)?;

            println!("{}", serde_json::to_string_pretty(&batch.points)?);
            eprintln!(
                "Parsed {} point(s) from {} station(s)",
                batch.points.len(),
                batch.stations
            );
            if !batch.accumulator.is_empty() {
                eprintln!(
                    "{}",
                    AggregateReporter::new().generate_summary(&batch.accumulator)?
                );
            }
        }

        Commands::CheckConfig => {
            println!("{}", settings.summary());
            println!("Configuration OK");
        }
    }

    Ok(())
}

/// Load settings from `--config`, or from `config.json` when it exists.
/// Commands that never reach the API fall back to defaults without a file.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if cli.config.is_some() || path.exists() {
        return Settings::load(&path);
    }

    if cli.command.needs_remote() {
        return Err(ProcessingError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    Ok(Settings::default())
}

/// Set up structured logging from the configured level and CLI flags
fn setup_logging(cli: &Cli, settings: &Settings) -> Result<()> {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        settings.global.log_level()?
    };
    let level = level.as_str().to_lowercase();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("netatmo_collector={}", level)));

    let result = match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
        }
        None => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| ProcessingError::Config(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}
