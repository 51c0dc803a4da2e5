mod platform;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use grabber_logging::{grabber_error, grabber_info, LogDestination};
use log::LevelFilter;

use platform::cli::Cli;
use platform::config::GrabberConfig;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            grabber_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = GrabberConfig::load(cli.config.as_deref())?.with_overrides(
        cli.backend.as_deref(),
        cli.poll_interval_ms,
        cli.catalog,
        cli.log_file.as_deref(),
    );

    let (destination, level) = match (&config.log_file, cli.verbose) {
        (Some(path), true) => (LogDestination::Both(path.clone()), LevelFilter::Debug),
        (Some(path), false) => (LogDestination::File(path.clone()), LevelFilter::Info),
        (None, true) => (LogDestination::Terminal, LevelFilter::Debug),
        (None, false) => (LogDestination::Terminal, LevelFilter::Warn),
    };
    grabber_logging::initialize(destination, level);
    match &config.source {
        Some(path) => grabber_info!("Loaded config from {:?}", path),
        None => grabber_info!("Using built-in config defaults"),
    }

    platform::run_app(cli, config)
}
