mod config;
mod display;
mod engine;
mod error;
mod food;
mod input;
mod session;
mod walls;
mod world;

use std::fs::File;

use anyhow::Context;
use log::info;
use simplelog::{Config, WriteLogger};

use crate::config::{GameConfig, LOG_FILE};

fn main() -> anyhow::Result<()> {
    // The screen belongs to the game, so logs go to a file
    WriteLogger::init(
        config::log_level(),
        Config::default(),
        File::create(LOG_FILE).context("Failed to create log file")?,
    )
    .context("Failed to initialize logger")?;

    info!("Starting termsnek");

    let reason = session::run(GameConfig::default()).context("Session failed")?;

    info!("Goodbye after {:?}", reason);
    Ok(())
}
