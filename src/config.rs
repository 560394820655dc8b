use std::env;
use std::time::Duration;

use simplelog::LevelFilter;

pub const LOG_FILE: &str = "termsnek.log";
pub const LOG_LEVEL_ENV: &str = "TERMSNEK_LOG";

/// Timing tunables for one session
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Tick interval at session start
    pub initial_interval: Duration,
    /// Amount a speed change moves the tick interval, either way
    pub speed_step: Duration,
    /// Speed-ups never push the interval below this
    pub min_interval: Duration,
    /// How long the game over banner stays up
    pub game_over_pause: Duration,
    /// Input poll timeout, bounds how long the input loop takes to notice shutdown
    pub input_poll: Duration,
    /// Random samples tried before scanning for a free cell
    pub spawn_attempts: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(200),
            speed_step: Duration::from_millis(10),
            min_interval: Duration::from_millis(10),
            game_over_pause: Duration::from_secs(3),
            input_poll: Duration::from_millis(50),
            spawn_attempts: 64,
        }
    }
}

/// Log level from `TERMSNEK_LOG`, falling back to `Info`.
pub fn log_level() -> LevelFilter {
    parse_level(env::var(LOG_LEVEL_ENV).ok().as_deref())
}

fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}
