use std::io;

use thiserror::Error;

/// Failures that stop a session from starting or running.
#[derive(Debug, Error)]
pub enum SnekError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
    #[error("terminal is {width}x{height}, need at least 3x3")]
    TooSmall { width: u16, height: u16 },
    #[error("input thread panicked")]
    InputThread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("no free interior cell left for a morsel")]
    NoFreeCell,
}
