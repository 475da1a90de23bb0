//! CLI failures and the exit code each one maps to.
//!
//! | code | meaning |
//! |---|---|
//! | 2 | clap rejected the arguments |
//! | 10 | the sketch refused its config or viewport |
//! | 11 | the PNG could not be written |
//! | 12 | `--config` or a point argument did not parse |
//! | 13 | the JSON summary could not be produced |

use glyph_swarm_core::SwarmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Swarm(SwarmError),
    #[error("cannot write output: {0}")]
    Io(String),
    #[error("{0}")]
    Input(String),
    #[error("cannot serialize summary: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Swarm(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// I/O failures surface from core as `SwarmError::Io` and keep their own code.
impl From<SwarmError> for CliError {
    fn from(e: SwarmError) -> Self {
        match e {
            SwarmError::Io(msg) => CliError::Io(msg),
            other => CliError::Swarm(other),
        }
    }
}
