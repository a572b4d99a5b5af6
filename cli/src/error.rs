use std::io;
use std::path::PathBuf;

use kl_sponge::{ConfigError, UsageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("--config cannot be combined with --width, --rounds, --rate or --capacity")]
    ConflictingConfig,

    #[error("--scenario fixes its own parameters and cannot be combined with sponge options")]
    ConflictingScenario,

    #[error("invalid configuration file {}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("input is not valid hex")]
    Hex(#[from] hex::FromHexError),

    #[error("failed to encode the report as JSON")]
    Json(#[from] serde_json::Error),

    #[error("the collision search worker panicked")]
    WorkerPanicked,
}
