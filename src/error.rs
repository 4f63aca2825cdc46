use std::path::PathBuf;

use thiserror::Error;

/// Errors that escape to the caller of the library.
///
/// Provider-level failures (bad metadata lines, missing assets, network
/// trouble) are logged and recovered where they happen and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
