//! Top-level error type for the command-line front end.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::LoadError;

/// Errors that end a command.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    /// The rendered frame could not be encoded or written
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested view does not overlap the image
    #[error("Nothing to render: {0}")]
    EmptyView(String),
}
