//! Loader errors including I/O operations.

use polyloader_core::CoreError;
use thiserror::Error;

/// Errors raised while resolving polyfill sources and assembling the
/// bootstrap script. Any error aborts the whole generation call; a partial
/// script is never returned.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Could not find a file at {path}: {reason}")]
    FileNotFound { path: String, reason: String },

    #[error("Failed to minify {name}: {reason}")]
    Minify { name: String, reason: String },

    #[error("Minification was requested but no minifier is configured")]
    MinifierNotConfigured,
}

pub type Result<T> = std::result::Result<T, LoaderError>;
