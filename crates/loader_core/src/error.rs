//! Core loader error types (pure - no I/O variants).

use thiserror::Error;

/// Errors raised while assembling polyfill descriptors or generating the
/// bootstrap script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid polyfill configuration for {name}: {reason}")]
    Configuration { name: String, reason: String },

    #[error("Unsupported entry type: {0}")]
    TypeNotSupported(String),

    #[error("Entry set of type {entry_type} has no files to load")]
    EmptyEntries { entry_type: String },
}

/// Result type for pure loader operations.
pub type Result<T> = std::result::Result<T, CoreError>;
