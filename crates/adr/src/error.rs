//! CLI error types.

use adr_config::ConfigError;
use adr_site::{BuildError, CreateError, ValidateError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Create(#[from] CreateError),

    #[error("{0}")]
    Validate(#[from] ValidateError),

    #[error("{0}")]
    Server(String),

    /// The validation sweep found errors.
    #[error("validation failed with {0} error(s)")]
    Validation(usize),
}
