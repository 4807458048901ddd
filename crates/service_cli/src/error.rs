//! CLI error types

use quant_core::{ConfigError as QuantConfigError, QuantError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by `riskq` commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Quant(#[from] QuantError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Quantification config error: {0}")]
    QuantConfig(#[from] QuantConfigError),
}

/// Result alias for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;
