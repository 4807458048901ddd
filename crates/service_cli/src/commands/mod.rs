//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands read their
//! inputs from JSON files and write to stdout unless an output path is given.

pub mod calibrate;
pub mod check;
pub mod summary;
pub mod templates;
pub mod validate;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use crate::{CliError, Result};

/// Output format shared by the reporting commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    #[default]
    Table,
}

/// Read a JSON document, mapping a missing file to [`CliError::FileNotFound`]
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Stdout, or a freshly created file
pub(crate) fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(Box::new(File::create(path)?))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
