// ABOUTME: Application-wide error types for voyage.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::deploy::PipelineError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("{}", missing_parameters_message(.0))]
    MissingParameters(Vec<String>),

    #[error("unsupported config file format: {0} (expected .yml, .yaml or .json)")]
    UnsupportedConfigFormat(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("run did not finish within {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

fn missing_parameters_message(params: &[String]) -> String {
    match params {
        [single] => format!("missing required parameter: {single}"),
        many => format!("missing required parameters: {}", many.join(", ")),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
