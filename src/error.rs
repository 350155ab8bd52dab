use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("source file {} could not be opened: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read source file {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid source configuration: {0}")]
    Config(String),

    #[error("dataframe operation failed: {0}")]
    Frame(#[from] PolarsError),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
