use std::path::PathBuf;

use thiserror::Error;

/// Why a load was aborted. Any of these means no table was produced.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no source files given")]
    NoSources,

    #[error("{}: unsupported file extension '.{ext}'", path.display())]
    UnsupportedFormat { path: PathBuf, ext: String },

    #[error("{}: cannot read source", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: malformed CSV", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: malformed JSON", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: cannot read parquet", path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("{}: cannot convert parquet column '{column}'", path.display())]
    Arrow {
        path: PathBuf,
        column: String,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("{}: missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}, row {row}: {message}", path.display())]
    InvalidRow {
        path: PathBuf,
        row: usize,
        message: String,
    },
}

/// Problems with a dashboard configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}: cannot read config", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: invalid config", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
