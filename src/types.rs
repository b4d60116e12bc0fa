use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ForecastError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("file {} not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("malformed document {origin}: {reason}")]
    Malformed { origin: String, reason: String },

    #[error("offer #{index}: missing <{field}>")]
    MissingField { index: usize, field: &'static str },

    #[error("offer '{name}': invalid price '{value}'")]
    InvalidPrice { name: String, value: String },

    #[error("forecast needs at least {required} periods of history, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("sales series for '{name}' has {actual} periods, expected {expected}")]
    SeriesLength {
        name:     String,
        expected: usize,
        actual:   usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("failed to build {what}: {reason}")]
    Builder { what: &'static str, reason: String },

    #[error("{0}")]
    Other(String),
}

impl ForecastError {
    /// The two input failures the application reports with a localized message.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::Malformed { .. })
    }

    pub(crate) fn builder<E: ToString>(what: &'static str) -> impl FnOnce(E) -> Self {
        move |err| Self::Builder {
            what,
            reason: err.to_string(),
        }
    }
}

macro_rules! fcerr {
    ($($arg:tt)*) => {
        $crate::types::ForecastError::Other(format!($($arg)*))
    };
}

pub(crate) use fcerr;
