//! Error types for each pipeline stage.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading the input table. All are fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Parse(String),

    #[error("dataset has no data rows")]
    Empty,
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

/// Startup configuration problems.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is not set.")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Why the narrative request failed. Only used for logging; every kind
/// collapses into the same user-visible story text.
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    MalformedBody(String),
}

impl NarrativeError {
    /// Short tag for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            NarrativeError::Timeout(_) => "timeout",
            NarrativeError::Transport(_) => "transport",
            NarrativeError::Status { .. } => "http-status",
            NarrativeError::MalformedBody(_) => "malformed-body",
        }
    }
}

impl From<reqwest::Error> for NarrativeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NarrativeError::Timeout(e)
        } else if e.is_decode() {
            NarrativeError::MalformedBody(e.to_string())
        } else {
            NarrativeError::Transport(e)
        }
    }
}

/// Fatal pipeline outcomes, mapped to exit code 1 by `main`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Error: File '{}' not found.", .0.display())]
    NotFound(PathBuf),

    #[error("Error loading file: {0}")]
    Load(#[from] LoadError),

    #[error("Error: Dataset is empty. Exiting.")]
    EmptyDataset,

    #[error("Error writing output: {0:#}")]
    Output(#[from] anyhow::Error),
}
