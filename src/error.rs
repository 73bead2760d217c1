use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Load errors – abort the whole load, nothing is kept
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    #[error("CSV has no '{0}' column")]
    MissingColumn(String),

    /// A numeric cell that is still not a number after locale normalisation.
    #[error("row {row}, column '{column}': '{value}' is not a number")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Analysis errors – scoped to one stage request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum AnalysisError {
    #[error("{0}: no rows to analyse")]
    EmptyInput(&'static str),

    #[error("{0}: standard deviation is zero")]
    DivisionByZero(&'static str),

    #[error("{what}: need at least {needed} rows, got {got}")]
    InsufficientData {
        what: String,
        needed: usize,
        got: usize,
    },

    #[error("invalid distribution parameters: {0}")]
    Distribution(String),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("separator {0:?} is not a single ASCII character")]
    Separator(char),
}
