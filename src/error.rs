//! Error types for the analyzer bridge

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between locating the analyzer and
/// handing typed results back to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// No usable analyzer executable was found
    #[error("mixxx-analyzer binary not found (searched: {}). {hint}", display_paths(.searched))]
    BinaryNotFound {
        /// Every location that was probed, in order
        searched: Vec<PathBuf>,
        /// Remediation hint for the operator
        hint: String,
    },

    /// The binary exists but the process could not be started
    #[error("failed to launch mixxx-analyzer: {0}")]
    Spawn(#[source] std::io::Error),

    /// Waiting on the analyzer or reading its output failed after launch
    #[error("I/O error while running mixxx-analyzer: {0}")]
    Io(#[source] std::io::Error),

    /// The analyzer ran and exited unsuccessfully
    #[error("mixxx-analyzer failed ({}): {stderr}", display_code(.code))]
    AnalysisFailed {
        /// Exit code, `None` when the process was terminated by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The analyzer exited zero but its output breaks the result contract
    #[error("malformed analyzer output: {0}")]
    MalformedResult(#[from] Malformed),

    /// The analyzer did not finish within the configured timeout
    #[error("mixxx-analyzer did not finish within {after:?}")]
    Timeout { after: Duration },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether running the same batch again could plausibly succeed.
    ///
    /// The bridge never retries on its own; this only informs callers
    /// that want a retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

/// Ways the analyzer's stdout can violate the JSON result contract
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Malformed {
    #[error("stdout is not valid UTF-8")]
    NotUtf8,

    #[error("stdout is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("expected a JSON array of results")]
    NotAnArray,

    #[error("expected {expected} results, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("element {index} is missing required key `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("element {index} is invalid: {reason}")]
    InvalidElement { index: usize, reason: String },

    #[error("element {index} violates result invariants: {reason}")]
    InvariantViolated { index: usize, reason: String },
}

impl Malformed {
    /// Index of the offending array element, if the problem is element-specific
    pub fn index(&self) -> Option<usize> {
        match self {
            Malformed::MissingField { index, .. }
            | Malformed::InvalidElement { index, .. }
            | Malformed::InvariantViolated { index, .. } => Some(*index),
            _ => None,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}
