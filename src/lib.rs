//! Mixxx Analyzer - bridge to the `mixxx-analyzer` binary
//!
//! This library locates the external analyzer, runs it over a batch of
//! audio files and returns BPM, key, loudness, intro/outro, tags and
//! beat grid as typed results.

pub mod config;
pub mod error;
pub mod locator;
pub mod model;
pub mod runner;

pub use config::AnalyzerConfig;
pub use error::{Error, Malformed, Result};
pub use locator::BinaryLocator;
pub use model::{AnalysisResult, MusicalKey, Tags};
pub use runner::{AnalysisRunner, Analyzer};

/// Analyze one file with default binary discovery
pub fn analyze<P: AsRef<std::ffi::OsStr>>(path: P) -> Result<AnalysisResult> {
    AnalysisRunner::new().analyze(path)
}

/// Analyze a batch of files in a single analyzer invocation
pub fn analyze_many<P: AsRef<std::ffi::OsStr>>(paths: &[P]) -> Result<Vec<AnalysisResult>> {
    AnalysisRunner::new().analyze_many(paths)
}
