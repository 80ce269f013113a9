//! Analyzer invocation
//!
//! One call, one subprocess: `mixxx-analyzer --json PATH...`. Results come
//! back in input order or not at all.

mod process;
pub mod schema;

use crate::config::AnalyzerConfig;
use crate::error::{Error, Malformed, Result};
use crate::locator::BinaryLocator;
use crate::model::AnalysisResult;
use process::CaptureError;
use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

/// Flag selecting the analyzer's machine-readable output
pub const JSON_FLAG: &str = "--json";

/// Audio analyzer trait - the seam between callers and the analyzer bridge
pub trait Analyzer {
    /// Analyze a batch of files in one go.
    ///
    /// Returns one result per path, in the same order, or an error for the
    /// whole batch.
    fn analyze_many<P: AsRef<OsStr>>(&self, paths: &[P]) -> Result<Vec<AnalysisResult>>;

    /// Analyze a single file
    fn analyze<P: AsRef<OsStr>>(&self, path: P) -> Result<AnalysisResult> {
        let mut results = self.analyze_many(&[path])?;
        results.pop().ok_or(Error::MalformedResult(Malformed::LengthMismatch {
            expected: 1,
            actual: 0,
        }))
    }
}

/// Runs the external `mixxx-analyzer` binary
#[derive(Debug)]
pub struct AnalysisRunner {
    locator: BinaryLocator,
    timeout: Option<Duration>,
}

impl AnalysisRunner {
    /// Runner with default discovery and no timeout
    pub fn new() -> Self {
        Self::with_locator(BinaryLocator::new())
    }

    pub fn with_locator(locator: BinaryLocator) -> Self {
        Self {
            locator,
            timeout: None,
        }
    }

    pub fn from_config(config: AnalyzerConfig) -> Self {
        let locator = match (config.binary, config.bundled_dir) {
            (Some(binary), _) => BinaryLocator::with_path(binary),
            (None, Some(dir)) => BinaryLocator::new().with_bundled_dir(dir),
            (None, None) => BinaryLocator::new(),
        };

        Self {
            locator,
            timeout: config.timeout,
        }
    }

    /// Kill the analyzer if a batch runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Path of the analyzer binary this runner will invoke
    pub fn binary(&self) -> Result<PathBuf> {
        self.locator.resolve()
    }
}

impl Default for AnalysisRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for AnalysisRunner {
    fn analyze_many<P: AsRef<OsStr>>(&self, paths: &[P]) -> Result<Vec<AnalysisResult>> {
        // The analyzer treats zero arguments as a usage error
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let binary = self.locator.resolve()?;
        log::debug!("Running {:?} on {} file(s)", binary, paths.len());

        let mut command = Command::new(&binary);
        command.arg(JSON_FLAG);
        // Literal argv entries; nothing is shell-interpreted
        command.args(paths);

        let captured = process::run(&mut command, self.timeout).map_err(|e| match e {
            CaptureError::Spawn(err) => spawn_error(binary.clone(), err),
            CaptureError::Io(err) => Error::Io(err),
            CaptureError::TimedOut => Error::Timeout {
                after: self.timeout.unwrap_or_default(),
            },
        })?;

        if !captured.status.success() {
            let stderr = captured.stderr_text();
            log::debug!(
                "Analyzer exited with {:?}: {}",
                captured.status.code(),
                stderr
            );
            return Err(Error::AnalysisFailed {
                code: captured.status.code(),
                stderr,
            });
        }

        let results = schema::parse_batch(&captured.stdout, paths.len())?;
        log::trace!("Decoded {} analysis result(s)", results.len());
        Ok(results)
    }
}

fn spawn_error(binary: PathBuf, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Error::BinaryNotFound {
            searched: vec![binary],
            hint: format!(
                "Could not execute it ({}). Install the platform-specific mixxx-analyzer \
                 package or ensure the binary is on PATH.",
                err
            ),
        },
        _ => Error::Spawn(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_does_not_spawn() {
        let runner = AnalysisRunner::with_locator(BinaryLocator::with_path("/nonexistent/bin"));
        let paths: [&str; 0] = [];
        assert!(runner.analyze_many(&paths).unwrap().is_empty());
    }

    #[test]
    fn test_missing_binary_is_binary_not_found() {
        let runner =
            AnalysisRunner::with_locator(BinaryLocator::with_path("/nonexistent/mixxx-analyzer"));
        match runner.analyze("/tmp/a.mp3") {
            Err(Error::BinaryNotFound { searched, .. }) => {
                assert_eq!(searched, vec![PathBuf::from("/nonexistent/mixxx-analyzer")]);
            }
            other => panic!("expected BinaryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config_prefers_explicit_binary() {
        let config = AnalyzerConfig::new()
            .with_binary("/opt/mixxx-analyzer")
            .with_bundled_dir("/ignored")
            .with_timeout(Duration::from_secs(3));
        let runner = AnalysisRunner::from_config(config);

        assert_eq!(runner.binary().unwrap(), PathBuf::from("/opt/mixxx-analyzer"));
        assert_eq!(runner.timeout, Some(Duration::from_secs(3)));
    }
}
