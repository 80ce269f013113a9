//! Analyzer configuration

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an explicit analyzer executable
pub const ENV_BINARY: &str = "MIXXX_ANALYZER_BINARY";

/// Environment variable holding a timeout in seconds
pub const ENV_TIMEOUT: &str = "MIXXX_ANALYZER_TIMEOUT";

/// Configuration for an [`AnalysisRunner`](crate::AnalysisRunner)
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    /// Explicit analyzer executable; skips bundled/PATH discovery
    pub binary: Option<PathBuf>,

    /// Directory holding the bundled binary (None = `bin/` next to the executable)
    pub bundled_dir: Option<PathBuf>,

    /// Kill the analyzer if a batch takes longer than this (None = wait forever)
    pub timeout: Option<Duration>,
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `MIXXX_ANALYZER_BINARY` and `MIXXX_ANALYZER_TIMEOUT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(binary) = lookup(ENV_BINARY).filter(|v| !v.trim().is_empty()) {
            let expanded = shellexpand::tilde(binary.trim());
            config = config.with_binary(PathBuf::from(expanded.as_ref()));
        }

        if let Some(raw) = lookup(ENV_TIMEOUT).filter(|v| !v.trim().is_empty()) {
            config = config.with_timeout(parse_timeout_secs(&raw)?);
        }

        Ok(config)
    }

    /// Use a specific analyzer executable
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// Look for the bundled binary in `dir`
    pub fn with_bundled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_dir = Some(dir.into());
        self
    }

    /// Set a per-batch timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Parse a positive, finite number of seconds
pub fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("timeout {:?} is not a number", raw)))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(Error::Config(format!(
            "timeout must be a positive number of seconds, got {}",
            raw
        )));
    }

    Ok(Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::new();
        assert!(config.binary.is_none());
        assert!(config.bundled_dir.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_from_env_reads_binary_and_timeout() {
        let config = AnalyzerConfig::from_lookup(lookup(&[
            (ENV_BINARY, "/opt/mixxx/mixxx-analyzer"),
            (ENV_TIMEOUT, "2.5"),
        ]))
        .unwrap();

        assert_eq!(
            config.binary,
            Some(PathBuf::from("/opt/mixxx/mixxx-analyzer"))
        );
        assert_eq!(config.timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_from_env_ignores_blank_values() {
        let config =
            AnalyzerConfig::from_lookup(lookup(&[(ENV_BINARY, "  "), (ENV_TIMEOUT, "")])).unwrap();
        assert!(config.binary.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        for raw in ["abc", "0", "-3", "inf", "NaN"] {
            match parse_timeout_secs(raw) {
                Err(Error::Config(_)) => {}
                other => panic!("{:?} should be rejected, got {:?}", raw, other),
            }
        }
    }
}
