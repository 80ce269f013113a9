//! Analyzer binary discovery
//!
//! Resolution order, first hit wins:
//! 1. the copy bundled next to the running executable (`bin/mixxx-analyzer`)
//! 2. `mixxx-analyzer` on the executable search path (`PATH`)
//!
//! The resolved path is cached per locator instance.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Bare name of the analyzer executable
pub const BINARY_NAME: &str = "mixxx-analyzer";

/// Directory, relative to the running executable, holding the bundled binary
pub const BUNDLED_SUBDIR: &str = "bin";

const NOT_FOUND_HINT: &str = "Install the platform-specific mixxx-analyzer package \
     or ensure the binary is on PATH.";

/// Platform-specific executable file name
pub fn executable_name() -> String {
    format!("{}{}", BINARY_NAME, std::env::consts::EXE_SUFFIX)
}

/// Default location of the bundled binary directory
pub fn default_bundled_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(BUNDLED_SUBDIR))
}

/// Resolves the analyzer executable
#[derive(Debug, Default)]
pub struct BinaryLocator {
    /// Directory holding the bundled binary (None = next to the running executable)
    bundled_dir: Option<PathBuf>,
    /// Search path override (None = the process `PATH`)
    search_path: Option<OsString>,
    /// Resolved path, filled on first successful lookup
    resolved: OnceLock<PathBuf>,
}

impl BinaryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator that always returns `path` without probing the filesystem
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let resolved = OnceLock::new();
        let _ = resolved.set(path.into());
        Self {
            bundled_dir: None,
            search_path: None,
            resolved,
        }
    }

    /// Look for the bundled binary in `dir` instead of next to the executable
    pub fn with_bundled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_dir = Some(dir.into());
        self
    }

    /// Search `paths` (PATH syntax) instead of the process `PATH`
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    /// Path of the analyzer executable
    pub fn resolve(&self) -> Result<PathBuf> {
        if let Some(path) = self.resolved.get() {
            return Ok(path.clone());
        }

        let path = self.discover()?;
        log::debug!("Resolved mixxx-analyzer at {:?}", path);
        // A concurrent caller may have won the race; both found the same file.
        Ok(self.resolved.get_or_init(|| path).clone())
    }

    fn discover(&self) -> Result<PathBuf> {
        let mut searched = Vec::new();

        let bundled_dir = self.bundled_dir.clone().or_else(default_bundled_dir);
        if let Some(dir) = bundled_dir {
            let candidate = dir.join(executable_name());
            log::trace!("Checking bundled binary at {:?}", candidate);
            if is_executable(&candidate) {
                return Ok(candidate);
            }
            searched.push(candidate);
        }

        let on_path = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(BINARY_NAME, Some(paths), cwd)
            }
            None => which::which(BINARY_NAME),
        };
        match on_path {
            Ok(path) => return Ok(path),
            Err(e) => {
                log::trace!("{} not found on search path: {}", BINARY_NAME, e);
                searched.push(PathBuf::from(format!("$PATH/{}", BINARY_NAME)));
            }
        }

        Err(Error::BinaryNotFound {
            searched,
            hint: NOT_FOUND_HINT.to_string(),
        })
    }
}

/// A regular file the current user may execute
fn is_executable(path: &Path) -> bool {
    use faccess::PathExt;

    path.is_file() && path.executable()
}
