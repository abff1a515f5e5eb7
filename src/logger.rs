//! Debug logging support for codewalk
//!
//! When debug mode is enabled via config or `CODEWALK_DEBUG`, address
//! resolution and walk loading are logged to ~/.codewalk/codewalk.log.
//! `RUST_LOG` overrides the default `codewalk=debug` filter.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Environment variable that forces debug logging on
pub const DEBUG_ENV: &str = "CODEWALK_DEBUG";

/// Whether debug logging was requested through the environment
pub fn debug_requested_by_env() -> bool {
    std::env::var_os(DEBUG_ENV).is_some_and(|v| !v.is_empty() && v != "0")
}

/// Directives used when `RUST_LOG` is unset, empty or unparsable
pub const DEFAULT_FILTER: &str = "codewalk=debug";

/// Build the log filter from `RUST_LOG`-style directives
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn open_log_file(log_path: &Path) -> Result<fs::File> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))
}

/// Initialize the debug logging system
///
/// If debug_enabled is true, resolution events go to the log file, filtered
/// by `RUST_LOG` when it is set. Returns the path to the log file, or None if
/// logging is not enabled.
pub fn init_debug_logging(debug_enabled: bool) -> Result<Option<PathBuf>> {
    if !debug_enabled {
        return Ok(None);
    }

    let log_path = get_log_path()?;

    // If we can't open the log file, gracefully fall back to no logging
    let log_file = match open_log_file(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {:#}", e);
            return Ok(None);
        }
    };

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = registry()
        .with(
            fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true),
        )
        .with(log_filter(directives.as_deref()));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "codewalk session started");
    Ok(Some(log_path))
}

/// Get the log file path, ~/.codewalk/codewalk.log
pub fn get_log_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home_dir.join(".codewalk").join("codewalk.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_path() {
        if let Ok(path) = get_log_path() {
            assert!(
                path.ends_with(".codewalk/codewalk.log"),
                "Log path should be in .codewalk directory, got: {}",
                path.display()
            );
        }
    }

    #[test]
    fn test_init_debug_logging_disabled() {
        let result = init_debug_logging(false);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), None, "Should return None when debug is disabled");
    }

    #[test]
    fn test_log_filter_defaults_to_codewalk_debug() {
        for directives in [None, Some(""), Some("  ")] {
            let filter = log_filter(directives).to_string().to_lowercase();
            assert!(filter.contains("codewalk=debug"), "got: {}", filter);
        }
    }

    #[test]
    fn test_log_filter_honours_directives() {
        let filter = log_filter(Some("codewalk::stepper=trace")).to_string().to_lowercase();
        assert!(filter.contains("codewalk::stepper=trace"), "got: {}", filter);
    }

    #[test]
    fn test_log_filter_falls_back_on_bad_directives() {
        let filter = log_filter(Some("codewalk=loudly")).to_string().to_lowercase();
        assert!(filter.contains("codewalk=debug"), "got: {}", filter);
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("codewalk.log");
        assert!(open_log_file(&path).is_ok());
        assert!(path.exists());
    }
}
