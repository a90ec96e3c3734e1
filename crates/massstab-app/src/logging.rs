// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subscriber setup: env filter, optional log file, optional console.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use massstab_core::LoggerConfig;
use tracing::{Subscriber, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Minimal stderr subscriber used while the configuration is being loaded.
pub fn bootstrap() -> impl Subscriber + Send + Sync {
    fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter("warn"))
        .finish()
}

/// Install the global subscriber described by `config`.
///
/// `verbose` forces the console layer on and lowers the default level to
/// `debug`; `RUST_LOG` still wins when set.
pub fn init(config: &LoggerConfig, verbose: bool) {
    let filter = env_filter(if verbose { "debug" } else { "info" });

    let (file, file_error) = match open_log_file(&config.filename) {
        Ok(file) => (file, None),
        Err(e) => (None, Some(e)),
    };
    let file_layer = file.map(|file| fmt::layer().with_ansi(false).with_writer(Mutex::new(file)));
    let console_layer = (config.console || verbose).then(|| fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    if let Some(e) = file_error {
        warn!(path = %config.filename, error = %e, "cannot open log file, file logging disabled");
    }
}

/// Open `filename` for appending. An empty name means no log file.
fn open_log_file(filename: &str) -> io::Result<Option<File>> {
    if filename.trim().is_empty() {
        return Ok(None);
    }
    let path = Path::new(filename);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filename_disables_file_log() {
        assert!(open_log_file("").unwrap().is_none());
        assert!(open_log_file("   ").unwrap().is_none());
    }

    #[test]
    fn log_file_is_created_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("processing.log");
        let file = open_log_file(path.to_str().unwrap()).unwrap();
        assert!(file.is_some());
        assert!(path.exists());
    }
}
