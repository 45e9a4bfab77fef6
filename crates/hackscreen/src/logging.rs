#![forbid(unsafe_code)]

//! Subscriber setup.
//!
//! The terminal belongs to the effects, so logs only ever go to a file.
//! Without a log file no subscriber is installed and every event is
//! dropped.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter directives when `HACKSCREEN_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON; anything else is human-readable.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Human,
        }
    }
}

/// Install a file subscriber if `log_file` is set.
///
/// Returns whether a subscriber was installed. Uses `try_init`, so a second
/// call is harmless.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init(log_file: Option<&Path>) -> io::Result<bool> {
    let Some(path) = log_file else {
        return Ok(false);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env("HACKSCREEN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let format = LogFormat::from_env_value(std::env::var("HACKSCREEN_LOG_FORMAT").ok().as_deref());

    let installed = match format {
        LogFormat::Human => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(Mutex::new(file))
            .try_init()
            .is_ok(),
    };
    if installed {
        tracing::info!(path = %path.display(), ?format, "logging started");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_env_value() {
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Human);
        assert_eq!(LogFormat::from_env_value(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("pretty")), LogFormat::Human);
    }

    #[test]
    fn no_file_means_no_subscriber() {
        assert!(!init(None).expect("no file"));
    }

    #[test]
    fn unopenable_file_is_an_error() {
        let dir = std::env::temp_dir().join("hackscreen-no-such-dir-for-logs");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(init(Some(&dir.join("x.log"))).is_err());
    }
}
