#![forbid(unsafe_code)]

//! Top-level error type.

use std::fmt;
use std::io;

use hackscreen_fx::pools::ContentError;

use crate::scheduler::ScheduleError;

/// Why a run could not complete. Every variant exits with status 1.
///
/// Ctrl-C is not here: an interrupted run is a normal outcome.
#[derive(Debug)]
pub enum RunError {
    /// A data pool is missing, malformed or empty.
    Content(ContentError),
    /// The bonus table is unusable.
    Schedule(ScheduleError),
    /// The terminal is too narrow for the effects.
    TooNarrow { width: u16, required: u16 },
    /// Terminal or log I/O failed.
    Io(io::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(err) => write!(f, "content error: {err}"),
            Self::Schedule(err) => write!(f, "invalid phase table: {err}"),
            Self::TooNarrow { width, required } => {
                write!(f, "Terminal too narrow ({width} cols). Need at least {required}.")
            }
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Content(err) => Some(err),
            Self::Schedule(err) => Some(err),
            Self::TooNarrow { .. } => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ContentError> for RunError {
    fn from(err: ContentError) -> Self {
        Self::Content(err)
    }
}

impl From<ScheduleError> for RunError {
    fn from(err: ScheduleError) -> Self {
        Self::Schedule(err)
    }
}

impl From<io::Error> for RunError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseKind;
    use std::error::Error;

    #[test]
    fn narrow_terminal_message() {
        let err = RunError::TooNarrow {
            width: 42,
            required: 60,
        };
        assert_eq!(
            err.to_string(),
            "Terminal too narrow (42 cols). Need at least 60."
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn wrapped_errors_keep_their_source() {
        let err = RunError::from(ScheduleError::NotABonus(PhaseKind::Welcome));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("WELCOME"));

        let err = RunError::from(io::Error::other("boom"));
        assert!(err.to_string().contains("boom"));
    }
}
