#![forbid(unsafe_code)]

//! Core: terminal lifecycle, interrupt handling, and input events.

pub mod event;
pub mod interrupt;
pub mod logging;
pub mod terminal_session;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, info_span, trace, warn};
