#![forbid(unsafe_code)]

//! Visual building blocks for hackscreen.
//!
//! - [`rain`]: the full-screen falling-glyph stage.
//! - [`surface`]: what the rain stage draws on.
//! - [`effects`]: the line-oriented effects the phase stage is made of.
//! - [`pools`]: the content those effects draw from.

pub mod effects;
pub mod pools;
pub mod rain;
pub mod surface;

pub use effects::{ConsoleInvoker, Effect, EffectError, EffectInvoker, Ink, Pacing, Tone};
pub use pools::{AssetSource, Category, ContentError, DataPools};
pub use rain::{RainConfig, RainEngine, RainReport, RainState, StopReason};
pub use surface::{DisplaySurface, HeadlessSurface, TerminalSurface};
