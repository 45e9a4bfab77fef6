#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, and ANSI presentation.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod presenter;

pub use buffer::Buffer;
pub use cell::{Cell, PackedRgba, StyleFlags};
pub use presenter::{PresentStats, Presenter};
