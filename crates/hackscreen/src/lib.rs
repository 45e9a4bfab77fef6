#![forbid(unsafe_code)]

//! hackscreen: a randomized "hacking" sequence followed by full-screen rain.
//!
//! - [`scheduler`] decides which phases a run plays, in what order.
//! - [`retry`] keeps cosmetic failures within per-phase and per-run budgets.
//! - [`script`] turns each phase into effects.
//! - [`runner`] wires content, console and rain together.

pub mod cli;
pub mod error;
pub mod logging;
pub mod phase;
pub mod retry;
pub mod runner;
pub mod scheduler;
pub mod script;

pub use error::RunError;
pub use phase::{BonusCandidate, BonusTable, PhaseKind};
pub use retry::RetryTracker;
pub use runner::{Outcome, Runner};
pub use scheduler::{PhaseScheduler, RunPlan};
