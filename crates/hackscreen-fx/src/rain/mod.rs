#![forbid(unsafe_code)]

//! Full-screen falling-glyph rain.
//!
//! [`RainEngine`] owns one [`RainColumn`] per horizontal position and drives
//! them at a fixed frame rate against a [`DisplaySurface`]:
//!
//! ```text
//! Initializing ──► Running ──► Stopped
//!      (size, seed columns)  (poll, step, paint, wait)  (surface dropped)
//! ```
//!
//! Each tick drains pending input without blocking, advances every column,
//! paints a fresh frame and then waits for the remainder of the frame budget
//! *on the input poll*, so a key press or interrupt ends the loop within one
//! frame interval. A resize rebuilds the columns from scratch at the new
//! geometry.
//!
//! [`RainEngine::run`] takes the surface by value. Whatever way the loop
//! ends (cancel, I/O error) the surface is dropped before `run` returns,
//! which is what restores the terminal.

mod column;
pub mod glyphs;

use std::io;
use std::time::{Duration, Instant};

use hackscreen_core::event::Event;
use hackscreen_render::Buffer;
use rand::Rng;

use crate::surface::DisplaySurface;

pub use column::{ColumnStep, RainColumn, TRAIL_BRIGHT, TRAIL_DIM};

/// Default frame rate.
pub const DEFAULT_FPS: u32 = 25;

/// Tunables for the rain stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RainConfig {
    /// Target frames per second (clamped to `1..=120`).
    pub fps: u32,
    /// Slowest column speed in rows per tick.
    pub min_speed: f64,
    /// Fastest column speed in rows per tick.
    pub max_speed: f64,
    /// Shortest trail. The longest is half the screen height.
    pub min_trail: usize,
    /// Chance per tick that the head glyph is replaced.
    pub flicker_chance: f64,
    /// Chance per tick that any trail glyph is replaced.
    pub mutation_chance: f64,
    /// Upper bound, in ticks, on how long an exited column stays dark.
    pub max_respawn_delay: u32,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            min_speed: 0.3,
            max_speed: 1.2,
            min_trail: 5,
            flicker_chance: 0.3,
            mutation_chance: 0.05,
            max_respawn_delay: 25,
        }
    }
}

impl RainConfig {
    /// Set the frame rate, clamped to `1..=120`.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.clamp(1, 120);
        self
    }

    /// Duration of one frame.
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.clamp(1, 120)))
    }
}

/// Lifecycle of the rain stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainState {
    /// Sizing the frame and seeding columns.
    Initializing,
    /// Frame loop running.
    Running,
    /// Loop left and surface released.
    Stopped,
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A key was pressed.
    Key,
    /// SIGINT/SIGTERM or an equivalent interrupt.
    Interrupt,
}

/// Summary of a finished rain stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainReport {
    /// Frames presented.
    pub frames: u64,
    /// Resizes handled.
    pub resizes: u32,
    /// What ended the loop.
    pub stop: StopReason,
}

/// The rain stage.
#[derive(Debug)]
pub struct RainEngine<R: Rng> {
    config: RainConfig,
    rng: R,
    columns: Vec<RainColumn>,
    frame: Buffer,
    state: RainState,
    frames: u64,
    resizes: u32,
}

impl<R: Rng> RainEngine<R> {
    /// Create an engine. Nothing is drawn until [`run`](Self::run).
    pub fn new(config: RainConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            columns: Vec::new(),
            frame: Buffer::new(0, 0),
            state: RainState::Initializing,
            frames: 0,
            resizes: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RainState {
        self.state
    }

    /// Number of columns (equals the frame width once initialized).
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Columns in x order.
    pub fn columns(&self) -> &[RainColumn] {
        &self.columns
    }

    /// The most recently painted frame.
    pub fn frame(&self) -> &Buffer {
        &self.frame
    }

    /// Frames presented by the current or last run.
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Rebuild all columns for a `width x height` display.
    ///
    /// Column state is drawn fresh; nothing is carried over from the old
    /// geometry.
    pub fn reset(&mut self, width: u16, height: u16) {
        self.frame.resize(width, height);
        self.columns.clear();
        self.columns.extend(
            (0..width).map(|x| RainColumn::new(x, height, &self.config, &mut self.rng)),
        );
        hackscreen_core::debug!(width, height, "rain columns seeded");
    }

    /// Advance every column one tick.
    pub fn step(&mut self) {
        let height = self.frame.height();
        for column in &mut self.columns {
            column.step(height, &self.config, &mut self.rng);
        }
    }

    /// Paint all columns into the frame buffer.
    pub fn paint(&mut self) -> &Buffer {
        self.frame.clear();
        for column in &self.columns {
            column.paint(&mut self.frame);
        }
        &self.frame
    }

    /// Take over `surface` and animate until a key press or interrupt.
    ///
    /// The surface is dropped before this returns on every path, including
    /// errors.
    pub fn run<S: DisplaySurface>(&mut self, mut surface: S) -> io::Result<RainReport> {
        self.state = RainState::Initializing;
        self.frames = 0;
        self.resizes = 0;

        let outcome = self.run_loop(&mut surface);

        self.state = RainState::Stopped;
        drop(surface);

        match &outcome {
            Ok(stop) => {
                hackscreen_core::info!(
                    frames = self.frames,
                    resizes = self.resizes,
                    ?stop,
                    "rain stopped"
                );
            }
            Err(err) => {
                hackscreen_core::error!(%err, "rain aborted");
            }
        }

        outcome.map(|stop| RainReport {
            frames: self.frames,
            resizes: self.resizes,
            stop,
        })
    }

    fn run_loop<S: DisplaySurface>(&mut self, surface: &mut S) -> io::Result<StopReason> {
        let (width, height) = surface.size()?;
        self.reset(width, height);
        self.state = RainState::Running;
        hackscreen_core::info!(width, height, fps = self.config.fps, "rain running");

        let budget = self.config.frame_budget();
        loop {
            let started = Instant::now();

            if let Some(stop) = self.drain_input(surface, Duration::ZERO)? {
                return Ok(stop);
            }

            self.step();
            self.paint();
            surface.present(&self.frame)?;
            self.frames += 1;

            let remaining = budget.saturating_sub(started.elapsed());
            if let Some(stop) = self.drain_input(surface, remaining)? {
                return Ok(stop);
            }
        }
    }

    /// Handle input for up to `wait`, returning early on a stop event.
    ///
    /// Returns once a poll comes back empty, so a zero `wait` drains
    /// whatever is already queued.
    fn drain_input<S: DisplaySurface>(
        &mut self,
        surface: &mut S,
        wait: Duration,
    ) -> io::Result<Option<StopReason>> {
        let deadline = Instant::now() + wait;
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            match surface.poll_event(timeout)? {
                Some(Event::Interrupt) => return Ok(Some(StopReason::Interrupt)),
                Some(event @ Event::Key(_)) if event.is_cancel() => {
                    return Ok(Some(StopReason::Key));
                }
                Some(Event::Resize { width, height }) => {
                    hackscreen_core::debug!(width, height, "rain resize");
                    self.resizes += 1;
                    self.reset(width, height);
                }
                Some(Event::Key(_)) => {}
                None => return Ok(None),
            }
        }
    }
}
