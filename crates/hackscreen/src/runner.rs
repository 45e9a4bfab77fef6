#![forbid(unsafe_code)]

//! The whole program, start to finish.
//!
//! 1. Load data pools and check the bonus table (fatal on failure).
//! 2. Refuse terminals narrower than [`MIN_WIDTH`].
//! 3. Phase stage: clear the screen and play the run plan through a
//!    [`ConsoleInvoker`] on the normal screen, with Ctrl-C routed to a flag.
//! 4. Hand-off: the console invoker and the interrupt guard are dropped.
//! 5. Rain stage: acquire a [`TerminalSurface`] and run the [`RainEngine`]
//!    until a key press.

use std::io::{self, Write};
use std::thread;

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use hackscreen_core::interrupt::{InterruptFlag, InterruptGuard};
use hackscreen_fx::effects::{ConsoleInvoker, EffectError, EffectInvoker, Pacing};
use hackscreen_fx::pools::{AssetSource, DataPools};
use hackscreen_fx::rain::{RainConfig, RainEngine, RainReport};
use hackscreen_fx::surface::TerminalSurface;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cli::Opts;
use crate::error::RunError;
use crate::phase::BonusTable;
use crate::retry::RetryTracker;
use crate::scheduler::{PhaseScheduler, RunPlan};
use crate::script::PhaseScript;

/// Narrowest terminal the effects are laid out for.
pub const MIN_WIDTH: u16 = 60;

/// Width assumed when the terminal cannot be queried.
const FALLBACK_WIDTH: u16 = 80;

/// How the phase stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Every phase of the plan played.
    Completed(RunPlan),
    /// Ctrl-C arrived part way through.
    Interrupted,
}

/// How the program ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Ran to the end; `rain` is `None` when the rain stage was skipped.
    Completed { rain: Option<RainReport> },
    /// Ctrl-C during the phase stage.
    Interrupted,
}

/// Everything a run needs, checked up front.
#[derive(Debug)]
pub struct Runner {
    opts: Opts,
    pools: DataPools,
    scheduler: PhaseScheduler,
    seed: u64,
}

impl Runner {
    /// Load content and validate the phase table.
    ///
    /// # Errors
    ///
    /// [`RunError::Content`] or [`RunError::Schedule`] when the packaged
    /// content is broken.
    pub fn new(opts: Opts) -> Result<Self, RunError> {
        let source = match &opts.assets {
            Some(dir) => AssetSource::Dir(dir.clone()),
            None => AssetSource::Bundled,
        };
        let pools = DataPools::load(&source)?;
        let scheduler = PhaseScheduler::new(BonusTable::default())?;
        let seed = opts.seed.unwrap_or_else(rand::random);
        tracing::info!(seed, ?source, "runner ready");
        Ok(Self {
            opts,
            pools,
            scheduler,
            seed,
        })
    }

    /// The seed every random source of this run derives from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn pools(&self) -> &DataPools {
        &self.pools
    }

    /// Plan a run and play it through `invoker`.
    ///
    /// # Errors
    ///
    /// Only display failures; an interrupt is [`PhaseOutcome::Interrupted`].
    pub fn play_phases<I, R>(&self, invoker: &mut I, rng: &mut R) -> Result<PhaseOutcome, RunError>
    where
        I: EffectInvoker + ?Sized,
        R: Rng + ?Sized,
    {
        let plan = self.scheduler.build_run(rng);
        let mut tracker = RetryTracker::new();
        let played = PhaseScript::new(invoker, &self.pools, &mut tracker, rng).run(&plan);
        match played {
            Ok(()) => {
                tracing::info!(failures = tracker.global_count(), "phase stage complete");
                Ok(PhaseOutcome::Completed(plan))
            }
            Err(EffectError::Interrupted) => {
                tracing::info!("phase stage interrupted");
                Ok(PhaseOutcome::Interrupted)
            }
            Err(EffectError::Io(err)) => Err(RunError::Io(err)),
        }
    }

    /// Run both stages on the real terminal.
    ///
    /// # Errors
    ///
    /// A narrow terminal or any terminal I/O failure.
    pub fn run(&self) -> Result<Outcome, RunError> {
        let width = crossterm::terminal::size()
            .map(|(w, _)| w)
            .unwrap_or(FALLBACK_WIDTH);
        check_width(width)?;

        let mut master = StdRng::seed_from_u64(self.seed);
        let mut script_rng = StdRng::from_rng(&mut master);
        let fx_rng = StdRng::from_rng(&mut master);
        let rain_rng = StdRng::from_rng(&mut master);

        if self.opts.phases {
            let outcome = self.phase_stage(width, &mut script_rng, fx_rng)?;
            if outcome == PhaseOutcome::Interrupted {
                print_farewell(&mut io::stdout())?;
                return Ok(Outcome::Interrupted);
            }
        }

        if !self.opts.rain {
            return Ok(Outcome::Completed { rain: None });
        }

        let surface = TerminalSurface::acquire()?;
        let config = RainConfig::default().with_fps(self.opts.fps);
        let report = RainEngine::new(config, rain_rng).run(surface)?;
        Ok(Outcome::Completed { rain: Some(report) })
    }

    /// The console half. Everything it holds is dropped on return, before
    /// the rain stage takes the terminal.
    fn phase_stage(
        &self,
        width: u16,
        script_rng: &mut StdRng,
        fx_rng: StdRng,
    ) -> Result<PhaseOutcome, RunError> {
        let guard = InterruptGuard::install()?;
        let flag: InterruptFlag = guard.flag().clone();
        let pacing = Pacing::new(self.opts.speed);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        thread::sleep(pacing.scale(0.3));

        let mut console = ConsoleInvoker::new(out, fx_rng, &self.pools, width)
            .with_pacing(pacing)
            .with_interrupt(flag);
        let outcome = self.play_phases(&mut console, script_rng)?;
        if let Err(EffectError::Io(err)) = console.into_inner() {
            return Err(RunError::Io(err));
        }
        drop(guard);
        Ok(outcome)
    }
}

/// Reject terminals narrower than [`MIN_WIDTH`].
pub fn check_width(width: u16) -> Result<(), RunError> {
    if width < MIN_WIDTH {
        return Err(RunError::TooNarrow {
            width,
            required: MIN_WIDTH,
        });
    }
    Ok(())
}

/// The Ctrl-C sign-off.
pub fn print_farewell<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(
        out,
        ResetColor,
        Print("\n\n  "),
        SetForegroundColor(Color::DarkRed),
        SetAttribute(Attribute::Bold),
        Print("★ CONNECTION TERMINATED ★"),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print("\n  "),
        SetAttribute(Attribute::Dim),
        Print("Trace erased. You were never here."),
        SetAttribute(Attribute::Reset),
        Print("\n\n"),
    )?;
    out.flush()
}

/// Process exit status for a finished run.
pub fn exit_code(result: &Result<Outcome, RunError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackscreen_fx::effects::RecordingInvoker;

    #[test]
    fn width_guard() {
        assert!(check_width(60).is_ok());
        assert!(check_width(200).is_ok());
        assert!(matches!(
            check_width(59),
            Err(RunError::TooNarrow { width: 59, .. })
        ));
    }

    #[test]
    fn farewell_text() {
        let mut out = Vec::new();
        print_farewell(&mut out).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("★ CONNECTION TERMINATED ★"));
        assert!(text.contains("Trace erased. You were never here."));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code(&Ok(Outcome::Interrupted)), 0);
        assert_eq!(exit_code(&Ok(Outcome::Completed { rain: None })), 0);
        assert_eq!(
            exit_code(&Err(RunError::TooNarrow {
                width: 10,
                required: MIN_WIDTH
            })),
            1
        );
    }

    #[test]
    fn missing_assets_dir_is_fatal() {
        let opts = Opts {
            assets: Some(std::env::temp_dir().join("hackscreen-missing-assets")),
            ..Opts::default()
        };
        assert!(matches!(Runner::new(opts), Err(RunError::Content(_))));
    }

    #[test]
    fn explicit_seed_is_kept() {
        let runner = Runner::new(Opts {
            seed: Some(1234),
            ..Opts::default()
        })
        .expect("runner");
        assert_eq!(runner.seed(), 1234);
    }

    #[test]
    fn interrupt_is_an_outcome_not_an_error() {
        let runner = Runner::new(Opts::default()).expect("runner");
        let mut rec = RecordingInvoker::new().interrupt_after(5);
        let outcome = runner
            .play_phases(&mut rec, &mut StdRng::seed_from_u64(1))
            .expect("no error");
        assert_eq!(outcome, PhaseOutcome::Interrupted);
    }
}
