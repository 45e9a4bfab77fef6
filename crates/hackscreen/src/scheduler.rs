#![forbid(unsafe_code)]

//! Run planning.
//!
//! A run is always `Welcome, <middle>, Final Sequence`. The middle starts as
//! the three required phases in fixed order; bonus phases drawn from the
//! [`BonusTable`] are then inserted one at a time at a uniformly random gap.
//!
//! Bonus selection is one independent Bernoulli draw per candidate, in table
//! order, stopping as soon as [`BONUS_CAP`] phases are selected. Later
//! candidates are therefore less likely to appear than their nominal
//! probability whenever earlier ones fill the cap.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;

use crate::phase::{BonusTable, PhaseKind, PhaseRole};

/// Most bonus phases in one run.
pub const BONUS_CAP: usize = 4;

/// Most numbered phases in one run: the required middle, the bonus cap and
/// the final sequence.
pub const MAX_NUMBERED_PHASES: usize = PhaseKind::REQUIRED_MIDDLE.len() + BONUS_CAP + 1;

/// A bonus table that cannot be used.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Probability is NaN, infinite or outside `[0, 1]`.
    ProbabilityOutOfRange { phase: PhaseKind, probability: f64 },
    /// The same phase listed twice.
    DuplicateCandidate(PhaseKind),
    /// A required phase listed as a bonus.
    NotABonus(PhaseKind),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbabilityOutOfRange { phase, probability } => {
                write!(f, "bonus phase {phase}: probability {probability} is not in [0, 1]")
            }
            Self::DuplicateCandidate(phase) => write!(f, "bonus phase {phase} is listed twice"),
            Self::NotABonus(phase) => write!(f, "{phase} is a required phase, not a bonus"),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// One entry of a [`RunPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedPhase {
    pub kind: PhaseKind,
    /// Display number; `None` for Welcome.
    pub number: Option<usize>,
}

/// The ordered phases of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    phases: Vec<PlannedPhase>,
}

impl RunPlan {
    /// Plan for `middle`, framed by Welcome and Final Sequence and numbered
    /// from 1.
    fn framed(middle: Vec<PhaseKind>) -> Self {
        let mut phases = Vec::with_capacity(middle.len() + 2);
        phases.push(PlannedPhase {
            kind: PhaseKind::Welcome,
            number: None,
        });
        phases.extend(
            middle
                .into_iter()
                .chain(std::iter::once(PhaseKind::FinalSequence))
                .enumerate()
                .map(|(i, kind)| PlannedPhase {
                    kind,
                    number: Some(i + 1),
                }),
        );
        Self { phases }
    }

    pub fn phases(&self) -> &[PlannedPhase] {
        &self.phases
    }

    /// Phase kinds in run order.
    pub fn kinds(&self) -> impl Iterator<Item = PhaseKind> + '_ {
        self.phases.iter().map(|p| p.kind)
    }

    /// Total phases, Welcome included.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phases that carry a number (everything but Welcome).
    pub fn numbered_len(&self) -> usize {
        self.phases.iter().filter(|p| p.number.is_some()).count()
    }

    /// Bonus phases in the plan.
    pub fn bonus_count(&self) -> usize {
        self.kinds().filter(|k| k.role() == PhaseRole::Bonus).count()
    }
}

/// Builds run plans from a validated bonus table.
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    table: BonusTable,
}

impl PhaseScheduler {
    /// Check `table` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns the first problem found in the table.
    pub fn new(table: BonusTable) -> Result<Self, ScheduleError> {
        validate(&table)?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &BonusTable {
        &self.table
    }

    /// Draw the phase list for one run.
    pub fn build_run<R: Rng + ?Sized>(&self, rng: &mut R) -> RunPlan {
        let mut selected = Vec::with_capacity(BONUS_CAP);
        for candidate in self.table.candidates() {
            if selected.len() >= BONUS_CAP {
                break;
            }
            let draw: f64 = rng.random();
            if draw < candidate.probability {
                selected.push(candidate.phase);
            }
        }

        let mut middle = PhaseKind::REQUIRED_MIDDLE.to_vec();
        for bonus in selected {
            let at = rng.random_range(0..=middle.len());
            middle.insert(at, bonus);
        }

        let plan = RunPlan::framed(middle);
        let titles: Vec<&str> = plan.kinds().map(PhaseKind::title).collect();
        tracing::info!(
            phases = ?titles,
            bonus = plan.bonus_count(),
            "run planned"
        );
        plan
    }
}

impl Default for PhaseScheduler {
    fn default() -> Self {
        Self {
            table: BonusTable::default(),
        }
    }
}

fn validate(table: &BonusTable) -> Result<(), ScheduleError> {
    let mut seen = HashSet::new();
    for candidate in table.candidates() {
        let phase = candidate.phase;
        if phase.role() != PhaseRole::Bonus {
            return Err(ScheduleError::NotABonus(phase));
        }
        if !seen.insert(phase) {
            return Err(ScheduleError::DuplicateCandidate(phase));
        }
        if !(0.0..=1.0).contains(&candidate.probability) {
            return Err(ScheduleError::ProbabilityOutOfRange {
                phase,
                probability: candidate.probability,
            });
        }
    }
    Ok(())
}
