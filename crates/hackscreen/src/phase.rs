#![forbid(unsafe_code)]

//! Phase catalog.

use std::fmt;

/// Whether a phase always runs or is drawn per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseRole {
    Required,
    Bonus,
}

/// Every scripted segment a run can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Welcome,
    Exploitation,
    Cracking,
    PayloadDeployment,
    FinalSequence,
    Reconnaissance,
    DataExfiltration,
    Surveillance,
    TraceCleanup,
    FirewallBypass,
    SocialEngineering,
}

impl PhaseKind {
    /// Required phases between Welcome and Final Sequence, in run order.
    pub const REQUIRED_MIDDLE: [PhaseKind; 3] = [
        PhaseKind::Exploitation,
        PhaseKind::Cracking,
        PhaseKind::PayloadDeployment,
    ];

    /// All bonus phases.
    pub const BONUS: [PhaseKind; 6] = [
        PhaseKind::Reconnaissance,
        PhaseKind::DataExfiltration,
        PhaseKind::Surveillance,
        PhaseKind::FirewallBypass,
        PhaseKind::SocialEngineering,
        PhaseKind::TraceCleanup,
    ];

    /// Header title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Welcome => "WELCOME",
            Self::Exploitation => "EXPLOITATION",
            Self::Cracking => "CRACKING",
            Self::PayloadDeployment => "PAYLOAD DEPLOYMENT",
            Self::FinalSequence => "FINAL SEQUENCE",
            Self::Reconnaissance => "RECONNAISSANCE",
            Self::DataExfiltration => "DATA EXFILTRATION",
            Self::Surveillance => "SURVEILLANCE",
            Self::TraceCleanup => "TRACE CLEANUP",
            Self::FirewallBypass => "FIREWALL BYPASS",
            Self::SocialEngineering => "SOCIAL ENGINEERING",
        }
    }

    pub fn role(self) -> PhaseRole {
        match self {
            Self::Welcome
            | Self::Exploitation
            | Self::Cracking
            | Self::PayloadDeployment
            | Self::FinalSequence => PhaseRole::Required,
            _ => PhaseRole::Bonus,
        }
    }

    /// Probability that a gated step in this phase fails, if it has any.
    pub fn failure_chance(self) -> Option<f64> {
        match self {
            Self::Exploitation => Some(0.20),
            Self::PayloadDeployment => Some(0.15),
            Self::FirewallBypass => Some(0.30),
            _ => None,
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One bonus phase with its inclusion odds.
///
/// Each candidate gets a single draw per run, so a bonus phase appears at
/// most once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusCandidate {
    pub phase: PhaseKind,
    /// Chance of inclusion in a run, in `[0, 1]`.
    pub probability: f64,
}

impl BonusCandidate {
    /// Times a bonus phase may appear in one run.
    pub const MAX_OCCURRENCES: usize = 1;

    /// A candidate drawn at `probability`.
    pub const fn once(phase: PhaseKind, probability: f64) -> Self {
        Self { phase, probability }
    }
}

/// Ordered bonus candidates. Order matters: candidates are drawn first to
/// last and drawing stops once the bonus cap is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusTable {
    candidates: Vec<BonusCandidate>,
}

impl Default for BonusTable {
    fn default() -> Self {
        Self::new(vec![
            BonusCandidate::once(PhaseKind::Reconnaissance, 0.65),
            BonusCandidate::once(PhaseKind::DataExfiltration, 0.55),
            BonusCandidate::once(PhaseKind::Surveillance, 0.50),
            BonusCandidate::once(PhaseKind::FirewallBypass, 0.30),
            BonusCandidate::once(PhaseKind::SocialEngineering, 0.25),
            BonusCandidate::once(PhaseKind::TraceCleanup, 0.40),
        ])
    }
}

impl BonusTable {
    /// A table with the given candidates, unchecked. The scheduler
    /// validates it before use.
    pub fn new(candidates: Vec<BonusCandidate>) -> Self {
        Self { candidates }
    }

    /// The same phases, all with probability `p`.
    #[must_use]
    pub fn with_uniform_probability(mut self, p: f64) -> Self {
        for candidate in &mut self.candidates {
            candidate.probability = p;
        }
        self
    }

    pub fn candidates(&self) -> &[BonusCandidate] {
        &self.candidates
    }
}
