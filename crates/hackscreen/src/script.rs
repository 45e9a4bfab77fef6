#![forbid(unsafe_code)]

//! Phase scripts.
//!
//! Turns each planned phase into its sequence of [`Effect`]s. Counts, picks
//! and timings are drawn from the injected generator, so a seeded run
//! replays the same effects. Steps that may fail go through the run's
//! [`RetryTracker`]: every honoured failure shows a [`Effect::FailureRetry`]
//! and the step is attempted again until the tracker forces success.

use std::time::Duration;

use hackscreen_fx::effects::{Effect, EffectError, EffectInvoker, Ink, Tone};
use hackscreen_fx::pools::{Category, DataPools};
use rand::Rng;

use crate::phase::PhaseKind;
use crate::retry::RetryTracker;
use crate::scheduler::{PlannedPhase, RunPlan};

/// Seconds in the final countdown.
pub const COUNTDOWN_SECONDS: u32 = 10;
/// Failed hash lines before the brute force succeeds.
const BRUTE_FORCE_ATTEMPTS: usize = 20;
const PORTS_SCANNED: usize = 15;
const EXFIL_TASKS: usize = 3;
const FIREWALL_STEPS: usize = 3;

/// Everything a phase script needs for one run.
pub struct PhaseScript<'a, I: ?Sized, R: ?Sized> {
    invoker: &'a mut I,
    pools: &'a DataPools,
    tracker: &'a mut RetryTracker,
    rng: &'a mut R,
}

impl<'a, I, R> PhaseScript<'a, I, R>
where
    I: EffectInvoker + ?Sized,
    R: Rng + ?Sized,
{
    pub fn new(
        invoker: &'a mut I,
        pools: &'a DataPools,
        tracker: &'a mut RetryTracker,
        rng: &'a mut R,
    ) -> Self {
        Self {
            invoker,
            pools,
            tracker,
            rng,
        }
    }

    /// Play every phase of `plan` in order.
    ///
    /// # Errors
    ///
    /// Stops at the first effect that fails or is interrupted.
    pub fn run(&mut self, plan: &RunPlan) -> Result<(), EffectError> {
        for phase in plan.phases() {
            self.run_phase(*phase)?;
        }
        Ok(())
    }

    /// Play one phase.
    pub fn run_phase(&mut self, phase: PlannedPhase) -> Result<(), EffectError> {
        let span = tracing::info_span!("phase", title = phase.kind.title(), number = ?phase.number);
        let _guard = span.enter();
        tracing::info!("phase started");

        self.tracker.reset_phase();
        if let Some(number) = phase.number {
            self.emit(Effect::PhaseHeader {
                number,
                title: phase.kind.title().to_string(),
            })?;
        }

        match phase.kind {
            PhaseKind::Welcome => self.welcome(),
            PhaseKind::Exploitation => self.exploitation(phase.kind),
            PhaseKind::Cracking => self.cracking(),
            PhaseKind::PayloadDeployment => self.payload_deployment(phase.kind),
            PhaseKind::FinalSequence => self.final_sequence(),
            PhaseKind::Reconnaissance => self.reconnaissance(),
            PhaseKind::DataExfiltration => self.data_exfiltration(),
            PhaseKind::Surveillance => self.surveillance(),
            PhaseKind::FirewallBypass => self.firewall_bypass(phase.kind),
            PhaseKind::SocialEngineering => self.social_engineering(),
            PhaseKind::TraceCleanup => self.trace_cleanup(),
        }
    }

    fn emit(&mut self, effect: Effect) -> Result<(), EffectError> {
        self.invoker.invoke(&effect)
    }

    fn pause(&mut self, secs: f64) -> Result<(), EffectError> {
        self.emit(Effect::pause_secs(secs))
    }

    fn seconds(&mut self, lo: f64, hi: f64) -> Duration {
        Duration::from_secs_f64(self.rng.random_range(lo..=hi))
    }

    fn pick(&mut self, category: Category) -> String {
        self.pools.pick(category, &mut *self.rng).to_string()
    }

    fn sample(&mut self, category: Category, n: usize) -> Vec<String> {
        self.pools
            .sample(category, n, &mut *self.rng)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// A step that may visibly fail before it succeeds.
    fn gated_step(
        &mut self,
        message: String,
        fail_chance: f64,
        duration: Duration,
    ) -> Result<(), EffectError> {
        while self.tracker.should_fail(fail_chance, &mut *self.rng) {
            tracing::info!(
                step = %message,
                phase_failures = self.tracker.phase_count(),
                run_failures = self.tracker.global_count(),
                "step failed, retrying"
            );
            self.emit(Effect::FailureRetry {
                message: message.clone(),
            })?;
        }
        self.emit(Effect::HackingStep { message, duration })
    }

    fn welcome(&mut self) -> Result<(), EffectError> {
        self.emit(Effect::WelcomeBanner)?;
        self.pause(0.3)?;
        let target = self.pick(Category::TargetServers).to_uppercase();
        self.emit(Effect::GlitchText {
            text: format!("TARGET ACQUIRED: {target}"),
        })?;
        self.pause(0.3)?;
        self.emit(Effect::SystemInfo)
    }

    fn exploitation(&mut self, kind: PhaseKind) -> Result<(), EffectError> {
        let fail_chance = kind.failure_chance().unwrap_or(0.0);
        let count = self.rng.random_range(5..=8);
        for step in self.sample(Category::HackingSteps, count) {
            let duration = self.seconds(0.8, 2.0);
            self.gated_step(step, fail_chance, duration)?;
            self.pause(0.2)?;
        }
        Ok(())
    }

    fn cracking(&mut self) -> Result<(), EffectError> {
        let brute = Effect::EncryptionCrack {
            attempts: BRUTE_FORCE_ATTEMPTS,
        };
        let led_with_brute = self.rng.random::<f64>() < 0.4;
        if led_with_brute {
            self.emit(brute.clone())?;
            self.pause(0.3)?;
        }

        let count = self.rng.random_range(2..=5);
        for target in self.sample(Category::Files, count) {
            self.emit(Effect::PasswordCrack { target })?;
            self.pause(0.3)?;
        }

        if !led_with_brute {
            self.emit(brute)?;
            self.pause(0.3)?;
        }

        let total = self.rng.random_range(50..=120);
        self.emit(Effect::progress("Bulk decrypt", total))
    }

    fn payload_deployment(&mut self, kind: PhaseKind) -> Result<(), EffectError> {
        let fail_chance = kind.failure_chance().unwrap_or(0.0);
        let count = self.rng.random_range(3..=6);
        for payload in self.sample(Category::MalwareNames, count) {
            let duration = self.seconds(0.8, 1.5);
            self.gated_step(format!("Deploying {payload}..."), fail_chance, duration)?;
            self.pause(0.15)?;
        }

        let total = self.rng.random_range(40..=80);
        self.emit(Effect::progress("Installing rootkit", total))?;
        self.pause(0.2)?;

        let note = self.pick(Category::MalwareCleanup);
        self.emit(Effect::typing(note, Ink::bold(Tone::Yellow)))?;
        let total = self.rng.random_range(30..=60);
        self.emit(Effect::progress("Wiping logs", total))
    }

    fn final_sequence(&mut self) -> Result<(), EffectError> {
        self.emit(Effect::PermissionPrompt)?;
        self.pause(0.5)?;
        self.emit(Effect::typing(
            ">> Hacking starting in...",
            Ink::bold(Tone::BrightGreen),
        ))?;
        self.emit(Effect::Countdown {
            seconds: COUNTDOWN_SECONDS,
        })?;
        self.emit(Effect::status(
            "★ ENTERING THE MATRIX ★",
            Ink::bold(Tone::Green),
        ))?;
        self.pause(1.0)
    }

    fn reconnaissance(&mut self) -> Result<(), EffectError> {
        let msg = self.pick(Category::Recon);
        self.emit(Effect::typing(msg, Ink::plain(Tone::Cyan)))?;
        self.pause(0.3)?;

        self.emit(Effect::PortScan {
            ports: PORTS_SCANNED,
        })?;
        self.pause(0.3)?;

        if self.rng.random::<f64>() < 0.35 {
            self.emit(Effect::typing(
                ">> Fingerprinting target OS...",
                Ink::plain(Tone::Cyan),
            ))?;
            self.emit(Effect::SystemInfo)?;
            self.pause(0.2)?;
        }

        let packets = self.rng.random_range(6..=12);
        self.emit(Effect::NetworkTraffic { packets })?;
        self.pause(0.3)?;

        let count = self.rng.random_range(3..=6);
        let ips = self.sample(Category::Ips, count);
        self.emit(Effect::HostList { ips })
    }

    fn data_exfiltration(&mut self) -> Result<(), EffectError> {
        self.emit(Effect::FileTree)?;
        self.pause(0.3)?;
        let lines = self.rng.random_range(8..=16);
        self.emit(Effect::HexDump { lines })?;
        self.pause(0.3)?;
        let tasks = self.sample(Category::ExfilTasks, EXFIL_TASKS);
        self.emit(Effect::MultiProgress { tasks })
    }

    fn surveillance(&mut self) -> Result<(), EffectError> {
        let msg = self.pick(Category::Surveillance);
        self.emit(Effect::typing(msg, Ink::plain(Tone::Green)))?;
        self.pause(0.3)?;
        let pools = self.pools;
        if let Some(profile) = pools.pick_signal_profile(&mut *self.rng) {
            self.emit(Effect::DualSignalGraph {
                profile: profile.clone(),
            })?;
        }
        Ok(())
    }

    fn firewall_bypass(&mut self, kind: PhaseKind) -> Result<(), EffectError> {
        let fail_chance = kind.failure_chance().unwrap_or(0.0);
        let msg = self.pick(Category::FirewallBypass);
        self.emit(Effect::typing(msg, Ink::plain(Tone::Red)))?;
        self.pause(0.3)?;

        for step in self.sample(Category::FirewallSteps, FIREWALL_STEPS) {
            let port = self.pools.pick_port(&mut *self.rng);
            let step = step.replace("%PORT%", &port.to_string());
            let duration = self.seconds(0.8, 1.5);
            self.gated_step(step, fail_chance, duration)?;
            self.pause(0.2)?;
        }

        self.emit(Effect::status("✓ FIREWALL BYPASSED", Ink::bold(Tone::Green)))
    }

    fn social_engineering(&mut self) -> Result<(), EffectError> {
        let msg = self.pick(Category::SocialEngineering);
        self.emit(Effect::typing(msg, Ink::plain(Tone::Yellow)))?;
        self.pause(0.3)?;

        let count = self.rng.random_range(2..=4);
        for message in self.sample(Category::SocialSteps, count) {
            let duration = self.seconds(1.0, 2.0);
            self.emit(Effect::HackingStep { message, duration })?;
            self.pause(0.2)?;
        }

        self.emit(Effect::progress("Exfiltrating credentials", 40))?;
        self.emit(Effect::status(
            "✓ CREDENTIALS CAPTURED",
            Ink::bold(Tone::Green),
        ))
    }

    fn trace_cleanup(&mut self) -> Result<(), EffectError> {
        let msg = self.pick(Category::Cleanup);
        self.emit(Effect::typing(msg, Ink::plain(Tone::Dim)))?;
        self.pause(0.3)?;

        let count = self.rng.random_range(3..=5);
        for message in self.sample(Category::CleanupSteps, count) {
            let duration = self.seconds(0.5, 1.2);
            self.emit(Effect::HackingStep { message, duration })?;
            self.pause(0.15)?;
        }

        self.emit(Effect::progress("Sanitizing forensic evidence", 50))?;
        self.emit(Effect::status(
            "✓ ALL TRACES ELIMINATED",
            Ink::bold(Tone::Green),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackscreen_fx::effects::RecordingInvoker;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn play(kind: PhaseKind, number: Option<usize>, seed: u64) -> (RecordingInvoker, RetryTracker) {
        let pools = DataPools::bundled().expect("bundled pools");
        let mut rec = RecordingInvoker::new();
        let mut tracker = RetryTracker::new();
        let mut rng = StdRng::seed_from_u64(seed);
        PhaseScript::new(&mut rec, &pools, &mut tracker, &mut rng)
            .run_phase(PlannedPhase { kind, number })
            .expect("phase");
        (rec, tracker)
    }

    fn count(rec: &RecordingInvoker, name: &str) -> usize {
        rec.names().iter().filter(|n| **n == name).count()
    }

    #[test]
    fn welcome_has_no_header() {
        let (rec, _) = play(PhaseKind::Welcome, None, 1);
        assert_eq!(count(&rec, "phase_header"), 0);
        assert_eq!(rec.names()[0], "welcome_banner");
        assert!(rec.effects().iter().any(|e| matches!(
            e,
            Effect::GlitchText { text } if text.starts_with("TARGET ACQUIRED: ")
        )));
    }

    #[test]
    fn numbered_phase_starts_with_its_header() {
        let (rec, _) = play(PhaseKind::Cracking, Some(4), 2);
        assert_eq!(
            rec.effects()[0],
            Effect::PhaseHeader {
                number: 4,
                title: "CRACKING".into()
            }
        );
        assert_eq!(count(&rec, "encryption_crack"), 1);
        let cracks = count(&rec, "password_crack");
        assert!((2..=5).contains(&cracks));
    }

    #[test]
    fn exploitation_steps_all_succeed_eventually() {
        for seed in 0..20 {
            let (rec, tracker) = play(PhaseKind::Exploitation, Some(1), seed);
            let steps = count(&rec, "hacking_step");
            assert!((5..=8).contains(&steps), "seed {seed}: {steps} steps");
            let failures = count(&rec, "failure_retry");
            assert_eq!(failures as u32, tracker.phase_count());
            assert!(failures <= 2);
        }
    }

    #[test]
    fn firewall_ports_are_substituted() {
        let (rec, _) = play(PhaseKind::FirewallBypass, Some(2), 5);
        for effect in rec.effects() {
            if let Effect::HackingStep { message, .. } | Effect::FailureRetry { message } = effect {
                assert!(!message.contains("%PORT%"), "{message}");
            }
        }
        assert!(rec.effects().contains(&Effect::status(
            "✓ FIREWALL BYPASSED",
            Ink::bold(Tone::Green)
        )));
    }

    #[test]
    fn final_sequence_counts_down_into_the_rain() {
        let (rec, _) = play(PhaseKind::FinalSequence, Some(6), 3);
        let names = rec.names();
        assert_eq!(
            &names[..2],
            &["phase_header", "permission_prompt"]
        );
        assert!(rec.effects().contains(&Effect::Countdown {
            seconds: COUNTDOWN_SECONDS
        }));
        assert!(rec.effects().iter().any(|e| matches!(
            e,
            Effect::Status { text, .. } if text.contains("ENTERING THE MATRIX")
        )));
    }

    #[test]
    fn every_phase_plays_without_error() {
        for kind in PhaseKind::REQUIRED_MIDDLE
            .into_iter()
            .chain(PhaseKind::BONUS)
        {
            let (rec, _) = play(kind, Some(1), 11);
            assert!(rec.effects().len() > 1, "{kind} emitted too little");
        }
    }

    #[test]
    fn interruption_stops_the_script() {
        let pools = DataPools::bundled().expect("bundled pools");
        let mut rec = RecordingInvoker::new().interrupt_after(3);
        let mut tracker = RetryTracker::new();
        let mut rng = StdRng::seed_from_u64(8);
        let result = PhaseScript::new(&mut rec, &pools, &mut tracker, &mut rng).run_phase(
            PlannedPhase {
                kind: PhaseKind::Exploitation,
                number: Some(1),
            },
        );
        assert!(matches!(result, Err(EffectError::Interrupted)));
        assert_eq!(rec.effects().len(), 3);
    }
}
