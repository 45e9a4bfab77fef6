#![forbid(unsafe_code)]

//! Effect invoker boundary.
//!
//! An [`Effect`] is one self-contained visual beat of the phase stage, with
//! its parameters already chosen. Phase scripts build effects and hand them
//! to an [`EffectInvoker`]; they never look at how an effect is drawn.
//!
//! - [`ConsoleInvoker`] prints effects to a line-oriented terminal with
//!   colours and pacing.
//! - [`RecordingInvoker`] keeps the effects it was given, for tests.

mod console;
pub mod waves;

use std::fmt;
use std::io;
use std::time::Duration;

use crate::pools::SignalProfile;

pub use console::{ConsoleInvoker, Pacing};

/// Colour of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Green,
    BrightGreen,
    Cyan,
    Red,
    BrightRed,
    Magenta,
    Yellow,
    Blue,
    White,
    BrightWhite,
    /// Default colour at reduced intensity.
    Dim,
}

/// Tone plus emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ink {
    pub tone: Tone,
    pub bold: bool,
    pub blink: bool,
}

impl Ink {
    /// Plain text in `tone`.
    pub const fn plain(tone: Tone) -> Self {
        Self {
            tone,
            bold: false,
            blink: false,
        }
    }

    /// Bold text in `tone`.
    pub const fn bold(tone: Tone) -> Self {
        Self {
            tone,
            bold: true,
            blink: false,
        }
    }

    /// Add blinking.
    #[must_use]
    pub const fn blinking(mut self) -> Self {
        self.blink = true;
        self
    }
}

/// Phase header tones, cycled by phase number.
pub const PHASE_TONES: [Tone; 7] = [
    Tone::Cyan,
    Tone::Red,
    Tone::Magenta,
    Tone::Yellow,
    Tone::Green,
    Tone::Red,
    Tone::BrightRed,
];

/// Header tone for 1-based phase `number`.
pub fn phase_tone(number: usize) -> Tone {
    PHASE_TONES[number.saturating_sub(1) % PHASE_TONES.len()]
}

/// One effect call with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Boxed "◆ PHASE n: TITLE" divider.
    PhaseHeader { number: usize, title: String },
    /// ASCII-art banner panel and tagline.
    WelcomeBanner,
    /// Text that resolves out of random noise.
    GlitchText { text: String },
    /// Text typed out character by character.
    Typing { text: String, ink: Ink },
    /// Spinner, then a success line.
    HackingStep { message: String, duration: Duration },
    /// A visible failure of `message`, before the step is attempted again.
    FailureRetry { message: String },
    /// A password revealed one mask character at a time.
    PasswordCrack { target: String },
    /// Scrolling failed hash attempts ending in a collision.
    EncryptionCrack { attempts: usize },
    /// Single progress bar.
    ProgressBar { label: String, total: u32 },
    /// Several progress bars advancing together.
    MultiProgress { tasks: Vec<String> },
    /// Port scan of a random host over `ports` ports.
    PortScan { ports: usize },
    /// System-intel table for a random target.
    SystemInfo,
    /// Packet-capture table.
    NetworkTraffic { packets: usize },
    /// List of discovered hosts.
    HostList { ips: Vec<String> },
    /// Remote filesystem tree.
    FileTree,
    /// Memory hex dump.
    HexDump { lines: usize },
    /// Scan line and sine wave side by side.
    DualSignalGraph { profile: SignalProfile },
    /// Skull, "EXECUTE FINAL HACK?" box and masked password.
    PermissionPrompt,
    /// Large countdown ending in "LAUNCHING".
    Countdown { seconds: u32 },
    /// One emphasised status line.
    Status { text: String, ink: Ink },
    /// Nothing for a while.
    Pause(Duration),
}

impl Effect {
    /// Short stable name, for logs and assertions.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PhaseHeader { .. } => "phase_header",
            Self::WelcomeBanner => "welcome_banner",
            Self::GlitchText { .. } => "glitch_text",
            Self::Typing { .. } => "typing",
            Self::HackingStep { .. } => "hacking_step",
            Self::FailureRetry { .. } => "failure_retry",
            Self::PasswordCrack { .. } => "password_crack",
            Self::EncryptionCrack { .. } => "encryption_crack",
            Self::ProgressBar { .. } => "progress_bar",
            Self::MultiProgress { .. } => "multi_progress",
            Self::PortScan { .. } => "port_scan",
            Self::SystemInfo => "system_info",
            Self::NetworkTraffic { .. } => "network_traffic",
            Self::HostList { .. } => "host_list",
            Self::FileTree => "file_tree",
            Self::HexDump { .. } => "hex_dump",
            Self::DualSignalGraph { .. } => "dual_signal_graph",
            Self::PermissionPrompt => "permission_prompt",
            Self::Countdown { .. } => "countdown",
            Self::Status { .. } => "status",
            Self::Pause(_) => "pause",
        }
    }

    /// Convenience constructor for [`Effect::Typing`].
    pub fn typing(text: impl Into<String>, ink: Ink) -> Self {
        Self::Typing {
            text: text.into(),
            ink,
        }
    }

    /// Convenience constructor for [`Effect::Status`].
    pub fn status(text: impl Into<String>, ink: Ink) -> Self {
        Self::Status {
            text: text.into(),
            ink,
        }
    }

    /// Convenience constructor for [`Effect::ProgressBar`].
    pub fn progress(label: impl Into<String>, total: u32) -> Self {
        Self::ProgressBar {
            label: label.into(),
            total,
        }
    }

    /// [`Effect::Pause`] of `secs` seconds.
    pub fn pause_secs(secs: f64) -> Self {
        Self::Pause(Duration::from_secs_f64(secs.max(0.0)))
    }
}

/// Why an effect could not finish.
#[derive(Debug)]
pub enum EffectError {
    /// Writing to the display failed.
    Io(io::Error),
    /// Ctrl-C arrived while the effect was running.
    Interrupted,
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "display write failed: {err}"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for EffectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Interrupted => None,
        }
    }
}

impl From<io::Error> for EffectError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Renders effects.
pub trait EffectInvoker {
    /// Render `effect` to completion.
    fn invoke(&mut self, effect: &Effect) -> Result<(), EffectError>;
}

impl<T: EffectInvoker + ?Sized> EffectInvoker for &mut T {
    fn invoke(&mut self, effect: &Effect) -> Result<(), EffectError> {
        (**self).invoke(effect)
    }
}

/// Keeps every effect it is handed.
#[derive(Debug, Clone, Default)]
pub struct RecordingInvoker {
    effects: Vec<Effect>,
    interrupt_after: Option<usize>,
}

impl RecordingInvoker {
    /// An invoker that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`EffectError::Interrupted`] once `n` effects were accepted.
    #[must_use]
    pub fn interrupt_after(mut self, n: usize) -> Self {
        self.interrupt_after = Some(n);
        self
    }

    /// Effects accepted so far, in order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Names of the accepted effects, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.effects.iter().map(Effect::name).collect()
    }
}

impl EffectInvoker for RecordingInvoker {
    fn invoke(&mut self, effect: &Effect) -> Result<(), EffectError> {
        if self
            .interrupt_after
            .is_some_and(|limit| self.effects.len() >= limit)
        {
            return Err(EffectError::Interrupted);
        }
        self.effects.push(effect.clone());
        Ok(())
    }
}
