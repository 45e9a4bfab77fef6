//! Line-oriented effect rendering.
//!
//! Runs in cooked mode on the normal screen: everything printed here stays
//! in the scrollback. In-place animation uses carriage return plus
//! clear-line, and multi-line redraws move the cursor up with
//! `MoveToPreviousLine`.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::MoveToPreviousLine;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use hackscreen_core::interrupt::InterruptFlag;
use rand::Rng;
use rand::seq::IndexedRandom;
use unicode_width::UnicodeWidthStr;

use super::waves::{scan_line, sine_wave};
use super::{Effect, EffectError, EffectInvoker, Ink, Tone, phase_tone};
use crate::pools::{Category, DataPools, SignalProfile, random_hex, random_ip, random_mac};

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const SPINNER_TICK: f64 = 0.08;
const GLITCH_CHARS: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '_', '+', '-', '=', '[', ']', '{', '}',
    '|', ';', ':', '\'', ',', '.', '<', '>', '?', '/', '~', '`', '░', '▒', '▓', '█', '▀', '▄',
];
const PACKET_FLAGS: [&str; 7] = ["SYN", "ACK", "PSH", "FIN", "RST", "DATA", "HANDSHAKE"];
const TREE_DIRS: [&str; 6] = ["etc", "var", "home", "opt", "srv", "root"];
/// Width of a single progress bar line, label included.
const PROGRESS_COLUMNS: usize = 70;
/// Slice length for interruptible sleeps.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Delay multiplier for every pause an effect takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    speed: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

impl Pacing {
    /// Scale delays by `speed`; `0.0` removes them. Negative and NaN count
    /// as `0.0`.
    pub fn new(speed: f64) -> Self {
        Self {
            speed: if speed.is_finite() { speed.max(0.0) } else { 0.0 },
        }
    }

    /// No delays at all.
    pub fn instant() -> Self {
        Self::new(0.0)
    }

    /// The multiplier.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Scaled length of a `secs`-second delay.
    pub fn scale(&self, secs: f64) -> Duration {
        Duration::try_from_secs_f64(secs * self.speed).unwrap_or(Duration::ZERO)
    }
}

/// Renders effects as coloured text on `out`.
pub struct ConsoleInvoker<'p, W: Write, R: Rng> {
    out: W,
    rng: R,
    pools: &'p DataPools,
    pacing: Pacing,
    interrupt: Option<InterruptFlag>,
    width: u16,
}

impl<'p, W: Write, R: Rng> ConsoleInvoker<'p, W, R> {
    /// Create an invoker for a console `width` columns wide.
    pub fn new(out: W, rng: R, pools: &'p DataPools, width: u16) -> Self {
        Self {
            out,
            rng,
            pools,
            pacing: Pacing::default(),
            interrupt: None,
            width,
        }
    }

    /// Use `pacing` for all delays.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Abort with [`EffectError::Interrupted`] once `flag` is raised.
    #[must_use]
    pub fn with_interrupt(mut self, flag: InterruptFlag) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Flush and give back the writer.
    pub fn into_inner(mut self) -> Result<W, EffectError> {
        self.out.flush()?;
        Ok(self.out)
    }

    // ---------------------------------------------------------------------
    // Output primitives
    // ---------------------------------------------------------------------

    fn check_interrupt(&self) -> Result<(), EffectError> {
        if self.interrupt.as_ref().is_some_and(InterruptFlag::is_raised) {
            return Err(EffectError::Interrupted);
        }
        Ok(())
    }

    /// Flush, then sleep for the scaled delay, waking early on Ctrl-C.
    fn pause(&mut self, secs: f64) -> Result<(), EffectError> {
        self.out.flush()?;
        self.check_interrupt()?;
        let deadline = Instant::now() + self.pacing.scale(secs);
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Ok(());
            }
            thread::sleep(left.min(SLEEP_SLICE));
            self.check_interrupt()?;
        }
    }

    fn pause_between(&mut self, lo: f64, hi: f64) -> Result<(), EffectError> {
        let secs = self.rng.random_range(lo..=hi);
        self.pause(secs)
    }

    fn styled(&mut self, ink: Ink, text: &str) -> Result<(), EffectError> {
        let (color, dim) = match ink.tone {
            Tone::Green => (Color::DarkGreen, false),
            Tone::BrightGreen => (Color::Green, false),
            Tone::Cyan => (Color::DarkCyan, false),
            Tone::Red => (Color::DarkRed, false),
            Tone::BrightRed => (Color::Red, false),
            Tone::Magenta => (Color::DarkMagenta, false),
            Tone::Yellow => (Color::DarkYellow, false),
            Tone::Blue => (Color::DarkBlue, false),
            Tone::White => (Color::Grey, false),
            Tone::BrightWhite => (Color::White, false),
            Tone::Dim => (Color::Reset, true),
        };
        queue!(self.out, SetForegroundColor(color))?;
        if ink.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if dim {
            queue!(self.out, SetAttribute(Attribute::Dim))?;
        }
        if ink.blink {
            queue!(self.out, SetAttribute(Attribute::SlowBlink))?;
        }
        queue!(
            self.out,
            Print(text),
            SetAttribute(Attribute::Reset),
            ResetColor
        )?;
        Ok(())
    }

    fn line(&mut self, ink: Ink, text: &str) -> Result<(), EffectError> {
        self.styled(ink, text)?;
        self.newline()
    }

    fn newline(&mut self) -> Result<(), EffectError> {
        queue!(self.out, Print("\n"))?;
        Ok(())
    }

    /// Replace the current line with `text`.
    fn rewrite(&mut self, ink: Ink, text: &str) -> Result<(), EffectError> {
        queue!(self.out, Print("\r"), Clear(ClearType::CurrentLine))?;
        self.styled(ink, text)
    }

    fn clear_line(&mut self) -> Result<(), EffectError> {
        queue!(self.out, Print("\r"), Clear(ClearType::CurrentLine))?;
        Ok(())
    }

    fn type_out(&mut self, ink: Ink, text: &str, delay: f64) -> Result<(), EffectError> {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            self.styled(ink, ch.encode_utf8(&mut buf))?;
            self.pause(delay)?;
        }
        self.newline()
    }

    /// Draw a rounded box around `body`, `width` columns wide overall.
    fn panel(
        &mut self,
        body: &[String],
        width: usize,
        border: Ink,
        content: Ink,
        title: Option<(&str, Ink)>,
        subtitle: Option<(&str, Ink)>,
    ) -> Result<(), EffectError> {
        let inner = width.saturating_sub(2).max(1);
        self.panel_rule(inner, '╭', '╮', border, title)?;
        self.newline()?;
        for text in body {
            self.styled(border, "│")?;
            self.styled(content, &fit(text, inner))?;
            self.styled(border, "│")?;
            self.newline()?;
        }
        self.panel_rule(inner, '╰', '╯', border, subtitle)?;
        self.newline()
    }

    fn panel_rule(
        &mut self,
        inner: usize,
        left: char,
        right: char,
        border: Ink,
        label: Option<(&str, Ink)>,
    ) -> Result<(), EffectError> {
        let label = label.filter(|(text, _)| text.width() + 2 <= inner);
        let Some((text, ink)) = label else {
            let rule: String = std::iter::once(left)
                .chain(std::iter::repeat_n('─', inner))
                .chain(std::iter::once(right))
                .collect();
            return self.styled(border, &rule);
        };
        let used = text.width() + 2;
        let lead = (inner - used) / 2;
        let trail = inner - used - lead;
        let mut head = String::from(left);
        head.extend(std::iter::repeat_n('─', lead));
        head.push(' ');
        self.styled(border, &head)?;
        self.styled(ink, text)?;
        let mut tail = String::from(" ");
        tail.extend(std::iter::repeat_n('─', trail));
        tail.push(right);
        self.styled(border, &tail)
    }

    fn pick(&mut self, category: Category) -> String {
        self.pools.pick(category, &mut self.rng).to_string()
    }

    fn console_width(&self) -> usize {
        usize::from(self.width.max(20))
    }

    // ---------------------------------------------------------------------
    // Effects
    // ---------------------------------------------------------------------

    fn phase_header(&mut self, number: usize, title: &str) -> Result<(), EffectError> {
        let tone = phase_tone(number);
        let width = self.console_width().min(60);
        self.newline()?;
        self.panel(
            &[format!("  ◆ PHASE {number}: {title}")],
            width,
            Ink::plain(tone),
            Ink::bold(tone),
            None,
            None,
        )?;
        self.pause(0.5)
    }

    fn welcome_banner(&mut self) -> Result<(), EffectError> {
        let pools = self.pools;
        let body: Vec<String> = pools
            .banner()
            .lines()
            .map(|l| format!(" {l}"))
            .collect();
        let art = body.iter().map(|l| l.width()).max().unwrap_or(0);
        let width = (art + 4).min(self.console_width()).max(40);
        let subtitle = format!("v{} · unauthorized access", env!("CARGO_PKG_VERSION"));
        self.panel(
            &body,
            width,
            Ink::plain(Tone::BrightGreen),
            Ink::bold(Tone::Green),
            Some(("★ CLASSIFIED ★", Ink::bold(Tone::Red))),
            Some((subtitle.as_str(), Ink::plain(Tone::Dim))),
        )?;
        self.pause(0.5)?;
        self.type_out(
            Ink::bold(Tone::BrightGreen),
            ">> Initializing hacking sequence...",
            0.04,
        )?;
        self.pause(0.3)
    }

    fn glitch_text(&mut self, text: &str) -> Result<(), EffectError> {
        const CYCLES: usize = 8;
        let ink = Ink::bold(Tone::BrightGreen);
        for cycle in 0..CYCLES {
            let ratio = cycle as f64 / CYCLES as f64;
            let glitched: String = text
                .chars()
                .map(|ch| {
                    if self.rng.random::<f64>() < ratio {
                        ch
                    } else {
                        GLITCH_CHARS.choose(&mut self.rng).copied().unwrap_or('#')
                    }
                })
                .collect();
            self.rewrite(ink, &format!("  {glitched}"))?;
            self.pause(0.12)?;
        }
        self.rewrite(ink, &format!("  {text}"))?;
        self.newline()?;
        self.pause(0.3)
    }

    fn spin(&mut self, message: &str, secs: f64) -> Result<(), EffectError> {
        let ticks = ((secs / SPINNER_TICK).ceil() as usize).max(1);
        for tick in 0..ticks {
            let frame = SPINNER[tick % SPINNER.len()];
            self.rewrite(Ink::bold(Tone::Yellow), &format!("{frame} {message}"))?;
            self.pause(SPINNER_TICK)?;
        }
        self.clear_line()
    }

    fn hacking_step(&mut self, message: &str, duration: Duration) -> Result<(), EffectError> {
        self.spin(message, duration.as_secs_f64())?;
        let ok = self.pick(Category::SuccessMessages);
        if self.rng.random::<f64>() < 0.85 {
            return self.line(Ink::bold(Tone::Green), &format!("  ✓ {ok}"));
        }
        let err = self.pick(Category::ErrorMessages);
        self.line(Ink::bold(Tone::Red), &format!("  ✗ {err}"))?;
        self.pause(0.3)?;
        self.line(
            Ink::bold(Tone::Yellow),
            "  ↻ Retrying with alternate vector...",
        )?;
        self.pause(0.5)?;
        self.line(Ink::bold(Tone::Green), &format!("  ✓ {ok}"))
    }

    fn failure_retry(&mut self, message: &str) -> Result<(), EffectError> {
        self.spin(message, 0.6)?;
        self.line(Ink::bold(Tone::Red), &format!("  ✗ FAILED: {message}"))?;
        let err = self.pick(Category::ErrorMessages);
        self.line(Ink::plain(Tone::Red), &format!("    {err}"))?;
        self.pause(0.4)?;
        self.line(
            Ink::bold(Tone::Yellow),
            "  ↻ Rerouting through backup proxy and retrying...",
        )?;
        self.pause(0.5)
    }

    fn password_crack(&mut self, target: &str) -> Result<(), EffectError> {
        let password = self.pick(Category::Passwords);
        let algo = self.pick(Category::EncryptionAlgos);
        self.newline()?;
        self.styled(Ink::plain(Tone::Cyan), "  Target:")?;
        self.line(Ink::plain(Tone::White), &format!(" {target}"))?;
        self.styled(Ink::plain(Tone::Cyan), "  Algo:")?;
        self.line(Ink::plain(Tone::White), &format!("   {algo}"))?;

        let len = password.chars().count();
        for i in 1..=len {
            let masked = format!("{}{}", "*".repeat(i), "_".repeat(len - i));
            self.rewrite(Ink::bold(Tone::Yellow), &format!("  Cracking: [{masked}]"))?;
            self.pause_between(0.05, 0.2)?;
        }
        self.pause(0.3)?;
        self.rewrite(Ink::bold(Tone::Green), &format!("  Cracked:  [{password}]"))?;
        self.newline()?;
        self.pause(0.3)
    }

    fn encryption_crack(&mut self, attempts: usize) -> Result<(), EffectError> {
        let algo = self.pick(Category::EncryptionAlgos);
        self.newline()?;
        self.line(Ink::bold(Tone::Magenta), &format!("  ◆ BRUTE-FORCING {algo}"))?;
        self.pause(0.2)?;
        let attempts = attempts.max(1);
        for i in 0..attempts {
            let hash = random_hex(&mut self.rng, 64);
            if i + 1 < attempts {
                self.styled(Ink::plain(Tone::Red), "  ✗ ")?;
                self.line(Ink::plain(Tone::Dim), &hash)?;
            } else {
                self.styled(Ink::plain(Tone::Green), "  ✓ ")?;
                self.line(Ink::bold(Tone::Green), &hash)?;
                self.line(Ink::bold(Tone::Green), "    COLLISION FOUND: key recovered")?;
            }
            self.pause_between(0.03, 0.12)?;
        }
        Ok(())
    }

    fn progress_bar(&mut self, label: &str, total: u32) -> Result<(), EffectError> {
        let total = total.max(1);
        for done in 0..=total {
            let text = progress_line(label, done, total);
            self.rewrite(Ink::plain(Tone::White), &text)?;
            if done < total {
                self.pause_between(0.005, 0.03)?;
            }
        }
        self.newline()
    }

    fn multi_progress(&mut self, tasks: &[String]) -> Result<(), EffectError> {
        if tasks.is_empty() {
            return Ok(());
        }
        let name_width = tasks.iter().map(|t| t.width()).max().unwrap_or(0);
        let mut completed = vec![0.0f64; tasks.len()];
        let mut frame = 0usize;
        loop {
            if frame > 0 {
                queue!(self.out, MoveToPreviousLine(tasks.len() as u16))?;
            }
            for (task, &done) in tasks.iter().zip(&completed) {
                let marker = if done >= 100.0 {
                    '✓'
                } else {
                    SPINNER[frame % SPINNER.len()]
                };
                let filled = ((done / 100.0) * 30.0).round() as usize;
                self.clear_line()?;
                self.styled(Ink::plain(Tone::Green), &format!("  {marker} "))?;
                self.styled(
                    Ink::bold(Tone::Blue),
                    &format!("{task:<name_width$}  "),
                )?;
                self.styled(
                    Ink::plain(Tone::Magenta),
                    &format!("{}{}", "━".repeat(filled), " ".repeat(30 - filled.min(30))),
                )?;
                self.line(Ink::plain(Tone::White), &format!(" {:>3.0}%", done.min(100.0)))?;
            }
            if completed.iter().all(|&d| d >= 100.0) {
                return Ok(());
            }
            for done in &mut completed {
                if *done < 100.0 {
                    *done = (*done + self.rng.random_range(1.0..=5.0)).min(100.0);
                }
            }
            frame += 1;
            self.pause(0.05)?;
        }
    }

    fn port_scan(&mut self, count: usize) -> Result<(), EffectError> {
        let target = random_ip(&mut self.rng);
        self.newline()?;
        self.line(Ink::bold(Tone::Cyan), &format!("  ◉ SCANNING {target}"))?;
        let pools = self.pools;
        let mut ports: Vec<u16> = pools
            .ports()
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect();
        ports.sort_unstable();
        for port in ports {
            self.pause_between(0.05, 0.2)?;
            let roll = self.rng.random::<f64>();
            if roll < 0.4 {
                let service = self.pick(Category::SystemProcesses);
                self.line(
                    Ink::plain(Tone::Green),
                    &format!("    {port:>5}/tcp   open     {service}"),
                )?;
            } else if roll < 0.8 {
                self.line(Ink::plain(Tone::Red), &format!("    {port:>5}/tcp   closed"))?;
            } else {
                self.line(
                    Ink::plain(Tone::Yellow),
                    &format!("    {port:>5}/tcp   filtered"),
                )?;
            }
        }
        Ok(())
    }

    fn system_info(&mut self) -> Result<(), EffectError> {
        let target = self.pick(Category::TargetServers);
        let pools = self.pools;
        let info = pools.system_info();
        let rng = &mut self.rng;
        let rows: Vec<(&str, String)> = vec![
            ("Hostname", target.clone()),
            ("OS", info.os.choose(rng).cloned().unwrap_or_default()),
            (
                "Kernel",
                format!(
                    "6.{}.{}-generic",
                    rng.random_range(1..=8),
                    rng.random_range(0..=15)
                ),
            ),
            ("CPU", info.cpu.choose(rng).cloned().unwrap_or_default()),
            ("GPU", info.gpu.choose(rng).cloned().unwrap_or_default()),
            (
                "RAM",
                format!("{} GB", info.ram_gb.choose(rng).copied().unwrap_or(16)),
            ),
            ("Disk", info.disk.choose(rng).cloned().unwrap_or_default()),
            ("Uptime", format!("{} days", rng.random_range(1..=365))),
            ("IP", random_ip(rng)),
            ("MAC", random_mac(rng)),
            ("Open Ports", rng.random_range(3..=12).to_string()),
            ("Active Users", rng.random_range(1..=5).to_string()),
        ];

        let key_w = rows.iter().map(|(k, _)| k.width()).max().unwrap_or(0) + 2;
        let val_w = rows.iter().map(|(_, v)| v.width()).max().unwrap_or(0) + 2;
        let border = Ink::plain(Tone::Red);

        self.newline()?;
        self.line(Ink::bold(Tone::Red), &format!("  ◆ SYSTEM INTEL: {target}"))?;
        self.line(
            border,
            &format!("  ┌{}┬{}┐", "─".repeat(key_w), "─".repeat(val_w)),
        )?;
        for (key, value) in &rows {
            self.styled(border, "  │")?;
            self.styled(Ink::bold(Tone::Cyan), &fit(&format!(" {key}"), key_w))?;
            self.styled(border, "│")?;
            self.styled(Ink::plain(Tone::Green), &fit(&format!(" {value}"), val_w))?;
            self.line(border, "│")?;
            self.pause(0.2)?;
        }
        self.line(
            border,
            &format!("  └{}┴{}┘", "─".repeat(key_w), "─".repeat(val_w)),
        )?;
        self.pause(0.3)
    }

    fn network_traffic(&mut self, packets: usize) -> Result<(), EffectError> {
        self.newline()?;
        self.line(Ink::bold(Tone::Cyan), "  ◉ PACKET CAPTURE")?;
        self.line(
            Ink::bold(Tone::Cyan),
            &format!(
                "  {:<4} {:<16} {:<16} {:<6} {:<7} {}",
                "#", "Source", "Destination", "Proto", "Size", "Info"
            ),
        )?;
        for i in 1..=packets {
            let src = random_ip(&mut self.rng);
            let dst = self.pick(Category::Ips);
            let proto = self.pick(Category::NetworkProtocols);
            let size = format!("{}B", self.rng.random_range(64..=1500));
            let flag = PACKET_FLAGS.choose(&mut self.rng).copied().unwrap_or("DATA");
            self.line(
                Ink::plain(Tone::Green),
                &format!("  {i:<4} {src:<16} {dst:<16} {proto:<6} {size:<7} {flag}"),
            )?;
            self.pause_between(0.15, 0.4)?;
        }
        Ok(())
    }

    fn host_list(&mut self, ips: &[String]) -> Result<(), EffectError> {
        self.newline()?;
        self.line(Ink::bold(Tone::Cyan), "  ◉ LIVE HOSTS DISCOVERED:")?;
        for ip in ips {
            self.line(Ink::plain(Tone::Green), &format!("    → {ip}"))?;
            self.pause(0.15)?;
        }
        Ok(())
    }

    fn file_tree(&mut self) -> Result<(), EffectError> {
        let target = self.pick(Category::TargetServers);
        let guide = Ink::plain(Tone::Dim);
        self.newline()?;
        self.line(Ink::bold(Tone::Green), &format!("  📂 //{target}/"))?;
        for (d, dir) in TREE_DIRS.iter().enumerate() {
            let last_dir = d + 1 == TREE_DIRS.len();
            self.styled(guide, if last_dir { "  └── " } else { "  ├── " })?;
            self.line(Ink::plain(Tone::Cyan), &format!("📁 {dir}/"))?;
            self.pause(0.2)?;

            let files = self.rng.random_range(1..=4);
            for f in 0..files {
                let path = self.pick(Category::Files);
                let name = path.rsplit('/').next().unwrap_or(&path).to_string();
                let size = self.rng.random_range(1..=9999);
                let stem = if last_dir { "      " } else { "  │   " };
                let branch = if f + 1 == files { "└── " } else { "├── " };
                self.styled(guide, &format!("{stem}{branch}"))?;
                self.styled(Ink::plain(Tone::Dim), &name)?;
                self.line(Ink::plain(Tone::Yellow), &format!(" ({size}K)"))?;
                self.pause(0.15)?;
            }
        }
        Ok(())
    }

    fn hex_dump(&mut self, lines: usize) -> Result<(), EffectError> {
        self.newline()?;
        self.line(Ink::bold(Tone::Magenta), "  ◆ MEMORY DUMP")?;
        for _ in 0..lines {
            let addr = self.rng.random_range(0x1000u32..=0xFFFF);
            let bytes: [u8; 16] = std::array::from_fn(|_| self.rng.random());
            let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
            let ascii: String = (0..16)
                .map(|_| {
                    if self.rng.random::<f64>() > 0.3 {
                        char::from(self.rng.random_range(33u8..=126))
                    } else {
                        '.'
                    }
                })
                .collect();
            self.styled(Ink::plain(Tone::Dim), &format!("  0x{addr:04X}"))?;
            self.styled(Ink::plain(Tone::Green), &format!("  {}  ", hex.join(" ")))?;
            self.line(Ink::plain(Tone::Yellow), &format!("|{ascii}|"))?;
            self.pause(0.08)?;
        }
        Ok(())
    }

    fn dual_signal_graph(&mut self, profile: &SignalProfile) -> Result<(), EffectError> {
        const HEIGHT: usize = 8;
        const FRAMES: usize = 40;
        let panel_width = (self.console_width().saturating_sub(6) / 2).clamp(12, 45);
        let inner = panel_width - 4;
        let border = Ink::plain(Tone::Cyan);
        let title = Ink::bold(Tone::Cyan);
        let left_title = format!("◉ {}", profile.left_label);
        let right_title = format!("◉ {}", profile.right_label);

        for frame in 0..FRAMES {
            if frame > 0 {
                queue!(self.out, MoveToPreviousLine((HEIGHT + 2) as u16))?;
            }
            let left = scan_line(inner, HEIGHT, frame, profile.scan_speed);
            let right = sine_wave(inner, HEIGHT, frame, profile.wave_freq, profile.wave_speed);

            self.clear_line()?;
            self.styled(border, "  ")?;
            self.panel_rule(panel_width - 2, '╭', '╮', border, Some((left_title.as_str(), title)))?;
            self.styled(border, " ")?;
            self.panel_rule(panel_width - 2, '╭', '╮', border, Some((right_title.as_str(), title)))?;
            self.newline()?;
            for (l, r) in left.iter().zip(&right) {
                self.clear_line()?;
                self.styled(border, "  │ ")?;
                self.styled(Ink::plain(Tone::Green), &fit(l, inner))?;
                self.styled(border, " │ │ ")?;
                self.styled(Ink::plain(Tone::BrightGreen), &fit(r, inner))?;
                self.line(border, " │")?;
            }
            self.clear_line()?;
            self.styled(border, "  ")?;
            self.panel_rule(panel_width - 2, '╰', '╯', border, None)?;
            self.styled(border, " ")?;
            self.panel_rule(panel_width - 2, '╰', '╯', border, None)?;
            self.newline()?;
            self.pause(0.07)?;
        }
        Ok(())
    }

    fn permission_prompt(&mut self) -> Result<(), EffectError> {
        let skull = self.pick(Category::Skulls);
        let body: Vec<String> = skull.lines().map(|l| format!(" {l}")).collect();
        let width = (body.iter().map(|l| l.width()).max().unwrap_or(0) + 4)
            .max(24)
            .min(self.console_width());
        self.newline()?;
        self.panel(
            &body,
            width,
            Ink::plain(Tone::Red),
            Ink::bold(Tone::Red),
            None,
            None,
        )?;
        self.type_out(
            Ink::bold(Tone::Yellow),
            ">> All systems compromised. Final payload ready.",
            0.04,
        )?;
        self.pause(0.5)?;

        let frame = Ink::bold(Tone::BrightWhite);
        self.newline()?;
        self.line(frame, "  ╔══════════════════════════╗")?;
        self.line(frame, "  ║   EXECUTE FINAL HACK?    ║")?;
        self.line(frame, "  ╚══════════════════════════╝")?;
        self.newline()?;

        let password = self.pick(Category::Passwords);
        self.styled(Ink::plain(Tone::Cyan), "  Enter master password: ")?;
        for _ in password.chars() {
            self.styled(Ink::bold(Tone::Green), "*")?;
            self.pause_between(0.05, 0.15)?;
        }
        self.newline()?;
        self.pause(0.3)?;
        self.line(Ink::bold(Tone::Green), "  ✓ AUTHENTICATION VERIFIED")?;
        self.pause(0.5)?;
        self.type_out(Ink::bold(Tone::Red), ">> Initiating final sequence...", 0.05)?;
        self.pause(0.3)
    }

    fn countdown(&mut self, seconds: u32) -> Result<(), EffectError> {
        for i in (1..=seconds).rev() {
            let ink = match i {
                7.. => Ink::plain(Tone::Green),
                4..=6 => Ink::plain(Tone::Yellow),
                _ => Ink::bold(Tone::Red),
            };
            self.line(ink, &format!("  >>> {i} <<<"))?;
            self.pause(1.0)?;
        }
        self.newline()?;
        self.line(Ink::bold(Tone::Red).blinking(), "  ★ LAUNCHING ★")?;
        self.pause(0.5)
    }
}

impl<W: Write, R: Rng> EffectInvoker for ConsoleInvoker<'_, W, R> {
    fn invoke(&mut self, effect: &Effect) -> Result<(), EffectError> {
        self.check_interrupt()?;
        hackscreen_core::trace!(effect = effect.name(), "invoke");
        match effect {
            Effect::PhaseHeader { number, title } => self.phase_header(*number, title)?,
            Effect::WelcomeBanner => self.welcome_banner()?,
            Effect::GlitchText { text } => self.glitch_text(text)?,
            Effect::Typing { text, ink } => self.type_out(*ink, text, 0.03)?,
            Effect::HackingStep { message, duration } => self.hacking_step(message, *duration)?,
            Effect::FailureRetry { message } => self.failure_retry(message)?,
            Effect::PasswordCrack { target } => self.password_crack(target)?,
            Effect::EncryptionCrack { attempts } => self.encryption_crack(*attempts)?,
            Effect::ProgressBar { label, total } => self.progress_bar(label, *total)?,
            Effect::MultiProgress { tasks } => self.multi_progress(tasks)?,
            Effect::PortScan { ports } => self.port_scan(*ports)?,
            Effect::SystemInfo => self.system_info()?,
            Effect::NetworkTraffic { packets } => self.network_traffic(*packets)?,
            Effect::HostList { ips } => self.host_list(ips)?,
            Effect::FileTree => self.file_tree()?,
            Effect::HexDump { lines } => self.hex_dump(*lines)?,
            Effect::DualSignalGraph { profile } => self.dual_signal_graph(profile)?,
            Effect::PermissionPrompt => self.permission_prompt()?,
            Effect::Countdown { seconds } => self.countdown(*seconds)?,
            Effect::Status { text, ink } => {
                self.newline()?;
                self.line(*ink, &format!("  {text}"))?;
                self.pause(0.3)?;
            }
            Effect::Pause(duration) => self.pause(duration.as_secs_f64())?,
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Pad or truncate `text` to exactly `width` display columns.
fn fit(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}

/// One tqdm-style progress line: `  label:  45%|██▒░░| 45/100`.
fn progress_line(label: &str, done: u32, total: u32) -> String {
    let frac = f64::from(done.min(total)) / f64::from(total.max(1));
    let prefix = format!("  {label}: {:>3.0}%|", frac * 100.0);
    let suffix = format!("| {done}/{total}");
    let bar_width = PROGRESS_COLUMNS
        .saturating_sub(prefix.width() + suffix.width())
        .max(10);
    let exact = frac * bar_width as f64;
    let full = exact.floor() as usize;
    let partial = full < bar_width && exact - full as f64 >= 0.5;
    let mut bar = "█".repeat(full);
    if partial {
        bar.push('▒');
    }
    let empty = bar_width - full - usize::from(partial);
    bar.push_str(&"░".repeat(empty));
    format!("{prefix}{bar}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pools() -> DataPools {
        DataPools::bundled().expect("bundled pools")
    }

    fn render(effect: &Effect) -> String {
        let pools = pools();
        let mut inv = ConsoleInvoker::new(Vec::new(), StdRng::seed_from_u64(1), &pools, 80)
            .with_pacing(Pacing::instant());
        inv.invoke(effect).expect("invoke");
        let bytes = inv.into_inner().expect("flush");
        String::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn pacing_scales_and_sanitizes() {
        assert_eq!(Pacing::new(2.0).scale(0.5), Duration::from_secs(1));
        assert_eq!(Pacing::new(-1.0).scale(5.0), Duration::ZERO);
        assert_eq!(Pacing::new(f64::NAN).speed(), 0.0);
        assert_eq!(Pacing::instant().scale(10.0), Duration::ZERO);
    }

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
        assert_eq!(fit("ｱｲ", 2), "ｱｲ");
        assert_eq!(fit("📂x", 1), " ");
    }

    #[test]
    fn progress_line_is_fixed_width() {
        for done in [0, 1, 33, 99, 100] {
            let line = progress_line("Bulk decrypt", done, 100);
            assert_eq!(line.width(), PROGRESS_COLUMNS, "{line}");
        }
        assert!(progress_line("x", 100, 100).contains("100%"));
    }

    #[test]
    fn phase_header_mentions_number_and_title() {
        let out = render(&Effect::PhaseHeader {
            number: 3,
            title: "CRACKING".into(),
        });
        assert!(out.contains("◆ PHASE 3: CRACKING"));
        assert!(out.contains('╭') && out.contains('╯'));
    }

    #[test]
    fn failure_retry_reports_failure() {
        let out = render(&Effect::FailureRetry {
            message: "Injecting shellcode".into(),
        });
        assert!(out.contains("FAILED: Injecting shellcode"));
        assert!(out.contains("retrying"));
    }

    #[test]
    fn hacking_step_ends_with_success() {
        let out = render(&Effect::HackingStep {
            message: "Bypassing ASLR".into(),
            duration: Duration::from_millis(200),
        });
        assert!(out.contains("Bypassing ASLR"));
        assert!(out.contains('✓'));
    }

    #[test]
    fn typing_prints_every_character() {
        let out = render(&Effect::typing("HELLO", Ink::plain(Tone::Green)));
        for ch in "HELLO".chars() {
            assert!(out.contains(ch));
        }
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn countdown_counts_to_launch() {
        let out = render(&Effect::Countdown { seconds: 3 });
        assert!(out.contains(">>> 3 <<<"));
        assert!(out.contains(">>> 1 <<<"));
        assert!(out.contains("LAUNCHING"));
    }

    #[test]
    fn every_effect_renders() {
        let profile = pools().signal_profiles()[0].clone();
        let effects = vec![
            Effect::WelcomeBanner,
            Effect::GlitchText {
                text: "TARGET ACQUIRED".into(),
            },
            Effect::PasswordCrack {
                target: "/etc/shadow".into(),
            },
            Effect::EncryptionCrack { attempts: 5 },
            Effect::progress("Bulk decrypt", 20),
            Effect::MultiProgress {
                tasks: vec!["a".into(), "bb".into()],
            },
            Effect::PortScan { ports: 15 },
            Effect::SystemInfo,
            Effect::NetworkTraffic { packets: 4 },
            Effect::HostList {
                ips: vec!["10.0.0.1".into()],
            },
            Effect::FileTree,
            Effect::HexDump { lines: 3 },
            Effect::DualSignalGraph { profile },
            Effect::PermissionPrompt,
            Effect::status("★ ENTERING THE MATRIX ★", Ink::bold(Tone::Green)),
            Effect::pause_secs(1.0),
        ];
        for effect in &effects {
            let out = render(effect);
            if !matches!(effect, Effect::Pause(_)) {
                assert!(!out.is_empty(), "{} printed nothing", effect.name());
            }
        }
    }

    #[test]
    fn raised_flag_interrupts() {
        let pools = pools();
        let flag = InterruptFlag::new();
        let mut inv = ConsoleInvoker::new(Vec::new(), StdRng::seed_from_u64(2), &pools, 80)
            .with_pacing(Pacing::instant())
            .with_interrupt(flag.clone());
        inv.invoke(&Effect::SystemInfo).expect("not yet interrupted");
        flag.raise();
        assert!(matches!(
            inv.invoke(&Effect::SystemInfo),
            Err(EffectError::Interrupted)
        ));
    }
}
