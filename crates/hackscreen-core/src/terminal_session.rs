#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! RAII ownership of the terminal for full-screen stages. Creating a
//! [`TerminalSession`] enters raw mode and (optionally) the alternate screen
//! and hides the cursor; dropping it undoes every change it made, in reverse
//! order.
//!
//! # Lifecycle Guarantees
//!
//! 1. **All terminal state changes are tracked** - each mode has an
//!    `_enabled` flag that is only set once the mode was actually entered.
//!
//! 2. **Drop restores previous state** - enabled modes are disabled in
//!    reverse order.
//!
//! 3. **Panic safety** - a panic hook performs the same restore before the
//!    previous hook runs, which also covers `panic = "abort"` builds where
//!    `Drop` never executes.
//!
//! 4. **Interrupts do not kill the process** - SIGINT/SIGTERM raise a flag
//!    (see [`crate::interrupt`]) that [`TerminalSession::poll_event`] reports
//!    as [`Event::Interrupt`], so the owner can leave its loop and drop the
//!    session normally.
//!
//! # Cleanup Order
//!
//! 1. Unregister interrupt handlers
//! 2. Reset colours, show cursor (always)
//! 3. Leave alternate screen (if enabled)
//! 4. Exit raw mode (always)
//! 5. Flush stdout
//!
//! # Usage
//!
//! ```no_run
//! use hackscreen_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let session = TerminalSession::new(SessionOptions::fullscreen())?;
//! // ... draw frames ...
//! drop(session); // terminal restored
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::event::Event;
use crate::interrupt::InterruptGuard;

/// Terminal session configuration options.
///
/// All options default to `false`: a default session is raw mode only.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Enable the alternate screen buffer (`CSI ? 1049 h`), preserving the
    /// scrollback the phase stage printed.
    pub alternate_screen: bool,

    /// Hide the cursor for the lifetime of the session.
    pub hide_cursor: bool,

    /// Route SIGINT/SIGTERM into [`Event::Interrupt`].
    pub catch_interrupts: bool,
}

impl SessionOptions {
    /// Everything a full-screen animation wants.
    #[must_use]
    pub fn fullscreen() -> Self {
        Self {
            alternate_screen: true,
            hide_cursor: true,
            catch_interrupts: true,
        }
    }
}

/// A terminal session that manages raw mode and cleanup.
///
/// # Contract
///
/// - **Exclusive ownership**: only one `TerminalSession` should exist at a
///   time. Nothing else may write to stdout while it is alive.
/// - **Raw mode entry**: creating a session enters raw mode, disabling line
///   buffering, echo, and the terminal's own Ctrl-C handling.
/// - **Cleanup guarantee**: when dropped (normally or via panic) every
///   enabled mode is disabled.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    alternate_screen_enabled: bool,
    cursor_hidden: bool,
    interrupts: Option<InterruptGuard>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested features.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or any requested mode cannot be enabled.
    /// Modes entered before the failure are restored when the partially built
    /// session is dropped on the error path.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        crate::info!("terminal raw mode enabled");

        let mut session = Self {
            options: options.clone(),
            alternate_screen_enabled: false,
            cursor_hidden: false,
            interrupts: None,
        };

        let mut stdout = io::stdout();

        if options.alternate_screen {
            crossterm::execute!(
                stdout,
                crossterm::terminal::EnterAlternateScreen,
                crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
            )?;
            session.alternate_screen_enabled = true;
            crate::info!("alternate screen enabled");
        }

        if options.hide_cursor {
            crossterm::execute!(stdout, crossterm::cursor::Hide)?;
            session.cursor_hidden = true;
        }

        if options.catch_interrupts {
            session.interrupts = Some(InterruptGuard::install()?);
        }

        Ok(session)
    }

    /// Get the current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for the next relevant event.
    ///
    /// A pending interrupt is reported before anything in the input queue.
    /// Events the program does not model are consumed and the wait goes on,
    /// so `Ok(None)` always means the full timeout elapsed.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<Option<Event>> {
        if self.interrupted() {
            return Ok(Some(Event::Interrupt));
        }
        match poll_modelled(timeout, crossterm::event::poll, crossterm::event::read)? {
            None if self.interrupted() => Ok(Some(Event::Interrupt)),
            event => Ok(event),
        }
    }

    /// Whether SIGINT/SIGTERM arrived while the session was alive.
    #[must_use]
    pub fn interrupted(&self) -> bool {
        self.interrupts
            .as_ref()
            .is_some_and(|guard| guard.flag().is_raised())
    }

    /// Get the session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn cleanup(&mut self) {
        let _ = self.interrupts.take();

        let mut stdout = io::stdout();

        let _ = crossterm::execute!(stdout, crossterm::style::ResetColor);
        if self.cursor_hidden || self.options.hide_cursor {
            let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
            self.cursor_hidden = false;
        }

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            crate::info!("alternate screen disabled");
        }

        let _ = crossterm::terminal::disable_raw_mode();
        crate::info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Poll until `timeout` elapses or a modelled event arrives, discarding
/// everything [`Event::from_crossterm`] drops.
fn poll_modelled<P, R>(timeout: Duration, mut poll: P, mut read: R) -> io::Result<Option<Event>>
where
    P: FnMut(Duration) -> io::Result<bool>,
    R: FnMut() -> io::Result<crossterm::event::Event>,
{
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !poll(remaining)? {
            return Ok(None);
        }
        if let Some(event) = Event::from_crossterm(read()?) {
            return Ok(Some(event));
        }
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();

    let _ = crossterm::execute!(stdout, crossterm::style::ResetColor);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[test]
    fn session_options_default_is_minimal() {
        let opts = SessionOptions::default();
        assert!(!opts.alternate_screen);
        assert!(!opts.hide_cursor);
        assert!(!opts.catch_interrupts);
    }

    #[test]
    fn fullscreen_enables_everything() {
        let opts = SessionOptions::fullscreen();
        assert!(opts.alternate_screen);
        assert!(opts.hide_cursor);
        assert!(opts.catch_interrupts);
    }

    fn scripted(
        events: Vec<crossterm::event::Event>,
    ) -> (
        impl FnMut(Duration) -> io::Result<bool>,
        impl FnMut() -> io::Result<crossterm::event::Event>,
        Rc<RefCell<Vec<Duration>>>,
    ) {
        let queue = Rc::new(RefCell::new(VecDeque::from(events)));
        let waits = Rc::new(RefCell::new(Vec::new()));
        let poll = {
            let queue = Rc::clone(&queue);
            let waits = Rc::clone(&waits);
            move |timeout: Duration| {
                waits.borrow_mut().push(timeout);
                Ok(!queue.borrow().is_empty())
            }
        };
        let read = move || {
            queue
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| io::Error::other("queue empty"))
        };
        (poll, read, waits)
    }

    #[test]
    fn unmodelled_events_do_not_end_the_wait() {
        use crossterm::event::{Event as CtEvent, KeyCode as CtKeyCode, KeyEvent as CtKeyEvent};

        let (poll, read, waits) = scripted(vec![
            CtEvent::FocusGained,
            CtEvent::FocusLost,
            CtEvent::Key(CtKeyEvent::from(CtKeyCode::Char('q'))),
        ]);
        let event = poll_modelled(Duration::from_millis(40), poll, read).expect("poll");
        assert!(matches!(event, Some(Event::Key(_))));
        assert_eq!(waits.borrow().len(), 3);
    }

    #[test]
    fn only_unmodelled_events_is_a_timeout() {
        let (poll, read, waits) = scripted(vec![
            crossterm::event::Event::FocusGained,
            crossterm::event::Event::Paste("x".to_string()),
        ]);
        let timeout = Duration::from_millis(40);
        assert_eq!(poll_modelled(timeout, poll, read).expect("poll"), None);

        let waits = waits.borrow();
        assert_eq!(waits.len(), 3);
        assert!(waits.iter().all(|w| *w <= timeout));
        assert!(waits.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    // Entering raw mode from a unit test would clobber the test runner's
    // terminal; the session itself is exercised by running the binary.
}
