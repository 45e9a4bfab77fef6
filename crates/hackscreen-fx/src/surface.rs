#![forbid(unsafe_code)]

//! Display surface boundary for full-screen stages.
//!
//! A [`DisplaySurface`] is everything the rain engine needs from the outside
//! world: the current size, a bounded-wait event poll, and a way to show a
//! complete frame. Acquiring a surface takes exclusive control of the
//! display; dropping it gives control back.
//!
//! - [`TerminalSurface`]: the real terminal (raw mode, alternate screen,
//!   hidden cursor), restored on drop and on panic.
//! - [`HeadlessSurface`]: an in-memory surface with scripted input, used by
//!   tests to drive the engine frame by frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::Duration;

use hackscreen_core::event::Event;
use hackscreen_core::terminal_session::{SessionOptions, TerminalSession};
use hackscreen_render::{Buffer, Presenter};

/// Exclusive full-screen output plus input polling.
pub trait DisplaySurface {
    /// Current size as `(columns, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Wait at most `timeout` for the next input event.
    ///
    /// `Ok(None)` means nothing relevant arrived in time.
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;

    /// Show `frame` in full.
    fn present(&mut self, frame: &Buffer) -> io::Result<()>;
}

/// The real terminal, held for the lifetime of the value.
pub struct TerminalSurface {
    // Declared first so buffered output is flushed before the session
    // restores the terminal.
    presenter: Presenter<Stdout>,
    session: TerminalSession,
}

impl TerminalSurface {
    /// Enter raw mode and the alternate screen, hide the cursor and start
    /// routing SIGINT/SIGTERM into [`Event::Interrupt`].
    pub fn acquire() -> io::Result<Self> {
        let session = TerminalSession::new(SessionOptions::fullscreen())?;
        hackscreen_core::info!("display surface acquired");
        Ok(Self {
            presenter: Presenter::new(io::stdout()),
            session,
        })
    }
}

impl DisplaySurface for TerminalSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        self.session.size()
    }

    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        self.session.poll_event(timeout)
    }

    fn present(&mut self, frame: &Buffer) -> io::Result<()> {
        self.presenter.present(frame).map(|_| ())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        hackscreen_core::info!("display surface released");
    }
}

/// What a [`HeadlessSurface`] observed.
#[derive(Debug, Clone, Default)]
pub struct HeadlessLog {
    /// Frames presented so far.
    pub frames: usize,
    /// `(width, height)` of every presented frame, in order.
    pub frame_sizes: Vec<(u16, u16)>,
    /// The most recent frame.
    pub last_frame: Option<Buffer>,
    /// Number of `poll_event` calls.
    pub polls: usize,
    /// Set once the surface has been dropped.
    pub released: bool,
}

/// In-memory surface with scripted input.
///
/// Events are keyed by the number of frames presented when they become
/// visible: an event at frame `0` is seen before anything is drawn, an event
/// at frame `1` right after the first frame. Polls never block.
#[derive(Debug)]
pub struct HeadlessSurface {
    width: u16,
    height: u16,
    script: VecDeque<(usize, Event)>,
    frame_limit: Option<usize>,
    log: Rc<RefCell<HeadlessLog>>,
}

impl HeadlessSurface {
    /// A `width x height` surface with no scripted input.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            script: VecDeque::new(),
            frame_limit: None,
            log: Rc::new(RefCell::new(HeadlessLog::default())),
        }
    }

    /// Deliver `event` once `frame` frames have been presented.
    #[must_use]
    pub fn with_event_at(mut self, frame: usize, event: Event) -> Self {
        let at = self.script.partition_point(|(f, _)| *f <= frame);
        self.script.insert(at, (frame, event));
        self
    }

    /// Report [`Event::Interrupt`] once `frames` frames have been presented.
    #[must_use]
    pub fn with_frame_limit(mut self, frames: usize) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Shared handle to the observation log; stays readable after drop.
    pub fn log(&self) -> Rc<RefCell<HeadlessLog>> {
        Rc::clone(&self.log)
    }
}

impl DisplaySurface for HeadlessSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.width, self.height))
    }

    fn poll_event(&mut self, _timeout: Duration) -> io::Result<Option<Event>> {
        let frames = {
            let mut log = self.log.borrow_mut();
            log.polls += 1;
            log.frames
        };
        if self.script.front().is_some_and(|(at, _)| *at <= frames)
            && let Some((_, event)) = self.script.pop_front()
        {
            if let Event::Resize { width, height } = event {
                self.width = width;
                self.height = height;
            }
            return Ok(Some(event));
        }
        if self.frame_limit.is_some_and(|limit| frames >= limit) {
            return Ok(Some(Event::Interrupt));
        }
        Ok(None)
    }

    fn present(&mut self, frame: &Buffer) -> io::Result<()> {
        let mut log = self.log.borrow_mut();
        log.frames += 1;
        log.frame_sizes.push((frame.width(), frame.height()));
        log.last_frame = Some(frame.clone());
        Ok(())
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        self.log.borrow_mut().released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackscreen_core::event::{KeyCode, KeyEvent};

    #[test]
    fn events_wait_for_their_frame() {
        let key = Event::Key(KeyEvent::new(KeyCode::Char('q')));
        let mut surface = HeadlessSurface::new(10, 5).with_event_at(1, key);
        assert_eq!(surface.poll_event(Duration::ZERO).ok().flatten(), None);
        surface.present(&Buffer::new(10, 5)).expect("present");
        assert_eq!(surface.poll_event(Duration::ZERO).ok().flatten(), Some(key));
        assert_eq!(surface.poll_event(Duration::ZERO).ok().flatten(), None);
    }

    #[test]
    fn resize_event_changes_reported_size() {
        let mut surface = HeadlessSurface::new(10, 5).with_event_at(
            0,
            Event::Resize {
                width: 30,
                height: 8,
            },
        );
        assert_eq!(surface.size().ok(), Some((10, 5)));
        let _ = surface.poll_event(Duration::ZERO);
        assert_eq!(surface.size().ok(), Some((30, 8)));
    }

    #[test]
    fn frame_limit_raises_interrupt() {
        let mut surface = HeadlessSurface::new(4, 4).with_frame_limit(2);
        for _ in 0..2 {
            assert_eq!(surface.poll_event(Duration::ZERO).ok().flatten(), None);
            surface.present(&Buffer::new(4, 4)).expect("present");
        }
        assert_eq!(
            surface.poll_event(Duration::ZERO).ok().flatten(),
            Some(Event::Interrupt)
        );
    }

    #[test]
    fn drop_marks_release() {
        let surface = HeadlessSurface::new(1, 1);
        let log = surface.log();
        assert!(!log.borrow().released);
        drop(surface);
        assert!(log.borrow().released);
    }

    #[test]
    fn events_at_same_frame_keep_insertion_order() {
        let a = Event::Resize {
            width: 1,
            height: 1,
        };
        let b = Event::Interrupt;
        let mut surface = HeadlessSurface::new(2, 2)
            .with_event_at(0, a)
            .with_event_at(0, b);
        assert_eq!(surface.poll_event(Duration::ZERO).ok().flatten(), Some(a));
        assert_eq!(surface.poll_event(Duration::ZERO).ok().flatten(), Some(b));
    }
}
