#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! The rain stage only cares about three things coming from the terminal:
//! a key press (cancel), a size change (rebuild), and an external interrupt
//! (cancel). Everything else crossterm can report is dropped at the mapping
//! boundary so callers never have to match on it.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press` when not available from the terminal
//! - `Modifiers` use bitflags for easy combination
//! - Key *release* events are mapped but [`Event::is_cancel`] ignores them,
//!   so the release of the key that launched the program cannot end the rain

use bitflags::bitflags;
use crossterm::event as cte;

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// Terminal was resized.
    Resize {
        /// New terminal width in columns.
        width: u16,
        /// New terminal height in rows.
        height: u16,
    },

    /// SIGINT/SIGTERM (or an equivalent host signal) was delivered.
    Interrupt,
}

impl Event {
    /// Convert a Crossterm event into a canonical [`Event`].
    ///
    /// Returns `None` for events the program has no use for (mouse, paste,
    /// focus).
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => Some(Self::Key(KeyEvent::from_crossterm(key))),
            cte::Event::Resize(width, height) => Some(Self::Resize { width, height }),
            cte::Event::Mouse(_)
            | cte::Event::Paste(_)
            | cte::Event::FocusGained
            | cte::Event::FocusLost => None,
        }
    }

    /// Whether this event ends a cancellable stage.
    #[must_use]
    pub const fn is_cancel(&self) -> bool {
        match self {
            Self::Key(key) => !matches!(key.kind, KeyEventKind::Release),
            Self::Interrupt => true,
            Self::Resize { .. } => false,
        }
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    fn from_crossterm(event: cte::KeyEvent) -> Self {
        Self {
            code: map_key_code(event.code),
            modifiers: map_modifiers(event.modifiers),
            kind: match event.kind {
                cte::KeyEventKind::Press => KeyEventKind::Press,
                cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
                cte::KeyEventKind::Release => KeyEventKind::Release,
            },
        }
    }
}

/// Key codes the program distinguishes.
///
/// Any key ends the rain, so the set stays small; keys without a variant of
/// their own arrive as [`KeyCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Function key (F1-F24).
    F(u8),

    /// Arrows, navigation, media and every other non-character key.
    Other,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

fn map_key_code(code: cte::KeyCode) -> KeyCode {
    match code {
        cte::KeyCode::Char(c) => KeyCode::Char(c),
        cte::KeyCode::Enter => KeyCode::Enter,
        cte::KeyCode::Esc => KeyCode::Escape,
        cte::KeyCode::Backspace => KeyCode::Backspace,
        cte::KeyCode::Tab => KeyCode::Tab,
        cte::KeyCode::F(n) => KeyCode::F(n),
        _ => KeyCode::Other,
    }
}

fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(cte::KeyModifiers::SUPER)
        || modifiers.contains(cte::KeyModifiers::HYPER)
        || modifiers.contains(cte::KeyModifiers::META)
    {
        mapped |= Modifiers::SUPER;
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ct_key(code: cte::KeyCode, modifiers: cte::KeyModifiers, kind: cte::KeyEventKind) -> cte::Event {
        cte::Event::Key(cte::KeyEvent::new_with_kind(code, modifiers, kind))
    }

    #[test]
    fn char_key_maps_with_modifiers() {
        let event = Event::from_crossterm(ct_key(
            cte::KeyCode::Char('c'),
            cte::KeyModifiers::CONTROL,
            cte::KeyEventKind::Press,
        ));
        let Some(Event::Key(key)) = event else {
            panic!("expected key event, got {event:?}");
        };
        assert_eq!(key.code, KeyCode::Char('c'));
        assert!(key.ctrl());
        assert_eq!(key.kind, KeyEventKind::Press);
    }

    #[test]
    fn navigation_keys_collapse_to_other() {
        let event = Event::from_crossterm(ct_key(
            cte::KeyCode::PageDown,
            cte::KeyModifiers::NONE,
            cte::KeyEventKind::Press,
        ));
        assert_eq!(event, Some(Event::Key(KeyEvent::new(KeyCode::Other))));
    }

    #[test]
    fn resize_maps_dimensions() {
        let event = Event::from_crossterm(cte::Event::Resize(132, 43));
        assert_eq!(
            event,
            Some(Event::Resize {
                width: 132,
                height: 43
            })
        );
    }

    #[test]
    fn focus_and_paste_are_dropped() {
        assert_eq!(Event::from_crossterm(cte::Event::FocusGained), None);
        assert_eq!(Event::from_crossterm(cte::Event::Paste("x".into())), None);
    }

    #[test]
    fn release_does_not_cancel() {
        let release = Event::Key(KeyEvent::new(KeyCode::Enter).with_kind(KeyEventKind::Release));
        assert!(!release.is_cancel());
        assert!(Event::Key(KeyEvent::new(KeyCode::Char('q'))).is_cancel());
        assert!(
            Event::Key(KeyEvent::new(KeyCode::Char('q')).with_kind(KeyEventKind::Repeat))
                .is_cancel()
        );
        assert!(Event::Interrupt.is_cancel());
        assert!(
            !Event::Resize {
                width: 1,
                height: 1
            }
            .is_cancel()
        );
    }

    #[test]
    fn super_hyper_meta_fold_into_super() {
        let mapped = map_modifiers(cte::KeyModifiers::HYPER | cte::KeyModifiers::SHIFT);
        assert_eq!(mapped, Modifiers::SUPER | Modifiers::SHIFT);
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }
}
