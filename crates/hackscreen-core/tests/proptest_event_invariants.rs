//! Property-based invariant tests for crossterm -> canonical event mapping.
//!
//! 1. Every character key maps to `KeyCode::Char` with the same character.
//! 2. A key event cancels unless it is a release.
//! 3. Resize events carry their dimensions through unchanged and never cancel.

use crossterm::event as cte;
use hackscreen_core::event::{Event, KeyCode, KeyEventKind};
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = cte::KeyEventKind> {
    prop_oneof![
        Just(cte::KeyEventKind::Press),
        Just(cte::KeyEventKind::Repeat),
        Just(cte::KeyEventKind::Release),
    ]
}

fn modifiers_strategy() -> impl Strategy<Value = cte::KeyModifiers> {
    (0u8..=0b0000_0111).prop_map(|bits| {
        let mut m = cte::KeyModifiers::NONE;
        if bits & 1 != 0 {
            m |= cte::KeyModifiers::SHIFT;
        }
        if bits & 2 != 0 {
            m |= cte::KeyModifiers::ALT;
        }
        if bits & 4 != 0 {
            m |= cte::KeyModifiers::CONTROL;
        }
        m
    })
}

proptest! {
    #[test]
    fn char_keys_round_trip(c in any::<char>(), mods in modifiers_strategy(), kind in kind_strategy()) {
        let raw = cte::Event::Key(cte::KeyEvent::new_with_kind(cte::KeyCode::Char(c), mods, kind));
        let mapped = Event::from_crossterm(raw);
        let Some(Event::Key(key)) = mapped else {
            return Err(TestCaseError::fail(format!("expected key, got {mapped:?}")));
        };
        prop_assert_eq!(key.code, KeyCode::Char(c));
        let released = key.kind == KeyEventKind::Release;
        prop_assert_eq!(Event::Key(key).is_cancel(), !released);
    }

    #[test]
    fn resize_preserves_dimensions(w in any::<u16>(), h in any::<u16>()) {
        let mapped = Event::from_crossterm(cte::Event::Resize(w, h));
        prop_assert_eq!(mapped, Some(Event::Resize { width: w, height: h }));
        let resize = Event::Resize { width: w, height: h };
        prop_assert!(!resize.is_cancel());
    }
}
