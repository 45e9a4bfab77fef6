//! Property-based invariant tests for the diffing presenter.
//!
//! 1. Presenting the same frame twice writes no cells the second time.
//! 2. A frame that differs in N cells from the previous one writes exactly N
//!    cells.
//! 3. Buffer writes outside the grid never change it.

use hackscreen_render::{Buffer, Cell, PackedRgba, Presenter};
use proptest::prelude::*;

fn glyph() -> impl Strategy<Value = char> {
    prop_oneof![Just('0'), Just('ｱ'), Just('Z'), Just('ﾝ'), Just(' ')]
}

fn edits(w: u16, h: u16) -> impl Strategy<Value = Vec<(u16, u16, char)>> {
    prop::collection::vec((0..w, 0..h, glyph()), 0..40)
}

proptest! {
    #[test]
    fn repeat_frame_is_free(w in 1u16..30, h in 1u16..12, seed in edits(30, 12)) {
        let mut frame = Buffer::new(w, h);
        for (x, y, ch) in seed {
            frame.set(x, y, Cell::from_char(ch).with_fg(PackedRgba::rgb(0, 200, 0)));
        }
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&frame).expect("first");
        let stats = presenter.present(&frame).expect("second");
        prop_assert_eq!(stats.cells_written, 0);
        prop_assert!(!stats.full_repaint);
    }

    #[test]
    fn diff_counts_changed_cells(w in 1u16..30, h in 1u16..12, changes in edits(30, 12)) {
        let before = Buffer::new(w, h);
        let mut after = before.clone();
        for (x, y, ch) in changes {
            after.set(x, y, Cell::from_char(ch));
        }
        let expected = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&(x, y)| before.get(x, y) != after.get(x, y))
            .count();

        let mut presenter = Presenter::new(Vec::new()).with_sync_output(false);
        presenter.present(&before).expect("before");
        let stats = presenter.present(&after).expect("after");
        prop_assert_eq!(stats.cells_written, expected);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored(w in 0u16..20, h in 0u16..20, dx in 0u16..50, dy in 0u16..50) {
        let mut buf = Buffer::new(w, h);
        buf.set(w.saturating_add(dx), dy, Cell::from_char('#'));
        buf.set(dx, h.saturating_add(dy), Cell::from_char('#'));
        prop_assert_eq!(buf.painted_cells(), 0);
    }
}
