//! Property-based invariant tests for rain columns.
//!
//! 1. A falling column advances by exactly its speed each tick.
//! 2. The trail never holds more glyphs than `trail_len`.
//! 3. Speed and trail length stay inside the configured bounds across
//!    respawns.
//! 4. Painting never touches a cell outside the column's own x.

use hackscreen_fx::rain::{ColumnStep, RainColumn, RainConfig};
use hackscreen_render::Buffer;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

proptest! {
    #[test]
    fn falling_advances_by_speed(seed in any::<u64>(), height in 1u16..60, ticks in 1usize..200) {
        let config = RainConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut column = RainColumn::new(0, height, &config, &mut rng);
        for _ in 0..ticks {
            let before = column.head_row;
            if column.step(height, &config, &mut rng) == ColumnStep::Falling {
                prop_assert!((column.head_row - before - column.speed).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn trail_is_bounded(seed in any::<u64>(), height in 1u16..60, ticks in 1usize..300) {
        let config = RainConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut column = RainColumn::new(3, height, &config, &mut rng);
        for _ in 0..ticks {
            let step = column.step(height, &config, &mut rng);
            prop_assert!(column.glyphs().count() <= column.trail_len);
            match step {
                ColumnStep::Retired | ColumnStep::Dormant => {
                    prop_assert!(!column.is_active());
                    prop_assert_eq!(column.glyphs().count(), 0);
                }
                ColumnStep::Falling | ColumnStep::Respawned => prop_assert!(column.is_active()),
            }
        }
    }

    #[test]
    fn respawn_stays_in_bounds(seed in any::<u64>(), height in 1u16..80, ticks in 1usize..400) {
        let config = RainConfig::default();
        let max_trail = (usize::from(height) / 2).max(config.min_trail);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut column = RainColumn::new(0, height, &config, &mut rng);
        for _ in 0..ticks {
            column.step(height, &config, &mut rng);
            if column.is_active() {
                prop_assert!(column.speed >= config.min_speed && column.speed <= config.max_speed);
                prop_assert!(column.trail_len >= config.min_trail && column.trail_len <= max_trail);
            }
        }
    }

    #[test]
    fn paint_stays_in_own_column(seed in any::<u64>(), x in 0u16..20, height in 1u16..30, ticks in 0usize..100) {
        let config = RainConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut column = RainColumn::new(x, height, &config, &mut rng);
        for _ in 0..ticks {
            column.step(height, &config, &mut rng);
        }
        let mut buf = Buffer::new(20, height);
        column.paint(&mut buf);
        for y in 0..height {
            for other in (0..20).filter(|&o| o != x) {
                prop_assert!(buf.get(other, y).is_some_and(|c| c.is_blank()));
            }
        }
        prop_assert!(buf.painted_cells() <= column.trail_len);
    }
}
