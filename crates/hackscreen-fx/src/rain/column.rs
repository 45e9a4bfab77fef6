//! A single falling stream.

use std::collections::VecDeque;

use hackscreen_render::{Buffer, Cell, PackedRgba, StyleFlags};
use rand::Rng;

use super::RainConfig;
use super::glyphs::random_glyph;

/// Bright trail green.
pub const TRAIL_BRIGHT: PackedRgba = PackedRgba::rgb(0, 255, 70);
/// Faded trail green.
pub const TRAIL_DIM: PackedRgba = PackedRgba::rgb(0, 140, 40);

/// What a column did during one [`RainColumn::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStep {
    /// Still falling.
    Falling,
    /// The trail left the bottom edge and the column was reset above the top.
    Respawned,
    /// The trail left the bottom edge and the column went dormant.
    Retired,
    /// Dormant, counting down to respawn.
    Dormant,
}

/// One vertical stream of glyphs.
///
/// `head_row` is fractional so slow columns advance less than a row per
/// tick. Glyphs are stored head first; the trail never holds more than
/// `trail_len` glyphs.
#[derive(Debug, Clone)]
pub struct RainColumn {
    /// Horizontal position.
    pub x: u16,
    /// Leading row; negative while above the top edge.
    pub head_row: f64,
    /// Rows advanced per tick (always > 0).
    pub speed: f64,
    /// Maximum trail length, head included.
    pub trail_len: usize,
    glyphs: VecDeque<char>,
    active: bool,
    dormant_ticks: u32,
}

impl RainColumn {
    /// Create a column at `x` with freshly drawn speed, trail and offset.
    pub fn new<R: Rng + ?Sized>(x: u16, height: u16, config: &RainConfig, rng: &mut R) -> Self {
        let mut column = Self {
            x,
            head_row: 0.0,
            speed: config.min_speed,
            trail_len: config.min_trail,
            glyphs: VecDeque::new(),
            active: true,
            dormant_ticks: 0,
        };
        column.spawn(height, config, rng);
        column
    }

    /// Whether the column currently has a falling stream.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Glyphs from head to tail.
    pub fn glyphs(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs.iter().copied()
    }

    /// Whole-row position of the head.
    #[inline]
    pub fn head(&self) -> i64 {
        self.head_row.floor() as i64
    }

    /// Whether every glyph of the trail is below the bottom edge.
    pub fn has_exited(&self, height: u16) -> bool {
        self.head() - self.trail_len as i64 > height as i64
    }

    /// Restart above the top edge with new speed and trail length.
    pub fn spawn<R: Rng + ?Sized>(&mut self, height: u16, config: &RainConfig, rng: &mut R) {
        let h = f64::from(height.max(1));
        self.head_row = rng.random_range(-h..=0.0);
        self.speed = if config.max_speed > config.min_speed {
            rng.random_range(config.min_speed..=config.max_speed)
        } else {
            config.min_speed
        };
        let max_trail = (height as usize / 2).max(config.min_trail);
        self.trail_len = rng.random_range(config.min_trail..=max_trail);
        self.glyphs.clear();
        self.glyphs
            .extend((0..self.trail_len).map(|_| random_glyph(rng)));
        self.active = true;
        self.dormant_ticks = 0;
    }

    /// Advance one tick.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        height: u16,
        config: &RainConfig,
        rng: &mut R,
    ) -> ColumnStep {
        if !self.active {
            if self.dormant_ticks == 0 {
                self.spawn(height, config, rng);
                return ColumnStep::Respawned;
            }
            self.dormant_ticks -= 1;
            return ColumnStep::Dormant;
        }

        let before = self.head();
        self.head_row += self.speed;
        let crossed = (self.head() - before).clamp(0, self.trail_len as i64);
        for _ in 0..crossed {
            self.glyphs.push_front(random_glyph(rng));
        }
        self.glyphs.truncate(self.trail_len);

        if let Some(head) = self.glyphs.front_mut()
            && rng.random::<f64>() < config.flicker_chance
        {
            *head = random_glyph(rng);
        }
        for glyph in self.glyphs.iter_mut().skip(1) {
            if rng.random::<f64>() < config.mutation_chance {
                *glyph = random_glyph(rng);
            }
        }

        if !self.has_exited(height) {
            return ColumnStep::Falling;
        }

        let delay = rng.random_range(0..=config.max_respawn_delay);
        if delay == 0 {
            self.spawn(height, config, rng);
            ColumnStep::Respawned
        } else {
            self.active = false;
            self.dormant_ticks = delay - 1;
            self.glyphs.clear();
            ColumnStep::Retired
        }
    }

    /// Paint the visible part of the trail into `buffer`.
    ///
    /// The head is bold white, the first third of the trail bold bright
    /// green and the remainder dim green.
    pub fn paint(&self, buffer: &mut Buffer) {
        if !self.active {
            return;
        }
        let height = buffer.height() as i64;
        let bright_len = self.trail_len / 3;
        for (i, ch) in self.glyphs.iter().enumerate() {
            let row = self.head() - i as i64;
            if row < 0 {
                break;
            }
            if row >= height {
                continue;
            }
            let cell = match i {
                0 => Cell::from_char(*ch)
                    .with_fg(PackedRgba::WHITE)
                    .with_flags(StyleFlags::BOLD),
                i if i < bright_len => Cell::from_char(*ch)
                    .with_fg(TRAIL_BRIGHT)
                    .with_flags(StyleFlags::BOLD),
                _ => Cell::from_char(*ch)
                    .with_fg(TRAIL_DIM)
                    .with_flags(StyleFlags::DIM),
            };
            buffer.set(self.x, row as u16, cell);
        }
    }
}
