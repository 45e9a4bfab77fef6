//! Rain glyph set.
//!
//! Digits, half-width katakana, Latin capitals and a few symbols. Every
//! glyph occupies exactly one terminal cell; full-width katakana would
//! shear the columns.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Characters a rain column draws from.
pub const RAIN_GLYPHS: &[char] = &[
    // Digits
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', // Half-width katakana
    'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ', 'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', 'ﾀ', 'ﾁ',
    'ﾂ', 'ﾃ', 'ﾄ', 'ﾅ', 'ﾆ', 'ﾇ', 'ﾈ', 'ﾉ', 'ﾊ', 'ﾋ', 'ﾌ', 'ﾍ', 'ﾎ', 'ﾏ', 'ﾐ', 'ﾑ', 'ﾒ',
    'ﾓ', 'ﾔ', 'ﾕ', 'ﾖ', 'ﾗ', 'ﾘ', 'ﾙ', 'ﾚ', 'ﾛ', 'ﾜ', 'ﾝ', // Latin capitals
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q',
    'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', // Symbols
    '@', '#', '$', '%', '&', '*', '+', '=', '<', '>', '?', '/',
];

/// Pick one rain glyph.
#[inline]
pub fn random_glyph<R: Rng + ?Sized>(rng: &mut R) -> char {
    RAIN_GLYPHS.choose(rng).copied().unwrap_or('0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use unicode_width::UnicodeWidthChar;

    #[test]
    fn every_glyph_is_single_width() {
        for &ch in RAIN_GLYPHS {
            assert_eq!(ch.width(), Some(1), "glyph {ch:?} is not one cell wide");
        }
    }

    #[test]
    fn random_glyph_comes_from_the_set() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(RAIN_GLYPHS.contains(&random_glyph(&mut rng)));
        }
    }
}
