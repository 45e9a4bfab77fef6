#![forbid(unsafe_code)]

//! Cell and colour model.
//!
//! A [`Cell`] is one terminal position: a single `char`, a foreground and a
//! background colour, and a handful of SGR style flags. The rain stage only
//! draws single-width glyphs, so there is no grapheme pool and no
//! continuation-cell handling.

/// A compact RGBA color.
///
/// - **Layout:** `0xRRGGBBAA` (R in bits 31..24, A in bits 7..0).
/// - Alpha is only used as "set / not set": an alpha of zero means "leave the
///   terminal's default colour alone".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// Fully transparent (terminal default colour).
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Scale the RGB channels by `factor` (clamped to `0.0..=1.0`).
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let ch = |v: u8| ((v as f32) * f).round() as u8;
        Self::rgba(ch(self.r()), ch(self.g()), ch(self.b()), self.a())
    }
}

bitflags::bitflags! {
    /// 8-bit cell style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Bold / increased intensity.
        const BOLD          = 0b0000_0001;
        /// Dim / decreased intensity.
        const DIM           = 0b0000_0010;
        /// Italic text.
        const ITALIC        = 0b0000_0100;
        /// Underlined text.
        const UNDERLINE     = 0b0000_1000;
        /// Blinking text.
        const BLINK         = 0b0001_0000;
        /// Reverse video (swap fg/bg).
        const REVERSE       = 0b0010_0000;
    }
}

/// One terminal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Displayed character; `' '` for blank cells.
    pub ch: char,
    /// Foreground colour.
    pub fg: PackedRgba,
    /// Background colour.
    pub bg: PackedRgba,
    /// SGR style flags.
    pub flags: StyleFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Cell {
    /// A space with default colours.
    pub const BLANK: Self = Self {
        ch: ' ',
        fg: PackedRgba::TRANSPARENT,
        bg: PackedRgba::TRANSPARENT,
        flags: StyleFlags::empty(),
    };

    /// Create a cell holding `ch` with default colours.
    #[inline]
    pub const fn from_char(ch: char) -> Self {
        Self { ch, ..Self::BLANK }
    }

    /// Whether the cell is a default-coloured space.
    #[inline]
    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }

    /// Set the character.
    #[inline]
    #[must_use]
    pub const fn with_char(mut self, ch: char) -> Self {
        self.ch = ch;
        self
    }

    /// Set the foreground colour.
    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: PackedRgba) -> Self {
        self.fg = fg;
        self
    }

    /// Set the background colour.
    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, bg: PackedRgba) -> Self {
        self.bg = bg;
        self
    }

    /// Set the style flags.
    #[inline]
    #[must_use]
    pub const fn with_flags(mut self, flags: StyleFlags) -> Self {
        self.flags = flags;
        self
    }
}
