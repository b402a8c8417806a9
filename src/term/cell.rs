//! The per-glyph cell model.

/// A terminal color: the default color, a 256-entry indexed palette color,
/// or a direct 24-bit RGB value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    /// Resolve an indexed color to its RGB value using the fixed ANSI
    /// palette (0–15), the 6×6×6 cube (16–231), and the grayscale ramp
    /// (232–255). `Default`/`Rgb` pass through unchanged.
    #[must_use]
    pub fn resolve_rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            Color::Default => None,
            Color::Rgb(r, g, b) => Some((r, g, b)),
            Color::Indexed(i) => Some(indexed_to_rgb(i)),
        }
    }
}

/// The 16 standard ANSI colors (0–7 normal, 8–15 bright).
const ANSI_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
);

/// The 6 coordinate stops of the 6×6×6 color cube (indices 16–231).
const CUBE_STOPS: [u8; 6] = [0, 95, 135, 175, 215, 255];

fn indexed_to_rgb(i: u8) -> (u8, u8, u8) {
    match i {
        0..=15 => ANSI_PALETTE[i as usize],
        16..=231 => {
            let n = i - 16;
            let r = CUBE_STOPS[(n / 36) as usize];
            let g = CUBE_STOPS[((n / 6) % 6) as usize];
            let b = CUBE_STOPS[(n % 6) as usize];
            (r, g, b)
        }
        232..=255 => {
            let level = 8 + (i - 232) * 10;
            (level, level, level)
        }
    }
}

/// SGR attribute bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attrs(u16);

impl Attrs {
    pub const BOLD: Attrs = Attrs(1 << 0);
    pub const DIM: Attrs = Attrs(1 << 1);
    pub const ITALIC: Attrs = Attrs(1 << 2);
    pub const UNDERLINE: Attrs = Attrs(1 << 3);
    pub const BLINK: Attrs = Attrs(1 << 4);
    pub const INVERSE: Attrs = Attrs(1 << 5);
    pub const INVISIBLE: Attrs = Attrs(1 << 6);
    pub const STRIKETHROUGH: Attrs = Attrs(1 << 7);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn contains(self, other: Attrs) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Attrs) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Attrs) {
        self.0 &= !other.0;
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Attrs {
    type Output = Attrs;
    fn bitor(self, rhs: Attrs) -> Attrs {
        Attrs(self.0 | rhs.0)
    }
}

/// Glyph display width: narrow (1 cell) or wide (2 cells, e.g. CJK).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Narrow,
    Wide,
}

impl Width {
    #[must_use]
    pub const fn cells(self) -> u16 {
        match self {
            Width::Narrow => 1,
            Width::Wide => 2,
        }
    }
}

/// A single glyph position in the grid.
///
/// `WideContinuation` cells hold no independent content; they exist purely
/// so indexing `[row][col]` always returns a cell, and must be replaced
/// atomically together with their lead cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attrs,
    pub width: Width,
    /// True for the trailing half of a wide glyph.
    pub continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Color::Default, Color::Default, Attrs::empty())
    }
}

impl Cell {
    #[must_use]
    pub const fn blank(fg: Color, bg: Color, attrs: Attrs) -> Self {
        Self { ch: ' ', fg, bg, attrs, width: Width::Narrow, continuation: false }
    }

    #[must_use]
    pub fn width_of(ch: char) -> Width {
        if unicode_width::UnicodeWidthChar::width(ch) == Some(2) {
            Width::Wide
        } else {
            Width::Narrow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_0_7_map_to_palette() {
        assert_eq!(indexed_to_rgb(1), (205, 0, 0));
    }

    #[test]
    fn cube_stops_match_spec() {
        // index 16 is the cube's (0,0,0) corner.
        assert_eq!(indexed_to_rgb(16), (0, 0, 0));
        // index 231 is the cube's (5,5,5) corner.
        assert_eq!(indexed_to_rgb(231), (255, 255, 255));
    }

    #[test]
    fn grayscale_ramp() {
        assert_eq!(indexed_to_rgb(232), (8, 8, 8));
        assert_eq!(indexed_to_rgb(255), (238, 238, 238));
    }

    #[test]
    fn wide_glyph_detected() {
        assert_eq!(Cell::width_of('A'), Width::Narrow);
        assert_eq!(Cell::width_of('\u{4E2D}'), Width::Wide); // 中
    }
}
