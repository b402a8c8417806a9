//! Cursor, saved-cursor slots, modes, and charset state.

use super::cell::{Attrs, Color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Block,
    Underline,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
    pub visible: bool,
    pub style: CursorStyle,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { row: 0, col: 0, visible: true, style: CursorStyle::Block }
    }
}

impl Cursor {
    pub fn clamp(&mut self, rows: usize, cols: usize) {
        self.row = self.row.min(rows.saturating_sub(1));
        self.col = self.col.min(cols.saturating_sub(1));
    }
}

/// Everything `ESC 7` / DECSC snapshots, restored by `ESC 8` / DECRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedCursor {
    pub cursor: Cursor,
    pub attrs: Attrs,
    pub fg: Color,
    pub bg: Color,
    pub origin_mode: bool,
    pub autowrap: bool,
}

impl Default for SavedCursor {
    fn default() -> Self {
        Self {
            cursor: Cursor::default(),
            attrs: Attrs::empty(),
            fg: Color::Default,
            bg: Color::Default,
            origin_mode: false,
            autowrap: true,
        }
    }
}

/// DECSET/DECRST mouse-tracking protocol selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseTracking {
    #[default]
    None,
    X10,
    Normal,
    Button,
    Any,
}

/// Boolean mode flags tracked per pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modes {
    pub application_cursor_keys: bool,
    pub application_keypad: bool,
    pub origin: bool,
    pub autowrap: bool,
    pub cursor_visible: bool,
    pub alternate_screen: bool,
    pub bracketed_paste: bool,
    pub focus_events: bool,
    pub mouse_tracking: MouseTracking,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            application_cursor_keys: false,
            application_keypad: false,
            origin: false,
            autowrap: true,
            cursor_visible: true,
            alternate_screen: false,
            bracketed_paste: false,
            focus_events: false,
            mouse_tracking: MouseTracking::None,
        }
    }
}

/// One of the four G0–G3 charset designation slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Ascii,
    DecSpecialGraphics,
    Uk,
}

/// G0–G3 designations plus the GL/GR selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charsets {
    pub g: [Charset; 4],
    pub gl: usize,
    pub gr: usize,
}

impl Default for Charsets {
    fn default() -> Self {
        Self { g: [Charset::Ascii; 4], gl: 0, gr: 1 }
    }
}

impl Charsets {
    #[must_use]
    pub fn active(&self) -> Charset {
        self.g[self.gl]
    }

    /// Translate a printable byte through the active GL charset. Only the
    /// DEC Special Graphics range (0x60..=0x7E) differs from ASCII.
    #[must_use]
    pub fn translate(&self, ch: char) -> char {
        if self.active() != Charset::DecSpecialGraphics {
            return ch;
        }
        match ch {
            'j' => '\u{2518}', // ┘
            'k' => '\u{2510}', // ┐
            'l' => '\u{250C}', // ┌
            'm' => '\u{2514}', // └
            'n' => '\u{253C}', // ┼
            'q' => '\u{2500}', // ─
            't' => '\u{251C}', // ├
            'u' => '\u{2524}', // ┤
            'v' => '\u{2534}', // ┴
            'w' => '\u{252C}', // ┬
            'x' => '\u{2502}', // │
            '`' => '\u{25C6}', // ◆
            'a' => '\u{2592}', // ▒
            _ => ch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_clamps_to_bounds() {
        let mut c = Cursor { row: 10, col: 10, ..Cursor::default() };
        c.clamp(5, 5);
        assert_eq!((c.row, c.col), (4, 4));
    }

    #[test]
    fn dec_special_graphics_translates_box_drawing() {
        let mut cs = Charsets::default();
        cs.g[0] = Charset::DecSpecialGraphics;
        assert_eq!(cs.translate('q'), '\u{2500}');
        assert_eq!(cs.translate('A'), 'A');
    }
}
