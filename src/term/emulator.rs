//! The terminal emulator: consumes [`crate::vt::Action`]s and mutates grid,
//! cursor, and mode state accordingly.

use crate::vt::{Action, CsiParams};

use super::cell::{Attrs, Cell, Color, Width};
use super::cursor::{Charsets, Cursor, CursorStyle, Modes, MouseTracking, SavedCursor};
use super::grid::{Grid, Scrollback};

const DEFAULT_SCROLLBACK: usize = 10_000;

/// A single pane's full terminal state: two grids (primary/alternate),
/// cursor, modes, charsets, and the scrollback ring backing the primary
/// screen.
pub struct Emulator {
    primary: Grid,
    alternate: Grid,
    scrollback: Scrollback,
    cursor: Cursor,
    saved: SavedCursor,
    alt_saved: SavedCursor,
    modes: Modes,
    charsets: Charsets,
    fg: Color,
    bg: Color,
    attrs: Attrs,
    scroll_top: usize,
    scroll_bottom: usize,
    dirty: Vec<bool>,
    title: String,
    pending_wrap: bool,
}

impl Emulator {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            primary: Grid::new(rows, cols),
            alternate: Grid::new(rows, cols),
            scrollback: Scrollback::new(DEFAULT_SCROLLBACK),
            cursor: Cursor::default(),
            saved: SavedCursor::default(),
            alt_saved: SavedCursor::default(),
            modes: Modes::default(),
            charsets: Charsets::default(),
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attrs::empty(),
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            dirty: vec![true; rows],
            title: String::new(),
            pending_wrap: false,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        if self.modes.alternate_screen {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn grid_mut(&mut self) -> &mut Grid {
        if self.modes.alternate_screen {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub const fn modes(&self) -> &Modes {
        &self.modes
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    /// Rows touched since the last call; clears the dirty set.
    pub fn take_dirty_rows(&mut self) -> Vec<usize> {
        let rows: Vec<usize> = self
            .dirty
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| d.then_some(i))
            .collect();
        self.dirty.iter_mut().for_each(|d| *d = false);
        rows
    }

    fn mark_dirty(&mut self, row: usize) {
        if row < self.dirty.len() {
            self.dirty[row] = true;
        }
    }

    fn mark_all_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|d| *d = true);
    }

    /// Feed a single parser action into the emulator.
    pub fn apply(&mut self, action: Action<'_>) {
        match action {
            Action::Print(ch) => self.print(ch),
            Action::Execute(byte) => self.execute(byte),
            Action::CsiDispatch { params, final_byte, private_marker, .. } => {
                self.csi_dispatch(&params, final_byte, private_marker);
            }
            Action::EscDispatch { final_byte, .. } => self.esc_dispatch(final_byte),
            Action::OscDispatch { command, payload } => self.osc_dispatch(command, payload),
            Action::DcsHook { .. } | Action::DcsPut(_) | Action::DcsUnhook => {
                // DCS passthrough (e.g. Sixel, termcap queries) is outside
                // the emulated feature set; swallow silently.
            }
        }
    }

    fn print(&mut self, ch: char) {
        let ch = self.charsets.translate(ch);
        let width = Cell::width_of(ch);
        let width_cells = usize::from(width.cells());
        let cols = self.grid().cols();

        if self.pending_wrap {
            self.pending_wrap = false;
            self.line_feed_cursor_only();
            self.cursor.col = 0;
        } else if self.cursor.col + width_cells > cols {
            if self.modes.autowrap {
                self.line_feed_cursor_only();
                self.cursor.col = 0;
            } else {
                self.cursor.col = cols.saturating_sub(width_cells);
            }
        }

        let row = self.cursor.row;
        let col = self.cursor.col;
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        {
            let grid = self.grid_mut();
            *grid.cell_mut(row, col) = Cell { ch, fg, bg, attrs, width, continuation: false };
            if width == Width::Wide && col + 1 < grid.cols() {
                *grid.cell_mut(row, col + 1) = Cell { ch: ' ', fg, bg, attrs, width: Width::Wide, continuation: true };
            }
        }
        self.mark_dirty(row);

        self.cursor.col += width_cells;
        if self.cursor.col >= cols {
            self.cursor.col = cols - 1;
            self.pending_wrap = self.modes.autowrap;
        } else {
            self.pending_wrap = false;
        }
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x07 => {} // BEL: bell is a session-level concern, not emulator state.
            0x08 => self.cursor.col = self.cursor.col.saturating_sub(1),
            0x09 => {
                let cols = self.grid().cols();
                let next_stop = ((self.cursor.col / 8) + 1) * 8;
                self.cursor.col = next_stop.min(cols.saturating_sub(1));
            }
            0x0A | 0x0B | 0x0C => self.line_feed(),
            0x0D => self.cursor.col = 0,
            0x0E => self.charsets.gl = 1,
            0x0F => self.charsets.gl = 0,
            _ => {}
        }
    }

    fn line_feed_cursor_only(&mut self) {
        if self.cursor.row == self.scroll_bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.grid().rows() {
            self.cursor.row += 1;
        }
    }

    fn line_feed(&mut self) {
        self.line_feed_cursor_only();
    }

    fn scroll_up(&mut self, n: usize) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        let in_alt = self.modes.alternate_screen;
        let evicted = self.grid_mut().scroll_up_region(top, bottom, n, fg, bg, attrs);
        if !in_alt && top == 0 {
            for row in evicted {
                self.scrollback.push(row);
            }
        }
        self.mark_all_dirty();
    }

    fn scroll_down(&mut self, n: usize) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        self.grid_mut().scroll_down_region(top, bottom, n, fg, bg, attrs);
        self.mark_all_dirty();
    }

    fn csi_dispatch(&mut self, params: &CsiParams, final_byte: u8, private_marker: Option<u8>) {
        if private_marker == Some(b'?') && matches!(final_byte, b'h' | b'l') {
            self.dec_private_mode(params, final_byte == b'h');
            return;
        }
        match final_byte {
            b'@' => self.insert_chars(params.get(0, 1) as usize),
            b'A' => self.move_cursor_row(-(i64::from(params.get(0, 1)))),
            b'B' => self.move_cursor_row(i64::from(params.get(0, 1))),
            b'C' => self.move_cursor_col(i64::from(params.get(0, 1))),
            b'D' => self.move_cursor_col(-(i64::from(params.get(0, 1)))),
            b'E' => {
                self.move_cursor_row(i64::from(params.get(0, 1)));
                self.cursor.col = 0;
            }
            b'F' => {
                self.move_cursor_row(-(i64::from(params.get(0, 1))));
                self.cursor.col = 0;
            }
            b'G' => self.cursor.col = (params.get(0, 1) as usize).saturating_sub(1),
            b'H' | b'f' => self.cursor_position(params),
            b'J' => self.erase_in_display(params.get(0, 0)),
            b'K' => self.erase_in_line(params.get(0, 0)),
            b'L' => self.insert_lines(params.get(0, 1) as usize),
            b'M' => self.delete_lines(params.get(0, 1) as usize),
            b'P' => self.delete_chars(params.get(0, 1) as usize),
            b'S' => self.scroll_up(params.get(0, 1) as usize),
            b'T' => self.scroll_down(params.get(0, 1) as usize),
            b'X' => self.erase_chars(params.get(0, 1) as usize),
            b'd' => self.cursor.row = (params.get(0, 1) as usize - 1).min(self.grid().rows() - 1),
            b'h' | b'l' => {} // ANSI (non-DEC) mode sets we don't model are no-ops.
            b'm' => self.sgr(params),
            b'r' => self.set_scroll_region(params),
            b's' => self.saved = self.snapshot_cursor(),
            b'u' => self.restore_cursor(self.saved),
            _ => {}
        }
        self.pending_wrap = false;
    }

    fn move_cursor_row(&mut self, delta: i64) {
        let rows = self.grid().rows() as i64;
        let new_row = (self.cursor.row as i64 + delta).clamp(0, rows - 1);
        self.cursor.row = new_row as usize;
    }

    fn move_cursor_col(&mut self, delta: i64) {
        let cols = self.grid().cols() as i64;
        let new_col = (self.cursor.col as i64 + delta).clamp(0, cols - 1);
        self.cursor.col = new_col as usize;
    }

    fn cursor_position(&mut self, params: &CsiParams) {
        let rows = self.grid().rows();
        let cols = self.grid().cols();
        let (row_base, col_base) = if self.modes.origin {
            (self.scroll_top, 0)
        } else {
            (0, 0)
        };
        let row = row_base + (params.get(0, 1) as usize).saturating_sub(1);
        let col = col_base + (params.get(1, 1) as usize).saturating_sub(1);
        self.cursor.row = row.min(rows - 1);
        self.cursor.col = col.min(cols - 1);
    }

    fn erase_in_display(&mut self, mode: u16) {
        let (rows, cols) = (self.grid().rows(), self.grid().cols());
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        let (row, col) = (self.cursor.row, self.cursor.col);
        let grid = self.grid_mut();
        match mode {
            0 => {
                grid.row_mut(row)[col..].fill(Cell::blank(fg, bg, attrs));
                for r in (row + 1)..rows {
                    grid.clear_row(r, fg, bg, attrs);
                }
            }
            1 => {
                grid.row_mut(row)[..=col.min(cols - 1)].fill(Cell::blank(fg, bg, attrs));
                for r in 0..row {
                    grid.clear_row(r, fg, bg, attrs);
                }
            }
            2 | 3 => grid.clear_all(fg, bg, attrs),
            _ => {}
        }
        self.mark_all_dirty();
    }

    fn erase_in_line(&mut self, mode: u16) {
        let cols = self.grid().cols();
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        let (row, col) = (self.cursor.row, self.cursor.col);
        let grid = self.grid_mut();
        match mode {
            0 => grid.row_mut(row)[col..].fill(Cell::blank(fg, bg, attrs)),
            1 => grid.row_mut(row)[..=col.min(cols - 1)].fill(Cell::blank(fg, bg, attrs)),
            2 => grid.clear_row(row, fg, bg, attrs),
            _ => {}
        }
        self.mark_dirty(row);
    }

    fn insert_lines(&mut self, n: usize) {
        if self.cursor.row < self.scroll_top || self.cursor.row > self.scroll_bottom {
            return;
        }
        let (top, bottom) = (self.cursor.row, self.scroll_bottom);
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        self.grid_mut().scroll_down_region(top, bottom, n, fg, bg, attrs);
        self.mark_all_dirty();
    }

    fn delete_lines(&mut self, n: usize) {
        if self.cursor.row < self.scroll_top || self.cursor.row > self.scroll_bottom {
            return;
        }
        let (top, bottom) = (self.cursor.row, self.scroll_bottom);
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        self.grid_mut().scroll_up_region(top, bottom, n, fg, bg, attrs);
        self.mark_all_dirty();
    }

    fn insert_chars(&mut self, n: usize) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        let cols = self.grid().cols();
        let grid = self.grid_mut();
        let line = grid.row_mut(row);
        let n = n.min(cols - col);
        line.copy_within(col..cols - n, col + n);
        line[col..col + n].fill(Cell::blank(fg, bg, attrs));
        self.mark_dirty(row);
    }

    fn delete_chars(&mut self, n: usize) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        let cols = self.grid().cols();
        let grid = self.grid_mut();
        let line = grid.row_mut(row);
        let n = n.min(cols - col);
        line.copy_within(col + n..cols, col);
        line[cols - n..cols].fill(Cell::blank(fg, bg, attrs));
        self.mark_dirty(row);
    }

    fn erase_chars(&mut self, n: usize) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        let (fg, bg, attrs) = (self.fg, self.bg, self.attrs);
        let cols = self.grid().cols();
        let end = (col + n).min(cols);
        self.grid_mut().row_mut(row)[col..end].fill(Cell::blank(fg, bg, attrs));
        self.mark_dirty(row);
    }

    fn set_scroll_region(&mut self, params: &CsiParams) {
        let rows = self.grid().rows();
        let top = (params.get(0, 1) as usize).saturating_sub(1);
        let bottom = if params.len() >= 2 {
            (params.get(1, rows as u16) as usize).saturating_sub(1)
        } else {
            rows - 1
        };
        if top < bottom && bottom < rows {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
        } else {
            self.scroll_top = 0;
            self.scroll_bottom = rows - 1;
        }
        self.cursor.row = self.scroll_top;
        self.cursor.col = 0;
    }

    fn sgr(&mut self, params: &CsiParams) {
        if params.is_empty() {
            self.attrs = Attrs::empty();
            self.fg = Color::Default;
            self.bg = Color::Default;
            return;
        }
        let values: Vec<u16> = params.iter().collect();
        let mut i = 0;
        while i < values.len() {
            match values[i] {
                0 => {
                    self.attrs = Attrs::empty();
                    self.fg = Color::Default;
                    self.bg = Color::Default;
                }
                1 => self.attrs.insert(Attrs::BOLD),
                2 => self.attrs.insert(Attrs::DIM),
                3 => self.attrs.insert(Attrs::ITALIC),
                4 => self.attrs.insert(Attrs::UNDERLINE),
                5 => self.attrs.insert(Attrs::BLINK),
                7 => self.attrs.insert(Attrs::INVERSE),
                8 => self.attrs.insert(Attrs::INVISIBLE),
                9 => self.attrs.insert(Attrs::STRIKETHROUGH),
                22 => self.attrs.remove(Attrs::BOLD | Attrs::DIM),
                23 => self.attrs.remove(Attrs::ITALIC),
                24 => self.attrs.remove(Attrs::UNDERLINE),
                25 => self.attrs.remove(Attrs::BLINK),
                27 => self.attrs.remove(Attrs::INVERSE),
                28 => self.attrs.remove(Attrs::INVISIBLE),
                29 => self.attrs.remove(Attrs::STRIKETHROUGH),
                30..=37 => self.fg = Color::Indexed((values[i] - 30) as u8),
                38 => {
                    let (color, consumed) = Self::parse_extended_color(&values[i + 1..]);
                    if let Some(c) = color {
                        self.fg = c;
                    }
                    i += consumed;
                }
                39 => self.fg = Color::Default,
                40..=47 => self.bg = Color::Indexed((values[i] - 40) as u8),
                48 => {
                    let (color, consumed) = Self::parse_extended_color(&values[i + 1..]);
                    if let Some(c) = color {
                        self.bg = c;
                    }
                    i += consumed;
                }
                49 => self.bg = Color::Default,
                90..=97 => self.fg = Color::Indexed((values[i] - 90 + 8) as u8),
                100..=107 => self.bg = Color::Indexed((values[i] - 100 + 8) as u8),
                _ => {}
            }
            i += 1;
        }
    }

    /// Parse the tail of a `38;...`/`48;...` extended color sequence.
    /// Returns the resolved color (if any) and how many extra values were
    /// consumed beyond the `38`/`48` selector itself.
    fn parse_extended_color(rest: &[u16]) -> (Option<Color>, usize) {
        match rest.first() {
            Some(5) if rest.len() >= 2 => (Some(Color::Indexed(rest[1] as u8)), 2),
            Some(2) if rest.len() >= 4 => {
                (Some(Color::Rgb(rest[1] as u8, rest[2] as u8, rest[3] as u8)), 4)
            }
            _ => (None, rest.len()),
        }
    }

    fn dec_private_mode(&mut self, params: &CsiParams, set: bool) {
        for mode in params.iter() {
            match mode {
                1 => self.modes.application_cursor_keys = set,
                3 => {} // DECCOLM (80/132 col switch): geometry is owned by the session layer.
                6 => {
                    self.modes.origin = set;
                    self.cursor.row = self.scroll_top;
                    self.cursor.col = 0;
                }
                7 => self.modes.autowrap = set,
                12 => {}
                25 => {
                    self.modes.cursor_visible = set;
                    self.cursor.visible = set;
                }
                1000 => self.modes.mouse_tracking = if set { MouseTracking::Normal } else { MouseTracking::None },
                1002 => self.modes.mouse_tracking = if set { MouseTracking::Button } else { MouseTracking::None },
                1003 => self.modes.mouse_tracking = if set { MouseTracking::Any } else { MouseTracking::None },
                1004 => self.modes.focus_events = set,
                1049 => self.switch_alt_screen(set),
                2004 => self.modes.bracketed_paste = set,
                _ => {}
            }
        }
    }

    fn switch_alt_screen(&mut self, enter: bool) {
        if enter == self.modes.alternate_screen {
            return;
        }
        if enter {
            self.alt_saved = self.snapshot_cursor();
            self.alternate.clear_all(Color::Default, Color::Default, Attrs::empty());
            self.modes.alternate_screen = true;
        } else {
            self.modes.alternate_screen = false;
            self.restore_cursor(self.alt_saved);
        }
        self.mark_all_dirty();
    }

    fn snapshot_cursor(&self) -> SavedCursor {
        SavedCursor {
            cursor: self.cursor,
            attrs: self.attrs,
            fg: self.fg,
            bg: self.bg,
            origin_mode: self.modes.origin,
            autowrap: self.modes.autowrap,
        }
    }

    fn restore_cursor(&mut self, saved: SavedCursor) {
        self.cursor = saved.cursor;
        self.attrs = saved.attrs;
        self.fg = saved.fg;
        self.bg = saved.bg;
        self.modes.origin = saved.origin_mode;
        self.modes.autowrap = saved.autowrap;
        self.cursor.clamp(self.grid().rows(), self.grid().cols());
    }

    fn esc_dispatch(&mut self, final_byte: u8) {
        match final_byte {
            b'7' => self.saved = self.snapshot_cursor(),
            b'8' => self.restore_cursor(self.saved),
            b'D' => self.line_feed(),
            b'E' => {
                self.line_feed();
                self.cursor.col = 0;
            }
            b'M' => {
                if self.cursor.row == self.scroll_top {
                    self.scroll_down(1);
                } else if self.cursor.row > 0 {
                    self.cursor.row -= 1;
                }
            }
            b'c' => self.reset(),
            _ => {}
        }
    }

    fn osc_dispatch(&mut self, command: i64, payload: &[u8]) {
        match command {
            0 | 1 | 2 => {
                self.title = String::from_utf8_lossy(payload).into_owned();
            }
            _ => {}
        }
    }

    /// Full power-on reset (`ESC c` / RIS): clears both grids, scrollback
    /// retained, all modes and attributes return to their defaults.
    pub fn reset(&mut self) {
        let (rows, cols) = (self.primary.rows(), self.primary.cols());
        self.primary = Grid::new(rows, cols);
        self.alternate = Grid::new(rows, cols);
        self.cursor = Cursor::default();
        self.saved = SavedCursor::default();
        self.alt_saved = SavedCursor::default();
        self.modes = Modes::default();
        self.charsets = Charsets::default();
        self.fg = Color::Default;
        self.bg = Color::Default;
        self.attrs = Attrs::empty();
        self.scroll_top = 0;
        self.scroll_bottom = rows.saturating_sub(1);
        self.pending_wrap = false;
        self.mark_all_dirty();
    }

    /// Resize both grids, preserving the top-left intersection and
    /// clamping the scroll region and cursor to the new bounds.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.primary.resize(rows, cols);
        self.alternate.resize(rows, cols);
        self.scroll_top = self.scroll_top.min(rows.saturating_sub(1));
        self.scroll_bottom = rows.saturating_sub(1);
        self.cursor.clamp(rows, cols);
        self.dirty = vec![true; rows];
        self.pending_wrap = false;
    }

    #[must_use]
    pub const fn cursor_style(&self) -> CursorStyle {
        self.cursor.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_str(emu: &mut Emulator, parser: &mut crate::vt::Parser, s: &str) {
        for &b in s.as_bytes() {
            if let Some(action) = parser.feed(b) {
                emu.apply(action);
            }
        }
    }

    #[test]
    fn prints_and_advances_cursor() {
        let mut emu = Emulator::new(5, 10);
        let mut p = crate::vt::Parser::new();
        feed_str(&mut emu, &mut p, "hi");
        assert_eq!(emu.grid().cell(0, 0).ch, 'h');
        assert_eq!(emu.grid().cell(0, 1).ch, 'i');
        assert_eq!(emu.cursor().col, 2);
    }

    #[test]
    fn cup_moves_cursor() {
        let mut emu = Emulator::new(24, 80);
        let mut p = crate::vt::Parser::new();
        feed_str(&mut emu, &mut p, "\x1b[10;5H");
        assert_eq!((emu.cursor().row, emu.cursor().col), (9, 4));
    }

    #[test]
    fn sgr_reset_clears_attrs_and_colors() {
        let mut emu = Emulator::new(5, 10);
        let mut p = crate::vt::Parser::new();
        feed_str(&mut emu, &mut p, "\x1b[1;31;44mX\x1b[0mY");
        assert_eq!(emu.grid().cell(0, 0).fg, Color::Indexed(1));
        assert_eq!(emu.grid().cell(0, 1).fg, Color::Default);
        assert_eq!(emu.grid().cell(0, 1).attrs, Attrs::empty());
    }

    #[test]
    fn line_feed_at_bottom_scrolls_into_scrollback() {
        let mut emu = Emulator::new(2, 4);
        let mut p = crate::vt::Parser::new();
        feed_str(&mut emu, &mut p, "AAAA\r\nBBBB\r\nCCCC");
        assert_eq!(emu.scrollback().len(), 1);
        assert!(emu.grid().row(0).iter().all(|c| c.ch == 'B'));
        assert!(emu.grid().row(1).iter().all(|c| c.ch == 'C'));
    }

    #[test]
    fn dec_private_mode_toggles_cursor_visibility() {
        let mut emu = Emulator::new(5, 5);
        let mut p = crate::vt::Parser::new();
        feed_str(&mut emu, &mut p, "\x1b[?25l");
        assert!(!emu.modes().cursor_visible);
        feed_str(&mut emu, &mut p, "\x1b[?25h");
        assert!(emu.modes().cursor_visible);
    }

    #[test]
    fn alt_screen_round_trip_restores_primary_content() {
        let mut emu = Emulator::new(5, 5);
        let mut p = crate::vt::Parser::new();
        feed_str(&mut emu, &mut p, "hello");
        feed_str(&mut emu, &mut p, "\x1b[?1049h");
        assert!(emu.modes().alternate_screen);
        feed_str(&mut emu, &mut p, "\x1b[?1049l");
        assert!(!emu.modes().alternate_screen);
        assert_eq!(emu.grid().cell(0, 0).ch, 'h');
    }

    #[test]
    fn ris_resets_modes_and_clears_grid() {
        let mut emu = Emulator::new(5, 5);
        let mut p = crate::vt::Parser::new();
        feed_str(&mut emu, &mut p, "\x1b[?25lhi\x1bc");
        assert_eq!(emu.grid().cell(0, 0).ch, ' ');
        assert!(emu.modes().cursor_visible);
    }
}
