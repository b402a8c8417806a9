//! Terminal emulator state: cells, grid, cursor/modes, and the emulator
//! that drives them from parsed VT actions.

pub mod cell;
pub mod cursor;
pub mod emulator;
pub mod grid;

pub use cell::{Attrs, Cell, Color, Width};
pub use cursor::{Charset, Charsets, Cursor, CursorStyle, Modes, MouseTracking, SavedCursor};
pub use emulator::Emulator;
pub use grid::{Grid, Scrollback};
