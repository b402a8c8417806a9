//! A pane: one PTY plus its parser and emulator.

use crate::pty::Pty;
use crate::term::Emulator;
use crate::vt::Parser;

use super::rect::Rect;

/// One PTY and the terminal state it drives.
pub struct Pane {
    pty: Option<Pty>,
    parser: Parser,
    emulator: Emulator,
    rect: Rect,
    zoomed: bool,
}

impl Pane {
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            pty: None,
            parser: Parser::new(),
            emulator: Emulator::new(usize::from(rect.height), usize::from(rect.width)),
            rect,
            zoomed: false,
        }
    }

    pub fn attach_pty(&mut self, pty: Pty) {
        self.pty = Some(pty);
    }

    #[must_use]
    pub fn pty(&self) -> Option<&Pty> {
        self.pty.as_ref()
    }

    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    #[must_use]
    pub const fn zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn set_zoomed(&mut self, zoomed: bool) {
        self.zoomed = zoomed;
    }

    #[must_use]
    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }

    /// Feed raw PTY output bytes through the parser into the emulator.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(action) = self.parser.feed(byte) {
                self.emulator.apply(action);
            }
        }
    }

    /// Resize the rect, the emulator grid, and (if spawned) the PTY.
    pub fn resize(&mut self, rect: Rect) {
        self.rect = rect;
        self.emulator.resize(usize::from(rect.height), usize::from(rect.width));
        if let Some(pty) = &self.pty {
            let _ = pty.set_size(rect.height, rect.width);
        }
    }

    /// True once the pane's child process has exited.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.pty.as_ref().is_some_and(Pty::is_alive)
    }

    pub fn close(&self) {
        if let Some(pty) = &self.pty {
            pty.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspawned_pane_reports_dead() {
        let pane = Pane::new(Rect::new(0, 0, 80, 24));
        assert!(!pane.is_alive());
    }

    #[test]
    fn feed_writes_into_emulator_grid() {
        let mut pane = Pane::new(Rect::new(0, 0, 10, 3));
        pane.feed(b"hi");
        assert_eq!(pane.emulator().grid().cell(0, 0).ch, 'h');
    }
}
