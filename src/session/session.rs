//! A session: an ordered set of windows with a client-visible geometry.

use super::ids::{Arena, WindowId};
use super::rect::Rect;
use super::window::Window;

pub struct Session {
    name: String,
    rect: Rect,
    scrollback: usize,
    windows: Arena<Window>,
    order: Vec<WindowId>,
    active: usize,
    last: usize,
}

impl Session {
    #[must_use]
    pub fn new(name: String, rect: Rect, scrollback: usize) -> Self {
        let mut windows = Arena::new();
        let id: WindowId = windows.insert(Window::new(rect));
        Self { name, rect, scrollback, windows, order: vec![id], active: 0, last: 0 }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: String) {
        self.name = name;
    }

    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    #[must_use]
    pub const fn scrollback_capacity(&self) -> usize {
        self.scrollback
    }

    #[must_use]
    pub fn window_count(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn active_window_id(&self) -> WindowId {
        self.order[self.active]
    }

    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(id)
    }

    #[must_use]
    pub fn active_window(&self) -> &Window {
        self.windows.get(self.active_window_id()).expect("active window id always valid")
    }

    pub fn active_window_mut(&mut self) -> &mut Window {
        let id = self.active_window_id();
        self.windows.get_mut(id).expect("active window id always valid")
    }

    #[must_use]
    pub fn windows(&self) -> impl Iterator<Item = (WindowId, &Window)> {
        self.order.iter().copied().filter_map(move |id| self.windows.get(id).map(|w| (id, w)))
    }

    pub fn new_window(&mut self) -> WindowId {
        let id: WindowId = self.windows.insert(Window::new(self.rect));
        self.order.push(id);
        id
    }

    /// Select by index; fails silently on out-of-range.
    pub fn select_window(&mut self, idx: usize) {
        if idx < self.order.len() {
            self.last = self.active;
            self.active = idx;
        }
    }

    pub fn next_window(&mut self) {
        if !self.order.is_empty() {
            self.last = self.active;
            self.active = (self.active + 1) % self.order.len();
        }
    }

    pub fn prev_window(&mut self) {
        if !self.order.is_empty() {
            self.last = self.active;
            self.active = (self.active + self.order.len() - 1) % self.order.len();
        }
    }

    pub fn last_window(&mut self) {
        std::mem::swap(&mut self.active, &mut self.last);
    }

    /// Refuses to remove the only window; reassigns indices contiguously.
    pub fn remove_window(&mut self, idx: usize) {
        if self.order.len() <= 1 || idx >= self.order.len() {
            return;
        }
        let id = self.order.remove(idx);
        if let Some(window) = self.windows.get(id) {
            for (_, pane) in window.panes() {
                pane.close();
            }
        }
        self.windows.remove(id);
        if self.active >= self.order.len() {
            self.active = self.order.len() - 1;
        }
        if self.last >= self.order.len() {
            self.last = self.order.len() - 1;
        }
    }

    /// Cascades a new geometry down to every window.
    pub fn resize(&mut self, rect: Rect) {
        self.rect = rect;
        for id in self.order.clone() {
            if let Some(window) = self.windows.get_mut(id) {
                window.resize(rect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_prev_and_last_window_cycle() {
        let mut session = Session::new("main".to_string(), Rect::new(0, 0, 80, 24), 1000);
        let w1 = session.new_window();
        assert_eq!(session.window_count(), 2);
        session.select_window(1);
        assert_eq!(session.active_window_id(), w1);
        session.last_window();
        assert_eq!(session.active_window_id(), session.order[0]);
        session.last_window();
        assert_eq!(session.active_window_id(), w1);
    }

    #[test]
    fn remove_window_refuses_the_last_one() {
        let mut session = Session::new("main".to_string(), Rect::new(0, 0, 80, 24), 1000);
        session.remove_window(0);
        assert_eq!(session.window_count(), 1);
    }
}
