//! A window: a tiling of panes within one rect.

use crate::error::{MuxError, Result};

use super::ids::{Arena, PaneId};
use super::pane::Pane;
use super::rect::Rect;

/// The current tiling arrangement. Only a single split level is modeled;
/// nested splits are out of scope. A `Tiled` variant for more than two
/// panes is intentionally not included here: `split` never produces more
/// than two panes, so there is nothing for it to describe yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Single,
    HorizontalSplit,
    VerticalSplit,
}

/// Split direction requested by `Window::split`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

pub struct Window {
    name: Option<String>,
    rect: Rect,
    layout: Layout,
    panes: Arena<Pane>,
    order: Vec<PaneId>,
    active: usize,
}

impl Window {
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        let mut panes = Arena::new();
        let id: PaneId = panes.insert(Pane::new(rect));
        Self { name: None, rect, layout: Layout::Single, panes, order: vec![id], active: 0 }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn rename(&mut self, name: String) {
        self.name = Some(name);
    }

    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    #[must_use]
    pub fn active_pane_id(&self) -> PaneId {
        self.order[self.active]
    }

    #[must_use]
    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.get(id)
    }

    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.get_mut(id)
    }

    #[must_use]
    pub fn active_pane(&self) -> &Pane {
        self.panes.get(self.active_pane_id()).expect("active pane id always valid")
    }

    pub fn active_pane_mut(&mut self) -> &mut Pane {
        let id = self.active_pane_id();
        self.panes.get_mut(id).expect("active pane id always valid")
    }

    #[must_use]
    pub fn panes(&self) -> impl Iterator<Item = (PaneId, &Pane)> {
        self.order.iter().copied().filter_map(move |id| self.panes.get(id).map(|p| (id, p)))
    }

    #[must_use]
    pub fn pane_count(&self) -> usize {
        self.order.len()
    }

    /// Halve the active pane's rect along `direction` and give the new
    /// half to a freshly created (unspawned) pane.
    pub fn split(&mut self, direction: SplitDirection) -> Result<PaneId> {
        if self.order.len() > 1 {
            return Err(MuxError::InvalidGeometry(
                "this revision supports only a single split level".to_string(),
            ));
        }
        let active_id = self.active_pane_id();
        let active_rect = self.panes.get(active_id).expect("active pane id always valid").rect();

        let (first_rect, second_rect) = match direction {
            SplitDirection::Horizontal => active_rect.split_horizontal(0.5)?,
            SplitDirection::Vertical => active_rect.split_vertical(0.5)?,
        };

        self.panes.get_mut(active_id).expect("active pane id always valid").resize(first_rect);
        let new_id: PaneId = self.panes.insert(Pane::new(second_rect));
        self.order.push(new_id);

        self.layout = match direction {
            SplitDirection::Horizontal => Layout::HorizontalSplit,
            SplitDirection::Vertical => Layout::VerticalSplit,
        };
        Ok(new_id)
    }

    pub fn focus_next(&mut self) {
        if !self.order.is_empty() {
            self.active = (self.active + 1) % self.order.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.order.is_empty() {
            self.active = (self.active + self.order.len() - 1) % self.order.len();
        }
    }

    pub fn focus_pane(&mut self, id: PaneId) {
        if let Some(idx) = self.order.iter().position(|&p| p == id) {
            self.active = idx;
        }
    }

    /// Destroy a pane (killing its PTY child). Sibling rects are left
    /// unchanged: this revision performs no auto-relayout on removal.
    pub fn remove_pane(&mut self, id: PaneId) -> Result<()> {
        if self.order.len() == 1 {
            return Err(MuxError::InvalidGeometry("cannot remove a window's only pane".to_string()));
        }
        let removed_idx = self
            .order
            .iter()
            .position(|&p| p == id)
            .ok_or(MuxError::NotFound { kind: "pane", id: 0 })?;
        if let Some(pane) = self.panes.remove(id) {
            pane.close();
        }
        self.order.remove(removed_idx);
        if self.order.len() == 1 {
            self.layout = Layout::Single;
        }
        if removed_idx == self.active {
            self.active = removed_idx.saturating_sub(1).min(self.order.len() - 1);
        } else if removed_idx < self.active {
            self.active -= 1;
        }
        Ok(())
    }

    /// Recompute child rects proportionally within the current layout and
    /// cascade into each pane's emulator/PTY resize.
    pub fn resize(&mut self, rect: Rect) {
        self.rect = rect;
        match self.layout {
            Layout::Single => {
                if let Some(id) = self.order.first().copied() {
                    if let Some(pane) = self.panes.get_mut(id) {
                        pane.resize(rect);
                    }
                }
            }
            Layout::HorizontalSplit => {
                if let Ok((left, right)) = rect.split_horizontal(0.5) {
                    self.resize_pair(left, right);
                }
            }
            Layout::VerticalSplit => {
                if let Ok((top, bottom)) = rect.split_vertical(0.5) {
                    self.resize_pair(top, bottom);
                }
            }
        }
    }

    fn resize_pair(&mut self, first: Rect, second: Rect) {
        let ids: Vec<PaneId> = self.order.clone();
        if let Some(&first_id) = ids.first() {
            if let Some(pane) = self.panes.get_mut(first_id) {
                pane.resize(first);
            }
        }
        if let Some(&second_id) = ids.get(1) {
            if let Some(pane) = self.panes.get_mut(second_id) {
                pane.resize(second);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_and_restore_matches_scenario() {
        let mut window = Window::new(Rect::new(0, 0, 80, 24));
        let right_id = window.split(SplitDirection::Horizontal).unwrap();
        assert_eq!(window.pane_count(), 2);

        let left_id = window.order[0];
        assert_eq!(window.pane(left_id).unwrap().rect(), Rect::new(0, 0, 40, 24));
        assert_eq!(window.pane(right_id).unwrap().rect(), Rect::new(41, 0, 39, 24));

        window.focus_next();
        assert_eq!(window.active_pane_id(), right_id);

        window.remove_pane(right_id).unwrap();
        assert_eq!(window.pane_count(), 1);
        assert_eq!(window.pane(left_id).unwrap().rect(), Rect::new(0, 0, 40, 24));
    }

    #[test]
    fn remove_only_pane_fails() {
        let mut window = Window::new(Rect::new(0, 0, 80, 24));
        let id = window.active_pane_id();
        assert!(window.remove_pane(id).is_err());
    }
}
