//! The process-wide session table.

use crate::error::{MuxError, Result};

use super::ids::{Arena, SessionId};
use super::rect::Rect;
use super::session::Session;

#[derive(Default)]
pub struct SessionManager {
    sessions: Arena<Session>,
    order: Vec<SessionId>,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session with one window and one (unspawned) pane.
    /// Fails with `DuplicateName` if the name is already taken.
    pub fn create_session(&mut self, name: &str, rect: Rect, scrollback: usize) -> Result<SessionId> {
        if self.find_by_name(name).is_some() {
            return Err(MuxError::DuplicateName(name.to_string()));
        }
        let id: SessionId = self.sessions.insert(Session::new(name.to_string(), rect, scrollback));
        self.order.push(id);
        Ok(id)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<SessionId> {
        self.order.iter().copied().find(|&id| self.sessions.get(id).is_some_and(|s| s.name() == name))
    }

    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    #[must_use]
    pub fn sessions(&self) -> impl Iterator<Item = (SessionId, &Session)> {
        self.order.iter().copied().filter_map(move |id| self.sessions.get(id).map(|s| (id, s)))
    }

    pub fn kill_session(&mut self, id: SessionId) {
        if let Some(session) = self.sessions.get(id) {
            for (_, window) in session.windows() {
                for (_, pane) in window.panes() {
                    pane.close();
                }
            }
        }
        self.sessions.remove(id);
        self.order.retain(|&sid| sid != id);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_is_rejected() {
        let mut mgr = SessionManager::new();
        mgr.create_session("main", Rect::new(0, 0, 80, 24), 1000).unwrap();
        let err = mgr.create_session("main", Rect::new(0, 0, 80, 24), 1000).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::DuplicateName);
    }

    #[test]
    fn kill_session_removes_it_from_the_table() {
        let mut mgr = SessionManager::new();
        let id = mgr.create_session("main", Rect::new(0, 0, 80, 24), 1000).unwrap();
        mgr.kill_session(id);
        assert!(mgr.get(id).is_none());
        assert!(mgr.is_empty());
    }
}
