//! The session/window/pane tree and the arena it's addressed through.

pub mod ids;
pub mod manager;
pub mod pane;
pub mod rect;
pub mod session;
pub mod window;

pub use ids::{Arena, PaneId, SessionId, WindowId};
pub use manager::SessionManager;
pub use pane::Pane;
pub use rect::Rect;
pub use session::Session;
pub use window::{Layout, SplitDirection, Window};
