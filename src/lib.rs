//! Terminal multiplexer core: PTY lifecycle, VT100/ECMA-48/xterm parsing,
//! terminal emulation, the session/window/pane tree, the diff-based
//! renderer, and the Unix-socket IPC protocol that ties them together.
//!
//! The reactor (`reactor` module) is the only piece that owns all of this
//! at once; everything else is a library a single thread drives directly.

pub mod config;
pub mod error;
pub mod ipc;
pub mod pty;
pub mod reactor;
pub mod render;
pub mod session;
pub mod term;
pub mod vt;

pub use config::Config;
pub use error::{ErrorCode, MuxError, Result};
pub use reactor::Reactor;
