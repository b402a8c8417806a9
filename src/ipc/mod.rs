//! Unix-domain socket IPC: wire framing, the non-blocking server side the
//! reactor polls, and a blocking client helper for the attach binary.

pub mod client;
pub mod framing;
pub mod server;

pub use client::{IpcClient, RawModeGuard};
pub use framing::{Message, SessionSummary, MAGIC, VERSION};
pub use server::{ClientConn, IpcServer};
