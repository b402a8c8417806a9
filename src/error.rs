//! Machine-readable error taxonomy for the multiplexer core.
//!
//! Most call sites inside this crate propagate `anyhow::Result` the way the
//! rest of the ambient stack does, but anything that crosses the IPC
//! boundary (an `error` frame back to a client) needs a stable numeric code
//! rather than a free-form string. [`MuxError`] is that taxonomy.

use std::fmt;

/// A single machine-readable error code, sent to clients in `error` frames
/// and matched on internally to decide pane/window/session cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    PtyAllocationFailed = 1,
    PtyIoError = 2,
    ChildSpawnFailed = 3,
    InvalidMessage = 4,
    PayloadTooLarge = 5,
    UnsupportedVersion = 6,
    DuplicateName = 7,
    NotFound = 8,
    InvalidGeometry = 9,
    ClientOverflow = 10,
    Internal = 11,
}

impl ErrorCode {
    /// The wire value sent in `error` frames.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::PtyAllocationFailed => "PtyAllocationFailed",
            ErrorCode::PtyIoError => "PtyIoError",
            ErrorCode::ChildSpawnFailed => "ChildSpawnFailed",
            ErrorCode::InvalidMessage => "InvalidMessage",
            ErrorCode::PayloadTooLarge => "PayloadTooLarge",
            ErrorCode::UnsupportedVersion => "UnsupportedVersion",
            ErrorCode::DuplicateName => "DuplicateName",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::InvalidGeometry => "InvalidGeometry",
            ErrorCode::ClientOverflow => "ClientOverflow",
            ErrorCode::Internal => "Internal",
        };
        f.write_str(s)
    }
}

/// Typed error values produced by the core subsystems.
///
/// Propagation policy: PTY EOF is not an error, parser errors
/// are impossible by construction, and emulator operations are total on
/// valid indices. This enum only covers the failures that are possible.
#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    #[error("failed to allocate a PTY: {0}")]
    PtyAllocationFailed(#[source] std::io::Error),

    #[error("PTY I/O error on pane {pane}: {source}")]
    PtyIoError {
        pane: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn child process: {0}")]
    ChildSpawnFailed(#[source] std::io::Error),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    #[error("a session or window named {0:?} already exists")]
    DuplicateName(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u32 },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("client cannot keep up, disconnecting")]
    ClientOverflow,

    #[error("internal invariant violation: {0}")]
    Internal(String),
}

impl MuxError {
    /// The machine code this error maps to on the wire.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            MuxError::PtyAllocationFailed(_) => ErrorCode::PtyAllocationFailed,
            MuxError::PtyIoError { .. } => ErrorCode::PtyIoError,
            MuxError::ChildSpawnFailed(_) => ErrorCode::ChildSpawnFailed,
            MuxError::InvalidMessage(_) => ErrorCode::InvalidMessage,
            MuxError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            MuxError::UnsupportedVersion(_) => ErrorCode::UnsupportedVersion,
            MuxError::DuplicateName(_) => ErrorCode::DuplicateName,
            MuxError::NotFound { .. } => ErrorCode::NotFound,
            MuxError::InvalidGeometry(_) => ErrorCode::InvalidGeometry,
            MuxError::ClientOverflow => ErrorCode::ClientOverflow,
            MuxError::Internal(_) => ErrorCode::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, MuxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_matches_variant() {
        assert_eq!(MuxError::ClientOverflow.code(), ErrorCode::ClientOverflow);
        assert_eq!(
            MuxError::DuplicateName("x".into()).code(),
            ErrorCode::DuplicateName
        );
    }

    #[test]
    fn display_is_human_readable() {
        let e = MuxError::NotFound { kind: "pane", id: 7 };
        assert_eq!(e.to_string(), "pane 7 not found");
    }
}
