//! The listening Unix-domain socket and the per-client connection state
//! the reactor polls directly.
//!
//! Everything here is non-blocking: the reactor owns a single `poll()`
//! call across the listener and every client fd, so no read or write in
//! this module may block.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use crate::error::{MuxError, Result};
use crate::session::SessionId;

use super::framing::{FrameDecoder, Message};

/// A receive buffer large enough for one maximum message.
const READ_CHUNK: usize = 64 * 1024;

/// The bound listen socket.
pub struct IpcServer {
    listener: UnixListener,
    path: PathBuf,
}

impl IpcServer {
    /// Bind the control socket at `path`, removing a stale file first and
    /// creating the parent directory if needed. The socket is restricted
    /// to owner access, matching the permissions a per-user control
    /// channel needs.
    pub fn bind(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MuxError::Internal(format!("failed to create socket directory {}: {e}", parent.display()))
            })?;
        }
        if path.exists() {
            std::fs::remove_file(path)
                .map_err(|e| MuxError::Internal(format!("failed to remove stale socket {}: {e}", path.display())))?;
        }

        let listener = UnixListener::bind(path)
            .map_err(|e| MuxError::Internal(format!("failed to bind socket {}: {e}", path.display())))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| MuxError::Internal(format!("failed to set socket non-blocking: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(path, perms);
        }

        Ok(Self { listener, path: path.to_path_buf() })
    }

    #[must_use]
    pub fn raw_fd(&self) -> RawFd {
        self.listener.as_raw_fd()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept one pending connection, if any. `Ok(None)` means the
    /// listener has nothing ready (`EAGAIN`/`EWOULDBLOCK`).
    pub fn accept(&self) -> io::Result<Option<ClientConn>> {
        match self.listener.accept() {
            Ok((stream, _addr)) => {
                stream.set_nonblocking(true)?;
                Ok(Some(ClientConn::new(stream)))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// One connected client: its socket, incremental frame decoder, a bounded
/// outbound byte queue, and which session it has attached to (if any).
pub struct ClientConn {
    stream: UnixStream,
    decoder: FrameDecoder,
    out_queue: VecDeque<u8>,
    pub attached_session: Option<SessionId>,
}

impl ClientConn {
    fn new(stream: UnixStream) -> Self {
        Self { stream, decoder: FrameDecoder::new(), out_queue: VecDeque::new(), attached_session: None }
    }

    #[must_use]
    pub fn raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }

    /// Read whatever is available and return every whole message it
    /// completed. Empty on `WouldBlock`. An `Err` means the client sent a
    /// malformed frame or version and must be disconnected.
    pub fn read_messages(&mut self) -> Result<Vec<Message>> {
        let mut buf = [0u8; READ_CHUNK];
        match self.stream.read(&mut buf) {
            Ok(0) => Err(MuxError::InvalidMessage("client closed connection".to_string())),
            Ok(n) => self.decoder.feed(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Vec::new()),
            Err(e) => Err(MuxError::Internal(format!("read error: {e}"))),
        }
    }

    /// Queue an outbound message for this client.
    pub fn queue(&mut self, message: &Message) {
        self.out_queue.extend(message.encode());
    }

    #[must_use]
    pub fn has_pending_output(&self) -> bool {
        !self.out_queue.is_empty()
    }

    /// Attempt to drain the outbound queue without blocking. Leaves
    /// whatever a short write didn't accept for the next tick.
    pub fn flush(&mut self) -> Result<()> {
        while !self.out_queue.is_empty() {
            let (front, _) = self.out_queue.as_slices();
            match self.stream.write(front) {
                Ok(0) => return Err(MuxError::ClientOverflow),
                Ok(n) => {
                    self.out_queue.drain(..n);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(MuxError::Internal(format!("write error: {e}"))),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::framing::Message;
    use std::io::Write as _;

    #[test]
    fn bind_removes_a_stale_socket_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        std::fs::write(&path, b"not a socket").unwrap();
        let server = IpcServer::bind(&path).unwrap();
        assert!(path.exists());
        drop(server);
        assert!(!path.exists());
    }

    #[test]
    fn accept_and_exchange_a_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        let server = IpcServer::bind(&path).unwrap();

        let mut client_stream = UnixStream::connect(&path).unwrap();
        let attach = Message::Attach { session_name: "main".to_string(), rows: 24, cols: 80 };
        client_stream.write_all(&attach.encode()).unwrap();

        let mut conn = loop {
            if let Some(conn) = server.accept().unwrap() {
                break conn;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        };

        let messages = loop {
            let messages = conn.read_messages().unwrap();
            if !messages.is_empty() {
                break messages;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert_eq!(messages, vec![attach]);
    }
}
