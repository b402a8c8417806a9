//! A thin client-side helper: connect to the control socket, send/receive
//! framed messages, and a raw-mode guard for the attached terminal.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::error::{MuxError, Result};

use super::framing::{FrameDecoder, Message};

/// A blocking client connection used by the attach-side binary. The
/// reactor's own server-side connections are non-blocking; this one is
/// deliberately simple since it drives a single foreground terminal.
pub struct IpcClient {
    stream: UnixStream,
    decoder: FrameDecoder,
}

impl IpcClient {
    pub fn connect(path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(path)
            .map_err(|e| MuxError::Internal(format!("failed to connect to {}: {e}", path.display())))?;
        Ok(Self { stream, decoder: FrameDecoder::new() })
    }

    pub fn send(&mut self, message: &Message) -> Result<()> {
        self.stream.write_all(&message.encode()).map_err(|e| MuxError::Internal(format!("write error: {e}")))
    }

    /// Block until at least one complete message has been read.
    pub fn recv(&mut self) -> Result<Vec<Message>> {
        loop {
            let mut buf = [0u8; 4096];
            let n = self.stream.read(&mut buf).map_err(|e| MuxError::Internal(format!("read error: {e}")))?;
            if n == 0 {
                return Err(MuxError::Internal("server closed connection".to_string()));
            }
            let messages = self.decoder.feed(&buf[..n])?;
            if !messages.is_empty() {
                return Ok(messages);
            }
        }
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        self.stream.set_nonblocking(nonblocking)
    }

    /// Non-blocking poll variant of `recv`, for the client's own event loop.
    pub fn try_recv(&mut self) -> Result<Vec<Message>> {
        let mut buf = [0u8; 4096];
        match self.stream.read(&mut buf) {
            Ok(0) => Err(MuxError::Internal("server closed connection".to_string())),
            Ok(n) => self.decoder.feed(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Vec::new()),
            Err(e) => Err(MuxError::Internal(format!("read error: {e}"))),
        }
    }
}

/// Scoped raw-mode acquisition for the attach client: enabled on
/// construction, restored unconditionally on drop (including unwinding
/// panics), so a crashed client never leaves the user's shell in raw mode.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::server::IpcServer;

    #[test]
    fn client_connects_and_round_trips_a_ping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        let server = IpcServer::bind(&path).unwrap();

        let mut client = IpcClient::connect(&path).unwrap();
        client.send(&Message::Ping).unwrap();

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
        assert_eq!(messages, vec![Message::Ping]);
    }
}
