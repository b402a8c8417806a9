//! Wire protocol codec for the multiplexer's Unix-domain socket IPC.
//!
//! Fixed 12-byte header — 4-byte magic `TMUX`, 1-byte version, 1-byte
//! message type, 2-byte flags, 4-byte little-endian payload length —
//! followed by `payload_len` bytes.

use crate::error::{MuxError, Result};
use crate::session::SplitDirection;

pub const MAGIC: [u8; 4] = *b"TMUX";
pub const VERSION: u8 = 1;
const HEADER_LEN: usize = 12;
/// One maximum message's worth of payload: 64 KiB.
pub const MAX_PAYLOAD: u32 = 64 * 1024;

pub mod msg_type {
    pub const ATTACH: u8 = 0x01;
    pub const DETACH: u8 = 0x02;
    pub const NEW_SESSION: u8 = 0x03;
    pub const NEW_WINDOW: u8 = 0x04;
    pub const SPLIT_PANE: u8 = 0x05;
    pub const KILL_PANE: u8 = 0x06;
    pub const RESIZE: u8 = 0x07;
    pub const INPUT: u8 = 0x08;
    pub const LIST_SESSIONS: u8 = 0x09;
    pub const SELECT_WINDOW: u8 = 0x0A;
    pub const SELECT_PANE: u8 = 0x0B;
    pub const RENAME_SESSION: u8 = 0x0C;
    pub const RENAME_WINDOW: u8 = 0x0D;
    pub const KILL_SESSION: u8 = 0x0E;
    pub const KILL_WINDOW: u8 = 0x0F;

    pub const OUTPUT: u8 = 0x80;
    pub const SESSION_INFO: u8 = 0x81;
    pub const ERROR: u8 = 0x82;
    pub const SYNC_STATE: u8 = 0x83;
    pub const PONG: u8 = 0x84;
    pub const PING: u8 = 0x85;
}

/// One entry in a `list_sessions` reply: name, window count, active window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub name: String,
    pub window_count: u16,
    pub active_window: u16,
}

/// A decoded IPC message, client- or server-originated.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Attach { session_name: String, rows: u16, cols: u16 },
    Detach,
    NewSession { name: String, rows: u16, cols: u16 },
    NewWindow,
    SplitPane { direction: SplitDirection },
    KillPane { pane: u64 },
    Resize { rows: u16, cols: u16 },
    Input { bytes: Vec<u8> },
    ListSessions,
    SelectWindow { index: u16 },
    SelectPane { pane: u64 },
    RenameSession { name: String },
    RenameWindow { name: String },
    KillSession,
    KillWindow,

    Output { bytes: Vec<u8> },
    SessionInfo { sessions: Vec<SessionSummary> },
    Error { code: u16, message: String },
    SyncState { bytes: Vec<u8> },
    Pong,
    Ping,
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn read_string(payload: &[u8], offset: &mut usize) -> Result<String> {
    if payload.len() < *offset + 2 {
        return Err(MuxError::InvalidMessage("truncated string length".to_string()));
    }
    let len = u16::from_le_bytes([payload[*offset], payload[*offset + 1]]) as usize;
    *offset += 2;
    if payload.len() < *offset + len {
        return Err(MuxError::InvalidMessage("truncated string payload".to_string()));
    }
    let s = String::from_utf8(payload[*offset..*offset + len].to_vec())
        .map_err(|_| MuxError::InvalidMessage("string payload is not valid UTF-8".to_string()))?;
    *offset += len;
    Ok(s)
}

impl Message {
    fn msg_type(&self) -> u8 {
        match self {
            Message::Attach { .. } => msg_type::ATTACH,
            Message::Detach => msg_type::DETACH,
            Message::NewSession { .. } => msg_type::NEW_SESSION,
            Message::NewWindow => msg_type::NEW_WINDOW,
            Message::SplitPane { .. } => msg_type::SPLIT_PANE,
            Message::KillPane { .. } => msg_type::KILL_PANE,
            Message::Resize { .. } => msg_type::RESIZE,
            Message::Input { .. } => msg_type::INPUT,
            Message::ListSessions => msg_type::LIST_SESSIONS,
            Message::SelectWindow { .. } => msg_type::SELECT_WINDOW,
            Message::SelectPane { .. } => msg_type::SELECT_PANE,
            Message::RenameSession { .. } => msg_type::RENAME_SESSION,
            Message::RenameWindow { .. } => msg_type::RENAME_WINDOW,
            Message::KillSession => msg_type::KILL_SESSION,
            Message::KillWindow => msg_type::KILL_WINDOW,
            Message::Output { .. } => msg_type::OUTPUT,
            Message::SessionInfo { .. } => msg_type::SESSION_INFO,
            Message::Error { .. } => msg_type::ERROR,
            Message::SyncState { .. } => msg_type::SYNC_STATE,
            Message::Pong => msg_type::PONG,
            Message::Ping => msg_type::PING,
        }
    }

    fn encode_payload(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        match self {
            Message::Attach { session_name, rows, cols } => {
                write_string(&mut payload, session_name);
                payload.extend_from_slice(&rows.to_le_bytes());
                payload.extend_from_slice(&cols.to_le_bytes());
            }
            Message::NewSession { name, rows, cols } => {
                write_string(&mut payload, name);
                payload.extend_from_slice(&rows.to_le_bytes());
                payload.extend_from_slice(&cols.to_le_bytes());
            }
            Message::SplitPane { direction } => {
                payload.push(match direction {
                    SplitDirection::Horizontal => 0,
                    SplitDirection::Vertical => 1,
                });
            }
            Message::KillPane { pane } | Message::SelectPane { pane } => {
                payload.extend_from_slice(&pane.to_le_bytes());
            }
            Message::Resize { rows, cols } => {
                payload.extend_from_slice(&rows.to_le_bytes());
                payload.extend_from_slice(&cols.to_le_bytes());
            }
            Message::Input { bytes } | Message::Output { bytes } | Message::SyncState { bytes } => {
                payload.extend_from_slice(bytes);
            }
            Message::SelectWindow { index } => {
                payload.extend_from_slice(&index.to_le_bytes());
            }
            Message::RenameSession { name } | Message::RenameWindow { name } => {
                write_string(&mut payload, name);
            }
            Message::SessionInfo { sessions } => {
                payload.extend_from_slice(&(sessions.len() as u16).to_le_bytes());
                for s in sessions {
                    write_string(&mut payload, &s.name);
                    payload.extend_from_slice(&s.window_count.to_le_bytes());
                    payload.extend_from_slice(&s.active_window.to_le_bytes());
                }
            }
            Message::Error { code, message } => {
                payload.extend_from_slice(&code.to_le_bytes());
                write_string(&mut payload, message);
            }
            Message::Detach
            | Message::NewWindow
            | Message::ListSessions
            | Message::KillSession
            | Message::KillWindow
            | Message::Pong
            | Message::Ping => {}
        }
        payload
    }

    /// Encode the full `[header][payload]` wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.encode_payload();
        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.extend_from_slice(&MAGIC);
        buf.push(VERSION);
        buf.push(self.msg_type());
        buf.extend_from_slice(&0u16.to_le_bytes()); // flags, currently unused
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&payload);
        buf
    }

    fn decode_payload(msg_type: u8, payload: &[u8]) -> Result<Self> {
        let mut offset = 0;
        match msg_type {
            msg_type::ATTACH => {
                let session_name = read_string(payload, &mut offset)?;
                let (rows, cols) = read_u16_pair(payload, &mut offset)?;
                Ok(Message::Attach { session_name, rows, cols })
            }
            msg_type::DETACH => Ok(Message::Detach),
            msg_type::NEW_SESSION => {
                let name = read_string(payload, &mut offset)?;
                let (rows, cols) = read_u16_pair(payload, &mut offset)?;
                Ok(Message::NewSession { name, rows, cols })
            }
            msg_type::NEW_WINDOW => Ok(Message::NewWindow),
            msg_type::SPLIT_PANE => {
                let direction = match payload.first() {
                    Some(0) => SplitDirection::Horizontal,
                    Some(1) => SplitDirection::Vertical,
                    _ => return Err(MuxError::InvalidMessage("bad split direction".to_string())),
                };
                Ok(Message::SplitPane { direction })
            }
            msg_type::KILL_PANE => Ok(Message::KillPane { pane: read_u64(payload)? }),
            msg_type::RESIZE => {
                let (rows, cols) = read_u16_pair(payload, &mut offset)?;
                Ok(Message::Resize { rows, cols })
            }
            msg_type::INPUT => Ok(Message::Input { bytes: payload.to_vec() }),
            msg_type::LIST_SESSIONS => Ok(Message::ListSessions),
            msg_type::SELECT_WINDOW => {
                if payload.len() < 2 {
                    return Err(MuxError::InvalidMessage("truncated select_window".to_string()));
                }
                Ok(Message::SelectWindow { index: u16::from_le_bytes([payload[0], payload[1]]) })
            }
            msg_type::SELECT_PANE => Ok(Message::SelectPane { pane: read_u64(payload)? }),
            msg_type::RENAME_SESSION => Ok(Message::RenameSession { name: read_string(payload, &mut offset)? }),
            msg_type::RENAME_WINDOW => Ok(Message::RenameWindow { name: read_string(payload, &mut offset)? }),
            msg_type::KILL_SESSION => Ok(Message::KillSession),
            msg_type::KILL_WINDOW => Ok(Message::KillWindow),
            msg_type::OUTPUT => Ok(Message::Output { bytes: payload.to_vec() }),
            msg_type::SESSION_INFO => {
                if payload.len() < 2 {
                    return Err(MuxError::InvalidMessage("truncated session_info".to_string()));
                }
                let count = u16::from_le_bytes([payload[0], payload[1]]);
                offset = 2;
                let mut sessions = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let name = read_string(payload, &mut offset)?;
                    if payload.len() < offset + 4 {
                        return Err(MuxError::InvalidMessage("truncated session_info entry".to_string()));
                    }
                    let window_count = u16::from_le_bytes([payload[offset], payload[offset + 1]]);
                    let active_window = u16::from_le_bytes([payload[offset + 2], payload[offset + 3]]);
                    offset += 4;
                    sessions.push(SessionSummary { name, window_count, active_window });
                }
                Ok(Message::SessionInfo { sessions })
            }
            msg_type::ERROR => {
                if payload.len() < 2 {
                    return Err(MuxError::InvalidMessage("truncated error frame".to_string()));
                }
                let code = u16::from_le_bytes([payload[0], payload[1]]);
                offset = 2;
                let message = read_string(payload, &mut offset)?;
                Ok(Message::Error { code, message })
            }
            msg_type::SYNC_STATE => Ok(Message::SyncState { bytes: payload.to_vec() }),
            msg_type::PONG => Ok(Message::Pong),
            msg_type::PING => Ok(Message::Ping),
            other => Err(MuxError::InvalidMessage(format!("unknown message type 0x{other:02x}"))),
        }
    }
}

fn read_u16_pair(payload: &[u8], offset: &mut usize) -> Result<(u16, u16)> {
    if payload.len() < *offset + 4 {
        return Err(MuxError::InvalidMessage("truncated u16 pair".to_string()));
    }
    let a = u16::from_le_bytes([payload[*offset], payload[*offset + 1]]);
    let b = u16::from_le_bytes([payload[*offset + 2], payload[*offset + 3]]);
    *offset += 4;
    Ok((a, b))
}

fn read_u64(payload: &[u8]) -> Result<u64> {
    if payload.len() < 8 {
        return Err(MuxError::InvalidMessage("truncated u64".to_string()));
    }
    Ok(u64::from_le_bytes(payload[..8].try_into().expect("slice is exactly 8 bytes")))
}

/// Incremental decoder that reassembles frames from a byte stream that may
/// arrive split across arbitrarily many reads.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed newly read bytes in and pull out every complete message now
    /// available. A bad magic or an over-limit length is a hard protocol
    /// error: the caller should disconnect the client.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Message>> {
        self.buf.extend_from_slice(bytes);
        let mut messages = Vec::new();

        loop {
            if self.buf.len() < HEADER_LEN {
                break;
            }
            if self.buf[0..4] != MAGIC {
                return Err(MuxError::InvalidMessage("bad magic".to_string()));
            }
            let version = self.buf[4];
            if version != VERSION {
                return Err(MuxError::UnsupportedVersion(version));
            }
            let msg_type = self.buf[5];
            let length = u32::from_le_bytes([self.buf[8], self.buf[9], self.buf[10], self.buf[11]]);
            if length > MAX_PAYLOAD {
                return Err(MuxError::PayloadTooLarge { len: length as usize, max: MAX_PAYLOAD as usize });
            }
            let total = HEADER_LEN + length as usize;
            if self.buf.len() < total {
                break;
            }
            let payload = &self.buf[HEADER_LEN..total];
            messages.push(Message::decode_payload(msg_type, payload)?);
            self.buf.drain(..total);
        }

        Ok(messages)
    }

    #[must_use]
    pub fn has_partial(&self) -> bool {
        !self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(msg: Message) {
        let encoded = msg.encode();
        let mut decoder = FrameDecoder::new();
        let decoded = decoder.feed(&encoded).unwrap();
        assert_eq!(decoded, vec![msg]);
        assert!(!decoder.has_partial());
    }

    #[test]
    fn attach_round_trips() {
        round_trip(Message::Attach { session_name: "main".to_string(), rows: 24, cols: 80 });
    }

    #[test]
    fn input_round_trips_with_binary_payload() {
        round_trip(Message::Input { bytes: vec![0, 1, 2, 255, 254] });
    }

    #[test]
    fn session_info_round_trips_a_list() {
        round_trip(Message::SessionInfo {
            sessions: vec![
                SessionSummary { name: "main".to_string(), window_count: 2, active_window: 1 },
                SessionSummary { name: "scratch".to_string(), window_count: 1, active_window: 0 },
            ],
        });
    }

    #[test]
    fn error_round_trips() {
        round_trip(Message::Error { code: 8, message: "pane 3 not found".to_string() });
    }

    #[test]
    fn split_frames_reassemble_incrementally() {
        let msg = Message::Input { bytes: vec![b'h', b'i'] };
        let encoded = msg.encode();
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&encoded[..5]).unwrap().is_empty());
        assert!(decoder.has_partial());
        let decoded = decoder.feed(&encoded[5..]).unwrap();
        assert_eq!(decoded, vec![msg]);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut decoder = FrameDecoder::new();
        let mut bogus = vec![0u8; 12];
        bogus[0..4].copy_from_slice(b"NOPE");
        assert!(decoder.feed(&bogus).is_err());
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut decoder = FrameDecoder::new();
        let mut header = Vec::new();
        header.extend_from_slice(&MAGIC);
        header.push(VERSION);
        header.push(msg_type::INPUT);
        header.extend_from_slice(&0u16.to_le_bytes());
        header.extend_from_slice(&(MAX_PAYLOAD + 1).to_le_bytes());
        assert!(decoder.feed(&header).is_err());
    }
}
