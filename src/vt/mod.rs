//! Byte-at-a-time VT100/ECMA-48/xterm escape sequence parser.
//!
//! Pure state machine: [`Parser::feed`] takes one byte and returns zero or
//! more [`Action`]s. Nothing here allocates beyond the parser's own
//! fixed-size scratch buffers (`PARAMS_MAX` integers, `OSC_BUF_LEN` bytes),
//! so it is safe to run on the hot path for every byte a PTY produces.

mod parser;

pub use parser::{Action, CsiParams, Parser, MAX_INTERMEDIATES, MAX_PARAMS, OSC_BUF_LEN};
