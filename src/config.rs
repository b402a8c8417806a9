//! Runtime configuration resolved from the environment.
//!
//! Nothing here is persisted; every value is re-derived from the process
//! environment at startup, the way the source daemon resolves its socket
//! path from `$XDG_RUNTIME_DIR`/`/tmp` and the current uid.

use std::env;
use std::fs;
use std::path::PathBuf;

const DEFAULT_TERM: &str = "xterm-256color";
const DEFAULT_SCROLLBACK: usize = 10_000;
const DEFAULT_SOCKET_NAME: &str = "terminal_mux.sock";

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub shell: String,
    pub term: String,
    pub scrollback: usize,
    pub socket_path: PathBuf,
}

impl Config {
    /// Resolve configuration from the environment the way the server
    /// binary sees it at startup.
    #[must_use]
    pub fn from_env() -> Self {
        let shell = env::var("TMUX_SHELL").or_else(|_| env::var("SHELL")).unwrap_or_else(|_| "/bin/sh".to_string());
        let term = DEFAULT_TERM.to_string();
        let scrollback = env::var("TMUX_SCROLLBACK")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SCROLLBACK);
        let socket_path = resolve_socket_path();
        Self { shell, term, scrollback, socket_path }
    }

    /// The environment handed to a spawned pane's child process.
    #[must_use]
    pub fn child_env(&self) -> Vec<String> {
        let mut env: Vec<String> = env::vars().map(|(k, v)| format!("{k}={v}")).collect();
        env.retain(|entry| !entry.starts_with("TERM="));
        env.push(format!("TERM={}", self.term));
        env
    }
}

/// `${XDG_RUNTIME_DIR}/terminal_mux.sock`, falling back to
/// `/tmp/terminal_mux-<uid>/default.sock` when the runtime directory isn't
/// set. The parent directory is created (with a restrictive
/// umask in the fallback case, since `/tmp` is shared) if missing.
#[must_use]
pub fn resolve_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = env::var("XDG_RUNTIME_DIR") {
        let dir = PathBuf::from(runtime_dir);
        let _ = fs::create_dir_all(&dir);
        return dir.join(DEFAULT_SOCKET_NAME);
    }

    // SAFETY: getuid never fails; it just returns the calling process's uid.
    let uid = unsafe { libc::getuid() };
    let dir = PathBuf::from(format!("/tmp/terminal_mux-{uid}"));
    if !dir.exists() {
        // SAFETY: umask affects only this process; restored immediately
        // after the directory is created, avoiding a TOCTOU window on
        // shared /tmp.
        let old_umask = unsafe { libc::umask(0o077) };
        let _ = fs::create_dir_all(&dir);
        // SAFETY: restoring the process's prior umask.
        unsafe { libc::umask(old_umask) };
    }
    dir.join("default.sock")
}

/// Remove a stale socket file left behind by a crashed server, so `bind`
/// doesn't fail with `AddrInUse` on a dead socket.
pub fn remove_stale_socket(path: &std::path::Path) {
    if path.exists() {
        let _ = fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_path_prefers_xdg_runtime_dir() {
        let dir = tempfile::tempdir().unwrap();
        // SAFETY: test process, single-threaded test; no concurrent env access.
        unsafe { env::set_var("XDG_RUNTIME_DIR", dir.path()) };
        let path = resolve_socket_path();
        assert_eq!(path, dir.path().join(DEFAULT_SOCKET_NAME));
        // SAFETY: see above.
        unsafe { env::remove_var("XDG_RUNTIME_DIR") };
    }

    #[test]
    fn config_defaults_scrollback_when_unset() {
        // SAFETY: test process, single-threaded test; no concurrent env access.
        unsafe { env::remove_var("TMUX_SCROLLBACK") };
        let config = Config::from_env();
        assert_eq!(config.scrollback, DEFAULT_SCROLLBACK);
    }
}
