//! PTY lifecycle: allocate a master/slave pair, spawn a shell as the
//! session leader, and shuttle bytes to/from the non-blocking master.
//!
//! Built on raw `libc` calls rather than a wrapper crate: the multiplexer
//! owns fork/exec directly so it controls session leadership, controlling
//! terminal assignment, and signal delivery to the child.

use std::ffi::CString;
use std::io;
use std::os::unix::io::RawFd;

use crate::error::{MuxError, Result};

/// A pane's PTY: the non-blocking master fd and the child it drives.
#[derive(Debug)]
pub struct Pty {
    master: RawFd,
    child_pid: libc::pid_t,
    slave_path: String,
}

/// A PTY and the path to the slave device used to open it, returned by
/// [`Pty::create`] before a child is spawned onto it.
pub struct PtyHandle {
    master: RawFd,
    slave_path: String,
}

impl Pty {
    /// Allocate a PTY master/slave pair via `/dev/ptmx`, without spawning
    /// anything yet.
    pub fn create() -> Result<PtyHandle> {
        // SAFETY: posix_openpt with O_RDWR|O_NOCTTY returns a fresh fd we
        // own exclusively; no aliasing with existing Rust values.
        let master = unsafe { libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY) };
        if master < 0 {
            return Err(MuxError::PtyAllocationFailed(io::Error::last_os_error()));
        }
        // SAFETY: master is a valid, just-opened PT master fd.
        let rc = unsafe { libc::grantpt(master) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            // SAFETY: master owned by this function, not yet handed out.
            unsafe { libc::close(master) };
            return Err(MuxError::PtyAllocationFailed(err));
        }
        // SAFETY: same master fd, still owned here.
        let rc = unsafe { libc::unlockpt(master) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            // SAFETY: see above.
            unsafe { libc::close(master) };
            return Err(MuxError::PtyAllocationFailed(err));
        }

        let slave_path = slave_name(master)?;
        set_nonblocking(master)?;
        Ok(PtyHandle { master, slave_path })
    }

    /// Fork, make the child a session leader attached to the PTY slave,
    /// and `execvpe` `argv[0]` with `argv` and `envp`. On success returns
    /// a live [`Pty`] owning the master fd and child pid; on failure the
    /// master fd passed in is closed by the caller.
    pub fn spawn(handle: PtyHandle, argv: &[String], envp: &[String]) -> Result<Self> {
        let PtyHandle { master, slave_path } = handle;

        let c_argv = to_cstrings(argv)?;
        let c_envp = to_cstrings(envp)?;
        let mut argv_ptrs: Vec<*const libc::c_char> =
            c_argv.iter().map(|s| s.as_ptr()).chain(std::iter::once(std::ptr::null())).collect();
        let mut envp_ptrs: Vec<*const libc::c_char> =
            c_envp.iter().map(|s| s.as_ptr()).chain(std::iter::once(std::ptr::null())).collect();
        let slave_path_c = CString::new(slave_path.clone())
            .map_err(|_| MuxError::ChildSpawnFailed(io::Error::from(io::ErrorKind::InvalidInput)))?;

        // SAFETY: fork() duplicates the process; the child branch below
        // only calls async-signal-safe functions (setsid, open, ioctl,
        // dup2, close, execvp) before either exec'ing or calling _exit.
        let pid = unsafe { libc::fork() };
        if pid < 0 {
            // SAFETY: master owned here, not yet returned to a caller.
            unsafe { libc::close(master) };
            return Err(MuxError::ChildSpawnFailed(io::Error::last_os_error()));
        }

        if pid == 0 {
            // Child: become session leader, acquire the slave as our
            // controlling terminal, wire it to stdio, then exec.
            // SAFETY: child process, pre-exec; only async-signal-safe libc
            // calls follow.
            unsafe {
                libc::setsid();
                let slave = libc::open(slave_path_c.as_ptr(), libc::O_RDWR);
                if slave < 0 {
                    libc::_exit(127);
                }
                if libc::ioctl(slave, u64::from(libc::TIOCSCTTY), 0) != 0 {
                    libc::_exit(127);
                }
                libc::dup2(slave, libc::STDIN_FILENO);
                libc::dup2(slave, libc::STDOUT_FILENO);
                libc::dup2(slave, libc::STDERR_FILENO);
                if slave > libc::STDERR_FILENO {
                    libc::close(slave);
                }
                libc::close(master);
                libc::execve(argv_ptrs[0], argv_ptrs.as_mut_ptr(), envp_ptrs.as_mut_ptr());
                // execve only returns on failure.
                libc::_exit(127);
            }
        }

        // Parent: keep the master, drop our reference to the slave path's
        // open lifetime (we never opened it here).
        Ok(Self { master, child_pid: pid, slave_path })
    }

    /// Update the PTY's window size and notify the foreground process
    /// group via `SIGWINCH`.
    pub fn set_size(&self, rows: u16, cols: u16) -> Result<()> {
        let ws = libc::winsize { ws_row: rows, ws_col: cols, ws_xpixel: 0, ws_ypixel: 0 };
        // SAFETY: self.master is a live PTY master fd owned by this struct.
        let rc = unsafe { libc::ioctl(self.master, u64::from(libc::TIOCSWINSZ), &ws) };
        if rc != 0 {
            return Err(MuxError::PtyIoError { pane: self.child_pid as u32, source: io::Error::last_os_error() });
        }
        // SAFETY: sending SIGWINCH to the child's process group (negative
        // pid) is the standard way to notify a foreground job of a resize.
        unsafe { libc::kill(-self.child_pid, libc::SIGWINCH) };
        Ok(())
    }

    /// Non-blocking read from the master. Returns `Ok(0)` on EOF (child
    /// closed its end); `WouldBlock` surfaces as `Err` with that kind.
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: buf is a valid, exclusively-borrowed byte slice; master
        // is a live fd.
        let n = unsafe {
            libc::read(self.master, buf.as_mut_ptr().cast::<libc::c_void>(), buf.len())
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    /// Write to the master. Partial writes are possible; callers must
    /// retry on short writes.
    pub fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        // SAFETY: bytes is a valid, immutably-borrowed byte slice; master
        // is a live fd.
        let n = unsafe {
            libc::write(self.master, bytes.as_ptr().cast::<libc::c_void>(), bytes.len())
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    /// Non-blocking liveness check via `waitpid(WNOHANG)`.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        let mut status: libc::c_int = 0;
        // SAFETY: child_pid was returned by our own fork() call above.
        let rc = unsafe { libc::waitpid(self.child_pid, &mut status, libc::WNOHANG) };
        rc == 0
    }

    /// Terminate the child and release both file descriptors.
    pub fn close(&self) {
        // SAFETY: child_pid is this struct's own child.
        unsafe { libc::kill(self.child_pid, libc::SIGTERM) };
        let mut status: libc::c_int = 0;
        // SAFETY: reap to avoid leaving a zombie; non-blocking is wrong
        // here since we just asked it to die, so block briefly.
        unsafe { libc::waitpid(self.child_pid, &mut status, 0) };
        // SAFETY: master is this struct's own fd, not used after close.
        unsafe { libc::close(self.master) };
    }

    #[must_use]
    pub const fn master_fd(&self) -> RawFd {
        self.master
    }

    #[must_use]
    pub const fn child_pid(&self) -> libc::pid_t {
        self.child_pid
    }

    #[must_use]
    pub fn slave_path(&self) -> &str {
        &self.slave_path
    }
}

fn slave_name(master: RawFd) -> Result<String> {
    let mut buf = [0u8; 256];
    // SAFETY: master is a valid PT master fd; buf is sized per POSIX's
    // advice for ptsname_r (PATH_MAX is always < 256 on Linux ptys).
    let rc = unsafe { libc::ptsname_r(master, buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
    if rc != 0 {
        return Err(MuxError::PtyAllocationFailed(io::Error::last_os_error()));
    }
    let nul = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..nul]).into_owned())
}

fn set_nonblocking(fd: RawFd) -> Result<()> {
    // SAFETY: fd is a valid, open file descriptor owned by the caller.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL, 0) };
    if flags < 0 {
        return Err(MuxError::PtyAllocationFailed(io::Error::last_os_error()));
    }
    // SAFETY: same fd, setting O_NONBLOCK on top of the existing flags.
    let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(MuxError::PtyAllocationFailed(io::Error::last_os_error()));
    }
    Ok(())
}

fn to_cstrings(values: &[String]) -> Result<Vec<CString>> {
    values
        .iter()
        .map(|s| {
            CString::new(s.as_str())
                .map_err(|_| MuxError::ChildSpawnFailed(io::Error::from(io::ErrorKind::InvalidInput)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_allocates_a_usable_slave_path() {
        let handle = Pty::create().expect("posix_openpt should succeed under test");
        assert!(handle.slave_path.starts_with("/dev/"));
        // SAFETY: cleanup of a fd we just allocated and never handed off.
        unsafe { libc::close(handle.master) };
    }

    #[test]
    fn spawn_true_exits_quickly_and_is_reaped() {
        let handle = Pty::create().expect("posix_openpt should succeed under test");
        let argv = vec!["/usr/bin/true".to_string()];
        let envp = vec!["PATH=/usr/bin:/bin".to_string()];
        let pty = Pty::spawn(handle, &argv, &envp).expect("spawn should succeed");
        for _ in 0..200 {
            if !pty.is_alive() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(!pty.is_alive());
        // SAFETY: cleanup of fds owned by this test's Pty.
        unsafe { libc::close(pty.master) };
    }

    #[test]
    fn echo_hi_appears_on_master_read() {
        let handle = Pty::create().expect("posix_openpt should succeed under test");
        let argv = vec!["/bin/sh".to_string(), "-c".to_string(), "echo hi".to_string()];
        let envp = vec!["PATH=/usr/bin:/bin".to_string(), "TERM=xterm-256color".to_string()];
        let pty = Pty::spawn(handle, &argv, &envp).expect("spawn should succeed");

        let mut collected = Vec::new();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while std::time::Instant::now() < deadline {
            let mut buf = [0u8; 256];
            match pty.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => collected.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
                Err(e) => panic!("unexpected read error: {e}"),
            }
        }
        let text = String::from_utf8_lossy(&collected);
        assert!(text.contains("hi"), "expected 'hi' in output, got {text:?}");
        // SAFETY: cleanup of fds owned by this test's Pty.
        unsafe { libc::close(pty.master) };
    }
}
