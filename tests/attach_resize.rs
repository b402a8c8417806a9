//! End-to-end attach/resize round trip: a session's geometry, its
//! spawned pane's PTY window size, and the pane's emulator grid all
//! cascade together from one resize call.

use terminal_mux::pty::Pty;
use terminal_mux::session::{Rect, Session};

#[test]
fn resize_cascades_to_pty_and_emulator() {
    let mut session = Session::new("0".to_string(), Rect::new(0, 0, 100, 30), 10_000);

    let handle = Pty::create().expect("posix_openpt should succeed under test");
    let argv = vec!["/bin/sh".to_string()];
    let envp = vec!["PATH=/usr/bin:/bin".to_string(), "TERM=xterm-256color".to_string()];
    let pty = Pty::spawn(handle, &argv, &envp).expect("spawn should succeed");
    session.active_window_mut().active_pane_mut().attach_pty(pty);

    session.resize(Rect::new(0, 0, 80, 20));

    assert_eq!(session.rect(), Rect::new(0, 0, 80, 20));

    let pane = session.active_window_mut().active_pane_mut();
    assert_eq!(pane.rect(), Rect::new(0, 0, 80, 20));
    assert_eq!(pane.emulator().grid().rows(), 20);
    assert_eq!(pane.emulator().grid().cols(), 80);

    let cursor = pane.emulator().cursor();
    assert!(cursor.row < 20, "cursor row {} must be clamped within 20 rows", cursor.row);
    assert!(cursor.col < 80, "cursor col {} must be clamped within 80 cols", cursor.col);

    let winsize = read_winsize(pane.pty().expect("pane has a pty attached").master_fd());
    assert_eq!(winsize.ws_row, 20);
    assert_eq!(winsize.ws_col, 80);

    pane.pty().expect("pane has a pty attached").close();
}

fn read_winsize(fd: std::os::unix::io::RawFd) -> libc::winsize {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: fd is a live PTY master fd owned by the test's Pty for the
    // duration of this call; ws is a valid, exclusively-borrowed out param.
    let rc = unsafe { libc::ioctl(fd, u64::from(libc::TIOCGWINSZ), &mut ws) };
    assert_eq!(rc, 0, "TIOCGWINSZ should succeed on a live pty master");
    ws
}
