//! End-to-end "echo hi" scenario: bytes from a real spawned shell travel
//! through the pty, the parser, and the emulator into the grid.

use terminal_mux::pty::Pty;
use terminal_mux::session::{Pane, Rect};

#[test]
fn echo_hi_lands_in_the_grid_and_advances_the_cursor() {
    let mut pane = Pane::new(Rect::new(0, 0, 80, 24));

    let handle = Pty::create().expect("posix_openpt should succeed under test");
    // Non-interactive `-c` invocation: no shell prompt to account for, so
    // the grid's first line is exactly the command's own output.
    let argv = vec!["/bin/sh".to_string(), "-c".to_string(), "echo hi".to_string()];
    let envp = vec!["PATH=/usr/bin:/bin".to_string(), "TERM=xterm-256color".to_string()];
    let pty = Pty::spawn(handle, &argv, &envp).expect("spawn should succeed");

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
    loop {
        let mut buf = [0u8; 4096];
        match pty.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => pane.feed(&buf[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if std::time::Instant::now() > deadline {
                    break;
                }
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
            Err(e) => panic!("unexpected read error: {e}"),
        }
    }

    let grid = pane.emulator().grid();
    assert_eq!(grid.cell(0, 0).ch, 'h');
    assert_eq!(grid.cell(0, 1).ch, 'i');

    let cursor = pane.emulator().cursor();
    assert_eq!(cursor.row, 1, "cursor should have moved to the line after the echoed output");
    assert_eq!(cursor.col, 0, "the trailing newline should have carried the cursor to column 0");

    pane.close();
}
