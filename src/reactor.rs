//! The single-threaded event loop: one `libc::poll` call per tick covers
//! the listen socket, every attached client socket, and every pane's PTY
//! master FD.
//!
//! No locks, no worker threads: everything here runs to completion within
//! one tick before the next `poll` wait, the way `RawInputReader` in the
//! source drives its own non-blocking fd directly instead of going through
//! a buffered, async runtime.

use std::collections::HashMap;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{ErrorCode, MuxError};
use crate::ipc::framing::{Message, SessionSummary};
use crate::ipc::server::{ClientConn, IpcServer};
use crate::pty::Pty;
use crate::render::{RenderConfig, Renderer};
use crate::session::{PaneId, Rect, Session, SessionId, SessionManager, SplitDirection, WindowId};

/// Redraw cadence even when nothing is ready.
const TICK_TIMEOUT_MS: i32 = 75;

pub struct Reactor {
    manager: SessionManager,
    ipc: IpcServer,
    clients: HashMap<RawFd, ClientConn>,
    renderers: HashMap<SessionId, Renderer>,
    config: Config,
    quit: Arc<AtomicBool>,
}

impl Reactor {
    pub fn new(ipc: IpcServer, config: Config) -> Self {
        Self {
            manager: SessionManager::new(),
            ipc,
            clients: HashMap::new(),
            renderers: HashMap::new(),
            config,
            quit: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register SIGINT/SIGTERM to flip a quit flag, then run until it's
    /// set.
    pub fn run(mut self) -> crate::error::Result<()> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};

        signal_hook::flag::register(SIGINT, Arc::clone(&self.quit))
            .map_err(|e| MuxError::Internal(format!("failed to register SIGINT handler: {e}")))?;
        signal_hook::flag::register(SIGTERM, Arc::clone(&self.quit))
            .map_err(|e| MuxError::Internal(format!("failed to register SIGTERM handler: {e}")))?;

        while !self.quit.load(Ordering::Relaxed) {
            self.tick();
        }
        self.shutdown();
        Ok(())
    }

    /// One iteration of the reactor: poll, accept, drain clients, drain
    /// PTYs, sweep dead panes, redraw.
    pub fn tick(&mut self) {
        let pane_fds = self.collect_pane_fds();
        let mut pollfds = Vec::with_capacity(1 + self.clients.len() + pane_fds.len());
        pollfds.push(libc::pollfd { fd: self.ipc.raw_fd(), events: libc::POLLIN, revents: 0 });
        for fd in self.clients.keys() {
            pollfds.push(libc::pollfd { fd: *fd, events: libc::POLLIN, revents: 0 });
        }
        for (fd, _) in &pane_fds {
            pollfds.push(libc::pollfd { fd: *fd, events: libc::POLLIN, revents: 0 });
        }

        // SAFETY: pollfds is a valid, exclusively-borrowed array of the
        // right length; poll() only reads/writes within it.
        let ready = unsafe { libc::poll(pollfds.as_mut_ptr(), pollfds.len() as libc::nfds_t, TICK_TIMEOUT_MS) };
        if ready < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::Interrupted {
                warn!("poll() failed: {err}");
            }
            return;
        }

        self.accept_new_clients();
        self.drain_clients(&pollfds);
        self.drain_ptys(&pollfds, &pane_fds);
        self.sweep_dead_panes();
        self.redraw_and_broadcast();
        self.flush_clients();
    }

    fn collect_pane_fds(&self) -> Vec<(RawFd, (SessionId, WindowId, PaneId))> {
        let mut out = Vec::new();
        for (session_id, session) in self.manager.sessions() {
            for (window_id, window) in session.windows() {
                for (pane_id, pane) in window.panes() {
                    if let Some(pty) = pane.pty() {
                        out.push((pty.master_fd(), (session_id, window_id, pane_id)));
                    }
                }
            }
        }
        out
    }

    fn accept_new_clients(&mut self) {
        loop {
            match self.ipc.accept() {
                Ok(Some(conn)) => {
                    info!("client connected on fd {}", conn.raw_fd());
                    self.clients.insert(conn.raw_fd(), conn);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("accept() failed: {e}");
                    break;
                }
            }
        }
    }

    fn drain_clients(&mut self, pollfds: &[libc::pollfd]) {
        let ready_fds: Vec<RawFd> = pollfds
            .iter()
            .filter(|p| p.revents & libc::POLLIN != 0 && self.clients.contains_key(&p.fd))
            .map(|p| p.fd)
            .collect();

        let mut to_drop = Vec::new();
        for fd in ready_fds {
            let messages = match self.clients.get_mut(&fd) {
                Some(conn) => conn.read_messages(),
                None => continue,
            };
            match messages {
                Ok(messages) => {
                    for message in messages {
                        self.dispatch(fd, message);
                    }
                }
                Err(e) => {
                    debug!("client fd {fd} disconnected: {e}");
                    to_drop.push(fd);
                }
            }
        }
        for fd in to_drop {
            self.clients.remove(&fd);
        }
    }

    fn dispatch(&mut self, client_fd: RawFd, message: Message) {
        let result = self.handle_message(client_fd, message);
        if let Err(e) = result {
            if let Some(conn) = self.clients.get_mut(&client_fd) {
                conn.queue(&Message::Error { code: e.code().as_u16(), message: e.to_string() });
            }
        }
    }

    fn handle_message(&mut self, client_fd: RawFd, message: Message) -> crate::error::Result<()> {
        match message {
            Message::Attach { session_name, rows, cols } => {
                let rect = Rect::new(0, 0, cols, rows);
                let id = match self.manager.find_by_name(&session_name) {
                    Some(id) => id,
                    None => self.create_session(&session_name, rect)?,
                };
                if let Some(conn) = self.clients.get_mut(&client_fd) {
                    conn.attached_session = Some(id);
                }
                self.renderers.entry(id).or_insert_with(|| Renderer::new(RenderConfig::default())).invalidate();
                Ok(())
            }
            Message::Detach => {
                if let Some(conn) = self.clients.get_mut(&client_fd) {
                    conn.attached_session = None;
                }
                Ok(())
            }
            Message::NewSession { name, rows, cols } => {
                let rect = Rect::new(0, 0, cols, rows);
                let id = self.create_session(&name, rect)?;
                if let Some(conn) = self.clients.get_mut(&client_fd) {
                    conn.attached_session = Some(id);
                }
                Ok(())
            }
            Message::NewWindow => {
                let session = self.session_mut_for(client_fd)?;
                session.new_window();
                Ok(())
            }
            Message::SplitPane { direction } => self.split_pane(client_fd, direction),
            Message::KillPane { pane } => {
                let pane_id = PaneId::from_wire(pane);
                let session = self.session_mut_for(client_fd)?;
                let window = session.active_window_mut();
                window.remove_pane(pane_id)
            }
            Message::Resize { rows, cols } => {
                let session = self.session_mut_for(client_fd)?;
                let rect = Rect::new(session.rect().x, session.rect().y, cols, rows);
                session.resize(rect);
                Ok(())
            }
            Message::Input { bytes } => {
                let session = self.session_mut_for(client_fd)?;
                let pane = session.active_window_mut().active_pane();
                if let Some(pty) = pane.pty() {
                    let _ = pty.write(&bytes);
                }
                Ok(())
            }
            Message::ListSessions => {
                let sessions: Vec<SessionSummary> = self
                    .manager
                    .sessions()
                    .map(|(_, s)| {
                        let active_id = s.active_window_id();
                        let index = s.windows().position(|(id, _)| id == active_id).unwrap_or(0);
                        SessionSummary {
                            name: s.name().to_string(),
                            window_count: s.window_count() as u16,
                            active_window: index as u16,
                        }
                    })
                    .collect();
                if let Some(conn) = self.clients.get_mut(&client_fd) {
                    conn.queue(&Message::SessionInfo { sessions });
                }
                Ok(())
            }
            Message::SelectWindow { index } => {
                let session = self.session_mut_for(client_fd)?;
                session.select_window(usize::from(index));
                Ok(())
            }
            Message::SelectPane { pane } => {
                let pane_id = PaneId::from_wire(pane);
                let session = self.session_mut_for(client_fd)?;
                session.active_window_mut().focus_pane(pane_id);
                Ok(())
            }
            Message::RenameSession { name } => {
                let session = self.session_mut_for(client_fd)?;
                session.rename(name);
                Ok(())
            }
            Message::RenameWindow { name } => {
                let session = self.session_mut_for(client_fd)?;
                session.active_window_mut().rename(name);
                Ok(())
            }
            Message::KillSession => {
                let id = self.attached_session(client_fd)?;
                self.manager.kill_session(id);
                self.renderers.remove(&id);
                Ok(())
            }
            Message::KillWindow => {
                let session = self.session_mut_for(client_fd)?;
                let idx = session
                    .windows()
                    .position(|(id, _)| id == session.active_window_id())
                    .unwrap_or(0);
                session.remove_window(idx);
                Ok(())
            }
            Message::Ping => {
                if let Some(conn) = self.clients.get_mut(&client_fd) {
                    conn.queue(&Message::Pong);
                }
                Ok(())
            }
            // Server-originated message types never arrive from a client.
            Message::Output { .. }
            | Message::SessionInfo { .. }
            | Message::Error { .. }
            | Message::SyncState { .. }
            | Message::Pong => Err(MuxError::InvalidMessage("unexpected server-originated message from client".to_string())),
        }
    }

    fn create_session(&mut self, name: &str, rect: Rect) -> crate::error::Result<SessionId> {
        let id = self.manager.create_session(name, rect, self.config.scrollback)?;
        match self.spawn_shell() {
            Ok(pty) => {
                if let Some(session) = self.manager.get_mut(id) {
                    session.active_window_mut().active_pane_mut().attach_pty(pty);
                }
                Ok(id)
            }
            Err(e) => {
                error!("failed to spawn shell for session {name:?}: {e}");
                self.manager.kill_session(id);
                Err(e)
            }
        }
    }

    fn split_pane(&mut self, client_fd: RawFd, direction: SplitDirection) -> crate::error::Result<()> {
        let session_id = self.attached_session(client_fd)?;
        let new_pane_id = {
            let session = self.manager.get_mut(session_id).ok_or(MuxError::NotFound { kind: "session", id: 0 })?;
            session.active_window_mut().split(direction)?
        };
        match self.spawn_shell() {
            Ok(pty) => {
                if let Some(session) = self.manager.get_mut(session_id) {
                    if let Some(pane) = session.active_window_mut().pane_mut(new_pane_id) {
                        pane.attach_pty(pty);
                    }
                }
                Ok(())
            }
            Err(e) => {
                error!("failed to spawn shell for split pane: {e}");
                if let Some(session) = self.manager.get_mut(session_id) {
                    let _ = session.active_window_mut().remove_pane(new_pane_id);
                }
                Err(e)
            }
        }
    }

    fn spawn_shell(&self) -> crate::error::Result<Pty> {
        let handle = Pty::create()?;
        let argv = vec![self.config.shell.clone()];
        Pty::spawn(handle, &argv, &self.config.child_env())
    }

    fn attached_session(&self, client_fd: RawFd) -> crate::error::Result<SessionId> {
        self.clients
            .get(&client_fd)
            .and_then(|c| c.attached_session)
            .ok_or(MuxError::NotFound { kind: "session", id: 0 })
    }

    fn session_mut_for(&mut self, client_fd: RawFd) -> crate::error::Result<&mut Session> {
        let id = self.attached_session(client_fd)?;
        self.manager.get_mut(id).ok_or(MuxError::NotFound { kind: "session", id: 0 })
    }

    fn drain_ptys(&mut self, pollfds: &[libc::pollfd], pane_fds: &[(RawFd, (SessionId, WindowId, PaneId))]) {
        let ready: Vec<(SessionId, WindowId, PaneId)> = pollfds
            .iter()
            .filter(|p| p.revents & libc::POLLIN != 0)
            .filter_map(|p| pane_fds.iter().find(|(fd, _)| *fd == p.fd).map(|(_, ids)| *ids))
            .collect();

        for (session_id, window_id, pane_id) in ready {
            let Some(session) = self.manager.get_mut(session_id) else { continue };
            let Some(window) = session.window_mut(window_id) else { continue };
            let Some(pane) = window.pane_mut(pane_id) else { continue };
            let mut buf = [0u8; 64 * 1024];
            loop {
                let read = match pane.pty() {
                    Some(pty) => pty.read(&mut buf),
                    None => break,
                };
                match read {
                    Ok(0) => break,
                    Ok(n) => pane.feed(&buf[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                    Err(_) => break,
                }
            }
        }
    }

    /// Sweep dead panes, cascading up: a window's last pane dying removes
    /// the window; a session's last window dying kills the session; the
    /// last session dying shuts the server down.
    fn sweep_dead_panes(&mut self) {
        let dead: Vec<(SessionId, crate::session::WindowId, PaneId)> = self
            .manager
            .sessions()
            .flat_map(|(sid, session)| {
                session.windows().flat_map(move |(wid, window)| {
                    window.panes().filter(|(_, p)| p.pty().is_some() && !p.is_alive()).map(move |(pid, _)| (sid, wid, pid))
                })
            })
            .collect();

        for (session_id, window_id, pane_id) in dead {
            let Some(session) = self.manager.get_mut(session_id) else { continue };
            let Some(window) = session.window_mut(window_id) else { continue };
            if window.pane_count() > 1 {
                let _ = window.remove_pane(pane_id);
                continue;
            }
            let window_idx = session.windows().position(|(id, _)| id == window_id).unwrap_or(0);
            if session.window_count() > 1 {
                session.remove_window(window_idx);
                continue;
            }
            if self.manager.session_count() > 1 {
                self.manager.kill_session(session_id);
                self.renderers.remove(&session_id);
            } else {
                self.manager.kill_session(session_id);
                self.quit.store(true, Ordering::Relaxed);
            }
        }
    }

    fn redraw_and_broadcast(&mut self) {
        let session_ids: Vec<SessionId> = self.manager.sessions().map(|(id, _)| id).collect();
        for session_id in session_ids {
            let attached: Vec<RawFd> = self
                .clients
                .iter()
                .filter(|(_, c)| c.attached_session == Some(session_id))
                .map(|(fd, _)| *fd)
                .collect();
            if attached.is_empty() {
                continue;
            }
            let Some(session) = self.manager.get(session_id) else { continue };
            let window = session.active_window();
            let renderer = self.renderers.entry(session_id).or_insert_with(|| Renderer::new(RenderConfig::default()));
            let bytes = renderer.render(window, window.active_pane_id(), session.name(), "");
            if bytes.is_empty() {
                continue;
            }
            for fd in attached {
                if let Some(conn) = self.clients.get_mut(&fd) {
                    conn.queue(&Message::Output { bytes: bytes.clone() });
                }
            }
        }
    }

    fn flush_clients(&mut self) {
        let mut overflowed = Vec::new();
        for (fd, conn) in &mut self.clients {
            if conn.has_pending_output() {
                if let Err(MuxError::ClientOverflow) = conn.flush() {
                    overflowed.push(*fd);
                }
            }
        }
        for fd in overflowed {
            warn!("client fd {fd} overflowed its output queue, disconnecting");
            self.clients.remove(&fd);
        }
    }

    /// Bounded-flush shutdown: drain pending output, notify every client,
    /// kill every live PTY child.
    fn shutdown(&mut self) {
        info!("reactor shutting down");
        for (_, conn) in &mut self.clients {
            conn.queue(&Message::Error { code: ErrorCode::Internal.as_u16(), message: "server shutting down".to_string() });
            let _ = conn.flush();
        }
        for (_, session) in self.manager.sessions() {
            for (_, window) in session.windows() {
                for (_, pane) in window.panes() {
                    pane.close();
                }
            }
        }
    }
}
