//! Terminal multiplexer server: binds the control socket and runs the
//! reactor until a client tears down the last session or a signal arrives.

use mimalloc::MiMalloc;

use terminal_mux::config::{remove_stale_socket, Config};
use terminal_mux::ipc::IpcServer;
use terminal_mux::reactor::Reactor;

/// mimalloc provides better allocation performance than the system
/// allocator for this daemon's churn of small per-cell, per-frame buffers.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    remove_stale_socket(&config.socket_path);
    log::info!("binding control socket at {}", config.socket_path.display());

    let server = IpcServer::bind(&config.socket_path)?;
    let reactor = Reactor::new(server, config);
    reactor.run()?;

    Ok(())
}
