use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::http::connection::{Connection, IdleTimeout};

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the configured address and serves until the idle timeout expires.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let addr = cfg.server.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Web server started on {}", addr);

    serve(listener, Arc::new(cfg.clone())).await
}

/// Accept loop. Each connection gets its own task; nothing flows back.
///
/// Returns `Ok` when no connection arrives within the idle timeout. The
/// listener is dropped, and so closed, on every return.
pub async fn serve(listener: TcpListener, cfg: Arc<Config>) -> anyhow::Result<()> {
    let idle = cfg.server.idle_timeout();

    loop {
        let accepted = match timeout(idle, listener.accept()).await {
            Ok(accepted) => accepted,
            Err(_) => {
                info!("Nothing received in {} secs, shutting down", idle.as_secs());
                return Ok(());
            }
        };

        let (socket, peer) = match accepted {
            Ok(pair) => pair,
            Err(e) if listener_is_dead(&e) => {
                error!(error = %e, "Listening socket is no longer usable");
                return Err(e).context("accept failed");
            }
            Err(e) => {
                warn!(error = %e, "Failed to accept connection");
                // Out of descriptors or buffers: give in-flight connections time to finish
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let cfg = Arc::clone(&cfg);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer, cfg);
            match conn.run().await {
                Ok(()) => debug!("Connection from {} closed", peer),
                Err(e) if e.is::<IdleTimeout>() => info!("Connection from {}: {}", peer, e),
                Err(e) => error!("Connection error from {}: {:#}", peer, e),
            }
        });
    }
}

/// Kinds that mean the listening socket itself is broken. Everything else,
/// descriptor exhaustion included, is survivable.
fn listener_is_dead(e: &io::Error) -> bool {
    if matches!(
        e.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::NotConnected | io::ErrorKind::Unsupported
    ) {
        return true;
    }

    // EBADF
    cfg!(unix) && e.raw_os_error() == Some(9)
}
