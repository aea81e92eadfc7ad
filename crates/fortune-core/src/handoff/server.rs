//! Content-side end of the handoff channel: the control-plane accept loop.
//!
//! Binds nowhere itself; the caller passes an already-bound listener so the
//! bind failure stays a setup error in `main`.  Each accepted connection gets
//! its own task, and each request on a connection is answered from its own
//! task, so a slow grant never holds up the next one.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::frame::{read_frame, write_frame, GrantRequest, GrantResponse};
use super::{AccessGrantor, GET_ACCESS_GRANT};

/// How often the accept loop re-checks the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Responses from concurrent request tasks interleave on one write half.
type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Accepts handoff connections until `running` is cleared.
pub async fn serve_handoff<G>(listener: TcpListener, grantor: Arc<G>, running: Arc<AtomicBool>)
where
    G: AccessGrantor + 'static,
{
    match listener.local_addr() {
        Ok(addr) => info!("handoff channel listening on {addr}"),
        Err(e) => warn!("handoff listener has no local address: {e}"),
    }

    while running.load(Ordering::Relaxed) {
        match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                info!("handoff connection from {peer}");
                let grantor = Arc::clone(&grantor);
                tokio::spawn(async move {
                    handle_connection(stream, peer, grantor).await;
                });
            }
            Ok(Err(e)) => error!("handoff accept error: {e}"),
            Err(_) => {}
        }
    }

    info!("handoff channel stopped");
}

/// Reads request frames from one connection until it closes.
async fn handle_connection<G>(stream: TcpStream, peer: SocketAddr, grantor: Arc<G>)
where
    G: AccessGrantor + 'static,
{
    if let Err(e) = stream.set_nodelay(true) {
        debug!("set_nodelay failed for {peer}: {e}");
    }
    let (mut reader, writer) = stream.into_split();
    let writer: SharedWriter = Arc::new(Mutex::new(writer));

    loop {
        let request: GrantRequest = match read_frame(&mut reader).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                info!("handoff connection from {peer} closed");
                break;
            }
            Err(e) => {
                // Without a readable frame there is no id to answer to.
                warn!("dropping handoff connection from {peer}: {e}");
                break;
            }
        };

        let grantor = Arc::clone(&grantor);
        let writer = Arc::clone(&writer);
        tokio::spawn(async move {
            let response = answer(&*grantor, request).await;
            let mut writer = writer.lock().await;
            if let Err(e) = write_frame(&mut *writer, &response).await {
                warn!("failed to send handoff response to {peer}: {e}");
            }
        });
    }
}

async fn answer<G: AccessGrantor + ?Sized>(grantor: &G, request: GrantRequest) -> GrantResponse {
    if request.method != GET_ACCESS_GRANT {
        warn!(method = %request.method, "unknown handoff method");
        return GrantResponse::refused(request.id, format!("unknown method: {}", request.method));
    }
    match grantor.get_access_grant(&request.client_addr).await {
        Ok(grant) => GrantResponse::granted(request.id, grant),
        Err(e) => GrantResponse::refused(request.id, e.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
