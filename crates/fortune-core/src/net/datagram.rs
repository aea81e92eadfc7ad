//! Client-facing datagram service loop.
//!
//! Both services speak to clients over UDP.  The loop below owns the socket's
//! receive side; every datagram is copied out of the receive buffer and handed
//! to a freshly spawned task, so the loop itself never waits on request
//! processing (session-table locks, the handoff call, the reply send).
//!
//! # Read timeout
//!
//! `recv_from` is wrapped in a 200 ms timeout.  On each timeout the loop
//! re-checks the `running` flag; once the process is shutting down the loop
//! exits cleanly.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::protocol::codec::encode;
use crate::protocol::messages::{ServerReply, MAX_REQUEST_SIZE};

/// How often the receive loop re-checks the shutdown flag.
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Handles one inbound datagram.
///
/// Returning `None` sends nothing back to the client.
#[async_trait]
pub trait DatagramHandler: Send + Sync + 'static {
    async fn handle(&self, payload: &[u8], peer: SocketAddr) -> Option<ServerReply>;
}

/// Runs the receive loop on `socket` until `running` is cleared.
///
/// # Errors
///
/// Returns an I/O error only if the socket has no local address; receive and
/// send errors on individual datagrams are logged and skipped.
pub async fn serve_datagrams<H: DatagramHandler>(
    socket: Arc<UdpSocket>,
    handler: Arc<H>,
    running: Arc<AtomicBool>,
) -> std::io::Result<()> {
    let local = socket.local_addr()?;
    let mut buf = vec![0u8; MAX_REQUEST_SIZE];
    info!("accepting datagrams on UDP {local}");

    while running.load(Ordering::Relaxed) {
        let (len, peer) = match timeout(RECV_POLL_INTERVAL, socket.recv_from(&mut buf)).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                // e.g. ICMP port unreachable surfacing as ConnectionReset on Windows.
                warn!("recv error on UDP {local}: {e}");
                continue;
            }
            Err(_) => continue,
        };

        debug!(%peer, bytes = len, "datagram received on {local}");
        let payload = buf[..len].to_vec();
        let socket = Arc::clone(&socket);
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            respond(&socket, &*handler, &payload, peer).await;
        });
    }

    info!("datagram service on UDP {local} stopped");
    Ok(())
}

async fn respond<H: DatagramHandler>(socket: &UdpSocket, handler: &H, payload: &[u8], peer: SocketAddr) {
    let Some(reply) = handler.handle(payload, peer).await else {
        return;
    };

    let bytes = match encode(&reply) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("failed to encode {} reply for {peer}: {e}", reply.kind());
            return;
        }
    };

    match socket.send_to(&bytes, peer).await {
        Ok(_) => debug!(%peer, kind = reply.kind(), "reply sent"),
        Err(e) => warn!("failed to send {} reply to {peer}: {e}", reply.kind()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
