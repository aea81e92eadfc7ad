//! Authorization-side end of the handoff channel.
//!
//! One TCP connection is dialled at startup and shared by every handler task.
//! Requests are written under a lock on the write half; a background reader
//! task routes each response to the waiting caller by request id, so grants
//! for different clients proceed concurrently instead of queueing behind one
//! another.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::frame::{read_frame, write_frame, GrantRequest, GrantResponse};
use super::{AccessGrantor, HandoffError, HandoffGrant, GET_ACCESS_GRANT};

type PendingMap = HashMap<Uuid, oneshot::Sender<GrantResponse>>;

/// Connection state shared between callers and the reader task.
#[derive(Default)]
struct Inflight {
    pending: StdMutex<PendingMap>,
    closed: AtomicBool,
}

impl Inflight {
    fn pending(&self) -> MutexGuard<'_, PendingMap> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the channel dead and wakes every waiting caller.
    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        // Dropping the senders makes each pending `rx.await` fail.
        self.pending().clear();
    }
}

/// Persistent, multiplexed handoff connection to the content service.
pub struct HandoffClient {
    addr: SocketAddr,
    writer: Mutex<OwnedWriteHalf>,
    inflight: Arc<Inflight>,
}

impl HandoffClient {
    /// Dials the content service's control address and starts the response
    /// reader.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError::ConnectFailed`] when the TCP connection cannot
    /// be established.
    pub async fn connect(addr: SocketAddr) -> Result<Self, HandoffError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| HandoffError::ConnectFailed { addr, source })?;
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();

        let inflight = Arc::new(Inflight::default());
        tokio::spawn(read_responses(read_half, Arc::clone(&inflight), addr));

        info!("handoff channel connected to {addr}");
        Ok(Self {
            addr,
            writer: Mutex::new(write_half),
            inflight,
        })
    }

    /// Address of the content service's control channel.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    /// `false` once the content service has closed the channel.
    pub fn is_connected(&self) -> bool {
        !self.inflight.closed.load(Ordering::SeqCst)
    }

    async fn call(&self, request: GrantRequest) -> Result<GrantResponse, HandoffError> {
        let id = request.id;
        let (tx, rx) = oneshot::channel();
        self.inflight.pending().insert(id, tx);

        // `close` sets the flag before clearing the map, so a request that
        // slipped in after the clear is caught here.
        if self.inflight.closed.load(Ordering::SeqCst) {
            self.inflight.pending().remove(&id);
            return Err(HandoffError::ConnectionClosed);
        }

        let sent = {
            let mut writer = self.writer.lock().await;
            write_frame(&mut *writer, &request).await
        };
        if let Err(e) = sent {
            self.inflight.pending().remove(&id);
            return Err(e);
        }

        rx.await.map_err(|_| HandoffError::ConnectionClosed)
    }
}

#[async_trait]
impl AccessGrantor for HandoffClient {
    async fn get_access_grant(&self, client_addr: &str) -> Result<HandoffGrant, HandoffError> {
        let request = GrantRequest {
            id: Uuid::new_v4(),
            method: GET_ACCESS_GRANT.to_string(),
            client_addr: client_addr.to_string(),
        };
        debug!(id = %request.id, client = client_addr, "requesting access grant");
        self.call(request).await?.into_result()
    }
}

/// Routes response frames to waiting callers until the channel closes.
async fn read_responses(mut reader: OwnedReadHalf, inflight: Arc<Inflight>, addr: SocketAddr) {
    loop {
        match read_frame::<_, GrantResponse>(&mut reader).await {
            Ok(Some(response)) => {
                let waiter = inflight.pending().remove(&response.id);
                match waiter {
                    // The caller may have given up; nothing to do then.
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => warn!(id = %response.id, "handoff response for unknown request"),
                }
            }
            Ok(None) => {
                info!("handoff channel to {addr} closed by peer");
                break;
            }
            Err(e) => {
                warn!("handoff channel to {addr} failed: {e}");
                break;
            }
        }
    }
    inflight.close();
}

// ── Tests ─────────────────────────────────────────────────────────────────────
