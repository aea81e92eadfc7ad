//! Process wiring: binds the client-facing UDP socket, dials the handoff
//! channel and runs the datagram loop.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::info;

use fortune_core::handoff::client::HandoffClient;
use fortune_core::{serve_datagrams, AccessGrantor, HandoffError};

use crate::application::authenticate::AuthService;
use crate::config::AuthConfig;

/// Setup and runtime failures of the authorization service process.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to bind UDP {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The content service's handoff channel could not be dialled.
    #[error(transparent)]
    Handoff(#[from] HandoffError),

    #[error("datagram service failed: {0}")]
    Io(#[from] io::Error),
}

/// A bound, ready-to-run authorization service.
pub struct AuthServer {
    socket: Arc<UdpSocket>,
    service: Arc<AuthService>,
}

impl AuthServer {
    /// Dials the content service, then binds the client-facing socket.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Handoff`] if the handoff channel is unreachable
    /// and [`AuthError::Bind`] if the UDP address cannot be bound.
    pub async fn bind(config: &AuthConfig) -> Result<Self, AuthError> {
        let grantor = HandoffClient::connect(config.content_control_addr).await?;
        info!("handoff channel connected to {}", grantor.peer_addr());
        Self::with_grantor(config.listen_addr, config.secret, Arc::new(grantor)).await
    }

    /// Binds the client-facing socket with an already established grantor.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Bind`] if the UDP address cannot be bound.
    pub async fn with_grantor(
        listen_addr: SocketAddr,
        secret: i64,
        grantor: Arc<dyn AccessGrantor>,
    ) -> Result<Self, AuthError> {
        let socket = UdpSocket::bind(listen_addr)
            .await
            .map_err(|source| AuthError::Bind {
                addr: listen_addr,
                source,
            })?;
        Ok(Self {
            socket: Arc::new(socket),
            service: Arc::new(AuthService::new(secret, grantor)),
        })
    }

    /// The address actually bound; differs from the configured one for port 0.
    ///
    /// # Errors
    ///
    /// Propagates the socket's `local_addr` error.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// The request handler, shared with the datagram loop once running.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }

    /// Serves clients until `running` is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Io`] if the socket fails before the loop starts.
    pub async fn run(self, running: Arc<AtomicBool>) -> Result<(), AuthError> {
        info!("authorization service ready");
        serve_datagrams(self.socket, self.service, running).await?;
        Ok(())
    }
}
