//! Process wiring: binds the control listener and the client-facing socket,
//! then runs the handoff acceptor next to the datagram loop.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, UdpSocket};
use tracing::{info, warn};

use fortune_core::handoff::server::serve_handoff;
use fortune_core::serve_datagrams;

use crate::application::deliver::FortuneService;
use crate::config::ContentConfig;

/// Setup and runtime failures of the content service process.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to bind handoff channel on TCP {addr}: {source}")]
    BindControl {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind UDP {addr}: {source}")]
    BindListen {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("datagram service failed: {0}")]
    Io(#[from] io::Error),
}

/// A bound, ready-to-run content service.
pub struct ContentServer {
    control: TcpListener,
    socket: Arc<UdpSocket>,
    service: Arc<FortuneService>,
}

impl ContentServer {
    /// Binds both endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::BindControl`] or [`ContentError::BindListen`]
    /// when an address cannot be bound.
    pub async fn bind(config: &ContentConfig) -> Result<Self, ContentError> {
        let control = TcpListener::bind(config.control_addr)
            .await
            .map_err(|source| ContentError::BindControl {
                addr: config.control_addr,
                source,
            })?;
        let socket = UdpSocket::bind(config.listen_addr)
            .await
            .map_err(|source| ContentError::BindListen {
                addr: config.listen_addr,
                source,
            })?;

        let advertised = match &config.advertise {
            Some(addr) => addr.clone(),
            None => socket.local_addr()?.to_string(),
        };
        info!("granting access to content at {advertised}");

        Ok(Self {
            control,
            socket: Arc::new(socket),
            service: Arc::new(FortuneService::new(advertised, config.fortune.clone())),
        })
    }

    /// Bound UDP address for client requests.
    ///
    /// # Errors
    ///
    /// Propagates the socket's `local_addr` error.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Bound TCP address of the handoff channel.
    ///
    /// # Errors
    ///
    /// Propagates the listener's `local_addr` error.
    pub fn control_addr(&self) -> io::Result<SocketAddr> {
        self.control.local_addr()
    }

    /// Shared with both the handoff acceptor and the datagram loop.
    pub fn service(&self) -> &Arc<FortuneService> {
        &self.service
    }

    /// Serves grants and clients until `running` is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Io`] if the UDP socket fails before the loop
    /// starts.
    pub async fn run(self, running: Arc<AtomicBool>) -> Result<(), ContentError> {
        let acceptor = tokio::spawn(serve_handoff(
            self.control,
            Arc::clone(&self.service),
            Arc::clone(&running),
        ));

        info!("content service ready");
        let served = serve_datagrams(self.socket, self.service, Arc::clone(&running)).await;

        // The acceptor watches the same flag.
        running.store(false, Ordering::Relaxed);
        if let Err(e) = acceptor.await {
            warn!("handoff acceptor ended abnormally: {e}");
        }
        served.map_err(ContentError::from)
    }
}
