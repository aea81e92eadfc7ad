//! The handoff: a privileged control-plane call from the authorization
//! service to the content service.
//!
//! ```text
//! fortune-auth                                  fortune-server
//! ────────────                                  ──────────────
//! hash verified for 10.0.0.5:2020
//! GetAccessGrant("10.0.0.5:2020")  ──TCP──►     token = random 63 bits
//!                                               table[10.0.0.5:2020] = token
//!                                  ◄──TCP──     (own UDP address, token)
//! reply HandoffInfo to the client
//! ```
//!
//! The call travels over a reliable, connection-oriented channel that is
//! never exposed on the client-facing UDP port.  [`AccessGrantor`] is the
//! seam: the authorization service only sees the trait, whether the grant
//! comes from the TCP [`client::HandoffClient`] or from an in-process content
//! service.
//!
//! # Sub-modules
//!
//! - **`frame`** – Length-prefixed JSON request/response frames.
//! - **`client`** – One persistent connection shared by all handler tasks;
//!   responses are matched to requests by id.
//! - **`server`** – Accept loop on the content service's control address.

pub mod client;
pub mod frame;
pub mod server;

use std::net::SocketAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Method name carried in every request frame.
pub const GET_ACCESS_GRANT: &str = "GetAccessGrant";

/// A content access grant issued for one client address.
///
/// Forwarded to the client unmodified as a
/// [`HandoffInfo`](crate::protocol::messages::HandoffInfo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffGrant {
    /// The content service's client-facing UDP address.
    #[serde(rename = "FortuneServer", alias = "fortuneServer", alias = "fortuneserver")]
    pub content_server: String,
    /// Token the client must present from the address it was issued for.
    #[serde(rename = "FortuneNonce", alias = "fortuneNonce", alias = "fortunenonce")]
    pub access_token: i64,
}

/// Errors raised on either end of the handoff channel.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The control channel could not be reached.
    #[error("failed to connect to handoff channel at {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred on an established channel.
    #[error("handoff channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame body was not valid JSON for the expected shape.
    #[error("malformed handoff frame: {0}")]
    Codec(#[from] serde_json::Error),

    /// A peer announced a frame longer than [`frame::MAX_FRAME_LEN`].
    #[error("handoff frame of {0} bytes exceeds the limit")]
    FrameTooLarge(usize),

    /// The channel closed before a response arrived.
    #[error("handoff channel closed")]
    ConnectionClosed,

    /// The content service answered with an error.
    #[error("content service refused grant: {0}")]
    Refused(String),
}

/// Issues content access grants on behalf of authenticated clients.
#[async_trait]
pub trait AccessGrantor: Send + Sync {
    /// Allocates a fresh access token bound to `client_addr`.
    async fn get_access_grant(&self, client_addr: &str) -> Result<HandoffGrant, HandoffError>;
}
