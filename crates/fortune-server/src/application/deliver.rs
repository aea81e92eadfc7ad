//! Content delivery: access grants in, fortunes out.
//!
//! The service plays two roles over one session table:
//!
//! - As an [`AccessGrantor`] it binds a fresh token to a client address on
//!   behalf of the authorization service.
//! - As a [`DatagramHandler`] it checks each client's [`ContentRequest`]
//!   against that binding:
//!
//! ```text
//!  not a ContentRequest ─────────────► "could not interpret message"
//!  ContentRequest ──► no grant for sender ───► "unknown remote client address"
//!                 ──► token ≠ granted ───────► "incorrect fortune nonce"
//!                 ──► match ─────────────────► ContentPayload
//! ```
//!
//! Grants are not consumed on use.  A client may fetch the fortune as often as
//! it likes until a new grant for its address replaces the old one.

use std::net::SocketAddr;

use async_trait::async_trait;
use tracing::{debug, info};

use fortune_core::{
    decode, generate_token, AccessGrantor, ContentPayload, ContentRequest, DatagramHandler,
    HandoffError, HandoffGrant, Rejection, ServerReply, SessionTable,
};

/// The content service's request handler and grant issuer.
#[derive(Debug)]
pub struct FortuneService {
    /// Client-facing UDP address reported in every grant.
    content_server: String,
    fortune: String,
    sessions: SessionTable,
}

impl FortuneService {
    pub fn new(content_server: impl Into<String>, fortune: impl Into<String>) -> Self {
        Self {
            content_server: content_server.into(),
            fortune: fortune.into(),
            sessions: SessionTable::new(),
        }
    }

    /// Granted tokens, keyed by client address.
    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Binds a fresh access token to `client_addr`, replacing any earlier one.
    pub fn grant(&self, client_addr: &str) -> HandoffGrant {
        let access_token = generate_token();
        self.sessions.put(client_addr, access_token);
        debug!(client = client_addr, "access granted");
        HandoffGrant {
            content_server: self.content_server.clone(),
            access_token,
        }
    }

    /// Checks `request` against the token granted to `client_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::UnknownClient`] if nothing was granted to
    /// `client_addr` and [`Rejection::TokenMismatch`] if the token differs.
    pub fn deliver(&self, request: &ContentRequest, client_addr: &str) -> Result<ContentPayload, Rejection> {
        let granted = self
            .sessions
            .get(client_addr)
            .ok_or(Rejection::UnknownClient)?;
        if request.access_token != granted {
            return Err(Rejection::TokenMismatch);
        }
        Ok(ContentPayload {
            content: self.fortune.clone(),
        })
    }

    /// Runs the delivery state machine for one datagram.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Malformed`] if `payload` is not a
    /// [`ContentRequest`], otherwise as [`deliver`](Self::deliver).
    pub fn process(&self, payload: &[u8], client_addr: &str) -> Result<ContentPayload, Rejection> {
        let request: ContentRequest = decode(payload).map_err(|_| Rejection::Malformed)?;
        self.deliver(&request, client_addr)
    }
}

#[async_trait]
impl AccessGrantor for FortuneService {
    async fn get_access_grant(&self, client_addr: &str) -> Result<HandoffGrant, HandoffError> {
        Ok(self.grant(client_addr))
    }
}

#[async_trait]
impl DatagramHandler for FortuneService {
    async fn handle(&self, payload: &[u8], peer: SocketAddr) -> Option<ServerReply> {
        let client = peer.to_string();
        let reply = match self.process(payload, &client) {
            Ok(payload) => ServerReply::Content(payload),
            Err(rejection) => {
                info!(%client, "rejected: {rejection}");
                ServerReply::Error(rejection.notice())
            }
        };
        Some(reply)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
