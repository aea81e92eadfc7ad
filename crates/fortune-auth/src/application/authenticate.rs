//! Authorization use case: nonce challenge, hash verification and handoff.
//!
//! Every inbound datagram is classified by whether it decodes as a
//! [`HashResponse`]:
//!
//! ```text
//!  anything else ──► issue nonce, bind it to the sender ──► NonceChallenge
//!
//!  HashResponse ──► no nonce for sender ───────────────────► "unknown remote client address"
//!               ──► hash ≠ MD5(varint(nonce + secret)) ─────► "unexpected hash value"
//!               ──► match ──► GetAccessGrant(sender) ─ ok ─► HandoffInfo
//!                                                   └ err ─► (no reply)
//! ```
//!
//! A probe can be sent at any time and always replaces the sender's previous
//! nonce, so a hash computed against an older nonce stops verifying.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use fortune_core::{
    decode, generate_token, verify_challenge, AccessGrantor, DatagramHandler, HandoffError,
    HandoffInfo, HashResponse, NonceChallenge, Rejection, ServerReply, SessionTable,
};

/// Why a [`HashResponse`] did not lead to a handoff.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The client is told about this one.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The content service did not grant access; the client hears nothing.
    #[error("handoff failed: {0}")]
    Handoff(#[from] HandoffError),
}

/// The authorization service's request handler.
///
/// Owns the authorization-side session table.  The content service is
/// reached only through the injected [`AccessGrantor`].
pub struct AuthService {
    secret: i64,
    sessions: SessionTable,
    grantor: Arc<dyn AccessGrantor>,
}

impl AuthService {
    pub fn new(secret: i64, grantor: Arc<dyn AccessGrantor>) -> Self {
        Self {
            secret,
            sessions: SessionTable::new(),
            grantor,
        }
    }

    /// Outstanding nonces, keyed by client address.
    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Issues a fresh nonce to `client_addr`, replacing any earlier one.
    pub fn issue_nonce(&self, client_addr: &str) -> NonceChallenge {
        let nonce = generate_token();
        self.sessions.put(client_addr, nonce);
        debug!(client = client_addr, "issued nonce");
        NonceChallenge { nonce }
    }

    /// Checks `response` against the nonce issued to `client_addr` and, on a
    /// match, asks the content service for an access grant.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::Rejected`] with [`Rejection::UnknownClient`] if no
    ///   nonce was issued to `client_addr`.
    /// - [`VerifyError::Rejected`] with [`Rejection::HashMismatch`] if the
    ///   hash is wrong.
    /// - [`VerifyError::Handoff`] if the grant call fails.
    pub async fn verify(
        &self,
        response: &HashResponse,
        client_addr: &str,
    ) -> Result<HandoffInfo, VerifyError> {
        // The table lock is released here, before the handoff call.
        let nonce = self
            .sessions
            .get(client_addr)
            .ok_or(Rejection::UnknownClient)?;

        if !verify_challenge(nonce, self.secret, &response.hash) {
            return Err(Rejection::HashMismatch.into());
        }

        let grant = self.grantor.get_access_grant(client_addr).await?;
        Ok(grant.into())
    }

    /// Runs the state machine for one datagram.
    ///
    /// # Errors
    ///
    /// See [`verify`](Self::verify).  A datagram that is not a
    /// [`HashResponse`] never fails: it is a probe.
    pub async fn process(&self, payload: &[u8], client_addr: &str) -> Result<ServerReply, VerifyError> {
        match decode::<HashResponse>(payload) {
            Ok(response) => self
                .verify(&response, client_addr)
                .await
                .map(ServerReply::Handoff),
            Err(_) => Ok(ServerReply::Nonce(self.issue_nonce(client_addr))),
        }
    }
}

#[async_trait]
impl DatagramHandler for AuthService {
    async fn handle(&self, payload: &[u8], peer: SocketAddr) -> Option<ServerReply> {
        let client = peer.to_string();
        match self.process(payload, &client).await {
            Ok(reply) => Some(reply),
            Err(VerifyError::Rejected(rejection)) => {
                info!(%client, "rejected: {rejection}");
                Some(ServerReply::Error(rejection.notice()))
            }
            Err(VerifyError::Handoff(e)) => {
                warn!(%client, "dropping authenticated request, no grant: {e}");
                None
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
