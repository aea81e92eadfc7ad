//! Client protocol driver.
//!
//! Strictly sequential: each step sends one datagram and waits for one reply
//! before the next step starts.  Every step runs on the same UDP socket, so
//! the content service sees the address the access grant was bound to.
//!
//! # Read timeout
//!
//! [`ReadTimeout::Forever`] waits indefinitely for each reply: a lost
//! datagram stalls the run.  [`ReadTimeout::After`] bounds every wait and
//! fails the run with [`ClientError::Timeout`] instead.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, info};

use fortune_core::{
    challenge_hash, decode, encode, CodecError, ContentPayload, ContentRequest, ErrorNotice,
    HandoffInfo, HashResponse, NonceChallenge, Probe, MAX_DATAGRAM_SIZE,
};

use crate::config::ClientConfig;

/// How long to wait for each reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadTimeout {
    #[default]
    Forever,
    After(Duration),
}

/// The protocol round trip a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Probe → nonce.
    Challenge,
    /// Hash → handoff info.
    Authenticate,
    /// Access token → fortune.
    Fetch,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Challenge => "nonce challenge",
            Step::Authenticate => "authentication",
            Step::Fetch => "fortune fetch",
        })
    }
}

/// Why a run failed.  Every variant ends the run; nothing is retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to bind UDP {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("network error during {step}: {source}")]
    Io {
        step: Step,
        #[source]
        source: io::Error,
    },

    #[error("no reply during {step}")]
    Timeout { step: Step },

    /// The service answered with an error notice.
    #[error("{step} rejected: {message}")]
    Rejected { step: Step, message: String },

    /// The reply was neither the expected message nor an error notice.
    #[error("unexpected reply during {step}")]
    UnexpectedReply { step: Step },

    #[error("content server address '{addr}' does not resolve")]
    ContentAddress { addr: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// One client socket and its timeout policy.
pub struct FortuneClient {
    socket: UdpSocket,
    read_timeout: ReadTimeout,
}

impl FortuneClient {
    /// Binds the client socket.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Bind`] if `local_addr` cannot be bound.
    pub async fn bind(local_addr: SocketAddr, read_timeout: ReadTimeout) -> Result<Self, ClientError> {
        let socket = UdpSocket::bind(local_addr)
            .await
            .map_err(|source| ClientError::Bind {
                addr: local_addr,
                source,
            })?;
        Ok(Self {
            socket,
            read_timeout,
        })
    }

    /// Address the services see this client as.
    ///
    /// # Errors
    ///
    /// Propagates the socket's `local_addr` error.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Step 1: probes the authorization service for a nonce.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] for [`Step::Challenge`].
    pub async fn request_nonce(&self, auth_addr: SocketAddr) -> Result<i64, ClientError> {
        let challenge: NonceChallenge = self
            .exchange(auth_addr, &Probe {}, Step::Challenge)
            .await?;
        debug!("received nonce");
        Ok(challenge.nonce)
    }

    /// Step 2: answers the challenge and receives the handoff.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] for [`Step::Authenticate`]; a wrong secret shows up
    /// as [`ClientError::Rejected`].
    pub async fn authenticate(
        &self,
        auth_addr: SocketAddr,
        nonce: i64,
        secret: i64,
    ) -> Result<HandoffInfo, ClientError> {
        let response = HashResponse {
            hash: challenge_hash(nonce, secret),
        };
        let info: HandoffInfo = self
            .exchange(auth_addr, &response, Step::Authenticate)
            .await?;
        info!("authenticated, content server is {}", info.content_server);
        Ok(info)
    }

    /// Step 3: presents the access token and receives the fortune.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] for [`Step::Fetch`], or
    /// [`ClientError::ContentAddress`] if the advertised address does not
    /// resolve.
    pub async fn fetch(&self, info: &HandoffInfo) -> Result<String, ClientError> {
        let content_addr = lookup_host(info.content_server.as_str())
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ClientError::ContentAddress {
                addr: info.content_server.clone(),
            })?;
        let request = ContentRequest {
            access_token: info.access_token,
        };
        let payload: ContentPayload = self.exchange(content_addr, &request, Step::Fetch).await?;
        Ok(payload.content)
    }

    /// Sends `message` to `peer` and decodes the single reply as `T`.
    async fn exchange<M, T>(&self, peer: SocketAddr, message: &M, step: Step) -> Result<T, ClientError>
    where
        M: Serialize,
        T: DeserializeOwned,
    {
        let io_err = |source: io::Error| ClientError::Io { step, source };

        // Connecting filters out datagrams from anyone but `peer`.
        self.socket.connect(peer).await.map_err(io_err)?;
        self.socket.send(&encode(message)?).await.map_err(io_err)?;

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let len = match self.read_timeout {
            ReadTimeout::Forever => self.socket.recv(&mut buf).await.map_err(io_err)?,
            ReadTimeout::After(limit) => tokio::time::timeout(limit, self.socket.recv(&mut buf))
                .await
                .map_err(|_| ClientError::Timeout { step })?
                .map_err(io_err)?,
        };
        debug!(%peer, bytes = len, "reply received during {step}");

        interpret(&buf[..len], step)
    }
}

/// Decodes a reply as the expected shape, falling back to an error notice.
fn interpret<T: DeserializeOwned>(reply: &[u8], step: Step) -> Result<T, ClientError> {
    if let Ok(expected) = decode::<T>(reply) {
        return Ok(expected);
    }
    match decode::<ErrorNotice>(reply) {
        Ok(notice) => Err(ClientError::Rejected {
            step,
            message: notice.message,
        }),
        Err(_) => Err(ClientError::UnexpectedReply { step }),
    }
}

/// Runs all three steps and returns the fortune.
///
/// # Errors
///
/// The first [`ClientError`] any step produces.
pub async fn run_protocol(config: &ClientConfig) -> Result<String, ClientError> {
    let client = FortuneClient::bind(config.local_addr, config.read_timeout).await?;
    let nonce = client.request_nonce(config.auth_addr).await?;
    let info = client
        .authenticate(config.auth_addr, nonce, config.secret)
        .await?;
    client.fetch(&info).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_accepts_expected_shape() {
        let nonce: NonceChallenge = interpret(br#"{"Nonce":5}"#, Step::Challenge).unwrap();
        assert_eq!(nonce.nonce, 5);
    }

    #[test]
    fn test_interpret_surfaces_error_notice() {
        // Act
        let result = interpret::<HandoffInfo>(br#"{"Error":"unexpected hash value"}"#, Step::Authenticate);

        // Assert
        match result {
            Err(ClientError::Rejected { step, message }) => {
                assert_eq!(step, Step::Authenticate);
                assert_eq!(message, "unexpected hash value");
            }
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_interpret_flags_other_shapes() {
        // A nonce where a handoff was expected.
        let result = interpret::<HandoffInfo>(br#"{"Nonce":1}"#, Step::Authenticate);
        assert!(matches!(
            result,
            Err(ClientError::UnexpectedReply {
                step: Step::Authenticate
            })
        ));
    }

    #[test]
    fn test_step_display_names() {
        assert_eq!(Step::Challenge.to_string(), "nonce challenge");
        assert_eq!(Step::Fetch.to_string(), "fortune fetch");
    }

    #[test]
    fn test_timeout_error_message_names_step() {
        let err = ClientError::Timeout {
            step: Step::Authenticate,
        };
        assert_eq!(err.to_string(), "no reply during authentication");
    }

    #[tokio::test]
    async fn test_bounded_timeout_fires_against_silent_peer() {
        // Arrange: a bound socket that never answers.
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let client = FortuneClient::bind(
            "127.0.0.1:0".parse().unwrap(),
            ReadTimeout::After(Duration::from_millis(100)),
        )
        .await
        .unwrap();

        // Act
        let result = client.request_nonce(silent.local_addr().unwrap()).await;

        // Assert
        assert!(matches!(
            result,
            Err(ClientError::Timeout {
                step: Step::Challenge
            })
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_unresolvable_content_address() {
        let client = FortuneClient::bind("127.0.0.1:0".parse().unwrap(), ReadTimeout::Forever)
            .await
            .unwrap();
        let info = HandoffInfo {
            content_server: "not an address".to_string(),
            access_token: 1,
        };

        let result = client.fetch(&info).await;

        assert!(matches!(result, Err(ClientError::ContentAddress { .. })));
    }
}
