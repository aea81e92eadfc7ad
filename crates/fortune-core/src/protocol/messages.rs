//! All client-facing message shapes.
//!
//! Every datagram carries exactly one JSON object and no type tag.  The
//! receiver decides what a datagram *is* by attempting to decode it as the
//! shape it expects at the current protocol step.  Field names are PascalCase
//! on the wire so existing deployments keep interoperating:
//!
//! | Message            | Wire form                                           |
//! |--------------------|-----------------------------------------------------|
//! | [`Probe`]          | `{}` (any payload that is not a [`HashResponse`])   |
//! | [`NonceChallenge`] | `{"Nonce":8675309}`                                 |
//! | [`HashResponse`]   | `{"Hash":"9e107d9d372bb6826bd81d3542a419d6"}`       |
//! | [`HandoffInfo`]    | `{"FortuneServer":"127.0.0.1:7071","FortuneNonce":7}` |
//! | [`ContentRequest`] | `{"FortuneNonce":7}`                                |
//! | [`ContentPayload`] | `{"Fortune":"seize the day"}`                       |
//! | [`ErrorNotice`]    | `{"Error":"unexpected hash value"}`                 |
//!
//! Replies always use the PascalCase names.  On decode each field also accepts
//! its lowercase and camelCase spelling, since peers in the existing
//! deployment match field names without regard to case.

use serde::{Deserialize, Serialize};

use crate::handoff::HandoffGrant;

/// Upper bound on an inbound request datagram accepted by either service.
pub const MAX_REQUEST_SIZE: usize = 1024;

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

// ── Client → authorization service ────────────────────────────────────────────

/// PROBE: opens (or restarts) an authentication attempt.
///
/// The authorization service treats any datagram that fails to decode as a
/// [`HashResponse`] as a probe, so the body is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {}

/// HASH_RESPONSE: the client's answer to a [`NonceChallenge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HashResponse {
    /// Lowercase hex MD5 digest of `varint(nonce + secret)`.
    #[serde(alias = "hash", alias = "HASH")]
    pub hash: String,
}

// ── Authorization service → client ────────────────────────────────────────────

/// NONCE_CHALLENGE: the nonce the client must fold into its hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NonceChallenge {
    #[serde(alias = "nonce", alias = "NONCE")]
    pub nonce: i64,
}

/// HANDOFF_INFO: where to fetch the fortune and which token to present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffInfo {
    /// UDP address of the content service, as configured on that service.
    #[serde(rename = "FortuneServer", alias = "fortuneServer", alias = "fortuneserver")]
    pub content_server: String,
    /// Access token bound to the client's address by the content service.
    #[serde(rename = "FortuneNonce", alias = "fortuneNonce", alias = "fortunenonce")]
    pub access_token: i64,
}

impl From<HandoffGrant> for HandoffInfo {
    fn from(grant: HandoffGrant) -> Self {
        Self {
            content_server: grant.content_server,
            access_token: grant.access_token,
        }
    }
}

// ── Client ↔ content service ──────────────────────────────────────────────────

/// CONTENT_REQUEST: presents the access token from [`HandoffInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    #[serde(rename = "FortuneNonce", alias = "fortuneNonce", alias = "fortunenonce")]
    pub access_token: i64,
}

/// CONTENT_PAYLOAD: the fortune itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPayload {
    #[serde(rename = "Fortune", alias = "fortune")]
    pub content: String,
}

// ── Either service → client ───────────────────────────────────────────────────

/// ERROR: a request was rejected.  Always terminal for that request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    #[serde(rename = "Error", alias = "error")]
    pub message: String,
}

impl ErrorNotice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Any reply a service can send back to a client.
///
/// Serialized untagged, so each variant goes on the wire exactly as its inner
/// message would on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServerReply {
    Nonce(NonceChallenge),
    Handoff(HandoffInfo),
    Content(ContentPayload),
    Error(ErrorNotice),
}

impl ServerReply {
    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerReply::Nonce(_) => "nonce",
            ServerReply::Handoff(_) => "handoff",
            ServerReply::Content(_) => "content",
            ServerReply::Error(_) => "error",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_challenge_uses_pascal_case_field() {
        // Arrange
        let msg = NonceChallenge { nonce: 42 };

        // Act
        let json = serde_json::to_string(&msg).unwrap();

        // Assert
        assert_eq!(json, r#"{"Nonce":42}"#);
    }

    #[test]
    fn test_handoff_info_wire_field_names() {
        let msg = HandoffInfo {
            content_server: "127.0.0.1:7071".to_string(),
            access_token: 7,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"FortuneServer":"127.0.0.1:7071","FortuneNonce":7}"#);
    }

    #[test]
    fn test_probe_serializes_as_empty_object() {
        assert_eq!(serde_json::to_string(&Probe {}).unwrap(), "{}");
    }

    #[test]
    fn test_server_reply_is_untagged_on_the_wire() {
        // Arrange
        let reply = ServerReply::Error(ErrorNotice::new("unexpected hash value"));

        // Act
        let json = serde_json::to_string(&reply).unwrap();

        // Assert – identical to the bare ErrorNotice
        assert_eq!(json, r#"{"Error":"unexpected hash value"}"#);
    }

    #[test]
    fn test_handoff_info_from_grant_keeps_fields_verbatim() {
        let grant = HandoffGrant {
            content_server: "10.0.0.9:9000".to_string(),
            access_token: i64::MAX,
        };
        let info = HandoffInfo::from(grant);
        assert_eq!(info.content_server, "10.0.0.9:9000");
        assert_eq!(info.access_token, i64::MAX);
    }

    #[test]
    fn test_server_reply_kind_labels() {
        assert_eq!(ServerReply::Nonce(NonceChallenge { nonce: 1 }).kind(), "nonce");
        assert_eq!(
            ServerReply::Content(ContentPayload {
                content: String::new()
            })
            .kind(),
            "content"
        );
    }

    #[test]
    fn test_field_names_decode_regardless_of_case() {
        // Arrange
        let hash = r#"{"hash":"00ff"}"#;
        let nonce = r#"{"nonce":9}"#;
        let info = r#"{"fortuneServer":"127.0.0.1:7071","fortunenonce":3}"#;
        let error = r#"{"error":"incorrect fortune nonce"}"#;

        // Act
        let hash: HashResponse = serde_json::from_str(hash).unwrap();
        let nonce: NonceChallenge = serde_json::from_str(nonce).unwrap();
        let info: HandoffInfo = serde_json::from_str(info).unwrap();
        let error: ErrorNotice = serde_json::from_str(error).unwrap();

        // Assert
        assert_eq!(hash.hash, "00ff");
        assert_eq!(nonce.nonce, 9);
        assert_eq!(info.content_server, "127.0.0.1:7071");
        assert_eq!(info.access_token, 3);
        assert_eq!(error.message, "incorrect fortune nonce");
    }

    #[test]
    fn test_lowercase_input_still_encodes_pascal_case() {
        let request: ContentRequest = serde_json::from_str(r#"{"fortuneNonce":12}"#).unwrap();
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"FortuneNonce":12}"#);
    }
}
