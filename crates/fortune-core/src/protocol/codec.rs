//! JSON codec for client-facing datagrams.
//!
//! One datagram holds one JSON object.  Decoding ignores fields the target
//! shape does not know about, but a missing required field, a field of the
//! wrong JSON type, trailing garbage or non-JSON bytes are all decode
//! failures.  Callers rely on that: "does this decode as X" is how a message
//! is recognised.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors that can occur while encoding or decoding a datagram.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The datagram is not valid JSON for the requested shape.
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The value could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Encodes a message into the bytes of a single datagram.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use fortune_core::{encode, NonceChallenge};
///
/// let bytes = encode(&NonceChallenge { nonce: 5 }).unwrap();
/// assert_eq!(bytes, br#"{"Nonce":5}"#);
/// ```
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(msg).map_err(CodecError::Encode)
}

/// Decodes a datagram as the shape `T`.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if `bytes` is not a `T`.
///
/// # Examples
///
/// ```rust
/// use fortune_core::{decode, HashResponse};
///
/// let msg: HashResponse = decode(br#"{"Hash":"00ff"}"#).unwrap();
/// assert_eq!(msg.hash, "00ff");
/// assert!(decode::<HashResponse>(b"{}").is_err());
/// ```
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Malformed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{
        ContentRequest, ErrorNotice, HandoffInfo, HashResponse, NonceChallenge, Probe,
    };

    #[test]
    fn test_probe_does_not_decode_as_hash_response() {
        // Arrange
        let bytes = encode(&Probe {}).unwrap();

        // Act
        let result = decode::<HashResponse>(&bytes);

        // Assert
        assert!(result.is_err(), "a probe must never be mistaken for a hash");
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let msg: ContentRequest = decode(br#"{"FortuneNonce":12,"Extra":"x"}"#).unwrap();
        assert_eq!(msg.access_token, 12);
    }

    #[test]
    fn test_decode_rejects_wrong_field_type() {
        let result = decode::<ContentRequest>(br#"{"FortuneNonce":"12"}"#);
        assert!(matches!(result, Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_garbage_bytes() {
        let garbage = [0xFFu8, 0x00, 0x13, 0x37, b'{'];
        assert!(decode::<ContentRequest>(&garbage).is_err());
        assert!(decode::<HashResponse>(&garbage).is_err());
    }

    #[test]
    fn test_decode_rejects_empty_datagram() {
        assert!(decode::<NonceChallenge>(&[]).is_err());
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        assert!(decode::<NonceChallenge>(br#"{"Nonce":1}xyz"#).is_err());
    }

    #[test]
    fn test_error_notice_is_not_a_handoff_info() {
        // The client relies on this to tell a rejection apart from a grant.
        let bytes = encode(&ErrorNotice::new("unexpected hash value")).unwrap();
        assert!(decode::<HandoffInfo>(&bytes).is_err());
        let notice: ErrorNotice = decode(&bytes).unwrap();
        assert_eq!(notice.message, "unexpected hash value");
    }

    #[test]
    fn test_nonce_extremes_survive_encoding() {
        for nonce in [0, 1, i64::MAX, i64::MIN] {
            let bytes = encode(&NonceChallenge { nonce }).unwrap();
            let decoded: NonceChallenge = decode(&bytes).unwrap();
            assert_eq!(decoded.nonce, nonce);
        }
    }
}
