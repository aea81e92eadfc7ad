//! Framing for the handoff channel.
//!
//! Wire format:
//! ```text
//! [body_len:4 (big-endian u32)][body:body_len bytes of JSON]
//! ```
//!
//! A request names the method and the client address; the response echoes
//! the request id and carries either a grant or an error string:
//!
//! ```json
//! {"id":"4f0c…","method":"GetAccessGrant","client_addr":"10.0.0.5:2020"}
//! {"id":"4f0c…","grant":{"FortuneServer":"10.0.0.1:7071","FortuneNonce":42}}
//! {"id":"4f0c…","error":"unknown method: Shutdown"}
//! ```

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

use super::{HandoffError, HandoffGrant};

/// Size of the length prefix.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Largest frame body either side will read or write.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Request frame sent by the authorization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    /// Correlates the response with this request.
    pub id: Uuid,
    pub method: String,
    pub client_addr: String,
}

/// Response frame sent by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantResponse {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant: Option<HandoffGrant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GrantResponse {
    pub fn granted(id: Uuid, grant: HandoffGrant) -> Self {
        Self {
            id,
            grant: Some(grant),
            error: None,
        }
    }

    pub fn refused(id: Uuid, error: impl Into<String>) -> Self {
        Self {
            id,
            grant: None,
            error: Some(error.into()),
        }
    }

    /// Converts the frame into the caller-facing result.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError::Refused`] when the frame carries no grant.
    pub fn into_result(self) -> Result<HandoffGrant, HandoffError> {
        match (self.grant, self.error) {
            (Some(grant), _) => Ok(grant),
            (None, Some(error)) => Err(HandoffError::Refused(error)),
            (None, None) => Err(HandoffError::Refused("empty response".to_string())),
        }
    }
}

/// Writes one frame.
///
/// # Errors
///
/// Returns [`HandoffError::FrameTooLarge`] if the encoded body exceeds
/// [`MAX_FRAME_LEN`], or an I/O / codec error.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> Result<(), HandoffError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(msg)?;
    if body.len() > MAX_FRAME_LEN {
        return Err(HandoffError::FrameTooLarge(body.len()));
    }
    let mut buf = Vec::with_capacity(LEN_PREFIX_SIZE + body.len());
    buf.extend_from_slice(&(body.len() as u32).to_be_bytes());
    buf.extend_from_slice(&body);
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame.
///
/// Returns `Ok(None)` when the peer closed the stream cleanly between frames,
/// that is before any byte of the next length prefix arrived.
///
/// # Errors
///
/// Returns [`HandoffError::FrameTooLarge`] for an oversized length prefix,
/// [`HandoffError::Codec`] for a body of the wrong shape, or an I/O error
/// (including EOF in the middle of a frame).
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, HandoffError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut prefix = [0u8; LEN_PREFIX_SIZE];
    let mut filled = 0;
    while filled < LEN_PREFIX_SIZE {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            // Only a close before the first prefix byte is clean.
            if filled == 0 {
                return Ok(None);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("stream closed after {filled} of {LEN_PREFIX_SIZE} length prefix bytes"),
            )
            .into());
        }
        filled += n;
    }

    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_LEN {
        return Err(HandoffError::FrameTooLarge(len));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(serde_json::from_slice(&body)?))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> GrantRequest {
        GrantRequest {
            id: Uuid::new_v4(),
            method: crate::handoff::GET_ACCESS_GRANT.to_string(),
            client_addr: "10.0.0.5:2020".to_string(),
        }
    }

    #[tokio::test]
    async fn test_frame_carries_request_across_a_stream() {
        // Arrange
        let (mut a, mut b) = tokio::io::duplex(1024);
        let request = sample_request();

        // Act
        write_frame(&mut a, &request).await.unwrap();
        let received: Option<GrantRequest> = read_frame(&mut b).await.unwrap();

        // Assert
        assert_eq!(received, Some(request));
    }

    #[tokio::test]
    async fn test_frame_prefix_is_big_endian_body_length() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        let response = GrantResponse::refused(Uuid::nil(), "nope");
        write_frame(&mut a, &response).await.unwrap();
        drop(a);

        let mut raw = Vec::new();
        b.read_to_end(&mut raw).await.unwrap();
        let body = serde_json::to_vec(&response).unwrap();
        assert_eq!(&raw[..4], &(body.len() as u32).to_be_bytes());
        assert_eq!(&raw[4..], &body[..]);
    }

    #[tokio::test]
    async fn test_read_frame_returns_none_on_clean_eof() {
        let (a, mut b) = tokio::io::duplex(64);
        drop(a);
        let result: Option<GrantRequest> = read_frame(&mut b).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_read_frame_reports_truncated_prefix_as_error() {
        // Arrange: half a length prefix, then the writer goes away.
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&[0, 0]).await.unwrap();
        drop(a);

        // Act
        let result = read_frame::<_, GrantRequest>(&mut b).await;

        // Assert
        match result {
            Err(HandoffError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_frame_rejects_oversized_prefix() {
        // Arrange
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&((MAX_FRAME_LEN as u32) + 1).to_be_bytes())
            .await
            .unwrap();

        // Act
        let result = read_frame::<_, GrantRequest>(&mut b).await;

        // Assert
        assert!(matches!(result, Err(HandoffError::FrameTooLarge(_))));
    }

    #[tokio::test]
    async fn test_read_frame_rejects_non_json_body() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&3u32.to_be_bytes()).await.unwrap();
        a.write_all(b"???").await.unwrap();
        let result = read_frame::<_, GrantRequest>(&mut b).await;
        assert!(matches!(result, Err(HandoffError::Codec(_))));
    }

    #[test]
    fn test_granted_response_omits_error_field() {
        let grant = HandoffGrant {
            content_server: "127.0.0.1:7071".to_string(),
            access_token: 3,
        };
        let json = serde_json::to_string(&GrantResponse::granted(Uuid::nil(), grant)).unwrap();
        assert!(!json.contains("error"));
        assert!(json.contains(r#""FortuneNonce":3"#));
    }

    #[test]
    fn test_into_result_maps_refusal() {
        let result = GrantResponse::refused(Uuid::nil(), "unknown method: X").into_result();
        assert!(matches!(result, Err(HandoffError::Refused(msg)) if msg == "unknown method: X"));
    }

    #[test]
    fn test_into_result_treats_empty_frame_as_refusal() {
        let response = GrantResponse {
            id: Uuid::nil(),
            grant: None,
            error: None,
        };
        assert!(matches!(response.into_result(), Err(HandoffError::Refused(_))));
    }
}
