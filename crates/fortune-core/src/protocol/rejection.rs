//! The four ways a single client request can be rejected.
//!
//! Rejections are values, never faults: a handler returns one, the service
//! loop turns it into exactly one [`ErrorNotice`] datagram, and the service
//! keeps running.  The `Display` text of each variant is the literal string
//! clients see in the notice.

use thiserror::Error;

use crate::protocol::messages::ErrorNotice;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Rejection {
    /// The datagram does not decode as the shape expected at this step.
    #[error("could not interpret message")]
    Malformed,

    /// No session entry exists for the sender's address.
    #[error("unknown remote client address")]
    UnknownClient,

    /// The supplied challenge hash does not match the recomputed one.
    #[error("unexpected hash value")]
    HashMismatch,

    /// The presented access token differs from the one bound to the address.
    #[error("incorrect fortune nonce")]
    TokenMismatch,
}

impl Rejection {
    /// Builds the notice sent back to the client.
    pub fn notice(&self) -> ErrorNotice {
        ErrorNotice::new(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_strings_match_wire_contract() {
        assert_eq!(Rejection::Malformed.notice().message, "could not interpret message");
        assert_eq!(
            Rejection::UnknownClient.notice().message,
            "unknown remote client address"
        );
        assert_eq!(Rejection::HashMismatch.notice().message, "unexpected hash value");
        assert_eq!(Rejection::TokenMismatch.notice().message, "incorrect fortune nonce");
    }
}
