//! Nonce and access-token generation.
//!
//! Tokens are drawn from the operating system's CSPRNG on every call.  There
//! is no seed and no way to make the sequence reproducible: an observer who
//! has seen any number of earlier tokens learns nothing about the next one.

use rand::{rngs::OsRng, RngCore};

/// Returns a uniformly random token in `0..=i64::MAX` (63 bits of entropy).
pub fn generate_token() -> i64 {
    // Dropping the top bit keeps the value non-negative.
    (OsRng.next_u64() >> 1) as i64
}
