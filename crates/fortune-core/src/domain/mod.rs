//! Domain layer: session bookkeeping, token generation and the challenge hash.
//!
//! Nothing in here performs I/O, so every rule can be exercised directly from
//! unit tests.

pub mod hash;
pub mod session;
pub mod token;
