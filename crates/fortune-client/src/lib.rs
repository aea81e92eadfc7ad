//! # fortune-client
//!
//! Fetches a fortune in three round trips over one UDP socket:
//!
//! 1. Probe the authorization service and receive a nonce.
//! 2. Answer with `hex(MD5(varint(nonce + secret)))` and receive the content
//!    service's address plus an access token bound to this socket's address.
//! 3. Present the token to the content service and receive the fortune.

pub mod application;
pub mod config;

pub use application::driver::{run_protocol, ClientError, FortuneClient, ReadTimeout, Step};
pub use config::{ClientConfig, ClientSettings};
