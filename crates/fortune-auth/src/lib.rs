//! # fortune-auth
//!
//! The authorization service.  Clients probe it over UDP, receive a nonce,
//! prove knowledge of the pre-shared secret by answering with
//! `hex(MD5(varint(nonce + secret)))`, and are then handed off to the content
//! service with a freshly issued access token.
//!
//! # Modules
//!
//! - **`application`** – The per-datagram authorization state machine.
//! - **`config`** – Settings as read from the command line, environment and
//!   TOML file, and the validated [`AuthConfig`](config::AuthConfig).
//! - **`server`** – Socket binding and the service loop.

pub mod application;
pub mod config;
pub mod server;

pub use application::authenticate::{AuthService, VerifyError};
pub use config::{AuthConfig, AuthSettings};
pub use server::{AuthError, AuthServer};
