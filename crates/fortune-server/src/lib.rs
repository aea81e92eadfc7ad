//! # fortune-server
//!
//! The content service.  It issues access grants to the authorization
//! service over a private TCP control channel, and serves the configured
//! fortune over UDP to any client that presents the token granted for its
//! exact address.
//!
//! # Modules
//!
//! - **`application`** – Grant issuing and the per-datagram delivery state
//!   machine.
//! - **`config`** – Settings sources and the validated
//!   [`ContentConfig`](config::ContentConfig).
//! - **`server`** – Binds both endpoints and runs their loops.

pub mod application;
pub mod config;
pub mod server;

pub use application::deliver::FortuneService;
pub use config::{ContentConfig, ContentSettings};
pub use server::{ContentError, ContentServer};
