//! # fortune-core
//!
//! Shared library for the fortune services: the client-facing wire protocol,
//! the per-service session table, the challenge hash, token generation and
//! the handoff channel between the authorization and content services.
//!
//! # Architecture overview
//!
//! Three parties take part in every exchange:
//!
//! ```text
//! client ──UDP──► fortune-auth ──TCP (GetAccessGrant)──► fortune-server
//!   ▲                 │                                       │
//!   └──── HandoffInfo ┘                                       │
//!   └──────────────────── UDP ContentRequest / Fortune ───────┘
//! ```
//!
//! - **`protocol`** – The seven JSON message shapes and the codec that turns
//!   them into datagrams.  Messages carry no type tag; a datagram *is* a
//!   given message when it decodes as that shape.
//!
//! - **`domain`** – Pure logic with no I/O: the [`SessionTable`], the
//!   challenge hash (`MD5` over a signed varint) and token generation.
//!
//! - **`handoff`** – The privileged control-plane call through which the
//!   authorization service obtains a content access grant for a client.
//!
//! - **`net`** – The datagram receive loop both services run, one spawned
//!   task per inbound datagram.
//!
//! - **`config`** – TOML config-file loading and address resolution shared by
//!   the three binaries.

pub mod config;
pub mod domain;
pub mod handoff;
pub mod net;
pub mod protocol;

pub use domain::hash::{challenge_hash, encode_varint, verify_challenge};
pub use domain::session::SessionTable;
pub use domain::token::generate_token;
pub use handoff::{AccessGrantor, HandoffError, HandoffGrant};
pub use net::datagram::{serve_datagrams, DatagramHandler};
pub use protocol::codec::{decode, encode, CodecError};
pub use protocol::messages::*;
pub use protocol::rejection::Rejection;
