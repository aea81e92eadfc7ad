//! Network plumbing shared by both services.
//!
//! - **`datagram`** – The client-facing UDP receive loop: one loop per
//!   socket, one spawned task per datagram, at most one reply per task.

pub mod datagram;
