//! Application layer: authorization use cases.

pub mod authenticate;
