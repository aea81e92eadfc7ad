//! Application layer: content service use cases.

pub mod deliver;
