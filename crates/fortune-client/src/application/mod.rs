//! Application layer: the client protocol driver.

pub mod driver;
