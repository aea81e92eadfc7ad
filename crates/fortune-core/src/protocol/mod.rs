//! Protocol module containing the message shapes, the JSON codec and the
//! rejection taxonomy shared by both services.

pub mod codec;
pub mod messages;
pub mod rejection;

pub use codec::{decode, encode, CodecError};
pub use messages::*;
pub use rejection::Rejection;
