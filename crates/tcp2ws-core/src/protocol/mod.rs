//! Protocol module containing the framing vocabulary and the frame codec.

pub mod codec;
pub mod framing;

pub use codec::{decode, encode, CodecError, DEFAULT_READ_BUFFER_SIZE};
pub use framing::{FramingMode, WirePayload};
