//! conclave-core — shared primitives for the conclave messaging library.
//! All other conclave crates depend on this one.

pub mod crypto;
pub mod message;

pub use message::{Message, MessageError, MessageKind};
