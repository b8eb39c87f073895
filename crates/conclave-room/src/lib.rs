//! conclave-room — room-level channel discovery.
//!
//! A room is a broadcast medium: every message is relayed to all
//! members. Channels are cryptographically scoped subgroups inside a
//! room. This crate implements the machinery a room uses to discover
//! which channels currently exist, track their tentative membership
//! while discovery is in progress, and join one of them.

pub mod channel;
pub mod discovery;
pub mod event;
pub mod room;

pub use channel::Channel;
pub use discovery::ChannelDiscovery;
pub use event::RoomEvent;
pub use room::RoomInterface;
