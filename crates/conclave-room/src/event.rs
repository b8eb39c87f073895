//! Room events observed at the transport boundary.

use conclave_core::Message;

/// A single event observed in the room, in transport-delivered order.
///
/// Discovery records these from the moment its probe echo is observed
/// and replays the record into late-discovered candidates, so every
/// candidate sees a consistent view of room history.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// A broadcast message, relayed to every room member.
    Message { sender: String, message: Message },
    /// A user entered the room.
    Join { sender: String },
    /// A user left the room.
    Leave { sender: String },
}
