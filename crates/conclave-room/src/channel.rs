//! The candidate channel seam.

use conclave_core::Message;

/// A candidate channel under discovery — an opaque state machine fed
/// room events.
///
/// The discovery controller owns each handle exclusively. Ownership
/// leaves the controller only on successful join, through
/// [`RoomInterface::joined_channel`].
///
/// Intentionally minimal. The channel's cryptography, authentication,
/// and membership protocol all live behind this trait; discovery only
/// feeds events in and reads two signals out.
///
/// [`RoomInterface::joined_channel`]: crate::room::RoomInterface::joined_channel
pub trait Channel {
    /// A broadcast message was observed in the room.
    fn message_received(&mut self, sender: &str, message: &Message);

    /// A user entered the room.
    fn user_joined(&mut self, sender: &str);

    /// A user left the room.
    fn user_left(&mut self, sender: &str);

    /// The named user vouched for this channel in a status or
    /// announcement message. Repeated confirmation of the same sender
    /// must be tolerated.
    fn confirm_participant(&mut self, sender: &str);

    /// Begin joining this channel as the local user.
    fn join(&mut self);

    /// True when the channel's membership model has no remaining
    /// participants. Empty candidates are dropped from discovery.
    fn empty(&self) -> bool;

    /// True when the local user is a full member.
    fn joined(&self) -> bool;
}
