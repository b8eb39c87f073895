//! The room seam — what discovery consumes from its owning room.

use conclave_core::message::{ChannelAnnouncementMessage, ChannelStatusMessage};

use crate::channel::Channel;

/// Everything the discovery controller needs from the room that owns
/// it: the broadcast transport, the local identity, channel
/// construction, and the handover hook.
///
/// The room is passed by `&mut` borrow into each controller call; the
/// controller never stores a reference back to its owner.
pub trait RoomInterface {
    /// The concrete channel type this room constructs.
    type Channel: Channel;

    /// Broadcast raw wire bytes to every room member.
    fn send_message(&mut self, message: Vec<u8>);

    /// The local user's stable name in the room. Compared by byte
    /// equality against message senders.
    fn username(&self) -> &str;

    /// Construct a candidate channel from status evidence.
    fn new_channel(&mut self, status: &ChannelStatusMessage) -> Self::Channel;

    /// Construct a candidate channel from a founder's announcement.
    fn new_channel_from_announcement(
        &mut self,
        announcement: &ChannelAnnouncementMessage,
        founder: &str,
    ) -> Self::Channel;

    /// Receive exclusive ownership of the channel the local user
    /// joined. Discovery is over once this fires.
    fn joined_channel(&mut self, channel: Self::Channel);
}
