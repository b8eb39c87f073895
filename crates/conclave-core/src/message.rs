//! Discovery wire format — room broadcast messages.
//!
//! Every conclave room broadcast is a single kind byte followed by the
//! message body. The three discovery kinds carry JSON bodies; the
//! `Channel` kind is channel-scoped protocol traffic that the discovery
//! layer forwards without interpreting.
//!
//! A malformed message is never an error to a receiver — discovery
//! drops it and moves on. The error values here exist so callers can
//! tell *why* a decode failed when they care.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::crypto::SearchNonce;

/// Message kind discriminator — the first byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageKind {
    /// Search probe. The searcher recognizes its own echo by nonce.
    ChannelSearch = 1,
    /// Channel state, broadcast by existing members in reply to a probe.
    ChannelStatus = 2,
    /// A founder announcing a freshly created channel.
    ChannelAnnouncement = 3,
    /// Channel-scoped protocol traffic. Opaque to discovery.
    Channel = 4,
}

impl MessageKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::ChannelSearch),
            2 => Some(Self::ChannelStatus),
            3 => Some(Self::ChannelAnnouncement),
            4 => Some(Self::Channel),
            _ => None,
        }
    }
}

/// A room broadcast message: kind tag plus raw body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub payload: Bytes,
}

impl Message {
    /// Serialize to wire bytes: one kind byte, then the payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.payload.len());
        buf.push(self.kind as u8);
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Parse wire bytes received from the room transport.
    pub fn decode(data: &[u8]) -> Result<Self, MessageError> {
        let (&kind, payload) = data.split_first().ok_or(MessageError::Empty)?;
        let kind = MessageKind::from_u8(kind).ok_or(MessageError::UnknownKind(kind))?;
        Ok(Self {
            kind,
            payload: Bytes::copy_from_slice(payload),
        })
    }
}

/// Search probe body.
///
/// Broadcast at the start of a discovery round. Existing channels reply
/// with [`ChannelStatusMessage`]; the searcher itself waits for the
/// probe to come back around as its causal barrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSearchMessage {
    pub nonce: SearchNonce,
}

impl ChannelSearchMessage {
    pub fn encode(&self) -> Message {
        Message {
            kind: MessageKind::ChannelSearch,
            payload: to_body(self),
        }
    }

    pub fn decode(message: &Message) -> Result<Self, MessageError> {
        expect_kind(message, MessageKind::ChannelSearch)?;
        Ok(serde_json::from_slice(&message.payload)?)
    }
}

/// Channel state body, broadcast by an existing member in reply to a probe.
///
/// `channel` is the channel's opaque identifier — compared by byte
/// equality, never interpreted. The participant lists hold room
/// usernames; `unauthorized_participants` are users the channel has
/// seen but not yet authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatusMessage {
    pub channel: Bytes,
    pub participants: Vec<String>,
    pub unauthorized_participants: Vec<String>,
}

impl ChannelStatusMessage {
    pub fn encode(&self) -> Message {
        Message {
            kind: MessageKind::ChannelStatus,
            payload: to_body(self),
        }
    }

    pub fn decode(message: &Message) -> Result<Self, MessageError> {
        expect_kind(message, MessageKind::ChannelStatus)?;
        Ok(serde_json::from_slice(&message.payload)?)
    }
}

/// Announcement body, broadcast by the founder of a new channel.
///
/// Carries only the founder's share of the identifier. The effective
/// channel identifier is `channel || founder-username-bytes`, so two
/// founders can never announce colliding identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAnnouncementMessage {
    pub channel: Bytes,
}

impl ChannelAnnouncementMessage {
    pub fn encode(&self) -> Message {
        Message {
            kind: MessageKind::ChannelAnnouncement,
            payload: to_body(self),
        }
    }

    pub fn decode(message: &Message) -> Result<Self, MessageError> {
        expect_kind(message, MessageKind::ChannelAnnouncement)?;
        Ok(serde_json::from_slice(&message.payload)?)
    }
}

fn to_body<T: Serialize>(body: &T) -> Bytes {
    serde_json::to_vec(body)
        .expect("message body serialization failed")
        .into()
}

fn expect_kind(message: &Message, kind: MessageKind) -> Result<(), MessageError> {
    if message.kind != kind {
        return Err(MessageError::WrongKind(message.kind));
    }
    Ok(())
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting wire-format data.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("empty message")]
    Empty,

    #[error("unknown message kind: 0x{0:02x}")]
    UnknownKind(u8),

    #[error("unexpected message kind: {0:?}")]
    WrongKind(MessageKind),

    #[error("malformed message body: {0}")]
    Body(#[from] serde_json::Error),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
