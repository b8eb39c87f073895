//! Channel discovery — find the channels alive in a room and join one.
//!
//! A discovery round starts with a broadcast probe. The probe's own
//! echo is the causal barrier: every message observed after the echo
//! was sent, on the wire, after the probe, so existing channels have
//! had the opportunity to respond. From that point the controller
//! reconstructs candidate channels from status and announcement
//! traffic, keeps every candidate's view consistent with interleaved
//! room joins and leaves, and hands the chosen channel to the room
//! once the local user is in.
//!
//! Single-threaded and callback-driven: no timers, no tasks, no locks.
//! Each inbound room callback runs to completion before the next.

use std::collections::BTreeMap;

use bytes::{BufMut, Bytes, BytesMut};

use conclave_core::crypto::{self, SearchNonce};
use conclave_core::message::{
    ChannelAnnouncementMessage, ChannelSearchMessage, ChannelStatusMessage, Message, MessageKind,
};

use crate::channel::Channel;
use crate::event::RoomEvent;
use crate::room::RoomInterface;

/// The discovery controller. One per room, owned by it, driven
/// exclusively by the room's inbound callbacks.
pub struct ChannelDiscovery<R: RoomInterface> {
    /// Nonce of the outstanding probe. None until the first `search()`.
    nonce: Option<SearchNonce>,
    /// One-shot latch — set when our own probe comes back around.
    probe_observed: bool,
    /// Events since the probe was observed, replayed into candidates
    /// discovered later in the round.
    event_log: Vec<RoomEvent>,
    /// Candidate channels by identifier. BTreeMap for deterministic
    /// iteration order.
    candidates: BTreeMap<Bytes, R::Channel>,
    /// Identifier of the candidate a join is pending on. Always names
    /// a key of `candidates`.
    joining: Option<Bytes>,
}

impl<R: RoomInterface> Default for ChannelDiscovery<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RoomInterface> ChannelDiscovery<R> {
    pub fn new() -> Self {
        Self {
            nonce: None,
            probe_observed: false,
            event_log: Vec::new(),
            candidates: BTreeMap::new(),
            joining: None,
        }
    }

    /// Begin a new discovery round.
    ///
    /// Discards all state of any previous round — including a pending
    /// join — then broadcasts a fresh probe through the room.
    pub fn search(&mut self, room: &mut R) {
        self.probe_observed = false;
        self.joining = None;
        self.event_log.clear();
        self.candidates.clear();

        let nonce = crypto::nonce();
        self.nonce = Some(nonce);
        tracing::debug!("channel search started");

        let probe = ChannelSearchMessage { nonce };
        room.send_message(probe.encode().encode());
    }

    /// Select a candidate by its public fingerprint and start joining
    /// it.
    ///
    /// An unknown fingerprint is a silent no-op. Calling this while a
    /// join is already pending is a programming error.
    pub fn join_channel(&mut self, id_hash: &str) {
        assert!(
            self.joining.is_none(),
            "join_channel called while a join is already pending"
        );

        let Some(identifier) = self
            .candidates
            .keys()
            .find(|identifier| crypto::fingerprint(identifier) == id_hash)
            .cloned()
        else {
            tracing::debug!(channel = id_hash, "join requested for unknown channel");
            return;
        };

        self.joining = Some(identifier.clone());
        if let Some(channel) = self.candidates.get_mut(&identifier) {
            channel.join();
        }
    }

    /// Fingerprints of the candidates currently under discovery, in
    /// identifier order.
    pub fn channels(&self) -> Vec<String> {
        self.candidates
            .keys()
            .map(|identifier| crypto::fingerprint(identifier))
            .collect()
    }

    /// A broadcast message was received from the room.
    pub fn message_received(&mut self, room: &mut R, sender: &str, message: Message) {
        self.process_event(RoomEvent::Message {
            sender: sender.to_owned(),
            message: message.clone(),
        });
        self.inspect_message(room, sender, &message);
        self.complete_join(room);
    }

    /// A user entered the room.
    pub fn user_joined(&mut self, room: &mut R, sender: &str) {
        self.process_event(RoomEvent::Join {
            sender: sender.to_owned(),
        });
        self.complete_join(room);
    }

    /// A user left the room.
    pub fn user_left(&mut self, room: &mut R, sender: &str) {
        self.process_event(RoomEvent::Leave {
            sender: sender.to_owned(),
        });
        self.complete_join(room);
    }

    /// Log an event and fan it out to every candidate, dropping any
    /// candidate the event left empty.
    ///
    /// Before the probe echo this is a no-op: the log starts at the
    /// first event after the latch, and the latching echo itself is
    /// never logged.
    fn process_event(&mut self, event: RoomEvent) {
        if !self.probe_observed {
            return;
        }

        self.event_log.push(event.clone());

        self.candidates.retain(|identifier, channel| {
            deliver(channel, &event);
            let keep = !channel.empty();
            if !keep {
                tracing::debug!(
                    channel = %crypto::fingerprint(identifier),
                    "candidate became empty, dropping"
                );
            }
            keep
        });
        self.drop_stale_join();
    }

    /// Discovery side effects for an inbound message: latch the probe,
    /// or create/confirm candidates from status and announcement
    /// evidence. Malformed bodies are dropped without comment.
    fn inspect_message(&mut self, room: &mut R, sender: &str, message: &Message) {
        match message.kind {
            MessageKind::ChannelSearch => {
                let Ok(search) = ChannelSearchMessage::decode(message) else {
                    return;
                };
                if sender == room.username() && Some(search.nonce) == self.nonce {
                    if !self.probe_observed {
                        tracing::debug!("probe echo observed, discovery active");
                    }
                    self.probe_observed = true;
                }
            }
            MessageKind::ChannelStatus => {
                if !self.probe_observed {
                    return;
                }
                let Ok(status) = ChannelStatusMessage::decode(message) else {
                    return;
                };

                // Ignore status messages that do not list the sender
                // itself.
                // TODO: tighten admission — a sender listed as both
                // authorized and unauthorized is accepted today.
                let listed = status
                    .participants
                    .iter()
                    .chain(&status.unauthorized_participants)
                    .any(|participant| participant == sender);
                if !listed {
                    return;
                }

                let identifier = status.channel.clone();
                if !self.candidates.contains_key(&identifier) {
                    let channel = self.create_channel(room, &status);
                    tracing::info!(
                        channel = %crypto::fingerprint(&identifier),
                        "found channel"
                    );
                    self.candidates.insert(identifier.clone(), channel);
                }
                self.confirm(identifier, sender);
            }
            MessageKind::ChannelAnnouncement => {
                if !self.probe_observed {
                    return;
                }
                let Ok(announcement) = ChannelAnnouncementMessage::decode(message) else {
                    return;
                };

                let identifier = announced_identifier(&announcement, sender);
                if !self.candidates.contains_key(&identifier) {
                    let channel = room.new_channel_from_announcement(&announcement, sender);
                    tracing::info!(
                        channel = %crypto::fingerprint(&identifier),
                        founder = sender,
                        "found announced channel"
                    );
                    self.candidates.insert(identifier.clone(), channel);
                }
                self.confirm(identifier, sender);
            }
            MessageKind::Channel => {}
        }
    }

    /// Construct a candidate from status evidence and replay room
    /// history into it: every logged event strictly preceding the
    /// status message that revealed the channel, in order. The status
    /// message itself reaches the new candidate only as
    /// `confirm_participant`.
    fn create_channel(&self, room: &mut R, status: &ChannelStatusMessage) -> R::Channel {
        let mut channel = room.new_channel(status);
        let history = &self.event_log[..self.event_log.len().saturating_sub(1)];
        for event in history {
            deliver(&mut channel, event);
        }
        channel
    }

    /// Confirm the sender on a candidate, then drop the candidate if
    /// it reports empty afterwards.
    fn confirm(&mut self, identifier: Bytes, sender: &str) {
        let Some(channel) = self.candidates.get_mut(&identifier) else {
            return;
        };
        channel.confirm_participant(sender);
        if channel.empty() {
            tracing::debug!(
                channel = %crypto::fingerprint(&identifier),
                "candidate empty after confirmation, dropping"
            );
            self.candidates.remove(&identifier);
            self.drop_stale_join();
        }
    }

    /// A pending join must always name a live candidate. Clears the
    /// pending join if eviction removed its channel, so a later
    /// `join_channel` is legal again.
    fn drop_stale_join(&mut self) {
        if let Some(identifier) = &self.joining {
            if !self.candidates.contains_key(identifier) {
                tracing::warn!(
                    channel = %crypto::fingerprint(identifier),
                    "joining channel emptied out before the join completed"
                );
                self.joining = None;
            }
        }
    }

    /// Finalize a pending join: once the joining candidate reports
    /// joined, transfer it to the room and end the round. No candidate
    /// sees another event after the handover in this tick.
    fn complete_join(&mut self, room: &mut R) {
        let Some(identifier) = self.joining.clone() else {
            return;
        };
        let ready = self
            .candidates
            .get(&identifier)
            .map(|channel| channel.joined())
            .unwrap_or(false);
        if !ready {
            return;
        }

        let Some(channel) = self.candidates.remove(&identifier) else {
            return;
        };
        self.candidates.clear();
        self.joining = None;
        tracing::info!(
            channel = %crypto::fingerprint(&identifier),
            "joined channel, discovery complete"
        );
        room.joined_channel(channel);
    }
}

/// Forward one room event to a candidate, by variant.
fn deliver<C: Channel>(channel: &mut C, event: &RoomEvent) {
    match event {
        RoomEvent::Message { sender, message } => channel.message_received(sender, message),
        RoomEvent::Join { sender } => channel.user_joined(sender),
        RoomEvent::Leave { sender } => channel.user_left(sender),
    }
}

/// The effective identifier of an announced channel: the announced
/// partial identifier with the founder's name appended, so no two
/// founders can announce colliding identifiers.
fn announced_identifier(announcement: &ChannelAnnouncementMessage, founder: &str) -> Bytes {
    let mut identifier = BytesMut::with_capacity(announcement.channel.len() + founder.len());
    identifier.put_slice(&announcement.channel);
    identifier.put_slice(founder.as_bytes());
    identifier.freeze()
}
