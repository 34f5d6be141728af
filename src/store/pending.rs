//! In-flight messages and the insertion-ordered set that owns them.

use std::collections::{HashMap, VecDeque};

use super::MessageId;
use crate::frame::{Capcode, DecodedFrame, FragmentFlag, FrameMetadata};

/// A logical message being assembled from one or more fragments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingMessage {
    id: MessageId,
    capcode: Capcode,
    metadata: Vec<FrameMetadata>,
    text: String,
}

impl PendingMessage {
    pub(super) fn start(id: MessageId, frame: DecodedFrame) -> Self {
        let DecodedFrame { metadata, payload } = frame;
        Self {
            id,
            capcode: metadata.capcode.clone(),
            metadata: vec![metadata],
            text: payload,
        }
    }

    pub(super) fn push(&mut self, frame: DecodedFrame) {
        self.metadata.push(frame.metadata);
        self.text.push_str(&frame.payload);
    }

    /// Identifier assigned when the first fragment arrived.
    #[must_use]
    pub const fn id(&self) -> MessageId { self.id }

    /// Address the fragments were grouped under.
    #[must_use]
    pub fn capcode(&self) -> &Capcode { &self.capcode }

    /// Per-fragment metadata in arrival order.
    #[must_use]
    pub fn metadata(&self) -> &[FrameMetadata] { &self.metadata }

    /// Concatenated payload text.
    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    /// Number of fragments folded into the message.
    #[must_use]
    pub fn fragment_count(&self) -> usize { self.metadata.len() }

    /// Whether the latest fragment completed the message.
    ///
    /// Messages flushed by the retention policy or a drain report `false`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.metadata.last().is_some_and(|metadata| {
            matches!(metadata.flag(), FragmentFlag::Only | FragmentFlag::Last)
        })
    }

    /// Consume the message, returning its id, metadata rows and text.
    #[must_use]
    pub fn into_parts(self) -> (MessageId, Vec<FrameMetadata>, String) {
        (self.id, self.metadata, self.text)
    }
}

/// Queue length below which stale order entries are left in place.
const COMPACT_FLOOR: usize = 64;

/// Capcode-keyed pending messages that remember insertion order.
///
/// Removal only touches the map. The order queue keeps each message's id and
/// skips entries whose message has left the set; once stale entries outnumber
/// live ones the queue is compacted.
#[derive(Debug, Default)]
pub(super) struct PendingSet {
    entries: HashMap<Capcode, PendingMessage>,
    order: VecDeque<(Capcode, MessageId)>,
}

impl PendingSet {
    pub(super) fn len(&self) -> usize { self.entries.len() }

    pub(super) fn get(&self, capcode: &Capcode) -> Option<&PendingMessage> {
        self.entries.get(capcode)
    }

    pub(super) fn get_mut(&mut self, capcode: &Capcode) -> Option<&mut PendingMessage> {
        self.entries.get_mut(capcode)
    }

    /// Track a new message at the tail. The capcode must not be pending.
    pub(super) fn insert(&mut self, message: PendingMessage) {
        let capcode = message.capcode().clone();
        debug_assert!(!self.entries.contains_key(&capcode));
        self.order.push_back((capcode.clone(), message.id()));
        self.entries.insert(capcode, message);
    }

    pub(super) fn remove(&mut self, capcode: &Capcode) -> Option<PendingMessage> {
        let message = self.entries.remove(capcode)?;
        self.compact();
        Some(message)
    }

    /// Remove and return the oldest-inserted message.
    pub(super) fn pop_oldest(&mut self) -> Option<PendingMessage> {
        while let Some((capcode, id)) = self.order.pop_front() {
            if self.is_live(&capcode, id) {
                return self.entries.remove(&capcode);
            }
        }
        None
    }

    pub(super) fn capcodes(&self) -> impl Iterator<Item = &Capcode> {
        self.order
            .iter()
            .filter(|(capcode, id)| self.is_live(capcode, *id))
            .map(|(capcode, _)| capcode)
    }

    /// Entries held by the order queue, stale ones included.
    #[cfg(test)]
    pub(super) fn queued(&self) -> usize { self.order.len() }

    fn is_live(&self, capcode: &Capcode, id: MessageId) -> bool {
        self.entries
            .get(capcode)
            .is_some_and(|message| message.id() == id)
    }

    fn compact(&mut self) {
        if self.order.len() <= COMPACT_FLOOR.max(self.entries.len().saturating_mul(2)) {
            return;
        }
        let entries = &self.entries;
        self.order.retain(|(capcode, id)| {
            entries
                .get(capcode)
                .is_some_and(|message| message.id() == *id)
        });
    }
}
