//! Capcode-keyed accumulator of in-flight fragment groups.
//!
//! [`RetentionStore`] folds fragments that share a capcode into a
//! [`PendingMessage`], hands messages back once a `Last` fragment completes
//! them, and applies a [`RetentionPolicy`] after every frame so the number of
//! incomplete messages held stays bounded under unbounded input. Messages
//! leave the store by value; nothing handed to a caller is still tracked.

mod id;
mod pending;
mod policy;

pub use id::{MessageId, MessageIdAllocator};
pub use pending::PendingMessage;
pub use policy::RetentionPolicy;
use tracing::debug;

use self::{
    pending::PendingSet,
    policy::{Admission, Retention},
};
use crate::frame::{Capcode, DecodedFrame, FragmentFlag};

/// Outcome of feeding one frame into the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Observation {
    /// The frame was absorbed; nothing is ready to flush.
    Buffered,
    /// The frame completed exactly one message.
    Flushed(PendingMessage),
    /// The retention policy forced messages out. The list holds the message
    /// the frame completed, if any, followed by evicted messages oldest first.
    FlushedAndEvicted(Vec<PendingMessage>),
}

impl Observation {
    fn new(completed: Option<PendingMessage>, evicted: Vec<PendingMessage>) -> Self {
        if evicted.is_empty() {
            return completed.map_or(Self::Buffered, Self::Flushed);
        }
        Self::FlushedAndEvicted(completed.into_iter().chain(evicted).collect())
    }

    /// Whether the frame produced nothing to flush.
    #[must_use]
    pub fn is_buffered(&self) -> bool { matches!(self, Self::Buffered) }

    /// Messages to flush, in emission order.
    #[must_use]
    pub fn into_messages(self) -> Vec<PendingMessage> {
        match self {
            Self::Buffered => Vec::new(),
            Self::Flushed(message) => vec![message],
            Self::FlushedAndEvicted(messages) => messages,
        }
    }
}

/// Insertion-ordered store of pending messages bounded by a retention policy.
///
/// # Examples
///
/// ```
/// use pagerframe::{
///     frame::parse_line,
///     store::{Observation, RetentionPolicy, RetentionStore},
/// };
///
/// let mut store = RetentionStore::new(RetentionPolicy::DEFAULT);
/// let first = parse_line("FLEX|1600/2|00.001.A|0001234567|LS|5|ALN|3.1.F|HELLO ")
///     .expect("valid frame");
/// let last = parse_line("FLEX|1600/2|00.002.A|0001234567|LS|5|ALN|3.0.C|WORLD")
///     .expect("valid frame");
///
/// assert!(store.observe(first).is_buffered());
/// let Observation::Flushed(message) = store.observe(last) else {
///     panic!("last fragment completes the message");
/// };
/// assert_eq!(message.text(), "HELLO WORLD");
/// assert!(store.is_empty());
/// ```
#[derive(Debug)]
pub struct RetentionStore {
    policy: RetentionPolicy,
    retention: Retention,
    pending: PendingSet,
    ids: MessageIdAllocator,
}

impl RetentionStore {
    /// Create an empty store governed by `policy`.
    #[must_use]
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            retention: Retention::new(policy),
            pending: PendingSet::default(),
            ids: MessageIdAllocator::default(),
        }
    }

    /// Feed one decoded frame into the store.
    ///
    /// Complete single-frame messages are returned immediately without being
    /// tracked. Fragments are appended to the message pending for their
    /// capcode, or start a new one with a fresh id. A `Last` fragment removes
    /// and returns its message. The retention policy is applied afterwards.
    ///
    /// Fragments for a capcode that is already pending are concatenated
    /// blindly, even when they look like the start of another message.
    pub fn observe(&mut self, frame: DecodedFrame) -> Observation {
        let flag = frame.flag();
        let mut completed = None;
        let mut admitted = None;

        if flag == FragmentFlag::Only {
            completed = Some(PendingMessage::start(self.ids.allocate(), frame));
        } else {
            let capcode = frame.capcode().clone();
            if let Some(message) = self.pending.get_mut(&capcode) {
                if frame
                    .metadata
                    .fragmentation
                    .is_some_and(|fragmentation| fragmentation.opens_message())
                {
                    debug!(
                        capcode = %capcode,
                        message_id = %message.id(),
                        "opening fragment for a pending capcode; concatenating"
                    );
                }
                message.push(frame);
            } else {
                let id = self.ids.allocate();
                self.pending.insert(PendingMessage::start(id, frame));
                admitted = Some(Admission {
                    capcode: capcode.clone(),
                    id,
                });
            }

            if flag == FragmentFlag::Last {
                completed = self.pending.remove(&capcode);
            }
        }

        let evicted = self.retention.enforce(&mut self.pending, admitted);
        for message in &evicted {
            debug!(
                capcode = %message.capcode(),
                message_id = %message.id(),
                fragments = message.fragment_count(),
                policy = %self.policy,
                "evicting incomplete message"
            );
        }
        Observation::new(completed, evicted)
    }

    /// Remove every pending message, oldest first, leaving the store empty.
    pub fn drain(&mut self) -> Vec<PendingMessage> {
        let mut drained = Vec::with_capacity(self.pending.len());
        while let Some(message) = self.pending.pop_oldest() {
            drained.push(message);
        }
        self.retention.reset();
        drained
    }

    /// Number of pending messages.
    #[must_use]
    pub fn len(&self) -> usize { self.pending.len() }

    /// Whether no message is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.pending.len() == 0 }

    /// Whether a message is pending for `capcode`.
    #[must_use]
    pub fn contains(&self, capcode: &Capcode) -> bool { self.pending.get(capcode).is_some() }

    /// Pending capcodes, oldest first.
    pub fn capcodes(&self) -> impl Iterator<Item = &Capcode> { self.pending.capcodes() }

    /// Policy the store was created with.
    #[must_use]
    pub const fn policy(&self) -> RetentionPolicy { self.policy }

    /// Identifier the next new message will receive.
    #[must_use]
    pub const fn next_id(&self) -> MessageId { self.ids.peek() }
}
