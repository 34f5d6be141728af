//! Retention policies bounding how many incomplete messages are held.

use std::{collections::VecDeque, fmt, num::NonZeroUsize};

use super::{MessageId, PendingMessage, pending::PendingSet};
use crate::frame::Capcode;

/// Bounding rule applied after every observed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Hold at most this many distinct pending capcodes, evicting the
    /// oldest-inserted when exceeded.
    CountBound(NonZeroUsize),
    /// Force out any message still pending this many frames after its first
    /// fragment arrived.
    DelayBound(NonZeroUsize),
}

const DEFAULT_BOUND: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(bound) => bound,
    None => NonZeroUsize::MIN,
};

impl RetentionPolicy {
    /// Ten distinct capcodes, evicted in insertion order.
    pub const DEFAULT: RetentionPolicy = RetentionPolicy::CountBound(DEFAULT_BOUND);

    /// Configured bound; the store never holds more entries than this.
    #[must_use]
    pub const fn bound(self) -> NonZeroUsize {
        match self {
            Self::CountBound(bound) | Self::DelayBound(bound) => bound,
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self { RetentionPolicy::DEFAULT }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountBound(bound) => write!(f, "count-bound({bound})"),
            Self::DelayBound(depth) => write!(f, "delay-bound({depth})"),
        }
    }
}

/// A message admitted to the store, remembered by the delay queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Admission {
    pub(super) capcode: Capcode,
    pub(super) id: MessageId,
}

/// Runtime state of the configured policy.
#[derive(Debug)]
pub(super) enum Retention {
    Count {
        limit: NonZeroUsize,
    },
    Delay {
        depth: NonZeroUsize,
        slots: VecDeque<Option<Admission>>,
    },
}

impl Retention {
    pub(super) fn new(policy: RetentionPolicy) -> Self {
        match policy {
            RetentionPolicy::CountBound(limit) => Self::Count { limit },
            RetentionPolicy::DelayBound(depth) => Self::Delay {
                depth,
                slots: VecDeque::with_capacity(depth.get().saturating_add(1)),
            },
        }
    }

    /// Apply the policy after one frame, returning evicted messages oldest
    /// first.
    ///
    /// `admitted` names the message the frame created, if any; every other
    /// frame occupies an empty delay slot.
    pub(super) fn enforce(
        &mut self,
        pending: &mut PendingSet,
        admitted: Option<Admission>,
    ) -> Vec<PendingMessage> {
        let mut evicted = Vec::new();
        match self {
            Self::Count { limit } => {
                while pending.len() > limit.get() {
                    let Some(message) = pending.pop_oldest() else {
                        break;
                    };
                    evicted.push(message);
                }
            }
            Self::Delay { depth, slots } => {
                slots.push_back(admitted);
                while slots.len() > depth.get() {
                    let Some(Some(Admission { capcode, id })) = slots.pop_front() else {
                        continue;
                    };
                    // The capcode may have completed and been reused since.
                    if pending.get(&capcode).is_some_and(|message| message.id() == id)
                        && let Some(message) = pending.remove(&capcode)
                    {
                        evicted.push(message);
                    }
                }
            }
        }
        evicted
    }

    /// Forget queued slots once the store has been drained.
    pub(super) fn reset(&mut self) {
        if let Self::Delay { slots, .. } = self {
            slots.clear();
        }
    }
}
