//! Message identifiers written to every row of a flushed message.

use derive_more::{Display, From, Into};

/// Identifier shared by every fragment row of one logical message.
///
/// Ids come from a [`MessageIdAllocator`] in arrival order of each message's
/// first fragment, so the CSV log can be grouped back into messages.
///
/// # Examples
///
/// ```
/// use pagerframe::store::{MessageId, MessageIdAllocator};
///
/// let mut ids = MessageIdAllocator::default();
/// let first = ids.allocate();
/// assert_eq!(first, MessageId::new(0));
/// assert_eq!(ids.peek().to_string(), "1");
/// assert!(ids.allocate() > first);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into)]
#[display("{_0}")]
pub struct MessageId(u64);

impl MessageId {
    /// Identifier with the given row value.
    #[must_use]
    pub const fn new(value: u64) -> Self { Self(value) }

    /// Value written to the `message_id` column.
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

/// Monotonic source of [`MessageId`]s, starting at zero.
#[derive(Debug, Default)]
pub struct MessageIdAllocator {
    next: u64,
}

impl MessageIdAllocator {
    /// Hand out the next identifier. Identifiers are never reused.
    pub fn allocate(&mut self) -> MessageId {
        let id = MessageId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Identifier the next call to [`allocate`](Self::allocate) returns.
    #[must_use]
    pub const fn peek(&self) -> MessageId { MessageId(self.next) }
}
