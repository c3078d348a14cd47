//! Last-request-wins delivery of pipeline results.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

/// Sequence number handed out when a computation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTag(u64);

impl RequestTag {
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// A published value and the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged<T> {
    pub tag: RequestTag,
    pub value: T,
}

/// Hands out request tags and publishes only the result of the newest
/// request. A computation that was superseded while in flight is dropped
/// instead of overwriting a newer result.
#[derive(Debug)]
pub struct SnapshotPublisher<T> {
    issued: AtomicU64,
    sender: watch::Sender<Option<Tagged<T>>>,
}

impl<T> Default for SnapshotPublisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotPublisher<T> {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            issued: AtomicU64::new(0),
            sender,
        }
    }

    /// Registers a new request; every earlier tag becomes stale.
    pub fn begin(&self) -> RequestTag {
        RequestTag(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, tag: RequestTag) -> bool {
        self.issued.load(Ordering::SeqCst) == tag.0
    }

    /// Publishes `value` if `tag` is still the newest request. Returns whether
    /// it was published.
    pub fn publish(&self, tag: RequestTag, value: T) -> bool {
        let published = self.sender.send_if_modified(|slot| {
            let newer_than_slot = slot.as_ref().map_or(true, |current| current.tag < tag);
            if !self.is_current(tag) || !newer_than_slot {
                return false;
            }
            *slot = Some(Tagged { tag, value });
            true
        });

        if !published {
            debug!(
                tag = tag.0,
                newest = self.issued.load(Ordering::SeqCst),
                "discarding superseded result"
            );
        }
        published
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Tagged<T>>> {
        self.sender.subscribe()
    }

    pub fn latest(&self) -> Option<Tagged<T>>
    where
        T: Clone,
    {
        self.sender.borrow().clone()
    }
}
