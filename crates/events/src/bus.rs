//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes events after they have been durably committed; it is not a
//! source of truth. Delivery is at-least-once and subscribers must tolerate
//! duplicates.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A subscription to a bus. Each subscription receives a copy of every message
/// published after it was created.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Collect everything currently queued without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Pub/sub abstraction with broadcast semantics.
///
/// `publish` may fail (poisoned lock, broker down); callers decide whether that
/// failure matters once the underlying write has been committed.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
