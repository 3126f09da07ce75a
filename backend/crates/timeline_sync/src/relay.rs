//! Typed event channels
//!
//! A `Relay` fans one kind of event out to every subscriber over unbounded
//! channels. Subscribers whose receiver was dropped are pruned on the next send.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use std::sync::{Mutex, PoisonError};

/// Fan-out event channel.
///
/// Relays follow the `{source}_{event}` naming pattern at their use sites,
/// e.g. `range_changed`, `selection_changed`, `item_set_changed`.
///
/// # Examples
///
/// ```rust
/// use futures::StreamExt;
/// use timeline_sync::Relay;
///
/// # futures::executor::block_on(async {
/// let range_changed = Relay::<u32>::new();
/// let mut stream = range_changed.subscribe();
/// range_changed.send(7);
/// assert_eq!(stream.next().await, Some(7));
/// # });
/// ```
#[derive(Debug)]
pub struct Relay<T>
where
    T: Clone + Send + 'static,
{
    subscribers: Mutex<Vec<UnboundedSender<T>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Every receiver has been dropped.
    NoSubscribers,
}

impl<T> Relay<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Opens a new stream receiving every event sent from now on.
    pub fn subscribe(&self) -> UnboundedReceiver<T> {
        let (sender, receiver) = unbounded();
        self.attach(sender);
        receiver
    }

    /// Forwards events into an existing channel, so one consumer can merge
    /// several relays into a single stream.
    pub fn attach(&self, sender: UnboundedSender<T>) {
        self.lock_subscribers().push(sender);
    }

    /// Send an event to all live subscribers. Events sent while nobody
    /// listens are discarded.
    pub fn send(&self, value: T) {
        let _ = self.try_send(value);
    }

    pub fn try_send(&self, value: T) -> Result<(), RelayError> {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|sender| sender.unbounded_send(value.clone()).is_ok());
        if subscribers.is_empty() {
            Err(RelayError::NoSubscribers)
        } else {
            Ok(())
        }
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|sender| !sender.is_closed());
        subscribers.len()
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<UnboundedSender<T>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Relay<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a relay together with its first subscription.
pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Clone + Send + 'static,
{
    let relay = Relay::new();
    let receiver = relay.subscribe();
    (relay, receiver)
}
