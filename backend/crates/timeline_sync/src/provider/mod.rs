//! Item sources
//!
//! A provider answers "which items are visible in this window". Editing and
//! change notification are optional capabilities; a provider without them
//! returns `None` from the corresponding accessor.

mod basic;
mod indexed;

pub use basic::BasicItemProvider;
pub use indexed::{IndexedItemProvider, ItemStore, VecItemStore};

use crate::item::{Item, ItemId};
use crate::relay::Relay;
use crate::time::DateRange;
use futures::channel::mpsc::UnboundedSender;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub trait ItemProvider: Send + Sync {
    /// Items visible in `window`. Called with confirmed windows only.
    fn items(&self, window: DateRange) -> Vec<Item>;

    fn editable(&self) -> Option<&dyn EditableItems> {
        None
    }

    fn notifier(&self) -> Option<&ItemSetNotifier> {
        None
    }
}

/// Write access to a provider's item set.
pub trait EditableItems: Send + Sync {
    /// Inserts `item`, replacing any item with the same id.
    fn add_item(&self, item: Item);

    fn remove_item(&self, id: &ItemId) -> Option<Item>;
}

/// Identifies the provider behind an [`ItemSetChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SourceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSetChange {
    pub source: SourceId,
}

/// Announces that a provider's item set changed.
#[derive(Debug)]
pub struct ItemSetNotifier {
    source: SourceId,
    item_set_changed: Relay<ItemSetChange>,
}

impl ItemSetNotifier {
    pub fn new() -> Self {
        Self {
            source: SourceId::next(),
            item_set_changed: Relay::new(),
        }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn subscribe(&self, sender: UnboundedSender<ItemSetChange>) {
        self.item_set_changed.attach(sender);
    }

    pub fn notify(&self) {
        log::debug!("Item set of source {:?} changed", self.source);
        self.item_set_changed.send(ItemSetChange {
            source: self.source,
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.item_set_changed.subscriber_count()
    }
}

impl Default for ItemSetNotifier {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
