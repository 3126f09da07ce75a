use super::{EditableItems, ItemProvider, ItemSetNotifier, read_lock, write_lock};
use crate::item::{Item, ItemId, Placement};
use crate::time::DateRange;
use std::sync::RwLock;

/// Random-access view over an external item collection.
pub trait ItemStore: Send + Sync {
    fn len(&self) -> usize;

    fn item_at(&self, index: usize) -> Option<Item>;

    /// True when items are ordered by ascending start.
    fn sorted_by_start(&self) -> bool {
        false
    }

    fn editable(&self) -> Option<&dyn EditableItems> {
        None
    }
}

/// Provider backed by an [`ItemStore`]. Sorted stores let the scan stop at
/// the first item starting after the window.
pub struct IndexedItemProvider<S: ItemStore> {
    store: S,
    sorted: bool,
    notifier: ItemSetNotifier,
}

impl<S: ItemStore> IndexedItemProvider<S> {
    pub fn new(store: S) -> Self {
        let sorted = store.sorted_by_start();
        Self {
            store,
            sorted,
            notifier: ItemSetNotifier::new(),
        }
    }

    /// Overrides what the store declares about its ordering.
    pub fn with_sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Lets the store owner announce changes made behind the provider's back.
    pub fn item_set_notifier(&self) -> &ItemSetNotifier {
        &self.notifier
    }
}

impl<S: ItemStore> ItemProvider for IndexedItemProvider<S> {
    fn items(&self, window: DateRange) -> Vec<Item> {
        let mut visible = Vec::new();
        for index in 0..self.store.len() {
            let Some(item) = self.store.item_at(index) else {
                continue;
            };
            match item.placement(window) {
                Placement::Within => visible.push(item),
                Placement::After if self.sorted => break,
                Placement::Before | Placement::After => {}
            }
        }
        visible
    }

    fn editable(&self) -> Option<&dyn EditableItems> {
        self.store.editable().map(|_| self as &dyn EditableItems)
    }

    fn notifier(&self) -> Option<&ItemSetNotifier> {
        Some(&self.notifier)
    }
}

/// Writes go to the store when it is editable and are dropped otherwise.
impl<S: ItemStore> EditableItems for IndexedItemProvider<S> {
    fn add_item(&self, item: Item) {
        let Some(editable) = self.store.editable() else {
            log::warn!("Dropping add of item '{}': store is read-only", item.id);
            return;
        };
        editable.add_item(item);
        self.notifier.notify();
    }

    fn remove_item(&self, id: &ItemId) -> Option<Item> {
        let Some(editable) = self.store.editable() else {
            log::warn!("Dropping removal of item '{}': store is read-only", id);
            return None;
        };
        let removed = editable.remove_item(id)?;
        self.notifier.notify();
        Some(removed)
    }
}

/// In-memory store kept sorted by start.
#[derive(Debug, Default)]
pub struct VecItemStore {
    items: RwLock<Vec<Item>>,
}

impl VecItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let store = Self::new();
        for item in items {
            store.insert(item);
        }
        store
    }

    fn insert(&self, item: Item) {
        let mut items = write_lock(&self.items);
        items.retain(|existing| existing.id != item.id);
        let index = items.partition_point(|existing| existing.start <= item.start);
        items.insert(index, item);
    }
}

impl ItemStore for VecItemStore {
    fn len(&self) -> usize {
        read_lock(&self.items).len()
    }

    fn item_at(&self, index: usize) -> Option<Item> {
        read_lock(&self.items).get(index).cloned()
    }

    fn sorted_by_start(&self) -> bool {
        true
    }

    fn editable(&self) -> Option<&dyn EditableItems> {
        Some(self)
    }
}

impl EditableItems for VecItemStore {
    fn add_item(&self, item: Item) {
        self.insert(item);
    }

    fn remove_item(&self, id: &ItemId) -> Option<Item> {
        let mut items = write_lock(&self.items);
        let position = items.iter().position(|item| &item.id == id)?;
        Some(items.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeMs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Read-only store that counts lookups.
    struct CountingStore {
        items: Vec<Item>,
        sorted: bool,
        reads: AtomicUsize,
    }

    impl ItemStore for CountingStore {
        fn len(&self) -> usize {
            self.items.len()
        }

        fn item_at(&self, index: usize) -> Option<Item> {
            self.reads.fetch_add(1, Ordering::Relaxed);
            self.items.get(index).cloned()
        }

        fn sorted_by_start(&self) -> bool {
            self.sorted
        }
    }

    fn counting(sorted: bool) -> IndexedItemProvider<CountingStore> {
        IndexedItemProvider::new(CountingStore {
            items: (0..10)
                .map(|i| Item::new(i as u64, format!("item {i}"), TimeMs(i * 100)))
                .collect(),
            sorted,
            reads: AtomicUsize::new(0),
        })
    }

    fn window() -> DateRange {
        DateRange::new(TimeMs(200), TimeMs(400))
    }

    #[test]
    fn test_sorted_store_stops_after_window() {
        let provider = counting(true);
        let items = provider.items(window());
        assert_eq!(items.len(), 3);
        // items 0..=4: the one at 500 ends the scan
        assert_eq!(provider.store().reads.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_unsorted_store_scans_everything() {
        let provider = counting(false);
        assert_eq!(provider.items(window()).len(), 3);
        assert_eq!(provider.store().reads.load(Ordering::Relaxed), 10);
        assert!(provider.editable().is_none());
    }

    #[test]
    fn test_vec_store_keeps_start_order() {
        let provider = IndexedItemProvider::new(VecItemStore::with_items([
            Item::new("c", "c", TimeMs(300)),
            Item::new("a", "a", TimeMs(100)),
        ]));
        assert!(provider.is_sorted());

        let editable = provider.editable().expect("vec store is editable");
        editable.add_item(Item::new("b", "b", TimeMs(200)));
        editable.add_item(Item::new("a", "a moved", TimeMs(350)));

        let ids: Vec<_> = provider
            .items(DateRange::new(TimeMs(0), TimeMs(1_000)))
            .into_iter()
            .map(|item| item.id.to_string())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        assert!(editable.remove_item(&ItemId::from("c")).is_some());
        assert_eq!(provider.store().len(), 2);
    }

    #[test]
    fn test_writes_to_read_only_store_are_dropped() {
        let provider = counting(true);
        let (tx, mut rx) = futures::channel::mpsc::unbounded();
        provider.item_set_notifier().subscribe(tx);

        EditableItems::add_item(&provider, Item::new("extra", "extra", TimeMs(250)));
        assert!(EditableItems::remove_item(&provider, &ItemId::from(2u64)).is_none());

        assert_eq!(provider.store().len(), 10);
        assert_eq!(provider.items(window()).len(), 3);
        assert!(rx.try_next().is_err());
    }
}
