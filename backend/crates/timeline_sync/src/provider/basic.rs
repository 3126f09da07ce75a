use super::{EditableItems, ItemProvider, ItemSetNotifier, read_lock, write_lock};
use crate::item::{Item, ItemId};
use crate::time::DateRange;
use std::sync::RwLock;

/// In-memory item list scanned linearly on every query.
#[derive(Debug, Default)]
pub struct BasicItemProvider {
    items: RwLock<Vec<Item>>,
    notifier: ItemSetNotifier,
}

impl BasicItemProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let provider = Self::new();
        {
            let mut stored = write_lock(&provider.items);
            for item in items {
                upsert(&mut stored, item);
            }
        }
        provider
    }

    pub fn len(&self) -> usize {
        read_lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &ItemId) -> Option<Item> {
        read_lock(&self.items)
            .iter()
            .find(|item| &item.id == id)
            .cloned()
    }

    /// Replaces the whole item set.
    pub fn set_items(&self, items: impl IntoIterator<Item = Item>) {
        {
            let mut stored = write_lock(&self.items);
            stored.clear();
            for item in items {
                upsert(&mut stored, item);
            }
        }
        self.notifier.notify();
    }
}

fn upsert(items: &mut Vec<Item>, item: Item) {
    match items.iter_mut().find(|existing| existing.id == item.id) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

impl ItemProvider for BasicItemProvider {
    fn items(&self, window: DateRange) -> Vec<Item> {
        read_lock(&self.items)
            .iter()
            .filter(|item| item.is_visible_in(window))
            .cloned()
            .collect()
    }

    fn editable(&self) -> Option<&dyn EditableItems> {
        Some(self)
    }

    fn notifier(&self) -> Option<&ItemSetNotifier> {
        Some(&self.notifier)
    }
}

impl EditableItems for BasicItemProvider {
    fn add_item(&self, item: Item) {
        upsert(&mut write_lock(&self.items), item);
        self.notifier.notify();
    }

    fn remove_item(&self, id: &ItemId) -> Option<Item> {
        let removed = {
            let mut items = write_lock(&self.items);
            let position = items.iter().position(|item| &item.id == id)?;
            items.remove(position)
        };
        self.notifier.notify();
        Some(removed)
    }
}
