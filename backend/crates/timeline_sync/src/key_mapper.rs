//! Render keys for items on the client
//!
//! The client only ever sees short string keys. Keys are allocated from a
//! monotonic counter and never reused, so a stale key from the client can
//! not resolve to a different item.

use crate::error::{Result, TimelineError};
use crate::item::{ItemId, RenderKey};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct KeyMapper {
    keys: HashMap<ItemId, RenderKey>,
    ids: HashMap<RenderKey, ItemId>,
    pinned: HashSet<ItemId>,
    next_key: u64,
}

impl KeyMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, id: &ItemId) -> RenderKey {
        if let Some(key) = self.keys.get(id) {
            return key.clone();
        }
        let key = RenderKey::from_index(self.next_key);
        self.next_key += 1;
        self.keys.insert(id.clone(), key.clone());
        self.ids.insert(key.clone(), id.clone());
        key
    }

    pub fn keys<'a>(&mut self, ids: impl IntoIterator<Item = &'a ItemId>) -> Vec<RenderKey> {
        ids.into_iter().map(|id| self.key(id)).collect()
    }

    pub fn item_id(&self, key: &RenderKey) -> Result<ItemId> {
        self.ids
            .get(key)
            .cloned()
            .ok_or_else(|| TimelineError::KeyNotFound(key.clone()))
    }

    /// Resolves every key or fails on the first unknown one.
    pub fn item_ids<'a>(&self, keys: impl IntoIterator<Item = &'a RenderKey>) -> Result<Vec<ItemId>> {
        keys.into_iter().map(|key| self.item_id(key)).collect()
    }

    /// Keeps mappings for `active` and for pinned ids, dropping the rest,
    /// and allocates keys for active ids that have none yet.
    pub fn set_active_rows<'a>(&mut self, active: impl IntoIterator<Item = &'a ItemId>) {
        let active: HashSet<&ItemId> = active.into_iter().collect();
        let pinned = &self.pinned;
        let ids = &mut self.ids;
        self.keys.retain(|id, key| {
            let keep = active.contains(id) || pinned.contains(id);
            if !keep {
                ids.remove(key);
            }
            keep
        });
        for id in active {
            self.key(id);
        }
        log::debug!(
            "Key mapper holds {} keys ({} pinned)",
            self.keys.len(),
            self.pinned.len()
        );
    }

    pub fn pin(&mut self, id: ItemId) -> Result<()> {
        if self.pinned.contains(&id) {
            return Err(TimelineError::InvalidPinState { id, pinned: true });
        }
        self.pinned.insert(id);
        Ok(())
    }

    /// The mapping itself survives until the next `set_active_rows` that
    /// does not list the id.
    pub fn unpin(&mut self, id: &ItemId) -> Result<()> {
        if !self.pinned.remove(id) {
            return Err(TimelineError::InvalidPinState {
                id: id.clone(),
                pinned: false,
            });
        }
        Ok(())
    }

    pub fn is_pinned(&self, id: &ItemId) -> bool {
        self.pinned.contains(id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
