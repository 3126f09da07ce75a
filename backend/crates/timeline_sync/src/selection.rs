use crate::error::Result;
use crate::events::SelectionChangedEvent;
use crate::item::{ItemId, RenderKey};
use crate::key_mapper::KeyMapper;
use indexmap::IndexSet;

/// Tracks the client's selection in item ids. Selected ids stay pinned in
/// the key mapper so a selection survives its items scrolling out of view.
#[derive(Debug, Default)]
pub struct SelectionReconciler {
    selected: IndexSet<ItemId>,
}

impl SelectionReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Vec<ItemId> {
        self.selected.iter().cloned().collect()
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selected.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Render keys for the current selection.
    pub fn selected_keys(&self, keys: &mut KeyMapper) -> Vec<RenderKey> {
        keys.keys(&self.selected)
    }

    /// Applies a selection reported by the client. Unknown keys fail before
    /// anything changes; an identical selection yields no event.
    pub fn reconcile(
        &mut self,
        reported: &[RenderKey],
        keys: &mut KeyMapper,
    ) -> Result<Option<SelectionChangedEvent>> {
        let reported: IndexSet<ItemId> = keys.item_ids(reported)?.into_iter().collect();

        let added: Vec<ItemId> = reported.difference(&self.selected).cloned().collect();
        let removed: Vec<ItemId> = self.selected.difference(&reported).cloned().collect();
        if added.is_empty() && removed.is_empty() {
            return Ok(None);
        }

        for id in &added {
            keys.pin(id.clone())?;
        }
        for id in &removed {
            keys.unpin(id)?;
        }
        self.selected = reported;
        log::debug!(
            "Selection changed: {} selected, {} added, {} removed",
            self.selected.len(),
            added.len(),
            removed.len()
        );

        Ok(Some(SelectionChangedEvent {
            selection: self.selection(),
            added,
            removed,
        }))
    }
}
