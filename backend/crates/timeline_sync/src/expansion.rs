use crate::item::Item;
use crate::provider::{EditableItems, ItemProvider, ItemSetNotifier};
use crate::time::{DateRange, clamp_factor};
use std::sync::Arc;

pub const DEFAULT_WINDOW_EXPAND_FACTOR: f64 = 0.2;

/// Queries the wrapped provider over a window widened by `factor`, so short
/// pans and zooms find their items already on the client.
#[derive(Clone)]
pub struct ExpandedItemProvider {
    inner: Arc<dyn ItemProvider>,
    factor: f64,
}

impl ExpandedItemProvider {
    pub fn new(inner: Arc<dyn ItemProvider>) -> Self {
        Self::with_factor(inner, DEFAULT_WINDOW_EXPAND_FACTOR)
    }

    pub fn with_factor(inner: Arc<dyn ItemProvider>, factor: f64) -> Self {
        Self {
            inner,
            factor: clamp_factor(factor),
        }
    }

    pub fn inner(&self) -> &Arc<dyn ItemProvider> {
        &self.inner
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn set_factor(&mut self, factor: f64) {
        self.factor = clamp_factor(factor);
    }

    pub fn expanded_window(&self, window: DateRange) -> DateRange {
        window.expanded(self.factor)
    }
}

impl ItemProvider for ExpandedItemProvider {
    fn items(&self, window: DateRange) -> Vec<Item> {
        self.inner.items(self.expanded_window(window))
    }

    fn editable(&self) -> Option<&dyn EditableItems> {
        self.inner.editable()
    }

    fn notifier(&self) -> Option<&ItemSetNotifier> {
        self.inner.notifier()
    }
}
