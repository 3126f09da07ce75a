use crate::item::ItemId;
use crate::relay::Relay;
use crate::time::DateRange;
use futures::channel::mpsc::UnboundedReceiver;
use shared::EventProperties;

#[derive(Debug, Clone, PartialEq)]
pub struct RangeChangedEvent {
    pub range: DateRange,
    /// False when the change followed a server-side window request.
    pub by_user: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChangedEvent {
    pub selection: Vec<ItemId>,
    pub added: Vec<ItemId>,
    pub removed: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickKind {
    Click,
    DoubleClick,
    ContextMenu,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub kind: ClickKind,
    /// Resolved from the render key under the pointer, if any.
    pub item_id: Option<ItemId>,
    pub props: EventProperties,
}

/// Per-timeline event channels, one relay per event kind.
#[derive(Debug, Default)]
pub struct TimelineEvents {
    pub range_changed: Relay<RangeChangedEvent>,
    pub selection_changed: Relay<SelectionChangedEvent>,
    pub clicked: Relay<ClickEvent>,
}

impl TimelineEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_range_changed(&self) -> UnboundedReceiver<RangeChangedEvent> {
        self.range_changed.subscribe()
    }

    pub fn subscribe_selection_changed(&self) -> UnboundedReceiver<SelectionChangedEvent> {
        self.selection_changed.subscribe()
    }

    pub fn subscribe_clicked(&self) -> UnboundedReceiver<ClickEvent> {
        self.clicked.subscribe()
    }
}
