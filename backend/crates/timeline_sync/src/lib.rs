//! Server-side state for a browser timeline widget.
//!
//! The client renders items inside a time window and reports what it shows.
//! This crate decides what the client is missing, hands out render keys in
//! place of application ids and turns client reports into typed events.

pub mod error;
pub mod events;
pub mod expansion;
pub mod item;
pub mod key_mapper;
pub mod provider;
pub mod relay;
pub mod selection;
pub mod sync;
pub mod time;
pub mod timeline;

pub use error::{Result, TimelineError};
pub use events::{
    ClickEvent, ClickKind, RangeChangedEvent, SelectionChangedEvent, TimelineEvents,
};
pub use expansion::{DEFAULT_WINDOW_EXPAND_FACTOR, ExpandedItemProvider};
pub use item::{Group, Item, ItemId, Placement, RenderKey};
pub use key_mapper::KeyMapper;
pub use provider::{
    BasicItemProvider, EditableItems, IndexedItemProvider, ItemProvider, ItemSetChange,
    ItemSetNotifier, ItemStore, SourceId, VecItemStore,
};
pub use relay::{Relay, RelayError, relay};
pub use selection::SelectionReconciler;
pub use sync::{FlushPlan, RangeReport, SyncState, WindowPush, WindowSync};
pub use time::{DateRange, MS_PER_HOUR, MS_PER_SECOND, TimeMs};
pub use timeline::{Timeline, TimelineConfig};
