//! Server-side timeline widget
//!
//! `Timeline` owns everything one client connection needs: the sync state,
//! the render keys, the selection and the outgoing message queue. All entry
//! points are synchronous; the transport calls [`Timeline::flush`] once per
//! round trip and sends whatever [`Timeline::take_outgoing`] returns.

use crate::error::{Result, TimelineError};
use crate::events::{ClickEvent, ClickKind, RangeChangedEvent, TimelineEvents};
use crate::expansion::{DEFAULT_WINDOW_EXPAND_FACTOR, ExpandedItemProvider};
use crate::item::{Group, Item, ItemId, RenderKey};
use crate::key_mapper::KeyMapper;
use crate::provider::{ItemProvider, ItemSetChange, SourceId};
use crate::selection::SelectionReconciler;
use crate::sync::{FlushPlan, RangeReport, SyncState};
use crate::time::{DateRange, MS_PER_HOUR, TimeMs};
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use shared::{
    Animation, DownMsg, EventProperties, FitOptions, FocusOptions, MoveToOptions,
    SetSelectionOptions, SetWindowOptions, TimelineOptions, UpMsg,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineConfig {
    pub window_expand_factor: f64,
    /// Length of the window shown to a client that has never reported one.
    pub default_window_millis: i64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            window_expand_factor: DEFAULT_WINDOW_EXPAND_FACTOR,
            default_window_millis: 8 * MS_PER_HOUR,
        }
    }
}

pub struct Timeline {
    provider: ExpandedItemProvider,
    active_source: Option<SourceId>,
    item_set_tx: UnboundedSender<ItemSetChange>,
    item_set_rx: UnboundedReceiver<ItemSetChange>,
    keys: KeyMapper,
    selection: SelectionReconciler,
    sync: SyncState,
    groups: Vec<Group>,
    options: TimelineOptions,
    options_dirty: bool,
    default_window_millis: i64,
    events: TimelineEvents,
    outgoing: Vec<DownMsg>,
}

impl Timeline {
    pub fn new(provider: Arc<dyn ItemProvider>) -> Self {
        Self::with_config(provider, TimelineConfig::default())
    }

    pub fn with_config(provider: Arc<dyn ItemProvider>, config: TimelineConfig) -> Self {
        let (item_set_tx, item_set_rx) = unbounded();
        let active_source = subscribe(provider.as_ref(), &item_set_tx);
        Self {
            provider: ExpandedItemProvider::with_factor(provider, config.window_expand_factor),
            active_source,
            item_set_tx,
            item_set_rx,
            keys: KeyMapper::new(),
            selection: SelectionReconciler::new(),
            sync: SyncState::new(),
            groups: Vec::new(),
            options: TimelineOptions::default(),
            options_dirty: false,
            default_window_millis: config.default_window_millis,
            events: TimelineEvents::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn events(&self) -> &TimelineEvents {
        &self.events
    }

    // ===== ITEMS =====

    pub fn item_provider(&self) -> &Arc<dyn ItemProvider> {
        self.provider.inner()
    }

    /// Switches to another item source. Change notifications still queued
    /// from the previous source are ignored.
    pub fn set_item_provider(&mut self, provider: Arc<dyn ItemProvider>) {
        self.active_source = subscribe(provider.as_ref(), &self.item_set_tx);
        let factor = self.provider.factor();
        self.provider = ExpandedItemProvider::with_factor(provider, factor);
        self.sync.mark_items_dirty();
    }

    pub fn window_expand_factor(&self) -> f64 {
        self.provider.factor()
    }

    pub fn set_window_expand_factor(&mut self, factor: f64) {
        self.provider.set_factor(factor);
        self.sync.mark_items_dirty();
    }

    /// Items the client would receive for `window`.
    pub fn items(&self, window: DateRange) -> Vec<Item> {
        self.provider.items(window)
    }

    pub fn add_item(&mut self, item: Item) -> Result<()> {
        let editable = self
            .provider
            .editable()
            .ok_or(TimelineError::UnsupportedOperation("add_item"))?;
        editable.add_item(item);
        self.sync.mark_items_dirty();
        Ok(())
    }

    pub fn remove_item(&mut self, id: &ItemId) -> Result<Option<Item>> {
        let editable = self
            .provider
            .editable()
            .ok_or(TimelineError::UnsupportedOperation("remove_item"))?;
        let removed = editable.remove_item(id);
        if removed.is_some() {
            self.sync.mark_items_dirty();
        }
        Ok(removed)
    }

    /// Waits for the next item-set change announced by any provider this
    /// timeline ever subscribed to. Pass the result to
    /// [`Timeline::item_set_changed`].
    pub async fn next_item_set_change(&mut self) -> Option<ItemSetChange> {
        self.item_set_rx.next().await
    }

    /// Handles every change that is already queued, without waiting.
    pub fn drain_item_set_changes(&mut self) {
        while let Ok(Some(change)) = self.item_set_rx.try_next() {
            self.item_set_changed(change);
        }
    }

    pub fn item_set_changed(&mut self, change: ItemSetChange) {
        if self.active_source == Some(change.source) {
            self.sync.mark_items_dirty();
        } else {
            log::debug!("Ignoring item set change from stale source {:?}", change.source);
        }
    }

    // ===== GROUPS & OPTIONS =====

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn set_groups(&mut self, groups: Vec<Group>) {
        self.groups = groups;
        self.sync.mark_groups_dirty();
    }

    pub fn options(&self) -> &TimelineOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TimelineOptions) {
        self.options = options;
        self.options_dirty = true;
    }

    // ===== WINDOW =====

    /// The window the client last reported as rendered.
    pub fn window(&self) -> Option<DateRange> {
        self.sync.confirmed()
    }

    pub fn request_window(
        &mut self,
        start: TimeMs,
        end: TimeMs,
        animation: Option<Animation>,
    ) -> Result<()> {
        let range = DateRange::checked(start, end)?;
        log::debug!("Window {range} requested");
        self.sync.request_window(range, animation);
        Ok(())
    }

    pub fn fit(&mut self, animation: Option<Animation>) {
        self.outgoing.push(DownMsg::Fit {
            options: FitOptions { animation },
        });
    }

    pub fn move_to(&mut self, time: TimeMs, animation: Option<Animation>) {
        self.outgoing.push(DownMsg::MoveTo {
            time: time.millis(),
            options: MoveToOptions { animation },
        });
    }

    pub fn focus(&mut self, ids: &[ItemId], animation: Option<Animation>) {
        let keys = self.keys.keys(ids);
        self.outgoing.push(DownMsg::Focus {
            keys: keys.into_iter().map(String::from).collect(),
            options: FocusOptions { animation },
        });
    }

    // ===== TIME MARKERS =====

    pub fn set_current_time(&mut self, time: TimeMs) {
        self.outgoing.push(DownMsg::SetCurrentTime {
            time: time.millis(),
        });
    }

    pub fn add_custom_time(&mut self, time: TimeMs, id: impl Into<String>) {
        self.outgoing.push(DownMsg::AddCustomTime {
            time: time.millis(),
            id: id.into(),
        });
    }

    pub fn set_custom_time(&mut self, time: TimeMs, id: impl Into<String>) {
        self.outgoing.push(DownMsg::SetCustomTime {
            time: time.millis(),
            id: id.into(),
        });
    }

    pub fn remove_custom_time(&mut self, id: impl Into<String>) {
        self.outgoing.push(DownMsg::RemoveCustomTime { id: id.into() });
    }

    // ===== SELECTION =====

    /// The selection as last reported by the client.
    pub fn selection(&self) -> Vec<ItemId> {
        self.selection.selection()
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selection.is_selected(id)
    }

    /// Asks the client to select `ids`. The stored selection follows once the
    /// client reports it back.
    pub fn set_selection(&mut self, ids: &[ItemId], options: SetSelectionOptions) {
        let keys = self.keys.keys(ids);
        self.push_selection(keys, options);
    }

    pub fn deselect(&mut self, ids: &[ItemId], options: SetSelectionOptions) {
        let remaining: Vec<ItemId> = self
            .selection
            .selection()
            .into_iter()
            .filter(|id| !ids.contains(id))
            .collect();
        self.set_selection(&remaining, options);
    }

    pub fn deselect_all(&mut self, options: SetSelectionOptions) {
        self.set_selection(&[], options);
    }

    fn push_selection(&mut self, keys: Vec<RenderKey>, options: SetSelectionOptions) {
        self.outgoing.push(DownMsg::SetSelection {
            keys: keys.into_iter().map(String::from).collect(),
            options,
        });
    }

    // ===== CLIENT MESSAGES =====

    /// Marks the start of a client connection; the next flush brings it up
    /// to date.
    pub fn attach(&mut self) {
        self.sync.attach();
    }

    /// Applies one client message. A `KeyNotFound` error means client and
    /// server disagree about render keys; the message had no effect.
    pub fn handle(&mut self, msg: UpMsg) -> Result<()> {
        match msg {
            UpMsg::Hello { .. } => {
                self.attach();
                Ok(())
            }
            UpMsg::RangeChanged {
                start,
                end,
                by_user,
            } => {
                self.range_reported(TimeMs(start), TimeMs(end), by_user);
                Ok(())
            }
            UpMsg::Select { keys } => {
                let keys: Vec<RenderKey> = keys.into_iter().map(RenderKey::from).collect();
                self.selection_reported(&keys)
            }
            UpMsg::Click { props } => self.clicked(ClickKind::Click, props),
            UpMsg::DoubleClick { props } => self.clicked(ClickKind::DoubleClick, props),
            UpMsg::ContextMenu { props } => self.clicked(ClickKind::ContextMenu, props),
            UpMsg::AckSetCurrentTime => {
                log::trace!("Client acknowledged current time");
                Ok(())
            }
        }
    }

    fn range_reported(&mut self, start: TimeMs, end: TimeMs, by_user: bool) {
        let range = DateRange::new(start, end);
        if let RangeReport::Changed(range) = self.sync.range_reported(range) {
            log::debug!("Client window is now {range} (by user: {by_user})");
            self.events
                .range_changed
                .send(RangeChangedEvent { range, by_user });
        }
    }

    fn selection_reported(&mut self, keys: &[RenderKey]) -> Result<()> {
        if let Some(event) = self.selection.reconcile(keys, &mut self.keys)? {
            self.events.selection_changed.send(event);
        }
        Ok(())
    }

    fn clicked(&mut self, kind: ClickKind, props: EventProperties) -> Result<()> {
        let item_id = match &props.item {
            Some(key) => Some(self.keys.item_id(&RenderKey::from(key.as_str()))?),
            None => None,
        };
        self.events.clicked.send(ClickEvent {
            kind,
            item_id,
            props,
        });
        Ok(())
    }

    // ===== FLUSH =====

    /// Queues everything the client is missing. Call once per round trip,
    /// after the inbound message and application reactions were handled.
    pub fn flush(&mut self) {
        let default_window =
            DateRange::starting_at(TimeMs::now(), self.default_window_millis);
        let plan = self.sync.plan(default_window);
        self.execute(&plan);
        self.sync.apply(&plan);
    }

    fn execute(&mut self, plan: &FlushPlan) {
        // window, groups and items go out after method calls queued
        // earlier in this round trip
        let mut pushes = Vec::new();
        if plan.attach || self.options_dirty {
            pushes.push(DownMsg::SetOptions {
                options: self.options.clone(),
            });
            self.options_dirty = false;
        }
        if let Some(window) = plan.window {
            log::debug!("Pushing window {}", window.range);
            pushes.push(DownMsg::SetWindow {
                start: window.range.start().millis(),
                end: window.range.end().millis(),
                options: SetWindowOptions {
                    animation: window.animation,
                },
            });
        }
        if plan.groups {
            pushes.push(DownMsg::SetGroups {
                groups: self.groups.iter().map(Group::to_record).collect(),
            });
        }
        self.outgoing.append(&mut pushes);

        if let Some(window) = plan.items {
            self.push_items(window);
        }
    }

    fn push_items(&mut self, window: DateRange) {
        let items = self.provider.items(window);
        self.keys.set_active_rows(items.iter().map(|item| &item.id));
        let records = items
            .iter()
            .map(|item| {
                let key = self.keys.key(&item.id);
                item.to_record(&key)
            })
            .collect::<Vec<_>>();
        log::debug!("Pushing {} items for {window}", records.len());
        self.outgoing.push(DownMsg::SetItems { items: records });

        // the client forgets the selection of items it re-renders
        if !self.selection.is_empty() {
            let keys = self.selection.selected_keys(&mut self.keys);
            self.push_selection(keys, SetSelectionOptions::default());
        }
    }

    pub fn take_outgoing(&mut self) -> Vec<DownMsg> {
        std::mem::take(&mut self.outgoing)
    }
}

fn subscribe(
    provider: &dyn ItemProvider,
    item_set_tx: &UnboundedSender<ItemSetChange>,
) -> Option<SourceId> {
    let notifier = provider.notifier()?;
    notifier.subscribe(item_set_tx.clone());
    Some(notifier.source())
}
