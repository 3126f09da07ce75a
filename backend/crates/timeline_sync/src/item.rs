//! Items and groups as the application sees them
//!
//! Values are never edited in place. To change an item the application
//! replaces it in its provider, which announces the change.

use crate::time::{DateRange, TimeMs};
use serde::{Deserialize, Serialize};
use shared::{GroupRecord, ItemRecord, ItemType};
use std::fmt;

/// Application-side item identity. Never sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        ItemId(id)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id.to_string())
    }
}

/// Client-facing item identifier handed out by the key mapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey(String);

impl RenderKey {
    pub(crate) fn from_index(index: u64) -> Self {
        RenderKey(index.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RenderKey {
    fn from(key: &str) -> Self {
        RenderKey(key.to_string())
    }
}

impl From<String> for RenderKey {
    fn from(key: String) -> Self {
        RenderKey(key)
    }
}

impl From<RenderKey> for String {
    fn from(key: RenderKey) -> Self {
        key.0
    }
}

/// Where an item lies relative to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    Within,
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    /// HTML content shown by the client.
    pub content: String,
    pub start: TimeMs,
    /// `None` makes the item a point event.
    pub end: Option<TimeMs>,
    pub class_name: Option<String>,
    pub group: Option<String>,
    pub subgroup: Option<String>,
    pub item_type: Option<ItemType>,
    pub title: Option<String>,
    pub style: Option<String>,
    /// `None` defers to the widget-wide editable options.
    pub editable: Option<bool>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, content: impl Into<String>, start: TimeMs) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            start,
            end: None,
            class_name: None,
            group: None,
            subgroup: None,
            item_type: None,
            title: None,
            style: None,
            editable: None,
        }
    }

    pub fn ranged(
        id: impl Into<ItemId>,
        content: impl Into<String>,
        start: TimeMs,
        end: TimeMs,
    ) -> Self {
        Self::new(id, content, start).with_end(end)
    }

    pub fn with_end(mut self, end: TimeMs) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_subgroup(mut self, subgroup: impl Into<String>) -> Self {
        self.subgroup = Some(subgroup.into());
        self
    }

    pub fn with_type(mut self, item_type: ItemType) -> Self {
        self.item_type = Some(item_type);
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn is_point(&self) -> bool {
        self.end.is_none()
    }

    /// Point items must start inside the window. Ranged items only have to
    /// intersect it and are not clipped.
    pub fn placement(&self, window: DateRange) -> Placement {
        if self.start > window.end() {
            return Placement::After;
        }
        let last = self.end.unwrap_or(self.start);
        if last < window.start() {
            return Placement::Before;
        }
        Placement::Within
    }

    pub fn is_visible_in(&self, window: DateRange) -> bool {
        self.placement(window) == Placement::Within
    }

    pub fn to_record(&self, key: &RenderKey) -> ItemRecord {
        ItemRecord {
            id: key.to_string(),
            content: self.content.clone(),
            start: self.start.millis(),
            end: self.end.map(TimeMs::millis),
            class_name: self.class_name.clone(),
            group: self.group.clone(),
            subgroup: self.subgroup.clone(),
            item_type: self.item_type,
            title: self.title.clone(),
            style: self.style.clone(),
            editable: self.editable,
        }
    }
}

/// A row of the timeline. Items refer to groups by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub content: String,
    pub class_name: Option<String>,
    pub order: Option<i32>,
    pub style: Option<String>,
    pub subgroup_order: Option<String>,
    pub title: Option<String>,
}

impl Group {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            class_name: None,
            order: None,
            style: None,
            subgroup_order: None,
            title: None,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn to_record(&self) -> GroupRecord {
        GroupRecord {
            id: self.id.clone(),
            content: self.content.clone(),
            class_name: self.class_name.clone(),
            order: self.order,
            style: self.style.clone(),
            subgroup_order: self.subgroup_order.clone(),
            title: self.title.clone(),
        }
    }
}
