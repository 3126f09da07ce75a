use serde::{Deserialize, Serialize};

// ===== MESSAGE TYPES =====

/// Messages sent by the browser timeline connector.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UpMsg {
    Hello {
        #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },
    RangeChanged {
        start: i64,
        end: i64,
        #[serde(rename = "byUser", default)]
        by_user: bool,
    },
    Select { keys: Vec<String> },
    Click { props: EventProperties },
    DoubleClick { props: EventProperties },
    ContextMenu { props: EventProperties },
    AckSetCurrentTime,
}

/// Messages pushed to the browser timeline connector.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DownMsg {
    SessionStarted {
        #[serde(rename = "sessionId")]
        session_id: String,
        restored: bool,
    },
    SetOptions { options: TimelineOptions },
    SetWindow {
        start: i64,
        end: i64,
        options: SetWindowOptions,
    },
    SetItems { items: Vec<ItemRecord> },
    SetGroups { groups: Vec<GroupRecord> },
    SetSelection {
        keys: Vec<String>,
        options: SetSelectionOptions,
    },
    SetCurrentTime { time: i64 },
    AddCustomTime { time: i64, id: String },
    RemoveCustomTime { id: String },
    SetCustomTime { time: i64, id: String },
    Fit { options: FitOptions },
    MoveTo { time: i64, options: MoveToOptions },
    Focus {
        keys: Vec<String>,
        options: FocusOptions,
    },
    Error { message: String },
}

impl DownMsg {
    pub fn kind(&self) -> &'static str {
        match self {
            DownMsg::SessionStarted { .. } => "sessionStarted",
            DownMsg::SetOptions { .. } => "setOptions",
            DownMsg::SetWindow { .. } => "setWindow",
            DownMsg::SetItems { .. } => "setItems",
            DownMsg::SetGroups { .. } => "setGroups",
            DownMsg::SetSelection { .. } => "setSelection",
            DownMsg::SetCurrentTime { .. } => "setCurrentTime",
            DownMsg::AddCustomTime { .. } => "addCustomTime",
            DownMsg::RemoveCustomTime { .. } => "removeCustomTime",
            DownMsg::SetCustomTime { .. } => "setCustomTime",
            DownMsg::Fit { .. } => "fit",
            DownMsg::MoveTo { .. } => "moveTo",
            DownMsg::Focus { .. } => "focus",
            DownMsg::Error { .. } => "error",
        }
    }
}

// ===== RECORDS =====

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    /// Render key, not the application's item identity.
    pub id: String,
    pub content: String,
    pub start: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgroup: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgroup_order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Box,
    Point,
    Range,
    Background,
}

// ===== ANIMATION =====

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum EasingFunction {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    #[default]
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    /// Milliseconds.
    pub duration: u32,
    pub easing_function: EasingFunction,
}

impl Animation {
    pub const DEFAULT_DURATION_MS: u32 = 500;

    pub fn new(duration: u32, easing_function: EasingFunction) -> Self {
        Self {
            duration,
            easing_function,
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION_MS, EasingFunction::default())
    }
}

// ===== METHOD OPTIONS =====

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetWindowOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetSelectionOptions {
    #[serde(default)]
    pub focus: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FitOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveToOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

// ===== EVENT PROPERTIES =====

/// Pointer event details reported by the client with click, double-click
/// and context-menu messages.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventProperties {
    #[serde(default)]
    pub group: Option<String>,
    /// Render key of the item under the pointer.
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub page_x: i32,
    #[serde(default)]
    pub page_y: i32,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub time: i64,
    pub snapped_time: i64,
    #[serde(default)]
    pub what: Option<ClickTarget>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ClickTarget {
    Item,
    Background,
    Axis,
    GroupLabel,
    CustomTime,
    CurrentTime,
}

// ===== TIMELINE OPTIONS =====

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemAlignment {
    #[default]
    Center,
    Left,
    Right,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Bottom,
    Top,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EditableOptions {
    pub add: bool,
    pub remove: bool,
    pub update_group: bool,
    pub update_time: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ItemMargin {
    pub horizontal: u32,
    pub vertical: u32,
}

impl Default for ItemMargin {
    fn default() -> Self {
        Self {
            horizontal: 10,
            vertical: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Margin {
    pub axis: u32,
    pub item: ItemMargin,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            axis: 20,
            item: ItemMargin::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TimeAxis {
    /// One of millisecond, second, minute, hour, weekday, day, month, year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    pub step: u32,
}

impl Default for TimeAxis {
    fn default() -> Self {
        Self {
            scale: None,
            step: 1,
        }
    }
}

/// Widget configuration pushed with `setOptions`. Field names follow the
/// client library so the record is passed through verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineOptions {
    pub align: ItemAlignment,
    pub auto_resize: bool,
    pub click_to_use: bool,
    pub editable: EditableOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_order: Option<String>,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    pub moveable: bool,
    pub multiselect: bool,
    pub orientation: Orientation,
    pub selectable: bool,
    pub show_current_time: bool,
    pub show_major_labels: bool,
    pub show_minor_labels: bool,
    pub stack: bool,
    pub time_axis: TimeAxis,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub zoomable: bool,
    /// Milliseconds.
    pub zoom_max: i64,
    /// Milliseconds.
    pub zoom_min: i64,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            align: ItemAlignment::Center,
            auto_resize: true,
            click_to_use: false,
            editable: EditableOptions::default(),
            group_order: None,
            margin: Margin::default(),
            min: None,
            max: None,
            moveable: true,
            multiselect: false,
            orientation: Orientation::Bottom,
            selectable: true,
            show_current_time: true,
            show_major_labels: true,
            show_minor_labels: true,
            stack: true,
            time_axis: TimeAxis::default(),
            item_type: ItemType::Box,
            zoomable: true,
            zoom_max: i32::MAX as i64,
            zoom_min: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_up_msg_from_client_json() {
        let msg: UpMsg = serde_json::from_value(json!({
            "type": "rangeChanged",
            "start": 1000,
            "end": 2000,
            "byUser": true
        }))
        .unwrap();
        assert_eq!(
            msg,
            UpMsg::RangeChanged {
                start: 1000,
                end: 2000,
                by_user: true
            }
        );

        let hello: UpMsg = serde_json::from_value(json!({ "type": "hello" })).unwrap();
        assert_eq!(hello, UpMsg::Hello { session_id: None });

        let ack: UpMsg = serde_json::from_value(json!({ "type": "ackSetCurrentTime" })).unwrap();
        assert_eq!(ack, UpMsg::AckSetCurrentTime);
    }

    #[test]
    fn test_click_props_parse_what() {
        let msg: UpMsg = serde_json::from_value(json!({
            "type": "doubleClick",
            "props": {
                "group": "S001",
                "item": null,
                "pageX": 10, "pageY": 20, "x": 3, "y": 4,
                "time": 5000,
                "snappedTime": 4800,
                "what": "group-label"
            }
        }))
        .unwrap();
        let UpMsg::DoubleClick { props } = msg else {
            panic!("expected doubleClick");
        };
        assert_eq!(props.what, Some(ClickTarget::GroupLabel));
        assert_eq!(props.snapped_time, 4800);
        assert_eq!(props.item, None);
    }

    #[test]
    fn test_item_record_omits_unset_fields() {
        let record = ItemRecord {
            id: "7".to_string(),
            content: "Morning Edition".to_string(),
            start: 100,
            end: None,
            class_name: None,
            group: Some("S001".to_string()),
            subgroup: None,
            item_type: Some(ItemType::Point),
            title: None,
            style: None,
            editable: Some(false),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "7",
                "content": "Morning Edition",
                "start": 100,
                "group": "S001",
                "type": "point",
                "editable": false
            })
        );
    }

    #[test]
    fn test_down_msg_tagging() {
        let msg = DownMsg::SetWindow {
            start: 1,
            end: 2,
            options: SetWindowOptions {
                animation: Some(Animation::default()),
            },
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "setWindow",
                "start": 1,
                "end": 2,
                "options": {
                    "animation": { "duration": 500, "easingFunction": "easeInOutQuad" }
                }
            })
        );
        assert_eq!(msg.kind(), "setWindow");
    }

    #[test]
    fn test_timeline_options_defaults() {
        let options: TimelineOptions =
            serde_json::from_value(json!({ "multiselect": true })).unwrap();
        assert!(options.multiselect);
        assert_eq!(options.zoom_min, 10);
        assert_eq!(options.margin.axis, 20);
        assert_eq!(options.margin.item.horizontal, 10);
        assert_eq!(options.orientation, Orientation::Bottom);
        assert_eq!(options.align, ItemAlignment::Center);

        let value = serde_json::to_value(TimelineOptions::default()).unwrap();
        assert_eq!(value["type"], "box");
        assert_eq!(value["showCurrentTime"], true);
        assert_eq!(value["timeAxis"], json!({ "step": 1 }));
        assert!(value.get("min").is_none());
    }
}
