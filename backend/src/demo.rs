//! Demo application: a radio schedule across six stations
//!
//! Every session shares one item provider, so an item added or removed in
//! one browser shows up in all others.

use crate::config::{DemoSection, TimelineSection};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Animation, ClickTarget, ItemType};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use timeline_sync::{
    BasicItemProvider, ClickEvent, ClickKind, Group, Item, RangeChangedEvent,
    SelectionChangedEvent, TimeMs, Timeline,
};

const MINUTE: i64 = 60_000;

pub struct Demo {
    provider: Arc<BasicItemProvider>,
    groups: Vec<Group>,
    next_user_item: AtomicU64,
}

impl Demo {
    /// Schedules `item_count` programs back to back from `start`, each
    /// 10 to 60 minutes long and starting 10 minutes after the previous one.
    pub fn seeded(config: &DemoSection, start: TimeMs) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut program_start = start;
        let mut items = Vec::with_capacity(config.item_count);

        for index in 0..config.item_count {
            let length = rng.gen_range(10..60) * MINUTE;
            let program = &config.programs[rng.gen_range(0..config.programs.len())];
            let group = &config.groups[rng.gen_range(0..config.groups.len())];
            items.push(
                Item::ranged(
                    format!("program-{index}"),
                    program.as_str(),
                    program_start,
                    program_start.add_millis(length),
                )
                .with_group(group.as_str()),
            );
            program_start = program_start.add_millis(10 * MINUTE);
        }

        let groups = config
            .groups
            .iter()
            .enumerate()
            .map(|(order, id)| Group::new(id.as_str(), id.as_str()).with_order(order as i32))
            .collect();

        log::info!(
            "Demo schedule: {} programs on {} stations",
            items.len(),
            config.groups.len()
        );
        Self {
            provider: Arc::new(BasicItemProvider::with_items(items)),
            groups,
            next_user_item: AtomicU64::new(1),
        }
    }

    pub fn provider(&self) -> &Arc<BasicItemProvider> {
        &self.provider
    }

    pub fn open_timeline(&self, section: &TimelineSection) -> Timeline {
        let mut timeline = Timeline::with_config(self.provider.clone(), section.timeline_config());
        timeline.set_groups(self.groups.clone());
        timeline.set_options(section.options.clone());
        timeline
    }

    pub fn on_click(&self, timeline: &mut Timeline, event: ClickEvent) -> timeline_sync::Result<()> {
        match (event.kind, event.item_id, event.props.what) {
            (ClickKind::DoubleClick, None, Some(ClickTarget::Background)) => {
                let id = self.next_user_item.fetch_add(1, Ordering::Relaxed);
                let mut item = Item::new(
                    format!("user-{id}"),
                    "New event",
                    TimeMs(event.props.snapped_time),
                )
                .with_type(ItemType::Point);
                if let Some(group) = event.props.group {
                    item = item.with_group(group);
                }
                log::info!("Adding {} at {}", item.id, item.start);
                timeline.add_item(item)
            }
            (ClickKind::DoubleClick, Some(id), _) => {
                timeline.focus(&[id], Some(Animation::default()));
                Ok(())
            }
            (ClickKind::ContextMenu, Some(id), _) => {
                if timeline.remove_item(&id)?.is_some() {
                    log::info!("Removed {id}");
                }
                Ok(())
            }
            (ClickKind::Click, None, Some(ClickTarget::Axis)) => {
                // zoom in around the clicked time
                let Some(window) = timeline.window() else {
                    return Ok(());
                };
                let half = (window.span_millis() / 4).max(MINUTE);
                let center = TimeMs(event.props.time);
                timeline.request_window(
                    center.sub_millis(half),
                    center.add_millis(half),
                    Some(Animation::default()),
                )
            }
            _ => Ok(()),
        }
    }

    pub fn on_range_changed(&self, event: &RangeChangedEvent) {
        log::info!(
            "Window moved to {} ({})",
            event.range,
            if event.by_user { "user" } else { "server" }
        );
    }

    pub fn on_selection_changed(&self, event: &SelectionChangedEvent) {
        log::info!(
            "Selection: {:?} (added {:?}, removed {:?})",
            event.selection,
            event.added,
            event.removed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{EventProperties, UpMsg};
    use timeline_sync::{DateRange, ItemId, ItemProvider};

    const T0: i64 = 1_700_000_000_000;

    fn demo() -> Demo {
        Demo::seeded(&DemoSection::default(), TimeMs(T0))
    }

    fn everything() -> DateRange {
        DateRange::new(TimeMs(T0 - MS_DAY), TimeMs(T0 + MS_DAY))
    }

    const MS_DAY: i64 = 24 * 60 * MINUTE;

    fn connected(demo: &Demo) -> Timeline {
        let mut timeline = demo.open_timeline(&TimelineSection::default());
        timeline.attach();
        timeline.flush();
        timeline
            .handle(UpMsg::RangeChanged {
                start: T0,
                end: T0 + 60 * MINUTE,
                by_user: false,
            })
            .unwrap();
        timeline.flush();
        timeline.take_outgoing();
        timeline
    }

    fn click(kind: ClickKind, item_id: Option<ItemId>, what: ClickTarget) -> ClickEvent {
        ClickEvent {
            kind,
            item_id,
            props: EventProperties {
                group: Some("S002".to_string()),
                time: T0 + 20 * MINUTE,
                snapped_time: T0 + 20 * MINUTE,
                what: Some(what),
                ..EventProperties::default()
            },
        }
    }

    #[test]
    fn test_seeded_schedule_is_deterministic() {
        let first = demo().provider().items(everything());
        let second = demo().provider().items(everything());
        assert_eq!(first.len(), 50);
        assert_eq!(first, second);

        let section = DemoSection::default();
        for (index, item) in first.iter().enumerate() {
            assert_eq!(item.start, TimeMs(T0 + index as i64 * 10 * MINUTE));
            let length = item.end.map(|end| end.0 - item.start.0).unwrap_or_default();
            assert!((10 * MINUTE..60 * MINUTE).contains(&length));
            assert!(section.groups.contains(item.group.as_ref().unwrap()));
            assert!(section.programs.contains(&item.content));
        }
    }

    #[test]
    fn test_double_click_background_adds_point() {
        let demo = demo();
        let mut timeline = connected(&demo);

        demo.on_click(&mut timeline, click(ClickKind::DoubleClick, None, ClickTarget::Background))
            .unwrap();

        let added = demo.provider().get(&ItemId::from("user-1")).expect("item added");
        assert_eq!(added.start, TimeMs(T0 + 20 * MINUTE));
        assert_eq!(added.group.as_deref(), Some("S002"));
        assert_eq!(added.item_type, Some(ItemType::Point));
    }

    #[test]
    fn test_context_menu_removes_item() {
        let demo = demo();
        let mut timeline = connected(&demo);

        demo.on_click(
            &mut timeline,
            click(ClickKind::ContextMenu, Some(ItemId::from("program-0")), ClickTarget::Item),
        )
        .unwrap();

        assert!(demo.provider().get(&ItemId::from("program-0")).is_none());
        assert_eq!(demo.provider().len(), 49);
    }

    #[test]
    fn test_axis_click_zooms_in() {
        let demo = demo();
        let mut timeline = connected(&demo);

        demo.on_click(&mut timeline, click(ClickKind::Click, None, ClickTarget::Axis))
            .unwrap();
        timeline.flush();
        let out = timeline.take_outgoing();
        assert!(matches!(
            out.as_slice(),
            [shared::DownMsg::SetWindow { start, end, .. }]
                if *start == T0 + 5 * MINUTE && *end == T0 + 35 * MINUTE
        ));
    }
}
