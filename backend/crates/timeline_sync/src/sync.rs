//! Pending-synchronization state between server and client
//!
//! `SyncState` records what the client is missing. `plan` decides what one
//! flush pushes without touching the state; `apply` then clears exactly the
//! flags the plan satisfied.

use crate::time::DateRange;
use shared::Animation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowSync {
    #[default]
    Clean,
    /// The application asked for a window that has not been pushed yet.
    Requested {
        range: DateRange,
        animation: Option<Animation>,
    },
    /// Pushed, waiting for the client to report it as rendered.
    AwaitingConfirmation { range: DateRange },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPush {
    pub range: DateRange,
    pub animation: Option<Animation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushPlan {
    pub window: Option<WindowPush>,
    pub groups: bool,
    /// Window to query items for.
    pub items: Option<DateRange>,
    /// Re-sends everything a reconnecting client lost; the window is already
    /// confirmed, so nothing waits for a range report afterwards.
    pub restore: bool,
    pub attach: bool,
}

impl FlushPlan {
    pub fn is_empty(&self) -> bool {
        self.window.is_none() && !self.groups && self.items.is_none() && !self.attach
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeReport {
    Changed(DateRange),
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncState {
    items_dirty: bool,
    groups_dirty: bool,
    window: WindowSync,
    confirmed: Option<DateRange>,
    attach_pending: bool,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(&self) -> WindowSync {
        self.window
    }

    pub fn confirmed(&self) -> Option<DateRange> {
        self.confirmed
    }

    pub fn items_dirty(&self) -> bool {
        self.items_dirty
    }

    pub fn groups_dirty(&self) -> bool {
        self.groups_dirty
    }

    pub fn attach_pending(&self) -> bool {
        self.attach_pending
    }

    /// A newly attached client has rendered nothing, whatever the window.
    pub fn attach(&mut self) {
        self.attach_pending = true;
        self.items_dirty = true;
    }

    pub fn mark_items_dirty(&mut self) {
        self.items_dirty = true;
    }

    pub fn mark_groups_dirty(&mut self) {
        self.groups_dirty = true;
    }

    /// Last request wins. The confirmed window stays until the client reports.
    pub fn request_window(&mut self, range: DateRange, animation: Option<Animation>) {
        self.window = WindowSync::Requested { range, animation };
    }

    /// Any report answers a pushed request. A request still waiting to be
    /// pushed is newer than the report and survives it.
    pub fn range_reported(&mut self, range: DateRange) -> RangeReport {
        if let WindowSync::AwaitingConfirmation { .. } = self.window {
            self.window = WindowSync::Clean;
        }
        if self.confirmed == Some(range) {
            return RangeReport::Unchanged;
        }
        self.confirmed = Some(range);
        self.items_dirty = true;
        RangeReport::Changed(range)
    }

    pub fn plan(&self, default_window: DateRange) -> FlushPlan {
        if self.attach_pending && self.window == WindowSync::Clean {
            return match self.confirmed {
                None => FlushPlan {
                    window: Some(WindowPush {
                        range: default_window,
                        animation: None,
                    }),
                    attach: true,
                    ..FlushPlan::default()
                },
                Some(confirmed) => FlushPlan {
                    window: Some(WindowPush {
                        range: confirmed,
                        animation: None,
                    }),
                    groups: true,
                    items: Some(confirmed),
                    restore: true,
                    attach: true,
                },
            };
        }

        let window = match self.window {
            WindowSync::Requested { range, animation } => Some(WindowPush { range, animation }),
            // the client that was asked is gone, ask the new one
            WindowSync::AwaitingConfirmation { range } if self.attach_pending => Some(WindowPush {
                range,
                animation: None,
            }),
            _ => None,
        };
        let items = match (self.window, self.confirmed) {
            (WindowSync::Clean, Some(confirmed)) if self.items_dirty => Some(confirmed),
            _ => None,
        };
        FlushPlan {
            window,
            groups: self.groups_dirty || self.attach_pending,
            items,
            restore: false,
            attach: self.attach_pending,
        }
    }

    pub fn apply(&mut self, plan: &FlushPlan) {
        if let Some(push) = plan.window {
            self.window = if plan.restore {
                WindowSync::Clean
            } else {
                WindowSync::AwaitingConfirmation { range: push.range }
            };
        }
        if plan.groups {
            self.groups_dirty = false;
        }
        if plan.items.is_some() {
            self.items_dirty = false;
        }
        if plan.attach {
            self.attach_pending = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeMs;

    fn range(start: i64, end: i64) -> DateRange {
        DateRange::new(TimeMs(start), TimeMs(end))
    }

    fn flush(state: &mut SyncState) -> FlushPlan {
        let plan = state.plan(range(0, 100));
        state.apply(&plan);
        plan
    }

    #[test]
    fn test_fresh_attach_requests_default_window_only() {
        let mut state = SyncState::new();
        state.mark_groups_dirty();
        state.mark_items_dirty();
        state.attach();

        let plan = flush(&mut state);
        assert_eq!(plan.window.map(|w| w.range), Some(range(0, 100)));
        assert!(!plan.groups);
        assert_eq!(plan.items, None);
        assert_eq!(
            state.window(),
            WindowSync::AwaitingConfirmation {
                range: range(0, 100)
            }
        );

        assert_eq!(state.range_reported(range(0, 100)), RangeReport::Changed(range(0, 100)));
        let plan = flush(&mut state);
        assert!(plan.groups);
        assert_eq!(plan.items, Some(range(0, 100)));
        assert!(flush(&mut state).is_empty());
    }

    #[test]
    fn test_restore_pushes_window_groups_and_items_together() {
        let mut state = SyncState::new();
        state.attach();
        flush(&mut state);
        state.range_reported(range(10, 20));
        flush(&mut state);

        state.attach();
        let plan = flush(&mut state);
        assert!(plan.restore);
        assert_eq!(plan.window.map(|w| w.range), Some(range(10, 20)));
        assert!(plan.groups);
        assert_eq!(plan.items, Some(range(10, 20)));
        assert_eq!(state.window(), WindowSync::Clean);
        assert!(flush(&mut state).is_empty());
    }

    #[test]
    fn test_requested_window_defers_items() {
        let mut state = SyncState::new();
        state.range_reported(range(0, 10));
        flush(&mut state);

        state.request_window(range(50, 60), None);
        state.mark_items_dirty();
        let plan = flush(&mut state);
        assert_eq!(plan.window.map(|w| w.range), Some(range(50, 60)));
        assert_eq!(plan.items, None);
        assert_eq!(state.confirmed(), Some(range(0, 10)));

        // still waiting: nothing to push
        assert!(flush(&mut state).is_empty());

        state.range_reported(range(50, 60));
        assert_eq!(flush(&mut state).items, Some(range(50, 60)));
    }

    #[test]
    fn test_unchanged_report_is_idempotent() {
        let mut state = SyncState::new();
        assert!(matches!(state.range_reported(range(0, 10)), RangeReport::Changed(_)));
        flush(&mut state);

        assert_eq!(state.range_reported(range(0, 10)), RangeReport::Unchanged);
        assert!(!state.items_dirty());
    }

    #[test]
    fn test_unchanged_report_still_answers_pushed_request() {
        let mut state = SyncState::new();
        state.range_reported(range(0, 10));
        flush(&mut state);
        state.request_window(range(0, 10), None);
        flush(&mut state);

        assert_eq!(state.range_reported(range(0, 10)), RangeReport::Unchanged);
        assert_eq!(state.window(), WindowSync::Clean);
    }

    #[test]
    fn test_last_request_wins() {
        let mut state = SyncState::new();
        state.request_window(range(0, 10), None);
        state.request_window(range(20, 30), Some(Animation::default()));

        let plan = flush(&mut state);
        assert_eq!(
            plan.window,
            Some(WindowPush {
                range: range(20, 30),
                animation: Some(Animation::default())
            })
        );
    }

    #[test]
    fn test_report_keeps_unpushed_request() {
        let mut state = SyncState::new();
        state.range_reported(range(0, 10));
        state.request_window(range(20, 30), None);

        state.range_reported(range(5, 15));
        assert!(matches!(state.window(), WindowSync::Requested { .. }));
    }

    #[test]
    fn test_reattach_while_awaiting_resends_window() {
        let mut state = SyncState::new();
        state.range_reported(range(0, 10));
        flush(&mut state);
        state.request_window(range(20, 30), None);
        flush(&mut state);

        state.attach();
        let plan = flush(&mut state);
        assert!(!plan.restore);
        assert!(plan.groups);
        assert_eq!(plan.window.map(|w| w.range), Some(range(20, 30)));
        assert_eq!(plan.items, None);
    }

    #[test]
    fn test_reattach_while_awaiting_then_unchanged_report_pushes_items() {
        let mut state = SyncState::new();
        state.attach();
        flush(&mut state);
        state.range_reported(range(0, 1000));
        flush(&mut state);
        state.request_window(range(5000, 6000), None);
        flush(&mut state);

        state.attach();
        let plan = flush(&mut state);
        assert_eq!(plan.items, None);

        assert_eq!(state.range_reported(range(0, 1000)), RangeReport::Unchanged);
        assert_eq!(state.window(), WindowSync::Clean);
        assert_eq!(flush(&mut state).items, Some(range(0, 1000)));
        assert!(flush(&mut state).is_empty());
    }
}
