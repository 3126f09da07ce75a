use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use timeline_sync::Timeline;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A timeline checked out for one client connection.
pub struct Session {
    pub id: String,
    pub timeline: OwnedMutexGuard<Timeline>,
    pub restored: bool,
}

struct SessionSlot {
    timeline: Arc<Mutex<Timeline>>,
    detached_at: Option<Instant>,
}

/// Keeps timelines of disconnected clients around so a reconnecting client
/// finds its window, keys and selection where it left them.
pub struct SessionRegistry {
    slots: Mutex<HashMap<String, SessionSlot>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Re-attaches to `requested` when it is known and not in use by another
    /// connection; otherwise starts a session with a timeline from `create`.
    pub async fn open(
        &self,
        requested: Option<&str>,
        create: impl FnOnce() -> Timeline,
    ) -> Session {
        let mut slots = self.slots.lock().await;
        prune_idle(&mut slots, self.idle_timeout);

        if let Some(id) = requested {
            match slots.get_mut(id) {
                Some(slot) => match slot.timeline.clone().try_lock_owned() {
                    Ok(timeline) => {
                        slot.detached_at = None;
                        return Session {
                            id: id.to_string(),
                            timeline,
                            restored: true,
                        };
                    }
                    Err(_) => log::warn!("Session {} is attached elsewhere, starting a new one", id),
                },
                None => log::info!("Unknown session {}, starting a new one", id),
            }
        }

        let id = format!("{:032x}", rand::random::<u128>());
        let timeline = Arc::new(Mutex::new(create()));
        let guard = timeline.clone().lock_owned().await;
        slots.insert(
            id.clone(),
            SessionSlot {
                timeline,
                detached_at: None,
            },
        );
        Session {
            id,
            timeline: guard,
            restored: false,
        }
    }

    /// Starts the idle countdown. Call after the session's guard is dropped.
    pub async fn detach(&self, id: &str) {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = slots.get_mut(id) {
            slot.detached_at = Some(Instant::now());
        }
        prune_idle(&mut slots, self.idle_timeout);
    }

    /// Drops detached sessions past the idle timeout, returns how many went.
    pub async fn sweep_idle(&self) -> usize {
        prune_idle(&mut *self.slots.lock().await, self.idle_timeout)
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub async fn session_count(&self) -> usize {
        self.slots.lock().await.len()
    }
}

fn prune_idle(slots: &mut HashMap<String, SessionSlot>, idle_timeout: Duration) -> usize {
    let before = slots.len();
    slots.retain(|id, slot| match slot.detached_at {
        Some(detached_at) if detached_at.elapsed() >= idle_timeout => {
            log::info!("Dropping idle session {}", id);
            false
        }
        _ => true,
    });
    before - slots.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_sync::BasicItemProvider;

    fn create() -> Timeline {
        Timeline::new(Arc::new(BasicItemProvider::new()))
    }

    #[tokio::test]
    async fn test_reopen_detached_session() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let session = registry.open(None, create).await;
        assert!(!session.restored);
        let id = session.id.clone();
        drop(session);
        registry.detach(&id).await;

        let session = registry.open(Some(id.as_str()), create).await;
        assert!(session.restored);
        assert_eq!(session.id, id);
        assert_eq!(registry.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_busy_or_unknown_session_starts_fresh() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let first = registry.open(None, create).await;

        let second = registry.open(Some(first.id.as_str()), create).await;
        assert!(!second.restored);
        assert_ne!(second.id, first.id);

        let third = registry.open(Some("missing"), create).await;
        assert!(!third.restored);
        assert_eq!(registry.session_count().await, 3);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let registry = SessionRegistry::new(Duration::ZERO);
        let session = registry.open(None, create).await;
        let id = session.id.clone();
        drop(session);
        registry.detach(&id).await;

        let session = registry.open(Some(id.as_str()), create).await;
        assert!(!session.restored);
        assert_eq!(registry.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_swept_without_new_connections() {
        let registry = SessionRegistry::new(Duration::from_millis(100));
        let session = registry.open(None, create).await;
        let id = session.id.clone();
        drop(session);
        registry.detach(&id).await;
        assert_eq!(registry.session_count().await, 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(registry.sweep_idle().await, 1);
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_detach_drops_other_expired_sessions() {
        let registry = SessionRegistry::new(Duration::from_millis(100));
        let first = registry.open(None, create).await;
        let second = registry.open(None, create).await;
        let (first_id, second_id) = (first.id.clone(), second.id.clone());
        drop(first);
        registry.detach(&first_id).await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        drop(second);
        registry.detach(&second_id).await;
        assert_eq!(registry.session_count().await, 1);

        let session = registry.open(Some(second_id.as_str()), create).await;
        assert!(session.restored);
    }
}
