//! Transient status and error banners
//!
//! The center only tracks state. Auto-dismiss timers are handed out through
//! `take_armed()` so the UI can schedule them; a timer carries the
//! generation it was armed for and is ignored once the banner is updated.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Default lifetime of an error banner, in milliseconds
pub const ERROR_DURATION_MS: i64 = 5000;
/// Duration value meaning "stay until updated or removed"
pub const PERSISTENT: i64 = 0;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum NotificationKind {
    Info,
    Error,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Info => "ℹ️",
            NotificationKind::Error => "⚠️",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            NotificationKind::Info => "toast toast-info",
            NotificationKind::Error => "toast toast-error",
        }
    }
}

/// Opaque reference to a rendered banner
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NotificationHandle {
    id: Uuid,
    generation: u64,
}

impl NotificationHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    generation: u64,
}

/// A pending auto-dismiss request for the UI to schedule
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DismissTimer {
    pub handle: NotificationHandle,
    pub after: Duration,
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    active: Vec<Notification>,
    armed: Vec<DismissTimer>,
    next_generation: u64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a banner. `duration_ms <= 0` keeps it until updated or removed.
    pub fn create(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        duration_ms: i64,
    ) -> NotificationHandle {
        let handle = NotificationHandle {
            id: Uuid::new_v4(),
            generation: self.bump(),
        };
        self.active.push(Notification {
            id: handle.id,
            kind,
            message: message.into(),
            generation: handle.generation,
        });
        self.arm(handle, duration_ms);
        handle
    }

    /// Rewrite a banner in place and re-arm its timer. A handle that has
    /// already been dismissed produces a fresh banner instead.
    pub fn update(
        &mut self,
        handle: NotificationHandle,
        kind: NotificationKind,
        message: impl Into<String>,
        duration_ms: i64,
    ) -> NotificationHandle {
        let generation = self.bump();
        let Some(existing) = self.active.iter_mut().find(|n| n.id == handle.id) else {
            tracing::debug!("Notification {} already gone, creating a new one", handle.id);
            return self.create(kind, message, duration_ms);
        };

        existing.kind = kind;
        existing.message = message.into();
        existing.generation = generation;

        let handle = NotificationHandle {
            id: handle.id,
            generation,
        };
        self.arm(handle, duration_ms);
        handle
    }

    /// Timer callback: removes the banner only if it was not updated since
    /// the timer was armed.
    pub fn expire(&mut self, handle: NotificationHandle) -> bool {
        let before = self.active.len();
        self.active
            .retain(|n| !(n.id == handle.id && n.generation == handle.generation));
        before != self.active.len()
    }

    /// Explicit removal (close button)
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        before != self.active.len()
    }

    pub fn contains(&self, handle: NotificationHandle) -> bool {
        self.active.iter().any(|n| n.id == handle.id)
    }

    pub fn get(&self, id: Uuid) -> Option<&Notification> {
        self.active.iter().find(|n| n.id == id)
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drain timers armed since the last call
    pub fn take_armed(&mut self) -> Vec<DismissTimer> {
        std::mem::take(&mut self.armed)
    }

    fn arm(&mut self, handle: NotificationHandle, duration_ms: i64) {
        if duration_ms > 0 {
            self.armed.push(DismissTimer {
                handle,
                after: Duration::from_millis(duration_ms as u64),
            });
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_arms_timer_only_with_duration() {
        let mut center = NotificationCenter::new();
        let timed = center.create(NotificationKind::Info, "Models loaded", 5000);
        center.create(NotificationKind::Error, "Refresh the page", PERSISTENT);
        center.create(NotificationKind::Error, "Negative", -1);

        let timers = center.take_armed();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].handle, timed);
        assert_eq!(timers[0].after, Duration::from_millis(5000));
        assert_eq!(center.len(), 3);
        assert!(center.take_armed().is_empty());
    }

    #[test]
    fn test_update_in_place() {
        let mut center = NotificationCenter::new();
        let handle = center.create(NotificationKind::Info, "Downloading GFPGAN...", PERSISTENT);
        let updated = center.update(handle, NotificationKind::Error, "Download failed", 3000);

        assert_eq!(updated.id(), handle.id());
        assert_eq!(center.len(), 1);
        let shown = center.get(handle.id()).unwrap();
        assert_eq!(shown.kind, NotificationKind::Error);
        assert_eq!(shown.message, "Download failed");
    }

    #[test]
    fn test_update_of_expired_handle_creates_exactly_one() {
        let mut center = NotificationCenter::new();
        let handle = center.create(NotificationKind::Info, "Short lived", 10);
        assert!(center.expire(handle));
        assert!(center.is_empty());

        let replacement = center.update(handle, NotificationKind::Info, "Back again", PERSISTENT);
        assert_eq!(center.len(), 1);
        assert_ne!(replacement.id(), handle.id());
        assert!(center.contains(replacement));
    }

    #[test]
    fn test_stale_timer_is_ignored_after_update() {
        let mut center = NotificationCenter::new();
        let handle = center.create(NotificationKind::Info, "first", 1000);
        let updated = center.update(handle, NotificationKind::Info, "second", 1000);

        assert!(!center.expire(handle));
        assert_eq!(center.len(), 1);
        assert!(center.expire(updated));
        assert!(center.is_empty());
    }

    #[test]
    fn test_overlapping_notifications_stack() {
        let mut center = NotificationCenter::new();
        let a = center.create(NotificationKind::Error, "same", 5000);
        let b = center.create(NotificationKind::Error, "same", 5000);
        assert_eq!(center.len(), 2);

        assert!(center.expire(a));
        assert!(center.contains(b));
    }

    #[test]
    fn test_explicit_remove() {
        let mut center = NotificationCenter::new();
        let handle = center.create(NotificationKind::Info, "bye", PERSISTENT);
        assert!(center.remove(handle.id()));
        assert!(!center.remove(handle.id()));
    }
}
