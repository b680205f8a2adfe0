// SPDX-License-Identifier: MPL-2.0
//! Optimistic mutations as reversible transactions over the cache.
//!
//! [`apply`] performs a mutation and returns a [`Snapshot`] holding exactly
//! what is needed to undo it; [`rollback`] consumes that snapshot. Both are
//! pure functions of the cache so every rollback path is unit-testable.

use super::model::{Notification, NotificationId};
use std::cmp::Ordering;

/// Client-side mirror of the server's notification list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cache {
    /// Always in newest-first order.
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
}

impl Cache {
    /// Builds a cache from a server page and the server's unread figure.
    #[must_use]
    pub fn new(mut notifications: Vec<Notification>, unread_count: u64) -> Self {
        super::model::sort_newest_first(&mut notifications);
        Self {
            notifications,
            unread_count,
        }
    }

    /// Builds a cache whose count is derived from the list itself.
    #[must_use]
    pub fn from_list(notifications: Vec<Notification>) -> Self {
        let mut cache = Self::new(notifications, 0);
        cache.unread_count = cache.local_unread();
        cache
    }

    /// Number of unread entries actually present in the list.
    #[must_use]
    pub fn local_unread(&self) -> u64 {
        self.notifications.iter().filter(|n| !n.read).count() as u64
    }

    #[must_use]
    pub fn position(&self, id: NotificationId) -> Option<usize> {
        self.notifications.iter().position(|n| n.id == id)
    }

    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    fn decrement(&mut self) -> bool {
        if self.unread_count == 0 {
            return false;
        }
        self.unread_count -= 1;
        true
    }

    /// Inserts at the slot implied by newest-first order.
    fn insert_ordered(&mut self, notification: Notification) {
        let index = self
            .notifications
            .partition_point(|n| Notification::newest_first(n, &notification) == Ordering::Less);
        self.notifications.insert(index, notification);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    MarkRead(NotificationId),
    MarkAllRead,
    Delete(NotificationId),
}

/// Undo record produced by [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    MarkRead {
        id: NotificationId,
        was_unread: bool,
        decremented: bool,
    },
    MarkAllRead {
        flipped: Vec<NotificationId>,
        prior_count: u64,
    },
    Delete {
        removed: Option<Notification>,
        decremented: bool,
    },
}

impl Snapshot {
    /// Number of entries the mutation changed.
    #[must_use]
    pub fn affected(&self) -> usize {
        match self {
            Snapshot::MarkRead { was_unread, .. } => usize::from(*was_unread),
            Snapshot::MarkAllRead { flipped, .. } => flipped.len(),
            Snapshot::Delete { removed, .. } => usize::from(removed.is_some()),
        }
    }
}

/// Applies a mutation to the cache.
pub fn apply(cache: &mut Cache, mutation: &Mutation) -> Snapshot {
    match *mutation {
        Mutation::MarkRead(id) => {
            let was_unread = match cache.notifications.iter_mut().find(|n| n.id == id) {
                Some(n) if !n.read => {
                    n.read = true;
                    true
                }
                _ => false,
            };
            let decremented = was_unread && cache.decrement();
            Snapshot::MarkRead {
                id,
                was_unread,
                decremented,
            }
        }
        Mutation::MarkAllRead => {
            let prior_count = cache.unread_count;
            let flipped = cache
                .notifications
                .iter_mut()
                .filter(|n| !n.read)
                .map(|n| {
                    n.read = true;
                    n.id
                })
                .collect();
            cache.unread_count = 0;
            Snapshot::MarkAllRead {
                flipped,
                prior_count,
            }
        }
        Mutation::Delete(id) => {
            let removed = cache.position(id).map(|i| cache.notifications.remove(i));
            let decremented = matches!(&removed, Some(n) if !n.read) && cache.decrement();
            Snapshot::Delete {
                removed,
                decremented,
            }
        }
    }
}

/// Reverts a mutation previously returned by [`apply`].
///
/// Entries changed or removed by later operations are left alone, so a
/// rollback never resurrects or duplicates anything.
pub fn rollback(cache: &mut Cache, snapshot: Snapshot) {
    match snapshot {
        Snapshot::MarkRead {
            id,
            was_unread: true,
            decremented,
        } => {
            if let Some(n) = cache.notifications.iter_mut().find(|n| n.id == id && n.read) {
                n.read = false;
                if decremented {
                    cache.unread_count += 1;
                }
            }
        }
        Snapshot::MarkRead { .. } => {}
        Snapshot::MarkAllRead {
            flipped,
            prior_count,
        } => {
            let mut lost = 0;
            for id in &flipped {
                match cache.notifications.iter_mut().find(|n| n.id == *id) {
                    Some(n) => n.read = false,
                    None => lost += 1,
                }
            }
            cache.unread_count = prior_count.saturating_sub(lost);
        }
        Snapshot::Delete {
            removed: Some(notification),
            decremented,
        } => {
            if cache.position(notification.id).is_some() {
                return;
            }
            cache.insert_ordered(notification);
            if decremented {
                cache.unread_count += 1;
            }
        }
        Snapshot::Delete { removed: None, .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::model::{is_newest_first, NotificationKind};
    use chrono::{TimeZone, Utc};

    fn n(id: i64, minute: u32, read: bool) -> Notification {
        Notification {
            id: NotificationId(id),
            title: format!("title {id}"),
            message: format!("message {id}"),
            kind: NotificationKind::Info,
            read,
            created_at: Utc.with_ymd_and_hms(2025, 2, 3, 10, minute, 0).unwrap(),
        }
    }

    fn cache() -> Cache {
        Cache::from_list(vec![n(1, 50, false), n(2, 40, false), n(3, 30, true), n(4, 20, true)])
    }

    #[test]
    fn mark_read_then_rollback_restores_everything() {
        let mut cache = cache();
        let before = cache.clone();

        let snapshot = apply(&mut cache, &Mutation::MarkRead(NotificationId(2)));
        assert!(cache.get(NotificationId(2)).unwrap().read);
        assert_eq!(cache.unread_count, 1);

        rollback(&mut cache, snapshot);
        assert_eq!(cache, before);
    }

    #[test]
    fn mark_read_on_read_entry_is_a_no_op() {
        let mut cache = cache();
        let snapshot = apply(&mut cache, &Mutation::MarkRead(NotificationId(3)));
        assert_eq!(snapshot.affected(), 0);
        assert_eq!(cache.unread_count, 2);

        rollback(&mut cache, snapshot);
        assert_eq!(cache.unread_count, 2);
        assert!(cache.get(NotificationId(3)).unwrap().read);
    }

    #[test]
    fn count_never_goes_negative() {
        let mut cache = Cache::new(vec![n(1, 10, false)], 0);
        let snapshot = apply(&mut cache, &Mutation::MarkRead(NotificationId(1)));
        assert_eq!(cache.unread_count, 0);

        rollback(&mut cache, snapshot);
        assert_eq!(cache.unread_count, 0);
        assert!(!cache.get(NotificationId(1)).unwrap().read);
    }

    #[test]
    fn delete_rollback_reinserts_in_order() {
        let mut cache = cache();
        let before = cache.clone();

        let snapshot = apply(&mut cache, &Mutation::Delete(NotificationId(2)));
        assert_eq!(cache.notifications.len(), 3);
        assert_eq!(cache.unread_count, 1);

        // A newer entry arrives while the delete is in flight.
        cache.insert_ordered(n(9, 59, true));

        rollback(&mut cache, snapshot);
        assert!(is_newest_first(&cache.notifications));
        let ids: Vec<i64> = cache.notifications.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![9, 1, 2, 3, 4]);
        assert_eq!(cache.unread_count, before.unread_count);
    }

    #[test]
    fn delete_rollback_skips_entries_already_present() {
        let mut cache = cache();
        let snapshot = apply(&mut cache, &Mutation::Delete(NotificationId(3)));
        cache.insert_ordered(n(3, 30, true));

        rollback(&mut cache, snapshot);
        assert_eq!(cache.notifications.len(), 4);
    }

    #[test]
    fn mark_all_flips_every_unread_entry() {
        let mut cache = Cache::new(vec![n(1, 50, false), n(2, 40, false)], 7);
        let snapshot = apply(&mut cache, &Mutation::MarkAllRead);
        assert_eq!(snapshot.affected(), 2);
        assert_eq!(cache.unread_count, 0);
        assert!(cache.notifications.iter().all(|n| n.read));

        rollback(&mut cache, snapshot);
        assert_eq!(cache.unread_count, 7);
        assert_eq!(cache.local_unread(), 2);
    }

    #[test]
    fn missing_ids_are_ignored() {
        let mut cache = cache();
        let before = cache.clone();
        let snapshot = apply(&mut cache, &Mutation::Delete(NotificationId(99)));
        assert_eq!(cache, before);
        rollback(&mut cache, snapshot);
        assert_eq!(cache, before);
    }
}
