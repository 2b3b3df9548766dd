//! Client-session read/unread tracking.
//!
//! A library type for the code that holds a client session, such as a
//! front-end or session gateway, to keep beside the feed it fetched from
//! `GET /notifications/feed/{client_id}`. The server exposes no read/unread
//! endpoint and stores nothing: the state is lost when the session ends and
//! notifications stay immutable.

use std::collections::HashSet;

use uuid::Uuid;

/// Notification ids the current session has marked as read.
#[derive(Debug, Clone, Default)]
pub struct SessionReadState {
    read: HashSet<Uuid>,
}

impl SessionReadState {
    /// Creates an empty read state; everything is unread.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a notification as read. Returns `false` if it already was.
    pub fn mark_read(&mut self, notification_id: Uuid) -> bool {
        self.read.insert(notification_id)
    }

    /// Marks every id in `feed` as read.
    pub fn mark_all_read<I: IntoIterator<Item = Uuid>>(&mut self, feed: I) {
        self.read.extend(feed);
    }

    /// Returns `true` if the notification has been marked as read.
    #[must_use]
    pub fn is_read(&self, notification_id: Uuid) -> bool {
        self.read.contains(&notification_id)
    }

    /// Number of ids in `feed` that are not yet read.
    #[must_use]
    pub fn unread_count<I: IntoIterator<Item = Uuid>>(&self, feed: I) -> usize {
        feed.into_iter().filter(|id| !self.is_read(*id)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_count_drops_as_items_are_read() {
        // Arrange
        let feed = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let mut state = SessionReadState::new();

        // Act
        let first = state.mark_read(feed[0]);
        let repeated = state.mark_read(feed[0]);

        // Assert
        assert!(first);
        assert!(!repeated);
        assert_eq!(state.unread_count(feed), 2);
    }

    #[test]
    fn test_mark_all_read_clears_unread_count() {
        let feed = vec![Uuid::new_v4(), Uuid::new_v4()];
        let mut state = SessionReadState::new();

        state.mark_all_read(feed.iter().copied());

        assert_eq!(state.unread_count(feed.iter().copied()), 0);
        assert!(state.is_read(feed[1]));
    }

    #[test]
    fn test_fresh_state_counts_new_notifications_as_unread() {
        let state = SessionReadState::new();

        assert_eq!(state.unread_count([Uuid::new_v4()]), 1);
    }
}
