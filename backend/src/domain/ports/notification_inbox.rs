//! Driving port for course notifications.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CourseCode, Error, Notification, NotificationContent, UserId};

/// A lecturer's broadcast to a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRequest {
    pub content: NotificationContent,
    pub course_code: CourseCode,
    pub sender_id: UserId,
}

/// `viewer` is the authenticated caller; lists are only visible to their
/// owner and single notifications to their sender or recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// Send one notification per enrolled student; returns the count.
    async fn broadcast(&self, request: BroadcastRequest) -> Result<usize, Error>;

    async fn list_for_recipient(
        &self,
        viewer: &UserId,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, Error>;

    async fn list_sent(&self, viewer: &UserId, sender: &UserId)
    -> Result<Vec<Notification>, Error>;

    async fn get(&self, viewer: &UserId, id: &Uuid) -> Result<Notification, Error>;
}
