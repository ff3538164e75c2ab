//! Port for notification persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Notification, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert every notification or none.
    async fn insert_many(
        &self,
        notifications: &[Notification],
    ) -> Result<(), NotificationRepositoryError>;

    /// Notifications addressed to a user, newest first.
    async fn list_for_recipient(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Notifications sent by a user, newest first.
    async fn list_sent_by(
        &self,
        sender: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    async fn find_by_id(&self, id: &Uuid)
    -> Result<Option<Notification>, NotificationRepositoryError>;
}
