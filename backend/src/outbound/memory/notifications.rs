//! Notification store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Notification, UserId};

#[derive(Debug, Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn newest_first<F>(&self, keep: F) -> Vec<Notification>
    where
        F: Fn(&Notification) -> bool + Send,
    {
        let notifications = self.notifications.read().await;
        let mut matching: Vec<Notification> =
            notifications.iter().filter(|n| keep(n)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert_many(
        &self,
        notifications: &[Notification],
    ) -> Result<(), NotificationRepositoryError> {
        self.notifications
            .write()
            .await
            .extend_from_slice(notifications);
        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        Ok(self.newest_first(|n| &n.recipient_id == recipient).await)
    }

    async fn list_sent_by(
        &self,
        sender: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        Ok(self.newest_first(|n| &n.sender_id == sender).await)
    }

    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let notifications = self.notifications.read().await;
        Ok(notifications.iter().find(|n| &n.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::{CourseCode, NotificationContent, Priority};

    #[rstest]
    #[tokio::test]
    async fn recipient_listing_is_newest_first() {
        let repo = InMemoryNotificationRepository::new();
        let recipient = UserId::random();
        let sender = UserId::random();
        let content =
            NotificationContent::new("Quiz", "Room 4", Priority::Medium).expect("valid content");
        let code = CourseCode::new("CS101").expect("valid code");
        let base = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .expect("valid time");
        let older = Notification::addressed(
            &content,
            recipient.clone(),
            sender.clone(),
            code.clone(),
            base,
        );
        let newer = Notification::addressed(
            &content,
            recipient.clone(),
            sender.clone(),
            code,
            base + TimeDelta::minutes(5),
        );
        repo.insert_many(&[older.clone(), newer.clone()])
            .await
            .expect("insert");

        let inbox = repo.list_for_recipient(&recipient).await.expect("list");
        assert_eq!(inbox, vec![newer, older.clone()]);
        assert_eq!(
            repo.find_by_id(&older.id).await.expect("find"),
            Some(older)
        );
        assert!(
            repo.list_sent_by(&recipient)
                .await
                .expect("list")
                .is_empty()
        );
    }
}
