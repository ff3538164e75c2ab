//! Notification broadcast and inbox service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::course_service::{map_course_error, require_course};
use crate::domain::ports::{
    BroadcastRequest, CourseRepository, NotificationInbox, NotificationRepository,
    NotificationRepositoryError, ProfileRepository,
};
use crate::domain::profile_service::map_profile_error;
use crate::domain::{Error, Notification, UserId};

fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

fn ensure_owner(viewer: &UserId, owner: &UserId) -> Result<(), Error> {
    if viewer == owner {
        Ok(())
    } else {
        Err(Error::forbidden("You can only view your own notifications"))
    }
}

/// Notification service implementing [`NotificationInbox`].
pub struct NotificationService<N, P, C> {
    notifications: Arc<N>,
    profiles: Arc<P>,
    courses: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<N, P, C> NotificationService<N, P, C> {
    pub fn new(
        notifications: Arc<N>,
        profiles: Arc<P>,
        courses: Arc<C>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            profiles,
            courses,
            clock,
        }
    }
}

#[async_trait]
impl<N, P, C> NotificationInbox for NotificationService<N, P, C>
where
    N: NotificationRepository,
    P: ProfileRepository,
    C: CourseRepository,
{
    async fn broadcast(&self, request: BroadcastRequest) -> Result<usize, Error> {
        let BroadcastRequest {
            content,
            course_code,
            sender_id,
        } = request;
        require_course(self.courses.as_ref(), &course_code).await?;

        let enrolled = self
            .courses
            .enrolled_students(&course_code)
            .await
            .map_err(map_course_error)?;
        if enrolled.is_empty() {
            return Err(Error::invalid_request(format!(
                "No students enrolled in course {course_code}"
            )));
        }
        let recipients = self
            .profiles
            .find_by_reg_numbers(&enrolled)
            .await
            .map_err(map_profile_error)?;

        let created_at = self.clock.utc();
        let batch: Vec<Notification> = recipients
            .iter()
            .map(|recipient| {
                Notification::addressed(
                    &content,
                    recipient.user_id().clone(),
                    sender_id.clone(),
                    course_code.clone(),
                    created_at,
                )
            })
            .collect();
        self.notifications
            .insert_many(&batch)
            .await
            .map_err(map_notification_error)?;
        info!(
            course_code = %course_code,
            sender_id = %sender_id,
            count = batch.len(),
            "notifications sent"
        );
        Ok(batch.len())
    }

    async fn list_for_recipient(
        &self,
        viewer: &UserId,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, Error> {
        ensure_owner(viewer, recipient)?;
        self.notifications
            .list_for_recipient(recipient)
            .await
            .map_err(map_notification_error)
    }

    async fn list_sent(
        &self,
        viewer: &UserId,
        sender: &UserId,
    ) -> Result<Vec<Notification>, Error> {
        ensure_owner(viewer, sender)?;
        self.notifications
            .list_sent_by(sender)
            .await
            .map_err(map_notification_error)
    }

    async fn get(&self, viewer: &UserId, id: &Uuid) -> Result<Notification, Error> {
        let notification = self
            .notifications
            .find_by_id(id)
            .await
            .map_err(map_notification_error)?
            .ok_or_else(|| Error::not_found("Notification not found"))?;
        if !notification.is_visible_to(viewer) {
            return Err(Error::forbidden("You can only view your own notifications"));
        }
        Ok(notification)
    }
}
