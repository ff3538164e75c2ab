//! PostgreSQL-backed `NotificationRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{CourseCode, Notification, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NotificationRow;
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationRepositoryError {
    map_basic_pool_error(error, NotificationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    map_basic_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

fn to_row(notification: &Notification) -> NotificationRow {
    NotificationRow {
        id: notification.id,
        recipient_id: *notification.recipient_id.as_uuid(),
        sender_id: *notification.sender_id.as_uuid(),
        title: notification.title.clone(),
        message: notification.message.clone(),
        course_code: notification.course_code.to_string(),
        priority: notification.priority.as_str().to_owned(),
        created_at: notification.created_at,
    }
}

fn from_row(row: NotificationRow) -> Result<Notification, NotificationRepositoryError> {
    let course_code = CourseCode::new(&row.course_code).map_err(|err| {
        NotificationRepositoryError::query(format!("stored notification {}: {err}", row.id))
    })?;
    let priority = row.priority.parse().map_err(|err| {
        NotificationRepositoryError::query(format!("stored notification {}: {err}", row.id))
    })?;
    Ok(Notification {
        id: row.id,
        recipient_id: UserId::from_uuid(row.recipient_id),
        sender_id: UserId::from_uuid(row.sender_id),
        title: row.title,
        message: row.message,
        course_code,
        priority,
        created_at: row.created_at,
    })
}

fn from_rows(rows: Vec<NotificationRow>) -> Result<Vec<Notification>, NotificationRepositoryError> {
    rows.into_iter().map(from_row).collect()
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert_many(
        &self,
        batch: &[Notification],
    ) -> Result<(), NotificationRepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }
        let rows: Vec<NotificationRow> = batch.iter().map(to_row).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_recipient(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = notifications::table
            .filter(notifications::recipient_id.eq(recipient.as_uuid()))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        from_rows(rows)
    }

    async fn list_sent_by(
        &self,
        sender: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = notifications::table
            .filter(notifications::sender_id.eq(sender.as_uuid()))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        from_rows(rows)
    }

    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        notifications::table
            .find(id)
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(from_row)
            .transpose()
    }
}
