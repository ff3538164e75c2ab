//! Append-only attendance log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{AttendanceRepository, AttendanceRepositoryError};
use crate::domain::{AttendanceRecord, CourseCode, RegNumber};

#[derive(Debug, Default)]
pub struct InMemoryAttendanceRepository {
    records: RwLock<Vec<AttendanceRecord>>,
}

impl InMemoryAttendanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record in insertion order.
    pub async fn snapshot(&self) -> Vec<AttendanceRecord> {
        self.records.read().await.clone()
    }
}

fn within(record: &AttendanceRecord, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    record.timestamp >= from && record.timestamp < to
}

#[async_trait]
impl AttendanceRepository for InMemoryAttendanceRepository {
    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn insert_many(
        &self,
        records: &[AttendanceRecord],
    ) -> Result<(), AttendanceRepositoryError> {
        self.records.write().await.extend_from_slice(records);
        Ok(())
    }

    async fn latest_since(
        &self,
        reg_number: &RegNumber,
        since: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| &r.reg_number == reg_number && r.timestamp >= since)
            .max_by_key(|r| r.timestamp)
            .cloned())
    }

    async fn list_for_student(
        &self,
        reg_number: &RegNumber,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
        let records = self.records.read().await;
        let mut matching: Vec<AttendanceRecord> = records
            .iter()
            .filter(|r| &r.reg_number == reg_number && within(r, from, to))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(matching)
    }

    async fn list_for_course(
        &self,
        course_code: &CourseCode,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
        let records = self.records.read().await;
        let mut matching: Vec<AttendanceRecord> = records
            .iter()
            .filter(|r| &r.course_code == course_code && within(r, from, to))
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.timestamp);
        Ok(matching)
    }
}
