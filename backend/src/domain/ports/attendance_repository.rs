//! Port for attendance record persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AttendanceRecord, CourseCode, RegNumber};

use super::define_port_error;

define_port_error! {
    /// Errors raised by attendance repository adapters.
    pub enum AttendanceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "attendance repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "attendance repository query failed: {message}",
    }
}

/// Time ranges are half-open: `[from, to)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError>;

    /// Insert records in one batch.
    async fn insert_many(
        &self,
        records: &[AttendanceRecord],
    ) -> Result<(), AttendanceRepositoryError>;

    /// Most recent record of a student at or after `since`.
    async fn latest_since(
        &self,
        reg_number: &RegNumber,
        since: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError>;

    /// Records of a student in a range, newest first.
    async fn list_for_student(
        &self,
        reg_number: &RegNumber,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError>;

    /// Records of a course in a range, oldest first.
    async fn list_for_course(
        &self,
        course_code: &CourseCode,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError>;
}
