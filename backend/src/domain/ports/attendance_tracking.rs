//! Driving port for attendance marking and reporting.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    AttendanceRecord, AttendanceStats, AttendanceStatus, CourseCode, Error, MarkEligibility,
    RegNumber,
};

/// Default look-back for attendance statistics.
pub const DEFAULT_STATS_DAYS: u32 = 30;

/// A lecturer's manual attendance mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualMark {
    pub reg_number: RegNumber,
    pub course_code: CourseCode,
    pub status: AttendanceStatus,
    pub location: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceTracking: Send + Sync {
    /// Check the marking window for a student.
    async fn can_mark(&self, reg_number: &RegNumber) -> Result<MarkEligibility, Error>;

    /// Record a manual mark, subject to the marking window.
    async fn mark(&self, request: ManualMark) -> Result<AttendanceRecord, Error>;

    /// Summarise the last `days` days of a student's attendance.
    async fn stats(&self, reg_number: &RegNumber, days: u32) -> Result<AttendanceStats, Error>;

    /// Mark every unrecorded enrolled student absent; returns the count.
    async fn mark_absent(
        &self,
        course_code: &CourseCode,
        date: Option<NaiveDate>,
    ) -> Result<usize, Error>;

    async fn course_report(
        &self,
        course_code: &CourseCode,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, Error>;

    /// Enrol a reference face for a student with the recognition engine.
    async fn register_face(&self, reg_number: &RegNumber, image_base64: &str)
    -> Result<(), Error>;
}
