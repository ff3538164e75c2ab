//! Port for exam and assignment persistence.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Assignment, Exam};

use super::define_port_error;

define_port_error! {
    /// Errors raised by schedule repository adapters.
    pub enum ScheduleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "schedule repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "schedule repository query failed: {message}",
    }
}

/// Updates and deletes return whether a row matched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn insert_exam(&self, exam: &Exam) -> Result<(), ScheduleRepositoryError>;

    async fn update_exam(&self, exam: &Exam) -> Result<bool, ScheduleRepositoryError>;

    async fn delete_exam(&self, id: &Uuid) -> Result<bool, ScheduleRepositoryError>;

    async fn find_exam(&self, id: &Uuid) -> Result<Option<Exam>, ScheduleRepositoryError>;

    /// Exams ordered by date then start time.
    async fn list_exams(&self) -> Result<Vec<Exam>, ScheduleRepositoryError>;

    /// Exams sat by a group on a date.
    async fn exams_for_group_on(
        &self,
        group_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Exam>, ScheduleRepositoryError>;

    async fn insert_assignment(&self, assignment: &Assignment)
    -> Result<(), ScheduleRepositoryError>;

    async fn update_assignment(
        &self,
        assignment: &Assignment,
    ) -> Result<bool, ScheduleRepositoryError>;

    async fn delete_assignment(&self, id: &Uuid) -> Result<bool, ScheduleRepositoryError>;

    async fn find_assignment(&self, id: &Uuid)
    -> Result<Option<Assignment>, ScheduleRepositoryError>;

    /// Assignments ordered by due date.
    async fn list_assignments(&self) -> Result<Vec<Assignment>, ScheduleRepositoryError>;
}
