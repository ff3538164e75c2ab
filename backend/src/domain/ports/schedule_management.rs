//! Driving port for exams and assignments.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::domain::{
    Assignment, AssignmentDraft, CourseCode, Error, Exam, ExamDraft,
};

/// Partial exam update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamUpdate {
    pub course_code: Option<CourseCode>,
    pub group_id: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub venue: Option<String>,
}

impl ExamUpdate {
    pub fn apply(self, draft: ExamDraft) -> ExamDraft {
        ExamDraft {
            course_code: self.course_code.unwrap_or(draft.course_code),
            group_id: self.group_id.unwrap_or(draft.group_id),
            exam_date: self.exam_date.unwrap_or(draft.exam_date),
            start_time: self.start_time.unwrap_or(draft.start_time),
            end_time: self.end_time.unwrap_or(draft.end_time),
            venue: self.venue.or(draft.venue),
        }
    }
}

/// Partial assignment update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentUpdate {
    pub course_code: Option<CourseCode>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
}

impl AssignmentUpdate {
    pub fn apply(self, draft: AssignmentDraft) -> AssignmentDraft {
        AssignmentDraft {
            course_code: self.course_code.unwrap_or(draft.course_code),
            title: self.title.unwrap_or(draft.title),
            description: self.description.or(draft.description),
            due_date: self.due_date.unwrap_or(draft.due_date),
            assigned_by: draft.assigned_by,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleManagement: Send + Sync {
    /// Schedule an exam unless it clashes with another sitting of the group.
    async fn schedule_exam(&self, draft: ExamDraft) -> Result<Exam, Error>;

    async fn get_exam(&self, id: &Uuid) -> Result<Exam, Error>;

    async fn list_exams(&self) -> Result<Vec<Exam>, Error>;

    async fn update_exam(&self, id: &Uuid, update: ExamUpdate) -> Result<Exam, Error>;

    async fn delete_exam(&self, id: &Uuid) -> Result<(), Error>;

    async fn create_assignment(&self, draft: AssignmentDraft) -> Result<Assignment, Error>;

    async fn get_assignment(&self, id: &Uuid) -> Result<Assignment, Error>;

    async fn list_assignments(&self) -> Result<Vec<Assignment>, Error>;

    async fn update_assignment(
        &self,
        id: &Uuid,
        update: AssignmentUpdate,
    ) -> Result<Assignment, Error>;

    async fn delete_assignment(&self, id: &Uuid) -> Result<(), Error>;
}
