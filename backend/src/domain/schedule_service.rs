//! Exam and assignment scheduling service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::domain::course_service::map_course_error;
use crate::domain::ports::{
    AssignmentUpdate, CourseRepository, ExamUpdate, ProfileRepository, ScheduleManagement,
    ScheduleRepository, ScheduleRepositoryError,
};
use crate::domain::profile_service::map_profile_error;
use crate::domain::{
    Assignment, AssignmentDraft, CourseCode, Error, Exam, ExamDraft, Role, UserId,
};

/// Message returned when an exam overlaps another sitting of the same group.
pub const EXAM_CLASH_MESSAGE: &str = "Exam clash detected! Group already has an exam at that time.";

fn map_schedule_error(error: ScheduleRepositoryError) -> Error {
    match error {
        ScheduleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("schedule repository unavailable: {message}"))
        }
        ScheduleRepositoryError::Query { message } => {
            Error::internal(format!("schedule repository error: {message}"))
        }
    }
}

fn exam_not_found() -> Error {
    Error::not_found("Exam not found")
}

fn assignment_not_found() -> Error {
    Error::not_found("Assignment not found")
}

/// Schedule service implementing [`ScheduleManagement`].
pub struct ScheduleService<S, P, C> {
    schedule: Arc<S>,
    profiles: Arc<P>,
    courses: Arc<C>,
}

impl<S, P, C> ScheduleService<S, P, C> {
    pub fn new(schedule: Arc<S>, profiles: Arc<P>, courses: Arc<C>) -> Self {
        Self {
            schedule,
            profiles,
            courses,
        }
    }
}

impl<S, P, C> ScheduleService<S, P, C>
where
    S: ScheduleRepository,
    P: ProfileRepository,
    C: CourseRepository,
{
    async fn ensure_course(&self, code: &CourseCode) -> Result<(), Error> {
        let course = self
            .courses
            .find_by_code(code)
            .await
            .map_err(map_course_error)?;
        if course.is_none() {
            return Err(Error::invalid_request(format!("Course {code} does not exist")));
        }
        Ok(())
    }

    async fn ensure_lecturer(&self, user_id: &UserId) -> Result<(), Error> {
        let profile = self
            .profiles
            .find_by_id(user_id)
            .await
            .map_err(map_profile_error)?;
        if profile.map(|p| p.role()) != Some(Role::Lecturer) {
            return Err(Error::unauthorized(
                "Only lecturers can create assignments",
            ));
        }
        Ok(())
    }

    /// Reject drafts overlapping another exam of the group, ignoring `exclude`.
    async fn ensure_no_clash(&self, draft: &ExamDraft, exclude: Option<Uuid>) -> Result<(), Error> {
        let sittings = self
            .schedule
            .exams_for_group_on(&draft.group_id, draft.exam_date)
            .await
            .map_err(map_schedule_error)?;
        let clash = sittings
            .iter()
            .filter(|exam| Some(exam.id) != exclude)
            .find(|exam| exam.clashes_with(draft));
        if let Some(existing) = clash {
            return Err(Error::conflict(EXAM_CLASH_MESSAGE).with_details(serde_json::json!({
                "exam_id": existing.id,
                "start_time": existing.start_time.format("%H:%M").to_string(),
                "end_time": existing.end_time.format("%H:%M").to_string(),
            })));
        }
        Ok(())
    }
}

fn validate_exam(draft: ExamDraft) -> Result<ExamDraft, Error> {
    draft
        .validate()
        .map_err(|err| Error::invalid_request(err.to_string()))
}

fn validate_assignment(draft: AssignmentDraft) -> Result<AssignmentDraft, Error> {
    draft
        .validate()
        .map_err(|err| Error::invalid_request(err.to_string()))
}

#[async_trait]
impl<S, P, C> ScheduleManagement for ScheduleService<S, P, C>
where
    S: ScheduleRepository,
    P: ProfileRepository,
    C: CourseRepository,
{
    async fn schedule_exam(&self, draft: ExamDraft) -> Result<Exam, Error> {
        let draft = validate_exam(draft)?;
        self.ensure_course(&draft.course_code).await?;
        self.ensure_no_clash(&draft, None).await?;
        let exam = Exam::from_draft(Uuid::new_v4(), draft);
        self.schedule
            .insert_exam(&exam)
            .await
            .map_err(map_schedule_error)?;
        info!(exam_id = %exam.id, group_id = %exam.group_id, "exam scheduled");
        Ok(exam)
    }

    async fn get_exam(&self, id: &Uuid) -> Result<Exam, Error> {
        self.schedule
            .find_exam(id)
            .await
            .map_err(map_schedule_error)?
            .ok_or_else(exam_not_found)
    }

    async fn list_exams(&self) -> Result<Vec<Exam>, Error> {
        self.schedule.list_exams().await.map_err(map_schedule_error)
    }

    async fn update_exam(&self, id: &Uuid, update: ExamUpdate) -> Result<Exam, Error> {
        let current = self.get_exam(id).await?;
        let course_changed = update
            .course_code
            .as_ref()
            .is_some_and(|code| code != &current.course_code);
        let draft = validate_exam(update.apply(current.to_draft()))?;
        if course_changed {
            self.ensure_course(&draft.course_code).await?;
        }
        self.ensure_no_clash(&draft, Some(*id)).await?;
        let exam = Exam::from_draft(*id, draft);
        if !self
            .schedule
            .update_exam(&exam)
            .await
            .map_err(map_schedule_error)?
        {
            return Err(exam_not_found());
        }
        Ok(exam)
    }

    async fn delete_exam(&self, id: &Uuid) -> Result<(), Error> {
        if self
            .schedule
            .delete_exam(id)
            .await
            .map_err(map_schedule_error)?
        {
            info!(exam_id = %id, "exam deleted");
            Ok(())
        } else {
            Err(exam_not_found())
        }
    }

    async fn create_assignment(&self, draft: AssignmentDraft) -> Result<Assignment, Error> {
        let draft = validate_assignment(draft)?;
        self.ensure_lecturer(&draft.assigned_by).await?;
        self.ensure_course(&draft.course_code).await?;
        let assignment = Assignment::from_draft(Uuid::new_v4(), draft);
        self.schedule
            .insert_assignment(&assignment)
            .await
            .map_err(map_schedule_error)?;
        info!(assignment_id = %assignment.id, "assignment created");
        Ok(assignment)
    }

    async fn get_assignment(&self, id: &Uuid) -> Result<Assignment, Error> {
        self.schedule
            .find_assignment(id)
            .await
            .map_err(map_schedule_error)?
            .ok_or_else(assignment_not_found)
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, Error> {
        self.schedule
            .list_assignments()
            .await
            .map_err(map_schedule_error)
    }

    async fn update_assignment(
        &self,
        id: &Uuid,
        update: AssignmentUpdate,
    ) -> Result<Assignment, Error> {
        let current = self.get_assignment(id).await?;
        let course_changed = update
            .course_code
            .as_ref()
            .is_some_and(|code| code != &current.course_code);
        let draft = validate_assignment(update.apply(current.to_draft()))?;
        if course_changed {
            self.ensure_course(&draft.course_code).await?;
        }
        let assignment = Assignment::from_draft(*id, draft);
        if !self
            .schedule
            .update_assignment(&assignment)
            .await
            .map_err(map_schedule_error)?
        {
            return Err(assignment_not_found());
        }
        Ok(assignment)
    }

    async fn delete_assignment(&self, id: &Uuid) -> Result<(), Error> {
        if self
            .schedule
            .delete_assignment(id)
            .await
            .map_err(map_schedule_error)?
        {
            Ok(())
        } else {
            Err(assignment_not_found())
        }
    }
}

#[cfg(test)]
#[path = "schedule_service_tests.rs"]
mod tests;
