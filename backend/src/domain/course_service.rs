//! Course catalogue and enrolment service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    CourseEnrollment, CourseRepository, CourseRepositoryError, CourseUpdate, ProfileRepository,
};
use crate::domain::profile_service::map_profile_error;
use crate::domain::{Course, CourseCode, CourseDraft, Error, Profile, RegNumber, Role, UserId};

pub(crate) fn map_course_error(error: CourseRepositoryError) -> Error {
    match error {
        CourseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CourseRepositoryError::Query { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
        CourseRepositoryError::Duplicate { message } => Error::conflict(message),
    }
}

/// Load a course or fail with `not_found`.
pub(crate) async fn require_course<C>(courses: &C, code: &CourseCode) -> Result<Course, Error>
where
    C: CourseRepository + ?Sized,
{
    courses
        .find_by_code(code)
        .await
        .map_err(map_course_error)?
        .ok_or_else(|| Error::not_found(format!("Course {code} not found")))
}

/// Load a student profile or fail with `not_found`.
pub(crate) async fn require_student<P>(
    profiles: &P,
    reg_number: &RegNumber,
) -> Result<Profile, Error>
where
    P: ProfileRepository + ?Sized,
{
    profiles
        .find_by_reg_number(reg_number)
        .await
        .map_err(map_profile_error)?
        .ok_or_else(|| Error::not_found(format!("Student {reg_number} not found")))
}

/// Course service implementing [`CourseEnrollment`].
pub struct CourseService<C, P> {
    courses: Arc<C>,
    profiles: Arc<P>,
}

impl<C, P> CourseService<C, P> {
    pub fn new(courses: Arc<C>, profiles: Arc<P>) -> Self {
        Self { courses, profiles }
    }
}

impl<C, P> CourseService<C, P>
where
    C: CourseRepository,
    P: ProfileRepository,
{
    async fn ensure_lecturers(&self, lecturers: &[UserId]) -> Result<(), Error> {
        for lecturer in lecturers {
            let profile = self
                .profiles
                .find_by_id(lecturer)
                .await
                .map_err(map_profile_error)?;
            if profile.map(|p| p.role()) != Some(Role::Lecturer) {
                return Err(Error::invalid_request(format!(
                    "Assigned user {lecturer} is not a lecturer"
                ))
                .with_details(serde_json::json!({
                    "field": "lecturers",
                    "value": lecturer.as_ref(),
                })));
            }
        }
        Ok(())
    }
}

fn validate(draft: CourseDraft) -> Result<Course, Error> {
    Course::new(draft).map_err(|err| Error::invalid_request(err.to_string()))
}

#[async_trait]
impl<C, P> CourseEnrollment for CourseService<C, P>
where
    C: CourseRepository,
    P: ProfileRepository,
{
    async fn enrolled_courses(&self, reg_number: &RegNumber) -> Result<Vec<Course>, Error> {
        self.courses
            .list_enrolled(reg_number)
            .await
            .map_err(map_course_error)
    }

    async fn eligible_courses(&self, reg_number: &RegNumber) -> Result<Vec<Course>, Error> {
        let student = require_student(self.profiles.as_ref(), reg_number).await?;
        let semester = student
            .student_details()
            .map(|details| details.semester)
            .ok_or_else(|| Error::not_found(format!("Student {reg_number} not found")))?;
        self.courses
            .list_by_semester(semester)
            .await
            .map_err(map_course_error)
    }

    async fn assigned_courses(&self, lecturer: &UserId) -> Result<Vec<Course>, Error> {
        self.courses
            .list_taught_by(lecturer)
            .await
            .map_err(map_course_error)
    }

    async fn all_courses(&self) -> Result<Vec<Course>, Error> {
        self.courses.list_all().await.map_err(map_course_error)
    }

    async fn get_course(&self, code: &CourseCode) -> Result<Course, Error> {
        require_course(self.courses.as_ref(), code).await
    }

    async fn add_course(&self, draft: CourseDraft) -> Result<Course, Error> {
        let course = validate(draft)?;
        self.ensure_lecturers(course.lecturers()).await?;
        self.courses.create(&course).await.map_err(|err| match err {
            CourseRepositoryError::Duplicate { .. } => {
                Error::conflict(format!("Course {} already exists", course.code()))
            }
            other => map_course_error(other),
        })?;
        info!(course_code = %course.code(), "course added");
        Ok(course)
    }

    async fn update_course(
        &self,
        code: &CourseCode,
        update: CourseUpdate,
    ) -> Result<Course, Error> {
        let current = require_course(self.courses.as_ref(), code).await?;
        let lecturers_changed = update.lecturers.is_some();
        let course = validate(update.apply(current.into_draft()))?;
        if lecturers_changed {
            self.ensure_lecturers(course.lecturers()).await?;
        }
        self.courses
            .update(&course)
            .await
            .map_err(map_course_error)?;
        Ok(course)
    }

    async fn assigned_lecturers(&self, code: &CourseCode) -> Result<Vec<Profile>, Error> {
        let course = require_course(self.courses.as_ref(), code).await?;
        let mut lecturers = Vec::with_capacity(course.lecturers().len());
        for lecturer in course.lecturers() {
            if let Some(profile) = self
                .profiles
                .find_by_id(lecturer)
                .await
                .map_err(map_profile_error)?
            {
                lecturers.push(profile);
            }
        }
        Ok(lecturers)
    }

    async fn enroll(&self, reg_number: &RegNumber, code: &CourseCode) -> Result<(), Error> {
        require_student(self.profiles.as_ref(), reg_number).await?;
        require_course(self.courses.as_ref(), code).await?;
        self.courses
            .enroll(reg_number, code)
            .await
            .map_err(|err| match err {
                CourseRepositoryError::Duplicate { .. } => {
                    Error::conflict("Student already enrolled in this course")
                }
                other => map_course_error(other),
            })?;
        info!(reg_number = %reg_number, course_code = %code, "student enrolled");
        Ok(())
    }

    async fn unenroll(&self, reg_number: &RegNumber, code: &CourseCode) -> Result<(), Error> {
        let removed = self
            .courses
            .unenroll(reg_number, code)
            .await
            .map_err(map_course_error)?;
        if !removed {
            return Err(Error::not_found("Enrollment not found"));
        }
        info!(reg_number = %reg_number, course_code = %code, "student unenrolled");
        Ok(())
    }
}

#[cfg(test)]
#[path = "course_service_tests.rs"]
mod tests;
