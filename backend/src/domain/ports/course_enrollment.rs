//! Driving port for the course catalogue and student enrolment.

use async_trait::async_trait;

use crate::domain::{Course, CourseCode, CourseDraft, Error, Profile, RegNumber, UserId};

/// Partial course update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub credits: Option<u8>,
    pub year: Option<u8>,
    pub semester: Option<u8>,
    pub lecturers: Option<Vec<UserId>>,
}

impl CourseUpdate {
    /// Overlay the provided fields on `draft`.
    pub fn apply(self, mut draft: CourseDraft) -> CourseDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(credits) = self.credits {
            draft.credits = credits;
        }
        if let Some(year) = self.year {
            draft.year = year;
        }
        if let Some(semester) = self.semester {
            draft.semester = semester;
        }
        if let Some(lecturers) = self.lecturers {
            draft.lecturers = lecturers;
        }
        draft
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseEnrollment: Send + Sync {
    async fn enrolled_courses(&self, reg_number: &RegNumber) -> Result<Vec<Course>, Error>;

    /// Courses offered in the student's current semester.
    async fn eligible_courses(&self, reg_number: &RegNumber) -> Result<Vec<Course>, Error>;

    async fn assigned_courses(&self, lecturer: &UserId) -> Result<Vec<Course>, Error>;

    async fn all_courses(&self) -> Result<Vec<Course>, Error>;

    async fn get_course(&self, code: &CourseCode) -> Result<Course, Error>;

    async fn add_course(&self, draft: CourseDraft) -> Result<Course, Error>;

    async fn update_course(&self, code: &CourseCode, update: CourseUpdate)
    -> Result<Course, Error>;

    async fn assigned_lecturers(&self, code: &CourseCode) -> Result<Vec<Profile>, Error>;

    async fn enroll(&self, reg_number: &RegNumber, code: &CourseCode) -> Result<(), Error>;

    async fn unenroll(&self, reg_number: &RegNumber, code: &CourseCode) -> Result<(), Error>;
}
