//! Port for the course catalogue and enrolments.

use async_trait::async_trait;

use crate::domain::{Course, CourseCode, RegNumber, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course repository adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "course repository query failed: {message}",
        /// The course or enrolment already exists.
        Duplicate { message: String } =>
            "course record already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: &Course) -> Result<(), CourseRepositoryError>;

    /// Overwrite an existing course, including its lecturer assignments.
    async fn update(&self, course: &Course) -> Result<(), CourseRepositoryError>;

    async fn find_by_code(&self, code: &CourseCode)
    -> Result<Option<Course>, CourseRepositoryError>;

    async fn list_all(&self) -> Result<Vec<Course>, CourseRepositoryError>;

    async fn list_by_semester(&self, semester: u8) -> Result<Vec<Course>, CourseRepositoryError>;

    async fn list_taught_by(&self, lecturer: &UserId) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Record an enrolment; an existing one yields `Duplicate`.
    async fn enroll(
        &self,
        reg_number: &RegNumber,
        code: &CourseCode,
    ) -> Result<(), CourseRepositoryError>;

    /// Remove an enrolment, returning whether one existed.
    async fn unenroll(
        &self,
        reg_number: &RegNumber,
        code: &CourseCode,
    ) -> Result<bool, CourseRepositoryError>;

    async fn list_enrolled(
        &self,
        reg_number: &RegNumber,
    ) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Students enrolled in a course, ordered by registration number.
    async fn enrolled_students(
        &self,
        code: &CourseCode,
    ) -> Result<Vec<RegNumber>, CourseRepositoryError>;
}
