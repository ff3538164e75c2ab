//! Course catalogue and enrolment store.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{Course, CourseCode, RegNumber, UserId};

#[derive(Debug, Default)]
struct Catalogue {
    courses: BTreeMap<CourseCode, Course>,
    enrolments: BTreeSet<(CourseCode, RegNumber)>,
}

/// Courses ordered by code; enrolments as `(course, student)` pairs.
#[derive(Debug, Default)]
pub struct InMemoryCourseRepository {
    state: RwLock<Catalogue>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut state = self.state.write().await;
        if state.courses.contains_key(course.code()) {
            return Err(CourseRepositoryError::duplicate(course.code().as_ref()));
        }
        state.courses.insert(course.code().clone(), course.clone());
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut state = self.state.write().await;
        match state.courses.get_mut(course.code()) {
            Some(slot) => {
                *slot = course.clone();
                Ok(())
            }
            None => Err(CourseRepositoryError::query(format!(
                "no course {}",
                course.code()
            ))),
        }
    }

    async fn find_by_code(
        &self,
        code: &CourseCode,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(self.state.read().await.courses.get(code).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        Ok(self.state.read().await.courses.values().cloned().collect())
    }

    async fn list_by_semester(&self, semester: u8) -> Result<Vec<Course>, CourseRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .courses
            .values()
            .filter(|course| course.semester() == semester)
            .cloned()
            .collect())
    }

    async fn list_taught_by(&self, lecturer: &UserId) -> Result<Vec<Course>, CourseRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .courses
            .values()
            .filter(|course| course.is_taught_by(lecturer))
            .cloned()
            .collect())
    }

    async fn enroll(
        &self,
        reg_number: &RegNumber,
        code: &CourseCode,
    ) -> Result<(), CourseRepositoryError> {
        let mut state = self.state.write().await;
        if !state.enrolments.insert((code.clone(), reg_number.clone())) {
            return Err(CourseRepositoryError::duplicate(format!(
                "{reg_number} in {code}"
            )));
        }
        Ok(())
    }

    async fn unenroll(
        &self,
        reg_number: &RegNumber,
        code: &CourseCode,
    ) -> Result<bool, CourseRepositoryError> {
        let mut state = self.state.write().await;
        Ok(state
            .enrolments
            .remove(&(code.clone(), reg_number.clone())))
    }

    async fn list_enrolled(
        &self,
        reg_number: &RegNumber,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .enrolments
            .iter()
            .filter(|(_, student)| student == reg_number)
            .filter_map(|(code, _)| state.courses.get(code).cloned())
            .collect())
    }

    async fn enrolled_students(
        &self,
        code: &CourseCode,
    ) -> Result<Vec<RegNumber>, CourseRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .enrolments
            .iter()
            .filter(|(course, _)| course == code)
            .map(|(_, student)| student.clone())
            .collect())
    }
}
