//! Exam and assignment store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::{ScheduleRepository, ScheduleRepositoryError};
use crate::domain::{Assignment, Exam};

#[derive(Debug, Default)]
pub struct InMemoryScheduleRepository {
    exams: RwLock<HashMap<Uuid, Exam>>,
    assignments: RwLock<HashMap<Uuid, Assignment>>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn insert_exam(&self, exam: &Exam) -> Result<(), ScheduleRepositoryError> {
        self.exams.write().await.insert(exam.id, exam.clone());
        Ok(())
    }

    async fn update_exam(&self, exam: &Exam) -> Result<bool, ScheduleRepositoryError> {
        let mut exams = self.exams.write().await;
        Ok(exams
            .get_mut(&exam.id)
            .map(|slot| *slot = exam.clone())
            .is_some())
    }

    async fn delete_exam(&self, id: &Uuid) -> Result<bool, ScheduleRepositoryError> {
        Ok(self.exams.write().await.remove(id).is_some())
    }

    async fn find_exam(&self, id: &Uuid) -> Result<Option<Exam>, ScheduleRepositoryError> {
        Ok(self.exams.read().await.get(id).cloned())
    }

    async fn list_exams(&self) -> Result<Vec<Exam>, ScheduleRepositoryError> {
        let mut exams: Vec<Exam> = self.exams.read().await.values().cloned().collect();
        exams.sort_by_key(|exam| (exam.exam_date, exam.start_time));
        Ok(exams)
    }

    async fn exams_for_group_on(
        &self,
        group_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Exam>, ScheduleRepositoryError> {
        let exams = self.exams.read().await;
        Ok(exams
            .values()
            .filter(|exam| exam.group_id == group_id && exam.exam_date == date)
            .cloned()
            .collect())
    }

    async fn insert_assignment(
        &self,
        assignment: &Assignment,
    ) -> Result<(), ScheduleRepositoryError> {
        self.assignments
            .write()
            .await
            .insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn update_assignment(
        &self,
        assignment: &Assignment,
    ) -> Result<bool, ScheduleRepositoryError> {
        let mut assignments = self.assignments.write().await;
        Ok(assignments
            .get_mut(&assignment.id)
            .map(|slot| *slot = assignment.clone())
            .is_some())
    }

    async fn delete_assignment(&self, id: &Uuid) -> Result<bool, ScheduleRepositoryError> {
        Ok(self.assignments.write().await.remove(id).is_some())
    }

    async fn find_assignment(
        &self,
        id: &Uuid,
    ) -> Result<Option<Assignment>, ScheduleRepositoryError> {
        Ok(self.assignments.read().await.get(id).cloned())
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, ScheduleRepositoryError> {
        let mut assignments: Vec<Assignment> =
            self.assignments.read().await.values().cloned().collect();
        assignments.sort_by_key(|a| a.due_date);
        Ok(assignments)
    }
}
