//! PostgreSQL-backed `ScheduleRepository`.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ScheduleRepository, ScheduleRepositoryError};
use crate::domain::{Assignment, CourseCode, Exam, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AssignmentRow, ExamRow};
use super::pool::{DbPool, PoolError};
use super::schema::{assignments, exams};

#[derive(Clone)]
pub struct DieselScheduleRepository {
    pool: DbPool,
}

impl DieselScheduleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ScheduleRepositoryError {
    map_basic_pool_error(error, ScheduleRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ScheduleRepositoryError {
    map_basic_diesel_error(
        error,
        ScheduleRepositoryError::query,
        ScheduleRepositoryError::connection,
    )
}

fn course_code(id: Uuid, raw: &str) -> Result<CourseCode, ScheduleRepositoryError> {
    CourseCode::new(raw)
        .map_err(|err| ScheduleRepositoryError::query(format!("stored schedule entry {id}: {err}")))
}

fn exam_row(exam: &Exam) -> ExamRow {
    ExamRow {
        id: exam.id,
        course_code: exam.course_code.to_string(),
        group_id: exam.group_id.clone(),
        exam_date: exam.exam_date,
        start_time: exam.start_time,
        end_time: exam.end_time,
        venue: exam.venue.clone(),
    }
}

fn row_to_exam(row: ExamRow) -> Result<Exam, ScheduleRepositoryError> {
    Ok(Exam {
        course_code: course_code(row.id, &row.course_code)?,
        id: row.id,
        group_id: row.group_id,
        exam_date: row.exam_date,
        start_time: row.start_time,
        end_time: row.end_time,
        venue: row.venue,
    })
}

fn assignment_row(assignment: &Assignment) -> AssignmentRow {
    AssignmentRow {
        id: assignment.id,
        course_code: assignment.course_code.to_string(),
        title: assignment.title.clone(),
        description: assignment.description.clone(),
        due_date: assignment.due_date,
        assigned_by: *assignment.assigned_by.as_uuid(),
    }
}

fn row_to_assignment(row: AssignmentRow) -> Result<Assignment, ScheduleRepositoryError> {
    Ok(Assignment {
        course_code: course_code(row.id, &row.course_code)?,
        id: row.id,
        title: row.title,
        description: row.description,
        due_date: row.due_date,
        assigned_by: UserId::from_uuid(row.assigned_by),
    })
}

#[async_trait]
impl ScheduleRepository for DieselScheduleRepository {
    async fn insert_exam(&self, exam: &Exam) -> Result<(), ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(exams::table)
            .values(&exam_row(exam))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_exam(&self, exam: &Exam) -> Result<bool, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(exams::table.find(exam.id))
            .set(&exam_row(exam))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_exam(&self, id: &Uuid) -> Result<bool, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(exams::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn find_exam(&self, id: &Uuid) -> Result<Option<Exam>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        exams::table
            .find(id)
            .select(ExamRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_exam)
            .transpose()
    }

    async fn list_exams(&self) -> Result<Vec<Exam>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ExamRow> = exams::table
            .order((exams::exam_date, exams::start_time))
            .select(ExamRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_exam).collect()
    }

    async fn exams_for_group_on(
        &self,
        group_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Exam>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ExamRow> = exams::table
            .filter(exams::group_id.eq(group_id))
            .filter(exams::exam_date.eq(date))
            .order(exams::start_time)
            .select(ExamRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_exam).collect()
    }

    async fn insert_assignment(
        &self,
        assignment: &Assignment,
    ) -> Result<(), ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(assignments::table)
            .values(&assignment_row(assignment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_assignment(
        &self,
        assignment: &Assignment,
    ) -> Result<bool, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(assignments::table.find(assignment.id))
            .set(&assignment_row(assignment))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_assignment(&self, id: &Uuid) -> Result<bool, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(assignments::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn find_assignment(
        &self,
        id: &Uuid,
    ) -> Result<Option<Assignment>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        assignments::table
            .find(id)
            .select(AssignmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_assignment)
            .transpose()
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AssignmentRow> = assignments::table
            .order(assignments::due_date)
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_assignment).collect()
    }
}
