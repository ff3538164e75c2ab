//! PostgreSQL-backed `AttendanceRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AttendanceRepository, AttendanceRepositoryError};
use crate::domain::{AttendanceRecord, CourseCode, RegNumber};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::AttendanceRow;
use super::pool::{DbPool, PoolError};
use super::schema::attendance_records;

#[derive(Clone)]
pub struct DieselAttendanceRepository {
    pool: DbPool,
}

impl DieselAttendanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AttendanceRepositoryError {
    map_basic_pool_error(error, AttendanceRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AttendanceRepositoryError {
    map_basic_diesel_error(
        error,
        AttendanceRepositoryError::query,
        AttendanceRepositoryError::connection,
    )
}

fn to_row(record: &AttendanceRecord) -> AttendanceRow {
    AttendanceRow {
        id: record.id,
        reg_number: record.reg_number.to_string(),
        status: record.status.as_str().to_owned(),
        method: record.method.as_str().to_owned(),
        course_code: record.course_code.to_string(),
        location: record.location.clone(),
        confidence: record.confidence,
        marked_at: record.timestamp,
    }
}

fn corrupt(id: uuid::Uuid, err: impl std::fmt::Display) -> AttendanceRepositoryError {
    AttendanceRepositoryError::query(format!("stored record {id}: {err}"))
}

fn from_row(row: AttendanceRow) -> Result<AttendanceRecord, AttendanceRepositoryError> {
    let id = row.id;
    Ok(AttendanceRecord {
        id,
        reg_number: RegNumber::new(&row.reg_number).map_err(|err| corrupt(id, err))?,
        status: row.status.parse().map_err(|err| corrupt(id, err))?,
        method: row.method.parse().map_err(|err| corrupt(id, err))?,
        course_code: CourseCode::new(&row.course_code).map_err(|err| corrupt(id, err))?,
        location: row.location,
        confidence: row.confidence,
        timestamp: row.marked_at,
    })
}

fn from_rows(rows: Vec<AttendanceRow>) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
    rows.into_iter().map(from_row).collect()
}

#[async_trait]
impl AttendanceRepository for DieselAttendanceRepository {
    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        self.insert_many(std::slice::from_ref(record)).await
    }

    async fn insert_many(
        &self,
        records: &[AttendanceRecord],
    ) -> Result<(), AttendanceRepositoryError> {
        if records.is_empty() {
            return Ok(());
        }
        let rows: Vec<AttendanceRow> = records.iter().map(to_row).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(attendance_records::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn latest_since(
        &self,
        reg_number: &RegNumber,
        since: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        attendance_records::table
            .filter(attendance_records::reg_number.eq(reg_number.as_ref()))
            .filter(attendance_records::marked_at.ge(since))
            .order(attendance_records::marked_at.desc())
            .select(AttendanceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(from_row)
            .transpose()
    }

    async fn list_for_student(
        &self,
        reg_number: &RegNumber,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = attendance_records::table
            .filter(attendance_records::reg_number.eq(reg_number.as_ref()))
            .filter(attendance_records::marked_at.ge(from))
            .filter(attendance_records::marked_at.lt(to))
            .order(attendance_records::marked_at.desc())
            .select(AttendanceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        from_rows(rows)
    }

    async fn list_for_course(
        &self,
        course_code: &CourseCode,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = attendance_records::table
            .filter(attendance_records::course_code.eq(course_code.as_ref()))
            .filter(attendance_records::marked_at.ge(from))
            .filter(attendance_records::marked_at.lt(to))
            .order(attendance_records::marked_at.asc())
            .select(AttendanceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        from_rows(rows)
    }
}
