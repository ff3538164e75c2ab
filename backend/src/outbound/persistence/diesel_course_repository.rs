//! PostgreSQL-backed `CourseRepository`.
//!
//! Courses, their ordered lecturer assignments and enrolments live in three
//! tables. Writes touching more than one table run in a transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{Course, CourseCode, CourseDraft, RegNumber, UserId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{CourseLecturerRow, CourseRow, CourseWrite, NewEnrollmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{course_lecturers, courses, enrollments};

#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CourseRepositoryError {
    map_basic_pool_error(error, CourseRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CourseRepositoryError {
    map_basic_diesel_error(
        error,
        CourseRepositoryError::query,
        CourseRepositoryError::connection,
    )
}

fn course_write(course: &Course) -> CourseWrite<'_> {
    CourseWrite {
        code: course.code().as_ref(),
        title: course.title(),
        credits: i16::from(course.credits()),
        year: i16::from(course.year()),
        semester: i16::from(course.semester()),
    }
}

fn lecturer_rows(course: &Course) -> Result<Vec<CourseLecturerRow>, CourseRepositoryError> {
    course
        .lecturers()
        .iter()
        .enumerate()
        .map(|(index, lecturer)| {
            Ok(CourseLecturerRow {
                course_code: course.code().to_string(),
                lecturer_id: *lecturer.as_uuid(),
                position: i16::try_from(index)
                    .map_err(|_| CourseRepositoryError::query("too many lecturers"))?,
            })
        })
        .collect()
}

fn narrow(field: &str, value: i16) -> Result<u8, CourseRepositoryError> {
    u8::try_from(value)
        .map_err(|_| CourseRepositoryError::query(format!("stored course has invalid {field}")))
}

fn row_to_course(
    row: CourseRow,
    lecturers: Vec<UserId>,
) -> Result<Course, CourseRepositoryError> {
    let code = CourseCode::new(&row.code)
        .map_err(|err| CourseRepositoryError::query(format!("stored course code: {err}")))?;
    Course::new(CourseDraft {
        code,
        title: row.title,
        credits: narrow("credits", row.credits)?,
        year: narrow("year", row.year)?,
        semester: narrow("semester", row.semester)?,
        lecturers,
    })
    .map_err(|err| CourseRepositoryError::query(err.to_string()))
}

/// Attach lecturer assignments to course rows, preserving row order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<CourseRow>,
) -> Result<Vec<Course>, CourseRepositoryError> {
    let codes: Vec<&str> = rows.iter().map(|row| row.code.as_str()).collect();
    let assignments: Vec<CourseLecturerRow> = course_lecturers::table
        .filter(course_lecturers::course_code.eq_any(codes))
        .order((course_lecturers::course_code, course_lecturers::position))
        .select(CourseLecturerRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut by_course: HashMap<String, Vec<UserId>> = HashMap::new();
    for assignment in assignments {
        by_course
            .entry(assignment.course_code)
            .or_default()
            .push(UserId::from_uuid(assignment.lecturer_id));
    }
    rows.into_iter()
        .map(|row| {
            let lecturers = by_course.remove(&row.code).unwrap_or_default();
            row_to_course(row, lecturers)
        })
        .collect()
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn create(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let write = course_write(course);
        let lecturers = lecturer_rows(course)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(courses::table)
                    .values(&write)
                    .execute(conn)
                    .await?;
                if !lecturers.is_empty() {
                    diesel::insert_into(course_lecturers::table)
                        .values(&lecturers)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err: diesel::result::Error| {
            if is_unique_violation(&err) {
                CourseRepositoryError::duplicate(course.code().as_ref())
            } else {
                map_diesel_error(err)
            }
        })
    }

    async fn update(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let write = course_write(course);
        let lecturers = lecturer_rows(course)?;
        let code = course.code().as_ref();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::update(courses::table.find(code))
                    .set(&write)
                    .execute(conn)
                    .await?;
                diesel::delete(
                    course_lecturers::table.filter(course_lecturers::course_code.eq(code)),
                )
                .execute(conn)
                .await?;
                if !lecturers.is_empty() {
                    diesel::insert_into(course_lecturers::table)
                        .values(&lecturers)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_code(
        &self,
        code: &CourseCode,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .filter(courses::code.eq(code.as_ref()))
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(hydrate(&mut conn, rows).await?.into_iter().next())
    }

    async fn list_all(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = courses::table
            .order(courses::code)
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn list_by_semester(&self, semester: u8) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = courses::table
            .filter(courses::semester.eq(i16::from(semester)))
            .order(courses::code)
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn list_taught_by(&self, lecturer: &UserId) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = courses::table
            .inner_join(course_lecturers::table)
            .filter(course_lecturers::lecturer_id.eq(lecturer.as_uuid()))
            .order(courses::code)
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn enroll(
        &self,
        reg_number: &RegNumber,
        code: &CourseCode,
    ) -> Result<(), CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(enrollments::table)
            .values(&NewEnrollmentRow {
                course_code: code.as_ref(),
                reg_number: reg_number.as_ref(),
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    CourseRepositoryError::duplicate(format!("{reg_number} in {code}"))
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn unenroll(
        &self,
        reg_number: &RegNumber,
        code: &CourseCode,
    ) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            enrollments::table
                .filter(enrollments::course_code.eq(code.as_ref()))
                .filter(enrollments::reg_number.eq(reg_number.as_ref())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_enrolled(
        &self,
        reg_number: &RegNumber,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = courses::table
            .inner_join(enrollments::table)
            .filter(enrollments::reg_number.eq(reg_number.as_ref()))
            .order(courses::code)
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn enrolled_students(
        &self,
        code: &CourseCode,
    ) -> Result<Vec<RegNumber>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Vec<String> = enrollments::table
            .filter(enrollments::course_code.eq(code.as_ref()))
            .order(enrollments::reg_number)
            .select(enrollments::reg_number)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        raw.into_iter()
            .map(|value| {
                RegNumber::new(&value).map_err(|err| {
                    CourseRepositoryError::query(format!("stored enrolment {value}: {err}"))
                })
            })
            .collect()
    }
}
