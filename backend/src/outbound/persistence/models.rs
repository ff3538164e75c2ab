//! Diesel row structs.
//!
//! Persistence-only types; repositories convert them to and from domain
//! values and never hand them to callers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    assignments, attendance_records, course_lecturers, courses, enrollments, exams,
    notifications, profiles,
};

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub department: String,
    pub faculty: String,
    pub reg_number: Option<String>,
    pub year_of_study: Option<i32>,
    pub semester: Option<i16>,
    pub designation: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub department: &'a str,
    pub faculty: &'a str,
    pub reg_number: Option<&'a str>,
    pub reg_value: Option<i64>,
    pub year_of_study: Option<i32>,
    pub semester: Option<i16>,
    pub designation: Option<&'a str>,
}

/// Contact fields a profile update may change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileContactUpdate<'a> {
    pub display_name: &'a str,
    pub phone: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub code: String,
    pub title: String,
    pub credits: i16,
    pub year: i16,
    pub semester: i16,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = courses)]
pub(crate) struct CourseWrite<'a> {
    pub code: &'a str,
    pub title: &'a str,
    pub credits: i16,
    pub year: i16,
    pub semester: i16,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = course_lecturers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseLecturerRow {
    pub course_code: String,
    pub lecturer_id: Uuid,
    pub position: i16,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = enrollments)]
pub(crate) struct NewEnrollmentRow<'a> {
    pub course_code: &'a str,
    pub reg_number: &'a str,
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttendanceRow {
    pub id: Uuid,
    pub reg_number: String,
    pub status: String,
    pub method: String,
    pub course_code: String,
    pub location: Option<String>,
    pub confidence: Option<f64>,
    pub marked_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
    pub title: String,
    pub message: String,
    pub course_code: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = exams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ExamRow {
    pub id: Uuid,
    pub course_code: String,
    pub group_id: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AssignmentRow {
    pub id: Uuid,
    pub course_code: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDateTime,
    pub assigned_by: Uuid,
}
