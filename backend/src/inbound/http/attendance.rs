//! Attendance marking and reporting HTTP handlers.
//!
//! ```text
//! POST /api-gateway/attendance/mark
//! GET  /api-gateway/attendance/can-mark/{reg_number}
//! GET  /api-gateway/attendance/stats/{reg_number}?days=30
//! POST /api-gateway/attendance/mark-absent
//! GET  /api-gateway/attendance/report/{course_code}?date=2026-05-04
//! POST /api-gateway/attendance/register-face
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{DEFAULT_STATS_DAYS, ManualMark};
use crate::domain::{AttendanceRecord, AttendanceStats, AttendanceStatus, Error, MarkEligibility};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, parse_course_code, parse_date, parse_enum, parse_reg_number,
    required_text,
};

const REG_NUMBER: FieldName = FieldName::new("reg_number");
const COURSE_CODE: FieldName = FieldName::new("course_code");
const STATUS: FieldName = FieldName::new("status");
const DATE: FieldName = FieldName::new("date");
const DAYS: FieldName = FieldName::new("days");
const IMAGE: FieldName = FieldName::new("image_base64");

/// Longest look-back accepted by the stats endpoint.
const MAX_STATS_DAYS: u32 = 366;

/// Manual mark submitted by a lecturer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MarkBody {
    pub reg_number: Option<String>,
    pub course_code: Option<String>,
    /// `PRESENT`, `ABSENT`, `LATE` or `EXCUSED`; defaults to `PRESENT`.
    pub status: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MarkAbsentBody {
    pub course_code: Option<String>,
    /// Defaults to today (UTC).
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterFaceBody {
    pub reg_number: Option<String>,
    pub image_base64: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatsQuery {
    /// Look-back in days.
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Report date as `YYYY-MM-DD`.
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecordResponse {
    pub id: Uuid,
    pub reg_number: String,
    #[schema(example = "PRESENT")]
    pub status: String,
    #[schema(example = "manual")]
    pub method: String,
    pub course_code: String,
    pub location: Option<String>,
    pub confidence: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl From<&AttendanceRecord> for AttendanceRecordResponse {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            id: record.id,
            reg_number: record.reg_number.to_string(),
            status: record.status.as_str().to_owned(),
            method: record.method.as_str().to_owned(),
            course_code: record.course_code.to_string(),
            location: record.location.clone(),
            confidence: record.confidence,
            timestamp: record.timestamp,
        }
    }
}

fn record_list(records: &[AttendanceRecord]) -> Vec<AttendanceRecordResponse> {
    records.iter().map(AttendanceRecordResponse::from).collect()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EligibilityResponse {
    pub can_mark: bool,
    pub message: String,
    pub last_marked: Option<DateTime<Utc>>,
    pub next_allowed: Option<DateTime<Utc>>,
    pub minutes_remaining: Option<i64>,
}

impl From<MarkEligibility> for EligibilityResponse {
    fn from(eligibility: MarkEligibility) -> Self {
        match eligibility {
            MarkEligibility::Allowed => Self {
                can_mark: true,
                message: "Attendance can be marked".to_owned(),
                last_marked: None,
                next_allowed: None,
                minutes_remaining: None,
            },
            MarkEligibility::Denied {
                last_marked,
                next_allowed,
                minutes_remaining,
            } => Self {
                can_mark: false,
                message: format!("Already marked. Next allowed in {minutes_remaining} minutes"),
                last_marked: Some(last_marked),
                next_allowed: Some(next_allowed),
                minutes_remaining: Some(minutes_remaining),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub reg_number: String,
    pub days: u32,
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
    pub attendance_rate: f64,
    /// Records keyed by `YYYY-MM-DD`.
    pub records_by_date: BTreeMap<String, Vec<AttendanceRecordResponse>>,
}

impl StatsResponse {
    fn new(reg_number: String, days: u32, summary: AttendanceStats) -> Self {
        let records_by_date = summary
            .by_date
            .iter()
            .map(|(date, records)| (date.format("%Y-%m-%d").to_string(), record_list(records)))
            .collect();
        Self {
            reg_number,
            days,
            total: summary.total,
            present: summary.present,
            absent: summary.absent,
            late: summary.late,
            excused: summary.excused,
            attendance_rate: summary.attendance_rate,
            records_by_date,
        }
    }
}

fn parse_mark(body: MarkBody) -> Result<ManualMark, Error> {
    let reg_number = parse_reg_number(&required_text(body.reg_number, REG_NUMBER)?, REG_NUMBER)?;
    let course_code =
        parse_course_code(&required_text(body.course_code, COURSE_CODE)?, COURSE_CODE)?;
    let status = match body.status.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => parse_enum::<AttendanceStatus>(&raw, STATUS)?,
        None => AttendanceStatus::Present,
    };
    Ok(ManualMark {
        reg_number,
        course_code,
        status,
        location: body.location.filter(|loc| !loc.trim().is_empty()),
    })
}

fn stats_days(query: &StatsQuery) -> Result<u32, Error> {
    match query.days {
        None => Ok(DEFAULT_STATS_DAYS),
        Some(days) if (1..=MAX_STATS_DAYS).contains(&days) => Ok(days),
        Some(days) => Err(invalid_value_error(
            DAYS,
            &days.to_string(),
            format!("days must be between 1 and {MAX_STATS_DAYS}"),
        )),
    }
}

/// Record a manual mark (lecturers only).
#[utoipa::path(
    post,
    path = "/api-gateway/attendance/mark",
    request_body = MarkBody,
    responses(
        (status = 201, description = "Attendance marked", body = AttendanceRecordResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Lecturer role required", body = ErrorSchema),
        (status = 404, description = "Student or course not found", body = ErrorSchema),
        (status = 409, description = "Inside the marking window", body = ErrorSchema)
    ),
    tags = ["attendance"],
    operation_id = "markAttendance"
)]
#[post("/attendance/mark")]
pub async fn mark(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<MarkBody>,
) -> ApiResult<HttpResponse> {
    session.require_lecturer()?;
    let request = parse_mark(payload.into_inner())?;
    let record = state.attendance.mark(request).await?;
    Ok(HttpResponse::Created().json(AttendanceRecordResponse::from(&record)))
}

/// Check whether a student may be marked now.
#[utoipa::path(
    get,
    path = "/api-gateway/attendance/can-mark/{reg_number}",
    params(("reg_number" = String, Path, description = "Student registration number")),
    responses(
        (status = 200, description = "Marking window state", body = EligibilityResponse),
        (status = 400, description = "Invalid registration number", body = ErrorSchema)
    ),
    tags = ["attendance"],
    operation_id = "canMark"
)]
#[get("/attendance/can-mark/{reg_number}")]
pub async fn can_mark(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<EligibilityResponse>> {
    session.require_user()?;
    let reg_number = parse_reg_number(&path.into_inner(), REG_NUMBER)?;
    let eligibility = state.attendance.can_mark(&reg_number).await?;
    Ok(web::Json(EligibilityResponse::from(eligibility)))
}

/// Summarise a student's attendance.
#[utoipa::path(
    get,
    path = "/api-gateway/attendance/stats/{reg_number}",
    params(
        ("reg_number" = String, Path, description = "Student registration number"),
        StatsQuery
    ),
    responses(
        (status = 200, description = "Attendance statistics", body = StatsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["attendance"],
    operation_id = "attendanceStats"
)]
#[get("/attendance/stats/{reg_number}")]
pub async fn stats(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<StatsQuery>,
) -> ApiResult<web::Json<StatsResponse>> {
    session.require_user()?;
    let reg_number = parse_reg_number(&path.into_inner(), REG_NUMBER)?;
    let days = stats_days(&query)?;
    let summary = state.attendance.stats(&reg_number, days).await?;
    Ok(web::Json(StatsResponse::new(
        reg_number.to_string(),
        days,
        summary,
    )))
}

/// Mark every unrecorded enrolled student absent (lecturers only).
#[utoipa::path(
    post,
    path = "/api-gateway/attendance/mark-absent",
    request_body = MarkAbsentBody,
    responses(
        (status = 200, description = "Absentees recorded"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Lecturer role required", body = ErrorSchema)
    ),
    tags = ["attendance"],
    operation_id = "markAbsent"
)]
#[post("/attendance/mark-absent")]
pub async fn mark_absent(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<MarkAbsentBody>,
) -> ApiResult<HttpResponse> {
    session.require_lecturer()?;
    let MarkAbsentBody { course_code, date } = payload.into_inner();
    let course_code = parse_course_code(&required_text(course_code, COURSE_CODE)?, COURSE_CODE)?;
    let date = date
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_date(&raw, DATE))
        .transpose()?;
    let count = state.attendance.mark_absent(&course_code, date).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Marked {count} students absent"),
        "count": count,
    })))
}

/// Attendance records for a course on one day.
#[utoipa::path(
    get,
    path = "/api-gateway/attendance/report/{course_code}",
    params(
        ("course_code" = String, Path, description = "Course code"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Course attendance", body = [AttendanceRecordResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["attendance"],
    operation_id = "courseReport"
)]
#[get("/attendance/report/{course_code}")]
pub async fn course_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<ReportQuery>,
) -> ApiResult<web::Json<Vec<AttendanceRecordResponse>>> {
    session.require_user()?;
    let course_code = parse_course_code(&path.into_inner(), COURSE_CODE)?;
    let raw_date = required_text(query.into_inner().date, DATE)?;
    let date = parse_date(&raw_date, DATE)?;
    let records = state.attendance.course_report(&course_code, date).await?;
    Ok(web::Json(record_list(&records)))
}

/// Enrol a student's reference face with the recognition engine.
#[utoipa::path(
    post,
    path = "/api-gateway/attendance/register-face",
    request_body = RegisterFaceBody,
    responses(
        (status = 200, description = "Face registered"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Student not found", body = ErrorSchema),
        (status = 503, description = "Recognition engine unavailable", body = ErrorSchema)
    ),
    tags = ["attendance"],
    operation_id = "registerFace"
)]
#[post("/attendance/register-face")]
pub async fn register_face(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterFaceBody>,
) -> ApiResult<HttpResponse> {
    session.require_user()?;
    let RegisterFaceBody {
        reg_number,
        image_base64,
    } = payload.into_inner();
    let reg_number = parse_reg_number(&required_text(reg_number, REG_NUMBER)?, REG_NUMBER)?;
    let image = required_text(image_base64, IMAGE)?;
    state.attendance.register_face(&reg_number, &image).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Face registered for {reg_number}"),
    })))
}

#[cfg(test)]
#[path = "attendance_tests.rs"]
mod tests;
