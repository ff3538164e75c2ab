//! Exam and assignment scheduling HTTP handlers.
//!
//! ```text
//! POST   /api-gateway/schedule/exams/schedule
//! GET    /api-gateway/schedule/exams
//! GET    /api-gateway/schedule/exams/{exam_id}
//! PUT    /api-gateway/schedule/exams/{exam_id}
//! DELETE /api-gateway/schedule/exams/{exam_id}
//! POST   /api-gateway/schedule/assignments
//! GET    /api-gateway/schedule/assignments
//! GET    /api-gateway/schedule/assignments/{assignment_id}
//! PUT    /api-gateway/schedule/assignments/{assignment_id}
//! DELETE /api-gateway/schedule/assignments/{assignment_id}
//! ```
//!
//! Dates travel as `YYYY-MM-DD`, times as `HH:MM`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{AssignmentUpdate, ExamUpdate};
use crate::domain::{Assignment, AssignmentDraft, Error, Exam, ExamDraft, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_course_code, parse_date, parse_due_date, parse_time, parse_user_id,
    parse_uuid, required_text,
};

const COURSE_CODE: FieldName = FieldName::new("course_code");
const GROUP_ID: FieldName = FieldName::new("group_id");
const EXAM_DATE: FieldName = FieldName::new("exam_date");
const START_TIME: FieldName = FieldName::new("start_time");
const END_TIME: FieldName = FieldName::new("end_time");
const EXAM_ID: FieldName = FieldName::new("exam_id");
const TITLE: FieldName = FieldName::new("title");
const DUE_DATE: FieldName = FieldName::new("due_date");
const ASSIGNED_BY: FieldName = FieldName::new("assigned_by");
const ASSIGNMENT_ID: FieldName = FieldName::new("assignment_id");

/// Exam fields; every field is required on create and optional on update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ExamBody {
    pub course_code: Option<String>,
    pub group_id: Option<String>,
    #[schema(example = "2026-05-04")]
    pub exam_date: Option<String>,
    #[schema(example = "09:00")]
    pub start_time: Option<String>,
    #[schema(example = "11:00")]
    pub end_time: Option<String>,
    pub venue: Option<String>,
}

/// Assignment fields; `assigned_by` defaults to the signed-in lecturer.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AssignmentBody {
    pub course_code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "2026-05-10T23:59")]
    pub due_date: Option<String>,
    pub assigned_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExamResponse {
    pub id: Uuid,
    pub course_code: String,
    pub group_id: String,
    pub exam_date: String,
    pub start_time: String,
    pub end_time: String,
    pub venue: Option<String>,
}

impl From<&Exam> for ExamResponse {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id,
            course_code: exam.course_code.to_string(),
            group_id: exam.group_id.clone(),
            exam_date: exam.exam_date.format("%Y-%m-%d").to_string(),
            start_time: exam.start_time.format("%H:%M").to_string(),
            end_time: exam.end_time.format("%H:%M").to_string(),
            venue: exam.venue.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub course_code: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: String,
    pub assigned_by: String,
}

impl From<&Assignment> for AssignmentResponse {
    fn from(assignment: &Assignment) -> Self {
        Self {
            id: assignment.id,
            course_code: assignment.course_code.to_string(),
            title: assignment.title.clone(),
            description: assignment.description.clone(),
            due_date: assignment.due_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            assigned_by: assignment.assigned_by.to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn parse_exam_update(body: ExamBody) -> Result<ExamUpdate, Error> {
    Ok(ExamUpdate {
        course_code: non_blank(body.course_code)
            .map(|raw| parse_course_code(&raw, COURSE_CODE))
            .transpose()?,
        group_id: non_blank(body.group_id).map(|raw| raw.trim().to_owned()),
        exam_date: non_blank(body.exam_date)
            .map(|raw| parse_date(&raw, EXAM_DATE))
            .transpose()?,
        start_time: non_blank(body.start_time)
            .map(|raw| parse_time(&raw, START_TIME))
            .transpose()?,
        end_time: non_blank(body.end_time)
            .map(|raw| parse_time(&raw, END_TIME))
            .transpose()?,
        venue: non_blank(body.venue),
    })
}

fn parse_exam_draft(body: ExamBody) -> Result<ExamDraft, Error> {
    let course_code = required_text(body.course_code, COURSE_CODE)?;
    let group_id = required_text(body.group_id, GROUP_ID)?;
    let exam_date = required_text(body.exam_date, EXAM_DATE)?;
    let start_time = required_text(body.start_time, START_TIME)?;
    let end_time = required_text(body.end_time, END_TIME)?;
    Ok(ExamDraft {
        course_code: parse_course_code(&course_code, COURSE_CODE)?,
        group_id: group_id.trim().to_owned(),
        exam_date: parse_date(&exam_date, EXAM_DATE)?,
        start_time: parse_time(&start_time, START_TIME)?,
        end_time: parse_time(&end_time, END_TIME)?,
        venue: non_blank(body.venue),
    })
}

fn parse_assignment_draft(
    body: AssignmentBody,
    session_user: UserId,
) -> Result<AssignmentDraft, Error> {
    let course_code = required_text(body.course_code, COURSE_CODE)?;
    let title = required_text(body.title, TITLE)?;
    let due_date = required_text(body.due_date, DUE_DATE)?;
    let assigned_by = match non_blank(body.assigned_by) {
        Some(raw) => parse_user_id(&raw, ASSIGNED_BY)?,
        None => session_user,
    };
    Ok(AssignmentDraft {
        course_code: parse_course_code(&course_code, COURSE_CODE)?,
        title: title.trim().to_owned(),
        description: non_blank(body.description),
        due_date: parse_due_date(&due_date, DUE_DATE)?,
        assigned_by,
    })
}

fn parse_assignment_update(body: AssignmentBody) -> Result<AssignmentUpdate, Error> {
    Ok(AssignmentUpdate {
        course_code: non_blank(body.course_code)
            .map(|raw| parse_course_code(&raw, COURSE_CODE))
            .transpose()?,
        title: non_blank(body.title).map(|raw| raw.trim().to_owned()),
        description: non_blank(body.description),
        due_date: non_blank(body.due_date)
            .map(|raw| parse_due_date(&raw, DUE_DATE))
            .transpose()?,
    })
}

/// Schedule an exam (lecturers only).
#[utoipa::path(
    post,
    path = "/api-gateway/schedule/exams/schedule",
    request_body = ExamBody,
    responses(
        (status = 201, description = "Exam scheduled", body = ExamResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Lecturer role required", body = ErrorSchema),
        (status = 409, description = "Exam clash", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "scheduleExam"
)]
#[post("/schedule/exams/schedule")]
pub async fn schedule_exam(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ExamBody>,
) -> ApiResult<HttpResponse> {
    session.require_lecturer()?;
    let draft = parse_exam_draft(payload.into_inner())?;
    let exam = state.schedule.schedule_exam(draft).await?;
    Ok(HttpResponse::Created().json(ExamResponse::from(&exam)))
}

#[utoipa::path(
    get,
    path = "/api-gateway/schedule/exams",
    responses(
        (status = 200, description = "All exams", body = [ExamResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "listExams"
)]
#[get("/schedule/exams")]
pub async fn list_exams(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ExamResponse>>> {
    session.require_user()?;
    let exams = state.schedule.list_exams().await?;
    Ok(web::Json(exams.iter().map(ExamResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api-gateway/schedule/exams/{exam_id}",
    params(("exam_id" = Uuid, Path, description = "Exam id")),
    responses(
        (status = 200, description = "Exam", body = ExamResponse),
        (status = 404, description = "Exam not found", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "getExam"
)]
#[get("/schedule/exams/{exam_id}")]
pub async fn get_exam(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ExamResponse>> {
    session.require_user()?;
    let id = parse_uuid(&path.into_inner(), EXAM_ID)?;
    let exam = state.schedule.get_exam(&id).await?;
    Ok(web::Json(ExamResponse::from(&exam)))
}

/// Partially update an exam (lecturers only).
#[utoipa::path(
    put,
    path = "/api-gateway/schedule/exams/{exam_id}",
    params(("exam_id" = Uuid, Path, description = "Exam id")),
    request_body = ExamBody,
    responses(
        (status = 200, description = "Updated exam", body = ExamResponse),
        (status = 404, description = "Exam not found", body = ErrorSchema),
        (status = 409, description = "Exam clash", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "updateExam"
)]
#[put("/schedule/exams/{exam_id}")]
pub async fn update_exam(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ExamBody>,
) -> ApiResult<web::Json<ExamResponse>> {
    session.require_lecturer()?;
    let id = parse_uuid(&path.into_inner(), EXAM_ID)?;
    let update = parse_exam_update(payload.into_inner())?;
    let exam = state.schedule.update_exam(&id, update).await?;
    Ok(web::Json(ExamResponse::from(&exam)))
}

#[utoipa::path(
    delete,
    path = "/api-gateway/schedule/exams/{exam_id}",
    params(("exam_id" = Uuid, Path, description = "Exam id")),
    responses(
        (status = 204, description = "Exam deleted"),
        (status = 404, description = "Exam not found", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "deleteExam"
)]
#[delete("/schedule/exams/{exam_id}")]
pub async fn delete_exam(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_lecturer()?;
    let id = parse_uuid(&path.into_inner(), EXAM_ID)?;
    state.schedule.delete_exam(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Create an assignment (lecturers only).
#[utoipa::path(
    post,
    path = "/api-gateway/schedule/assignments",
    request_body = AssignmentBody,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 400, description = "Invalid request or unknown course", body = ErrorSchema),
        (status = 401, description = "Assigner is not a lecturer", body = ErrorSchema),
        (status = 403, description = "Lecturer role required", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "createAssignment"
)]
#[post("/schedule/assignments")]
pub async fn create_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AssignmentBody>,
) -> ApiResult<HttpResponse> {
    let lecturer = session.require_lecturer()?;
    let draft = parse_assignment_draft(payload.into_inner(), lecturer.user_id)?;
    let assignment = state.schedule.create_assignment(draft).await?;
    Ok(HttpResponse::Created().json(AssignmentResponse::from(&assignment)))
}

#[utoipa::path(
    get,
    path = "/api-gateway/schedule/assignments",
    responses(
        (status = 200, description = "All assignments", body = [AssignmentResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "listAssignments"
)]
#[get("/schedule/assignments")]
pub async fn list_assignments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AssignmentResponse>>> {
    session.require_user()?;
    let assignments = state.schedule.list_assignments().await?;
    Ok(web::Json(
        assignments.iter().map(AssignmentResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api-gateway/schedule/assignments/{assignment_id}",
    params(("assignment_id" = Uuid, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment", body = AssignmentResponse),
        (status = 404, description = "Assignment not found", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "getAssignment"
)]
#[get("/schedule/assignments/{assignment_id}")]
pub async fn get_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    session.require_user()?;
    let id = parse_uuid(&path.into_inner(), ASSIGNMENT_ID)?;
    let assignment = state.schedule.get_assignment(&id).await?;
    Ok(web::Json(AssignmentResponse::from(&assignment)))
}

/// Partially update an assignment (lecturers only).
#[utoipa::path(
    put,
    path = "/api-gateway/schedule/assignments/{assignment_id}",
    params(("assignment_id" = Uuid, Path, description = "Assignment id")),
    request_body = AssignmentBody,
    responses(
        (status = 200, description = "Updated assignment", body = AssignmentResponse),
        (status = 404, description = "Assignment not found", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "updateAssignment"
)]
#[put("/schedule/assignments/{assignment_id}")]
pub async fn update_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AssignmentBody>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    session.require_lecturer()?;
    let id = parse_uuid(&path.into_inner(), ASSIGNMENT_ID)?;
    let update = parse_assignment_update(payload.into_inner())?;
    let assignment = state.schedule.update_assignment(&id, update).await?;
    Ok(web::Json(AssignmentResponse::from(&assignment)))
}

#[utoipa::path(
    delete,
    path = "/api-gateway/schedule/assignments/{assignment_id}",
    params(("assignment_id" = Uuid, Path, description = "Assignment id")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "deleteAssignment"
)]
#[delete("/schedule/assignments/{assignment_id}")]
pub async fn delete_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_lecturer()?;
    let id = parse_uuid(&path.into_inner(), ASSIGNMENT_ID)?;
    state.schedule.delete_assignment(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
