//! Course catalogue and enrolment HTTP handlers.
//!
//! ```text
//! POST /api-gateway/courses/enrolled            {"reg_number":"220001"}
//! POST /api-gateway/courses/eligible            {"reg_number":"220001"}
//! POST /api-gateway/courses/assigned            {"lecturer_id":"<uuid>"}
//! GET  /api-gateway/courses/all
//! POST /api-gateway/courses/enroll              {"reg_number":"220001","course_id":"CS101"}
//! POST /api-gateway/courses/unenroll            {"reg_number":"220001","course_id":"CS101"}
//! POST /api-gateway/courses/add-new-course
//! POST /api-gateway/courses/assigned-lecturers  {"course_id":"CS101"}
//! GET  /api-gateway/courses/{course_id}
//! PUT  /api-gateway/courses/{course_id}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::CourseUpdate;
use crate::domain::{Course, CourseDraft, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::user_profiles::{ProfileResponse, profile_list};
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_course_code, parse_reg_number, parse_user_id,
    parse_user_ids, required_text,
};

const REG_NUMBER: FieldName = FieldName::new("reg_number");
const COURSE_ID: FieldName = FieldName::new("course_id");
const LECTURER_ID: FieldName = FieldName::new("lecturer_id");
const LECTURERS: FieldName = FieldName::new("lecturers");

/// Body naming a student.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StudentBody {
    pub reg_number: Option<String>,
}

/// Body naming a lecturer. `reg_number` is accepted for older clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LecturerBody {
    #[serde(alias = "reg_number")]
    pub lecturer_id: Option<String>,
}

/// Body naming a course.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CourseBody {
    #[serde(alias = "course_code")]
    pub course_id: Option<String>,
}

/// Body pairing a student and a course.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EnrollmentBody {
    pub reg_number: Option<String>,
    #[serde(alias = "course_code")]
    pub course_id: Option<String>,
}

/// New course definition.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct NewCourseBody {
    #[serde(alias = "course_code")]
    pub course_id: Option<String>,
    pub title: Option<String>,
    pub credits: Option<u8>,
    pub year: Option<u8>,
    pub semester: Option<u8>,
    /// Lecturer user ids.
    #[serde(default)]
    pub lecturers: Vec<String>,
}

/// Partial course update; omitted fields keep their value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CourseUpdateBody {
    pub title: Option<String>,
    pub credits: Option<u8>,
    pub year: Option<u8>,
    pub semester: Option<u8>,
    pub lecturers: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    #[schema(example = "CS101")]
    pub course_code: String,
    pub title: String,
    pub credits: u8,
    pub year: u8,
    pub semester: u8,
    pub lecturers: Vec<String>,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            course_code: course.code().to_string(),
            title: course.title().to_owned(),
            credits: course.credits(),
            year: course.year(),
            semester: course.semester(),
            lecturers: course.lecturers().iter().map(ToString::to_string).collect(),
        }
    }
}

fn course_list(courses: &[Course]) -> Vec<CourseResponse> {
    courses.iter().map(CourseResponse::from).collect()
}

fn parse_new_course(body: NewCourseBody) -> Result<CourseDraft, Error> {
    let code = required_text(body.course_id, COURSE_ID)?;
    Ok(CourseDraft {
        code: parse_course_code(&code, COURSE_ID)?,
        title: required_text(body.title, FieldName::new("title"))?,
        credits: body
            .credits
            .ok_or_else(|| missing_field_error(FieldName::new("credits")))?,
        year: body
            .year
            .ok_or_else(|| missing_field_error(FieldName::new("year")))?,
        semester: body
            .semester
            .ok_or_else(|| missing_field_error(FieldName::new("semester")))?,
        lecturers: parse_user_ids(&body.lecturers, LECTURERS)?,
    })
}

fn parse_course_update(body: CourseUpdateBody) -> Result<CourseUpdate, Error> {
    Ok(CourseUpdate {
        title: body.title,
        credits: body.credits,
        year: body.year,
        semester: body.semester,
        lecturers: body
            .lecturers
            .map(|ids| parse_user_ids(&ids, LECTURERS))
            .transpose()?,
    })
}

/// Courses the student is enrolled in.
#[utoipa::path(
    post,
    path = "/api-gateway/courses/enrolled",
    request_body = StudentBody,
    responses(
        (status = 200, description = "Enrolled courses", body = [CourseResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "enrolledCourses"
)]
#[post("/courses/enrolled")]
pub async fn enrolled_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StudentBody>,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    session.require_user()?;
    let raw = required_text(payload.into_inner().reg_number, REG_NUMBER)?;
    let reg_number = parse_reg_number(&raw, REG_NUMBER)?;
    let courses = state.courses.enrolled_courses(&reg_number).await?;
    Ok(web::Json(course_list(&courses)))
}

/// Courses offered in the student's current semester.
#[utoipa::path(
    post,
    path = "/api-gateway/courses/eligible",
    request_body = StudentBody,
    responses(
        (status = 200, description = "Eligible courses", body = [CourseResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Student not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "eligibleCourses"
)]
#[post("/courses/eligible")]
pub async fn eligible_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StudentBody>,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    session.require_user()?;
    let raw = required_text(payload.into_inner().reg_number, REG_NUMBER)?;
    let reg_number = parse_reg_number(&raw, REG_NUMBER)?;
    let courses = state.courses.eligible_courses(&reg_number).await?;
    Ok(web::Json(course_list(&courses)))
}

/// Courses a lecturer teaches.
#[utoipa::path(
    post,
    path = "/api-gateway/courses/assigned",
    request_body = LecturerBody,
    responses(
        (status = 200, description = "Assigned courses", body = [CourseResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "assignedCourses"
)]
#[post("/courses/assigned")]
pub async fn assigned_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LecturerBody>,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    session.require_user()?;
    let raw = required_text(payload.into_inner().lecturer_id, LECTURER_ID)?;
    let lecturer = parse_user_id(&raw, LECTURER_ID)?;
    let courses = state.courses.assigned_courses(&lecturer).await?;
    Ok(web::Json(course_list(&courses)))
}

/// Every course in the catalogue.
#[utoipa::path(
    get,
    path = "/api-gateway/courses/all",
    responses(
        (status = 200, description = "All courses", body = [CourseResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "allCourses"
)]
#[get("/courses/all")]
pub async fn all_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    session.require_user()?;
    let courses = state.courses.all_courses().await?;
    Ok(web::Json(course_list(&courses)))
}

/// Enrol a student in a course.
#[utoipa::path(
    post,
    path = "/api-gateway/courses/enroll",
    request_body = EnrollmentBody,
    responses(
        (status = 200, description = "Enrolled"),
        (status = 404, description = "Student or course not found", body = ErrorSchema),
        (status = 409, description = "Already enrolled", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "enroll"
)]
#[post("/courses/enroll")]
pub async fn enroll(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EnrollmentBody>,
) -> ApiResult<HttpResponse> {
    session.require_user()?;
    let EnrollmentBody {
        reg_number,
        course_id,
    } = payload.into_inner();
    let reg_number = parse_reg_number(&required_text(reg_number, REG_NUMBER)?, REG_NUMBER)?;
    let code = parse_course_code(&required_text(course_id, COURSE_ID)?, COURSE_ID)?;
    state.courses.enroll(&reg_number, &code).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Enrolled {reg_number} in {code}"),
    })))
}

/// Remove a student from a course.
#[utoipa::path(
    post,
    path = "/api-gateway/courses/unenroll",
    request_body = EnrollmentBody,
    responses(
        (status = 200, description = "Unenrolled"),
        (status = 404, description = "Not enrolled", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "unenroll"
)]
#[post("/courses/unenroll")]
pub async fn unenroll(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EnrollmentBody>,
) -> ApiResult<HttpResponse> {
    session.require_user()?;
    let EnrollmentBody {
        reg_number,
        course_id,
    } = payload.into_inner();
    let reg_number = parse_reg_number(&required_text(reg_number, REG_NUMBER)?, REG_NUMBER)?;
    let code = parse_course_code(&required_text(course_id, COURSE_ID)?, COURSE_ID)?;
    state.courses.unenroll(&reg_number, &code).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Unenrolled {reg_number} from {code}"),
    })))
}

/// Create a course (lecturers only).
#[utoipa::path(
    post,
    path = "/api-gateway/courses/add-new-course",
    request_body = NewCourseBody,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Lecturer role required", body = ErrorSchema),
        (status = 409, description = "Course already exists", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "addCourse"
)]
#[post("/courses/add-new-course")]
pub async fn add_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NewCourseBody>,
) -> ApiResult<HttpResponse> {
    session.require_lecturer()?;
    let draft = parse_new_course(payload.into_inner())?;
    let course = state.courses.add_course(draft).await?;
    Ok(HttpResponse::Created().json(CourseResponse::from(&course)))
}

/// Lecturer profiles assigned to a course.
#[utoipa::path(
    post,
    path = "/api-gateway/courses/assigned-lecturers",
    request_body = CourseBody,
    responses(
        (status = 200, description = "Assigned lecturers", body = [ProfileResponse]),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "assignedLecturers"
)]
#[post("/courses/assigned-lecturers")]
pub async fn assigned_lecturers(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CourseBody>,
) -> ApiResult<web::Json<Vec<ProfileResponse>>> {
    session.require_user()?;
    let raw = required_text(payload.into_inner().course_id, COURSE_ID)?;
    let code = parse_course_code(&raw, COURSE_ID)?;
    let lecturers = state.courses.assigned_lecturers(&code).await?;
    Ok(web::Json(profile_list(&lecturers)))
}

/// Fetch one course.
#[utoipa::path(
    get,
    path = "/api-gateway/courses/{course_id}",
    params(("course_id" = String, Path, description = "Course code")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "getCourse"
)]
#[get("/courses/{course_id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CourseResponse>> {
    session.require_user()?;
    let code = parse_course_code(&path.into_inner(), COURSE_ID)?;
    let course = state.courses.get_course(&code).await?;
    Ok(web::Json(CourseResponse::from(&course)))
}

/// Update a course (lecturers only).
#[utoipa::path(
    put,
    path = "/api-gateway/courses/{course_id}",
    params(("course_id" = String, Path, description = "Course code")),
    request_body = CourseUpdateBody,
    responses(
        (status = 200, description = "Updated course", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Lecturer role required", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{course_id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CourseUpdateBody>,
) -> ApiResult<web::Json<CourseResponse>> {
    session.require_lecturer()?;
    let code = parse_course_code(&path.into_inner(), COURSE_ID)?;
    let update = parse_course_update(payload.into_inner())?;
    let course = state.courses.update_course(&code, update).await?;
    Ok(web::Json(CourseResponse::from(&course)))
}

#[cfg(test)]
mod tests {
    //! Handler coverage for course routes.

    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::CourseCode;
    use crate::inbound::http::test_utils::{
        LECTURER_ID as FIXTURE_LECTURER, MockPorts, gateway_app, lecturer_profile, session_for,
        student_profile,
    };

    fn course() -> Course {
        Course::new(CourseDraft {
            code: CourseCode::new("CS101").expect("valid code"),
            title: "Programming".to_owned(),
            credits: 3,
            year: 1,
            semester: 1,
            lecturers: vec![lecturer_profile().user_id().clone()],
        })
        .expect("valid course")
    }

    #[actix_web::test]
    async fn all_courses_is_not_shadowed_by_course_lookup() {
        let mut ports = MockPorts::default();
        ports
            .courses
            .expect_all_courses()
            .return_once(|| Ok(vec![course()]));
        ports.courses.expect_get_course().times(0);
        let app = gateway_app(ports.into_state()).await;
        let cookie = session_for(&app, &student_profile()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api-gateway/courses/all")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        insta::assert_json_snapshot!(body, @r#"
        [
          {
            "course_code": "CS101",
            "credits": 3,
            "lecturers": [
              "3fa85f64-5717-4562-b3fc-2c963f66afa6"
            ],
            "semester": 1,
            "title": "Programming",
            "year": 1
          }
        ]
        "#);
    }

    #[actix_web::test]
    async fn students_cannot_add_courses() {
        let mut ports = MockPorts::default();
        ports.courses.expect_add_course().times(0);
        let app = gateway_app(ports.into_state()).await;
        let cookie = session_for(&app, &student_profile()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api-gateway/courses/add-new-course")
                .cookie(cookie)
                .set_json(json!({"course_id": "CS102", "title": "Data", "credits": 3, "year": 1, "semester": 2}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn lecturers_add_courses_with_parsed_lecturers() {
        let mut ports = MockPorts::default();
        ports
            .courses
            .expect_add_course()
            .withf(|draft| {
                draft.code.as_ref() == "CS101"
                    && draft.lecturers.len() == 1
                    && draft.lecturers[0].as_ref() == FIXTURE_LECTURER
            })
            .times(1)
            .return_once(|_| Ok(course()));
        let app = gateway_app(ports.into_state()).await;
        let cookie = session_for(&app, &lecturer_profile()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api-gateway/courses/add-new-course")
                .cookie(cookie)
                .set_json(json!({
                    "course_id": "cs101",
                    "title": "Programming",
                    "credits": 3,
                    "year": 1,
                    "semester": 1,
                    "lecturers": [FIXTURE_LECTURER]
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn assigned_accepts_legacy_reg_number_field() {
        let mut ports = MockPorts::default();
        ports
            .courses
            .expect_assigned_courses()
            .withf(|lecturer| lecturer.as_ref() == FIXTURE_LECTURER)
            .return_once(|_| Ok(vec![course()]));
        let app = gateway_app(ports.into_state()).await;
        let cookie = session_for(&app, &lecturer_profile()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api-gateway/courses/assigned")
                .cookie(cookie)
                .set_json(json!({"reg_number": FIXTURE_LECTURER}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn enroll_conflicts_surface_as_409() {
        let mut ports = MockPorts::default();
        ports
            .courses
            .expect_enroll()
            .return_once(|_, _| Err(Error::conflict("Student already enrolled in CS101")));
        let app = gateway_app(ports.into_state()).await;
        let cookie = session_for(&app, &student_profile()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api-gateway/courses/enroll")
                .cookie(cookie)
                .set_json(json!({"reg_number": "220001", "course_id": "CS101"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Student already enrolled in CS101");
    }
}
