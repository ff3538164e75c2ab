//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api-gateway` handler plus the health probes.
//! Domain types stay free of utoipa derives; the HTTP layer documents them
//! through DTOs and the [`ErrorSchema`]/[`ErrorCodeSchema`] wrappers.
//!
//! The generated document is served by Swagger UI in debug builds and
//! exported via `cargo run --bin openapi-dump` for the SPA's client tooling.

use crate::inbound::http::attendance::{
    AttendanceRecordResponse, EligibilityResponse, MarkAbsentBody, MarkBody, RegisterFaceBody,
    StatsResponse,
};
use crate::inbound::http::courses::{
    CourseBody, CourseResponse, CourseUpdateBody, EnrollmentBody, LecturerBody, NewCourseBody,
    StudentBody,
};
use crate::inbound::http::notifications::{NotificationResponse, SendBody};
use crate::inbound::http::schedule::{
    AssignmentBody, AssignmentResponse, ExamBody, ExamResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::user_profiles::{
    ProfileResponse, SignInBody, SignUpBody, UpdateProfileBody,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api-gateway/user-profile/sign-in.",
            ))),
        );
    }
}

/// OpenAPI document for the campus gateway.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus attendance gateway",
        description = "REST interface for profiles, courses, attendance, notifications and schedules."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::user_profiles::sign_up,
        crate::inbound::http::user_profiles::sign_in,
        crate::inbound::http::user_profiles::sign_out,
        crate::inbound::http::user_profiles::get_user,
        crate::inbound::http::user_profiles::update_profile,
        crate::inbound::http::user_profiles::list_lecturers,
        crate::inbound::http::courses::enrolled_courses,
        crate::inbound::http::courses::eligible_courses,
        crate::inbound::http::courses::assigned_courses,
        crate::inbound::http::courses::all_courses,
        crate::inbound::http::courses::enroll,
        crate::inbound::http::courses::unenroll,
        crate::inbound::http::courses::add_course,
        crate::inbound::http::courses::assigned_lecturers,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::attendance::mark,
        crate::inbound::http::attendance::can_mark,
        crate::inbound::http::attendance::stats,
        crate::inbound::http::attendance::mark_absent,
        crate::inbound::http::attendance::course_report,
        crate::inbound::http::attendance::register_face,
        crate::inbound::http::notifications::send,
        crate::inbound::http::notifications::for_user,
        crate::inbound::http::notifications::sent,
        crate::inbound::http::notifications::get_notification,
        crate::inbound::http::schedule::schedule_exam,
        crate::inbound::http::schedule::list_exams,
        crate::inbound::http::schedule::get_exam,
        crate::inbound::http::schedule::update_exam,
        crate::inbound::http::schedule::delete_exam,
        crate::inbound::http::schedule::create_assignment,
        crate::inbound::http::schedule::list_assignments,
        crate::inbound::http::schedule::get_assignment,
        crate::inbound::http::schedule::update_assignment,
        crate::inbound::http::schedule::delete_assignment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        SignUpBody,
        SignInBody,
        UpdateProfileBody,
        ProfileResponse,
        StudentBody,
        LecturerBody,
        CourseBody,
        EnrollmentBody,
        NewCourseBody,
        CourseUpdateBody,
        CourseResponse,
        MarkBody,
        MarkAbsentBody,
        RegisterFaceBody,
        AttendanceRecordResponse,
        EligibilityResponse,
        StatsResponse,
        SendBody,
        NotificationResponse,
        ExamBody,
        ExamResponse,
        AssignmentBody,
        AssignmentResponse,
    )),
    tags(
        (name = "user-profile", description = "Sign-up, sign-in and profile maintenance"),
        (name = "courses", description = "Course catalogue and enrolment"),
        (name = "attendance", description = "Manual marking, statistics and face registration"),
        (name = "notifications", description = "Course broadcasts and inboxes"),
        (name = "schedule", description = "Exams and assignments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api-gateway/courses/{course_id}")]
    #[case("/api-gateway/attendance/stats/{reg_number}")]
    #[case("/api-gateway/schedule/exams/schedule")]
    #[case("/api-gateway/notifications/sent/{faculty_id}")]
    #[case("/health/ready")]
    fn documents_gateway_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn course_path_documents_get_and_put() {
        let doc = ApiDoc::openapi();
        let item = doc
            .paths
            .paths
            .get("/api-gateway/courses/{course_id}")
            .expect("course path");
        assert!(item.get.is_some());
        assert!(item.put.is_some());
    }
}
