//! Notification HTTP handlers.
//!
//! ```text
//! POST /api-gateway/notifications/send
//! GET  /api-gateway/notifications/user/{user_id}
//! GET  /api-gateway/notifications/sent/{faculty_id}
//! GET  /api-gateway/notifications/{notification_id}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::BroadcastRequest;
use crate::domain::{Error, Notification, NotificationContent, NotificationValidationError, Priority};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_course_code, parse_enum, parse_user_id, parse_uuid,
    required_text,
};

const TITLE: FieldName = FieldName::new("title");
const MESSAGE: FieldName = FieldName::new("message");
const PRIORITY: FieldName = FieldName::new("priority");
const COURSE_CODE: FieldName = FieldName::new("course_code");
const USER_ID: FieldName = FieldName::new("user_id");
const FACULTY_ID: FieldName = FieldName::new("faculty_id");
const NOTIFICATION_ID: FieldName = FieldName::new("notification_id");

/// Broadcast to every student enrolled in a course.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendBody {
    pub title: Option<String>,
    pub message: Option<String>,
    /// `low`, `medium` or `high`; defaults to `low`.
    pub priority: Option<String>,
    pub course_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub recipient_id: String,
    pub sender_id: String,
    pub title: String,
    pub message: String,
    pub course_code: String,
    #[schema(example = "low")]
    pub priority: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationResponse {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            recipient_id: notification.recipient_id.to_string(),
            sender_id: notification.sender_id.to_string(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            course_code: notification.course_code.to_string(),
            priority: notification.priority.as_str().to_owned(),
            created_at: notification.created_at,
        }
    }
}

fn notification_list(notifications: &[Notification]) -> Vec<NotificationResponse> {
    notifications
        .iter()
        .map(NotificationResponse::from)
        .collect()
}

fn map_content_error(error: NotificationValidationError) -> Error {
    match error {
        NotificationValidationError::EmptyTitle => invalid_field_error(TITLE, error),
        NotificationValidationError::EmptyMessage => invalid_field_error(MESSAGE, error),
        NotificationValidationError::UnknownPriority { .. } => {
            invalid_field_error(PRIORITY, error)
        }
    }
}

fn parse_send(body: SendBody) -> Result<(NotificationContent, String), Error> {
    let title = required_text(body.title, TITLE)?;
    let message = required_text(body.message, MESSAGE)?;
    let course_code = required_text(body.course_code, COURSE_CODE)?;
    let priority = match body.priority.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => parse_enum::<Priority>(&raw, PRIORITY)?,
        None => Priority::Low,
    };
    let content = NotificationContent::new(title, message, priority).map_err(map_content_error)?;
    Ok((content, course_code))
}

/// Broadcast a notification to a course (lecturers only).
#[utoipa::path(
    post,
    path = "/api-gateway/notifications/send",
    request_body = SendBody,
    responses(
        (status = 201, description = "Notifications sent"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Lecturer role required", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "sendNotification"
)]
#[post("/notifications/send")]
pub async fn send(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SendBody>,
) -> ApiResult<HttpResponse> {
    let sender = session.require_lecturer()?;
    let (content, raw_code) = parse_send(payload.into_inner())?;
    let course_code = parse_course_code(&raw_code, COURSE_CODE)?;
    let count = state
        .notifications
        .broadcast(BroadcastRequest {
            content,
            course_code,
            sender_id: sender.user_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "message": format!("Notification sent to {count} students"),
        "count": count,
    })))
}

/// Notifications received by a user, newest first.
#[utoipa::path(
    get,
    path = "/api-gateway/notifications/user/{user_id}",
    params(("user_id" = String, Path, description = "Recipient user id")),
    responses(
        (status = 200, description = "Received notifications", body = [NotificationResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the recipient", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "userNotifications"
)]
#[get("/notifications/user/{user_id}")]
pub async fn for_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<NotificationResponse>>> {
    let viewer = session.require_user()?;
    let recipient = parse_user_id(&path.into_inner(), USER_ID)?;
    let notifications = state
        .notifications
        .list_for_recipient(&viewer.user_id, &recipient)
        .await?;
    Ok(web::Json(notification_list(&notifications)))
}

/// Notifications a lecturer sent, newest first.
#[utoipa::path(
    get,
    path = "/api-gateway/notifications/sent/{faculty_id}",
    params(("faculty_id" = String, Path, description = "Sender user id")),
    responses(
        (status = 200, description = "Sent notifications", body = [NotificationResponse]),
        (status = 403, description = "Not the sender", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "sentNotifications"
)]
#[get("/notifications/sent/{faculty_id}")]
pub async fn sent(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<NotificationResponse>>> {
    let viewer = session.require_user()?;
    let sender = parse_user_id(&path.into_inner(), FACULTY_ID)?;
    let notifications = state
        .notifications
        .list_sent(&viewer.user_id, &sender)
        .await?;
    Ok(web::Json(notification_list(&notifications)))
}

/// Fetch one notification visible to the caller.
#[utoipa::path(
    get,
    path = "/api-gateway/notifications/{notification_id}",
    params(("notification_id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification", body = NotificationResponse),
        (status = 403, description = "Not visible to the caller", body = ErrorSchema),
        (status = 404, description = "Notification not found", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "getNotification"
)]
#[get("/notifications/{notification_id}")]
pub async fn get_notification(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<NotificationResponse>> {
    let viewer = session.require_user()?;
    let id = parse_uuid(&path.into_inner(), NOTIFICATION_ID)?;
    let notification = state.notifications.get(&viewer.user_id, &id).await?;
    Ok(web::Json(NotificationResponse::from(&notification)))
}

#[cfg(test)]
mod tests {
    //! Handler coverage for notification routes.

    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::{CourseCode, UserId};
    use crate::inbound::http::test_utils::{
        LECTURER_ID, MockPorts, STUDENT_ID, gateway_app, lecturer_profile, session_for,
        student_profile,
    };

    fn notification() -> Notification {
        Notification {
            id: Uuid::nil(),
            recipient_id: UserId::new(STUDENT_ID).expect("fixture id"),
            sender_id: UserId::new(LECTURER_ID).expect("fixture id"),
            title: "Quiz".to_owned(),
            message: "Bring a pencil".to_owned(),
            course_code: CourseCode::new("CS101").expect("valid code"),
            priority: Priority::High,
            created_at: Utc
                .with_ymd_and_hms(2026, 5, 4, 8, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[actix_web::test]
    async fn send_uses_session_lecturer_as_sender() {
        let mut ports = MockPorts::default();
        ports
            .notifications
            .expect_broadcast()
            .withf(|request| {
                request.sender_id.as_ref() == LECTURER_ID
                    && request.content.priority() == Priority::Low
                    && request.course_code.as_ref() == "CS101"
            })
            .times(1)
            .return_once(|_| Ok(2));
        let app = gateway_app(ports.into_state()).await;
        let cookie = session_for(&app, &lecturer_profile()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api-gateway/notifications/send")
                .cookie(cookie)
                .set_json(json!({"title": "Quiz", "message": "Bring a pencil", "course_code": "CS101"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["count"], 2);
    }

    #[rstest]
    #[case(json!({"message": "m", "course_code": "CS101"}), "title")]
    #[case(json!({"title": "t", "message": "  ", "course_code": "CS101"}), "message")]
    #[case(json!({"title": "t", "message": "m", "course_code": "CS101", "priority": "urgent"}), "priority")]
    #[actix_web::test]
    async fn send_rejects_incomplete_payloads(#[case] payload: Value, #[case] field: &str) {
        let mut ports = MockPorts::default();
        ports.notifications.expect_broadcast().times(0);
        let app = gateway_app(ports.into_state()).await;
        let cookie = session_for(&app, &lecturer_profile()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api-gateway/notifications/send")
                .cookie(cookie)
                .set_json(payload)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn inbox_passes_viewer_and_recipient() {
        let mut ports = MockPorts::default();
        ports
            .notifications
            .expect_list_for_recipient()
            .withf(|viewer, recipient| {
                viewer.as_ref() == STUDENT_ID && recipient.as_ref() == STUDENT_ID
            })
            .return_once(|_, _| Ok(vec![notification()]));
        let app = gateway_app(ports.into_state()).await;
        let cookie = session_for(&app, &student_profile()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api-gateway/notifications/user/{STUDENT_ID}"))
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
            "created_at": "2026-05-04T08:00:00Z",
            "id": "00000000-0000-0000-0000-000000000000",
            "message": "Bring a pencil",
            "priority": "high",
            "recipient_id": "6b1f9e2c-1c1e-4a57-9d3c-2f6f8f7e4c21",
            "sender_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "title": "Quiz"
          }
        ]
        "#);
    }

    #[actix_web::test]
    async fn get_rejects_non_uuid_ids() {
        let mut ports = MockPorts::default();
        ports.notifications.expect_get().times(0);
        let app = gateway_app(ports.into_state()).await;
        let cookie = session_for(&app, &student_profile()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api-gateway/notifications/not-a-uuid")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "invalid_uuid");
    }
}
