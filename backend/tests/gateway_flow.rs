//! End-to-end gateway flows over in-memory adapters.
//!
//! Each test drives the real `/api-gateway` scope with session cookies, so
//! handler parsing, role checks, domain services and the in-memory stores are
//! exercised together.

use std::sync::Arc;

use actix_http::Request;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use campus_backend::Trace;
use campus_backend::domain::TRACE_ID_HEADER;
use campus_backend::inbound::http::configure_gateway;
use campus_backend::test_support::clock::{MutableClock, fixture_clock};
use campus_backend::test_support::harness::{MemoryStores, http_state_without_engine};
use chrono::TimeDelta;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

struct Gateway {
    stores: MemoryStores,
    clock: Arc<MutableClock>,
}

#[fixture]
fn gateway() -> Gateway {
    Gateway {
        stores: MemoryStores::default(),
        clock: fixture_clock(),
    }
}

async fn init_app(
    gateway: &Gateway,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    let state = http_state_without_engine(&gateway.stores, gateway.clock.clone());
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                    .cookie_name("session".to_owned())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(Trace)
            .configure(configure_gateway),
    )
    .await
}

async fn call_json<S>(app: &S, request: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = test::call_service(app, request).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

/// Sign up and sign in, returning the profile and the session cookie.
async fn register<S>(app: &S, email: &str, username: &str) -> (Value, Cookie<'static>)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let password = "correct horse";
    let sign_up = TestRequest::post()
        .uri("/api-gateway/user-profile/sign-up")
        .set_json(json!({"email": email, "password": password, "username": username}))
        .to_request();
    let (status, _) = call_json(app, sign_up).await;
    assert_eq!(status, StatusCode::CREATED, "sign-up {email}");

    let sign_in = TestRequest::post()
        .uri("/api-gateway/user-profile/sign-in")
        .set_json(json!({"email": email, "password": password}))
        .to_request();
    let response = test::call_service(app, sign_in).await;
    assert_eq!(response.status(), StatusCode::OK, "sign-in {email}");
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie");
    let profile: Value = test::read_body_json(response).await;
    (profile, cookie)
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing {key} in {value}"))
        .to_owned()
}

async fn seed_course<S>(app: &S, lecturer: &Value, cookie: &Cookie<'static>)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let request = TestRequest::post()
        .uri("/api-gateway/courses/add-new-course")
        .cookie(cookie.clone())
        .set_json(json!({
            "course_id": "CS4010",
            "title": "Computer Vision",
            "credits": 3,
            "year": 4,
            "semester": 1,
            "lecturers": [text(lecturer, "user_id")],
        }))
        .to_request();
    let (status, body) = call_json(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

#[rstest]
#[actix_web::test]
async fn sign_up_assigns_roles_from_email(gateway: Gateway) {
    let app = init_app(&gateway).await;

    let (lecturer, _) = register(&app, "perera@cs.lk", "Dr Perera").await;
    let (student, _) = register(&app, "nimal.22@cs.lk", "Nimal").await;

    assert_eq!(text(&lecturer, "role"), "lecturer");
    assert_eq!(text(&student, "role"), "student");
    assert_eq!(text(&student, "reg_number"), "220001");
    assert_eq!(text(&student, "department"), "Computer Science");
}

#[rstest]
#[actix_web::test]
async fn requests_without_session_are_unauthorised(gateway: Gateway) {
    let app = init_app(&gateway).await;

    let response = test::call_service(
        &app,
        TestRequest::get().uri("/api-gateway/courses/all").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));
}

#[rstest]
#[actix_web::test]
async fn enrolment_and_attendance_flow(gateway: Gateway) {
    let app = init_app(&gateway).await;
    let (lecturer, lecturer_cookie) = register(&app, "perera@cs.lk", "Dr Perera").await;
    let (student, student_cookie) = register(&app, "nimal.22@cs.lk", "Nimal").await;
    let reg_number = text(&student, "reg_number");
    seed_course(&app, &lecturer, &lecturer_cookie).await;

    let enroll = TestRequest::post()
        .uri("/api-gateway/courses/enroll")
        .cookie(student_cookie.clone())
        .set_json(json!({"reg_number": reg_number, "course_id": "CS4010"}))
        .to_request();
    let (status, _) = call_json(&app, enroll).await;
    assert_eq!(status, StatusCode::OK);

    let enrolled = TestRequest::post()
        .uri("/api-gateway/courses/enrolled")
        .cookie(student_cookie.clone())
        .set_json(json!({"reg_number": reg_number}))
        .to_request();
    let (_, courses) = call_json(&app, enrolled).await;
    assert_eq!(courses[0]["course_code"], "CS4010");

    let mark = || {
        TestRequest::post()
            .uri("/api-gateway/attendance/mark")
            .cookie(lecturer_cookie.clone())
            .set_json(json!({"reg_number": reg_number, "course_code": "CS4010"}))
            .to_request()
    };
    let (status, record) = call_json(&app, mark()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["status"], "PRESENT");

    let (status, _) = call_json(&app, mark()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let can_mark = TestRequest::get()
        .uri(&format!("/api-gateway/attendance/can-mark/{reg_number}"))
        .cookie(lecturer_cookie.clone())
        .to_request();
    let (_, eligibility) = call_json(&app, can_mark).await;
    assert_eq!(eligibility["can_mark"], false);
    assert_eq!(eligibility["minutes_remaining"], 120);

    gateway.clock.advance(TimeDelta::hours(2));
    let (status, _) = call_json(&app, mark()).await;
    assert_eq!(status, StatusCode::CREATED);

    let stats = TestRequest::get()
        .uri(&format!("/api-gateway/attendance/stats/{reg_number}?days=7"))
        .cookie(student_cookie.clone())
        .to_request();
    let (_, stats) = call_json(&app, stats).await;
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["present"], 2);
}

#[rstest]
#[actix_web::test]
async fn broadcast_reaches_enrolled_students_only(gateway: Gateway) {
    let app = init_app(&gateway).await;
    let (lecturer, lecturer_cookie) = register(&app, "perera@cs.lk", "Dr Perera").await;
    let (student, student_cookie) = register(&app, "nimal.22@cs.lk", "Nimal").await;
    let reg_number = text(&student, "reg_number");
    seed_course(&app, &lecturer, &lecturer_cookie).await;

    let enroll = TestRequest::post()
        .uri("/api-gateway/courses/enroll")
        .cookie(student_cookie.clone())
        .set_json(json!({"reg_number": reg_number, "course_id": "CS4010"}))
        .to_request();
    call_json(&app, enroll).await;

    let send = TestRequest::post()
        .uri("/api-gateway/notifications/send")
        .cookie(lecturer_cookie.clone())
        .set_json(json!({
            "title": "Lab moved",
            "message": "Lab 3 is now in Hall B",
            "priority": "high",
            "course_code": "CS4010",
        }))
        .to_request();
    let (status, body) = call_json(&app, send).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 1);

    let inbox = TestRequest::get()
        .uri(&format!(
            "/api-gateway/notifications/user/{}",
            text(&student, "user_id")
        ))
        .cookie(student_cookie.clone())
        .to_request();
    let (_, inbox) = call_json(&app, inbox).await;
    assert_eq!(inbox[0]["title"], "Lab moved");
    assert_eq!(inbox[0]["priority"], "high");

    let peek = TestRequest::get()
        .uri(&format!(
            "/api-gateway/notifications/user/{}",
            text(&student, "user_id")
        ))
        .cookie(lecturer_cookie.clone())
        .to_request();
    let (status, _) = call_json(&app, peek).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn overlapping_exams_for_a_group_clash(gateway: Gateway) {
    let app = init_app(&gateway).await;
    let (lecturer, lecturer_cookie) = register(&app, "perera@cs.lk", "Dr Perera").await;
    seed_course(&app, &lecturer, &lecturer_cookie).await;

    let schedule = |start: &str, end: &str| {
        TestRequest::post()
            .uri("/api-gateway/schedule/exams/schedule")
            .cookie(lecturer_cookie.clone())
            .set_json(json!({
                "course_code": "CS4010",
                "group_id": "CS-22",
                "exam_date": "2026-05-04",
                "start_time": start,
                "end_time": end,
                "venue": "Hall A",
            }))
            .to_request()
    };

    let (status, exam) = call_json(&app, schedule("09:00", "11:00")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(exam["start_time"], "09:00");

    let (status, error) = call_json(&app, schedule("10:00", "12:00")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        error["message"],
        "Exam clash detected! Group already has an exam at that time."
    );

    let (status, _) = call_json(&app, schedule("11:00", "13:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    let list = TestRequest::get()
        .uri("/api-gateway/schedule/exams")
        .cookie(lecturer_cookie.clone())
        .to_request();
    let (_, exams) = call_json(&app, list).await;
    assert_eq!(exams.as_array().map(Vec::len), Some(2));
}
