//! Handler coverage for attendance routes.

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{NaiveDate, TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::{AttendanceMethod, CourseCode, RegNumber};
use crate::inbound::http::test_utils::{
    MockPorts, gateway_app, lecturer_profile, session_for, student_profile,
};

fn record(status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        id: Uuid::nil(),
        reg_number: RegNumber::new("220001").expect("valid reg"),
        status,
        method: AttendanceMethod::Manual,
        course_code: CourseCode::new("CS101").expect("valid code"),
        location: Some("Hall A".to_owned()),
        confidence: None,
        timestamp: Utc
            .with_ymd_and_hms(2026, 5, 4, 9, 30, 0)
            .single()
            .expect("valid timestamp"),
    }
}

#[actix_web::test]
async fn mark_defaults_status_to_present() {
    let mut ports = MockPorts::default();
    ports
        .attendance
        .expect_mark()
        .withf(|manual| manual.status == AttendanceStatus::Present && manual.location.is_none())
        .times(1)
        .return_once(|_| Ok(record(AttendanceStatus::Present)));
    let app = gateway_app(ports.into_state()).await;
    let cookie = session_for(&app, &lecturer_profile()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api-gateway/attendance/mark")
            .cookie(cookie)
            .set_json(json!({"reg_number": "220001", "course_code": "CS101", "location": " "}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    insta::assert_json_snapshot!(body, @r#"
    {
      "confidence": null,
      "course_code": "CS101",
      "id": "00000000-0000-0000-0000-000000000000",
      "location": "Hall A",
      "method": "manual",
      "reg_number": "220001",
      "status": "PRESENT",
      "timestamp": "2026-05-04T09:30:00Z"
    }
    "#);
}

#[rstest]
#[case(json!({"course_code": "CS101"}), "missing_field")]
#[case(json!({"reg_number": "220001", "course_code": "CS101", "status": "sleeping"}), "invalid_value")]
#[actix_web::test]
async fn mark_rejects_invalid_payloads(#[case] payload: Value, #[case] code: &str) {
    let mut ports = MockPorts::default();
    ports.attendance.expect_mark().times(0);
    let app = gateway_app(ports.into_state()).await;
    let cookie = session_for(&app, &lecturer_profile()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api-gateway/attendance/mark")
            .cookie(cookie)
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn window_conflicts_keep_their_details() {
    let mut ports = MockPorts::default();
    ports.attendance.expect_mark().return_once(|_| {
        Err(Error::conflict("Attendance already marked").with_details(json!({
            "minutes_remaining": 42,
        })))
    });
    let app = gateway_app(ports.into_state()).await;
    let cookie = session_for(&app, &lecturer_profile()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api-gateway/attendance/mark")
            .cookie(cookie)
            .set_json(json!({"reg_number": "220001", "course_code": "CS101", "status": "late"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["minutes_remaining"], 42);
}

#[actix_web::test]
async fn can_mark_reports_remaining_minutes() {
    let last_marked = Utc
        .with_ymd_and_hms(2026, 5, 4, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    let mut ports = MockPorts::default();
    ports.attendance.expect_can_mark().return_once(move |_| {
        Ok(MarkEligibility::Denied {
            last_marked,
            next_allowed: last_marked + chrono::TimeDelta::hours(2),
            minutes_remaining: 75,
        })
    });
    let app = gateway_app(ports.into_state()).await;
    let cookie = session_for(&app, &student_profile()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api-gateway/attendance/can-mark/220001")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: EligibilityResponse = test::read_body_json(res).await;
    assert!(!body.can_mark);
    assert_eq!(body.minutes_remaining, Some(75));
    assert_eq!(body.message, "Already marked. Next allowed in 75 minutes");
}

#[rstest]
#[case(None, 200, Some(DEFAULT_STATS_DAYS))]
#[case(Some(7), 200, Some(7))]
#[case(Some(0), 400, None)]
#[actix_web::test]
async fn stats_validates_look_back(
    #[case] days: Option<u32>,
    #[case] status: u16,
    #[case] expected_days: Option<u32>,
) {
    let mut ports = MockPorts::default();
    ports
        .attendance
        .expect_stats()
        .withf(move |_, days| Some(*days) == expected_days)
        .times(usize::from(expected_days.is_some()))
        .returning(|_, _| {
            Ok(AttendanceStats::from_records(vec![
                record(AttendanceStatus::Present),
                record(AttendanceStatus::Absent),
            ]))
        });
    let app = gateway_app(ports.into_state()).await;
    let cookie = session_for(&app, &student_profile()).await;
    let uri = match days {
        Some(days) => format!("/api-gateway/attendance/stats/220001?days={days}"),
        None => "/api-gateway/attendance/stats/220001".to_owned(),
    };

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(&uri).cookie(cookie).to_request(),
    )
    .await;

    assert_eq!(res.status().as_u16(), status);
    if status == 200 {
        let body: StatsResponse = test::read_body_json(res).await;
        assert_eq!(body.total, 2);
        assert_eq!(body.attendance_rate, 50.0);
        assert_eq!(body.records_by_date["2026-05-04"].len(), 2);
    }
}

#[actix_web::test]
async fn report_requires_a_date() {
    let mut ports = MockPorts::default();
    ports.attendance.expect_course_report().times(0);
    let app = gateway_app(ports.into_state()).await;
    let cookie = session_for(&app, &lecturer_profile()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api-gateway/attendance/report/CS101")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn mark_absent_passes_explicit_date() {
    let mut ports = MockPorts::default();
    ports
        .attendance
        .expect_mark_absent()
        .withf(|code, date| {
            code.as_ref() == "CS101" && *date == NaiveDate::from_ymd_opt(2026, 5, 4)
        })
        .return_once(|_, _| Ok(3));
    let app = gateway_app(ports.into_state()).await;
    let cookie = session_for(&app, &lecturer_profile()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api-gateway/attendance/mark-absent")
            .cookie(cookie)
            .set_json(json!({"course_code": "CS101", "date": "2026-05-04"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["count"], 3);
}
