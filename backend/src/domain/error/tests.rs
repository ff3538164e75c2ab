//! Tests for domain error construction and trace propagation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("no"), ErrorCode::Forbidden)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::conflict("clash"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::conflict("already marked") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_with_camel_case_and_skips_empty_fields() {
    let error = Error::conflict("exam clash").with_details(json!({ "groupId": "G1" }));
    let value = serde_json::to_value(&error).expect("error serialises");

    assert_eq!(
        value,
        json!({
            "code": "conflict",
            "message": "exam clash",
            "details": { "groupId": "G1" }
        })
    );
}

#[rstest]
fn deserialises_snake_case_trace_id_alias(expected_trace_id: String) {
    let payload = json!({
        "code": "not_found",
        "message": "missing",
        "trace_id": expected_trace_id,
    });
    let error: Error = serde_json::from_value(payload).expect("error deserialises");
    assert_eq!(error.trace_id(), Some(TRACE_ID));
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
fn redacted_hides_internal_details_only(expected_trace_id: String) {
    let internal = Error::internal("pool exhausted: postgres://secret")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "dsn": "postgres://secret" }));
    let redacted = internal.redacted();
    assert_eq!(redacted.message(), REDACTED_MESSAGE);
    assert_eq!(redacted.trace_id(), Some(expected_trace_id.as_str()));
    assert!(redacted.details().is_none());

    let clash = Error::conflict("exam clash").with_details(json!({ "groupId": "G1" }));
    assert_eq!(clash.redacted(), clash);
}
