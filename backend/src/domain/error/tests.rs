//! Tests for domain error construction and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn unavailable_error() -> Error {
    Error::service_unavailable("venue store offline")
        .with_details(json!({"batch": "batch-001.jsonl", "appliedBeforeFailure": 2}))
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
#[should_panic(expected = "error messages must satisfy validation")]
fn new_panics_on_blank_message() {
    let _ = Error::new(ErrorCode::InternalError, "");
}

#[rstest]
fn display_uses_message(unavailable_error: Error) {
    assert_eq!(unavailable_error.to_string(), "venue store offline");
}

#[rstest]
fn serialises_with_snake_case_code_and_details(unavailable_error: Error) {
    let value = serde_json::to_value(&unavailable_error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "service_unavailable",
            "message": "venue store offline",
            "details": {"batch": "batch-001.jsonl", "appliedBeforeFailure": 2}
        })
    );
}

#[rstest]
fn omits_absent_details() {
    let value = serde_json::to_value(Error::conflict("taken")).expect("serialise error");
    assert!(value.get("details").is_none());
}

#[rstest]
fn deserialising_blank_message_fails() {
    let payload = json!({"code": "conflict", "message": "  "});
    let result = serde_json::from_value::<Error>(payload);
    assert!(result.is_err());
}

#[rstest]
fn deserialising_restores_details(unavailable_error: Error) {
    let value = serde_json::to_value(&unavailable_error).expect("serialise error");
    let restored: Error = serde_json::from_value(value).expect("deserialise error");
    assert_eq!(restored, unavailable_error);
}
