//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details name the
//! offending field, so the SPA can highlight it without parsing messages.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{CourseCode, Email, Error, RegNumber, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidTime,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidTime => "invalid_time",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: Option<&str>) -> Error {
    let mut details = json!({
        "field": field.as_str(),
        "code": code.as_str(),
    });
    if let Some(value) = value {
        details["value"] = json!(value);
    }
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
        None,
    )
}

/// Report a value the domain rejected, keeping the domain's message.
pub(crate) fn invalid_value_error(field: FieldName, value: &str, reason: impl ToString) -> Error {
    field_error(field, reason.to_string(), ErrorCode::InvalidValue, Some(value))
}

/// Report a rejected value without echoing it back (used for secrets).
pub(crate) fn invalid_field_error(field: FieldName, reason: impl ToString) -> Error {
    field_error(field, reason.to_string(), ErrorCode::InvalidValue, None)
}

/// Unwrap an optional payload field, treating blank strings as missing.
pub(crate) fn required_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            Some(value),
        )
    })
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    parse_uuid(value, field).map(UserId::from_uuid)
}

pub(crate) fn parse_user_ids(values: &[String], field: FieldName) -> Result<Vec<UserId>, Error> {
    values
        .iter()
        .map(|value| parse_user_id(value, field))
        .collect()
}

pub(crate) fn parse_reg_number(value: &str, field: FieldName) -> Result<RegNumber, Error> {
    RegNumber::new(value).map_err(|err| invalid_value_error(field, value, err))
}

pub(crate) fn parse_course_code(value: &str, field: FieldName) -> Result<CourseCode, Error> {
    CourseCode::new(value).map_err(|err| invalid_value_error(field, value, err))
}

pub(crate) fn parse_email(value: &str, field: FieldName) -> Result<Email, Error> {
    Email::new(value).map_err(|err| invalid_value_error(field, value, err))
}

/// Parse a wire enum through its `FromStr` implementation.
pub(crate) fn parse_enum<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: ToString,
{
    T::from_str(value).map_err(|err| invalid_value_error(field, value, err))
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a YYYY-MM-DD date"),
            ErrorCode::InvalidDate,
            Some(value),
        )
    })
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<NaiveTime, Error> {
    let raw = value.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| {
            let name = field.as_str();
            field_error(
                field,
                format!("{name} must be an HH:MM time"),
                ErrorCode::InvalidTime,
                Some(value),
            )
        })
}

/// Parse a due date given either as a date or as a local date-time.
pub(crate) fn parse_due_date(value: &str, field: FieldName) -> Result<NaiveDateTime, Error> {
    let raw = value.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|_| {
            let name = field.as_str();
            field_error(
                field,
                format!("{name} must be a YYYY-MM-DD date or date-time"),
                ErrorCode::InvalidDate,
                Some(value),
            )
        })
}
