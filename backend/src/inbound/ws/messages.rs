//! Wire-level message definitions for the recognition socket.
//!
//! Field names are snake_case to match the camera client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ports::FrameRequest;
use crate::domain::{Error, FrameReport, OutcomeStatus, StudentOutcome};

/// One camera frame submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameMessage {
    #[serde(alias = "image")]
    pub image_base64: String,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
}

impl From<FrameMessage> for FrameRequest {
    fn from(value: FrameMessage) -> Self {
        Self {
            image_base64: value.image_base64,
            threshold: value.threshold,
            location: value.location.filter(|loc| !loc.trim().is_empty()),
            course_code: value.course_code,
        }
    }
}

/// Per-student entry in a frame reply.
#[derive(Debug, Serialize)]
pub struct StudentResult {
    pub reg_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: OutcomeStatus,
    pub message: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<StudentOutcome> for StudentResult {
    fn from(value: StudentOutcome) -> Self {
        Self {
            reg_number: value.reg_number.to_string(),
            name: value.name,
            status: value.status,
            message: value.message,
            confidence: value.confidence,
            timestamp: value.timestamp,
        }
    }
}

/// Reply sent for every processed frame, successful or not.
#[derive(Debug, Serialize)]
pub struct FrameReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub total_faces_detected: usize,
    pub recognized_count: usize,
    pub unknown_count: usize,
    pub attendance_results: Vec<StudentResult>,
}

impl From<FrameReport> for FrameReply {
    fn from(value: FrameReport) -> Self {
        Self {
            success: true,
            message: None,
            total_faces_detected: value.total_faces_detected,
            recognized_count: value.recognized_count,
            unknown_count: value.unknown_count,
            attendance_results: value
                .attendance_results
                .into_iter()
                .map(StudentResult::from)
                .collect(),
        }
    }
}

impl From<Error> for FrameReply {
    fn from(value: Error) -> Self {
        let message = value.redacted().message().to_owned();
        Self {
            success: false,
            message: Some(message),
            total_faces_detected: 0,
            recognized_count: 0,
            unknown_count: 0,
            attendance_results: Vec::new(),
        }
    }
}

impl FrameReply {
    pub fn from_result(result: Result<FrameReport, Error>) -> Self {
        match result {
            Ok(report) => report.into(),
            Err(error) => error.into(),
        }
    }
}
