//! Real-time recognition service.
//!
//! Turns one camera frame into attendance marks: validate, ask the engine for
//! faces, reconcile against the threshold, then mark each recognised student
//! in ascending distance order. Per-student failures become `error` outcomes
//! so one bad record never drops the rest of the frame.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::attendance_service::{check_window, map_attendance_error};
use crate::domain::ports::{
    AttendanceRepository, FaceRecognitionEngine, FaceRecognitionEngineError, FrameProcessor,
    FrameRequest, ProfileRepository,
};
use crate::domain::profile_service::map_profile_error;
use crate::domain::{
    AttendanceMethod, AttendanceRecord, AttendanceStatus, AttendanceWindow, Error, FrameLimits,
    FrameReport, MarkEligibility, MarkGate, OutcomeStatus, RecognisedStudent, RecognitionFrame,
    StudentOutcome, reconcile,
};

pub(crate) fn map_engine_error(error: FaceRecognitionEngineError) -> Error {
    match error {
        FaceRecognitionEngineError::Timeout { message } => {
            Error::service_unavailable(format!("recognition engine timed out: {message}"))
        }
        FaceRecognitionEngineError::Unavailable { message } => {
            Error::service_unavailable(format!("recognition engine unavailable: {message}"))
        }
        FaceRecognitionEngineError::Rejected { message } => Error::invalid_request(message),
        FaceRecognitionEngineError::Decode { message } => {
            Error::internal(format!("recognition engine response invalid: {message}"))
        }
    }
}

/// Recognition service implementing [`FrameProcessor`].
pub struct RecognitionService<A, P, E: ?Sized> {
    attendance: Arc<A>,
    profiles: Arc<P>,
    engine: Arc<E>,
    clock: Arc<dyn Clock>,
    window: AttendanceWindow,
    limits: FrameLimits,
    gate: MarkGate,
}

impl<A, P, E: ?Sized> RecognitionService<A, P, E> {
    pub fn new(
        attendance: Arc<A>,
        profiles: Arc<P>,
        engine: Arc<E>,
        clock: Arc<dyn Clock>,
        window: AttendanceWindow,
        limits: FrameLimits,
    ) -> Self {
        Self {
            attendance,
            profiles,
            engine,
            clock,
            window,
            limits,
            gate: MarkGate::new(),
        }
    }

    /// Share the per-student mark gate with the attendance service.
    #[must_use]
    pub fn with_mark_gate(mut self, gate: MarkGate) -> Self {
        self.gate = gate;
        self
    }
}

impl<A, P, E> RecognitionService<A, P, E>
where
    A: AttendanceRepository,
    P: ProfileRepository,
    E: FaceRecognitionEngine + ?Sized,
{
    async fn mark_student(
        &self,
        frame: &RecognitionFrame,
        student: RecognisedStudent,
        now: DateTime<Utc>,
    ) -> StudentOutcome {
        let confidence = student.confidence();
        match self.try_mark(frame, &student, now).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(
                    reg_number = %student.reg_number,
                    error = %error,
                    "recognised student could not be marked"
                );
                StudentOutcome {
                    reg_number: student.reg_number,
                    name: None,
                    status: OutcomeStatus::Error,
                    message: error.message().to_owned(),
                    confidence,
                    timestamp: None,
                }
            }
        }
    }

    async fn try_mark(
        &self,
        frame: &RecognitionFrame,
        student: &RecognisedStudent,
        now: DateTime<Utc>,
    ) -> Result<StudentOutcome, Error> {
        let profile = self
            .profiles
            .find_by_reg_number(&student.reg_number)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found("Student not found"))?;
        let name = Some(profile.display_name().as_ref().to_owned());
        let confidence = student.confidence();

        let _pass = self.gate.enter(&student.reg_number).await;
        let eligibility = check_window(
            self.attendance.as_ref(),
            self.window,
            &student.reg_number,
            now,
        )
        .await?;
        if let MarkEligibility::Denied {
            last_marked,
            minutes_remaining,
            ..
        } = eligibility
        {
            return Ok(StudentOutcome {
                reg_number: student.reg_number.clone(),
                name,
                status: OutcomeStatus::AlreadyMarked,
                message: format!("Already marked. Next allowed in {minutes_remaining} minutes"),
                confidence,
                timestamp: Some(last_marked),
            });
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            reg_number: student.reg_number.clone(),
            status: AttendanceStatus::Present,
            method: AttendanceMethod::FaceRecognition,
            course_code: frame.course_code.clone(),
            location: frame.location.clone(),
            confidence: Some(confidence),
            timestamp: now,
        };
        self.attendance
            .insert(&record)
            .await
            .map_err(map_attendance_error)?;
        Ok(StudentOutcome {
            reg_number: record.reg_number,
            name,
            status: OutcomeStatus::Marked,
            message: "Attendance marked".to_owned(),
            confidence,
            timestamp: Some(now),
        })
    }
}

#[async_trait]
impl<A, P, E> FrameProcessor for RecognitionService<A, P, E>
where
    A: AttendanceRepository,
    P: ProfileRepository,
    E: FaceRecognitionEngine + ?Sized,
{
    async fn process_frame(&self, request: FrameRequest) -> Result<FrameReport, Error> {
        let FrameRequest {
            image_base64,
            threshold,
            location,
            course_code,
        } = request;
        let frame = RecognitionFrame::parse(
            &image_base64,
            threshold,
            location,
            course_code.as_deref(),
            self.limits,
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        let detections = self
            .engine
            .identify(&frame.image)
            .await
            .map_err(map_engine_error)?;
        let reconciliation = reconcile(&detections, frame.threshold);
        let now = self.clock.utc();

        let recognized_count = reconciliation.students.len();
        let mut attendance_results = Vec::with_capacity(recognized_count);
        for student in reconciliation.students {
            attendance_results.push(self.mark_student(&frame, student, now).await);
        }

        debug!(
            course_code = %frame.course_code,
            faces = reconciliation.total_faces,
            recognized = recognized_count,
            unknown = reconciliation.unknown_count,
            "frame processed"
        );
        Ok(FrameReport {
            total_faces_detected: reconciliation.total_faces,
            recognized_count,
            unknown_count: reconciliation.unknown_count,
            attendance_results,
        })
    }
}

#[cfg(test)]
#[path = "recognition_service_tests.rs"]
mod tests;
