//! Attendance marking and reporting service.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::course_service::{map_course_error, require_course, require_student};
use crate::domain::ports::{
    AttendanceRepository, AttendanceRepositoryError, AttendanceTracking, CourseRepository,
    FaceRecognitionEngine, ManualMark, ProfileRepository,
};
use crate::domain::recognition_service::map_engine_error;
use crate::domain::{
    AttendanceMethod, AttendanceRecord, AttendanceStats, AttendanceStatus, AttendanceWindow,
    CourseCode, Error, FrameLimits, MarkEligibility, MarkGate, RegNumber, decode_image,
    start_of_day,
};

pub(crate) fn map_attendance_error(error: AttendanceRepositoryError) -> Error {
    match error {
        AttendanceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("attendance repository unavailable: {message}"))
        }
        AttendanceRepositoryError::Query { message } => {
            Error::internal(format!("attendance repository error: {message}"))
        }
    }
}

/// Evaluate the marking window from the student's latest record today.
pub(crate) async fn check_window<A>(
    attendance: &A,
    window: AttendanceWindow,
    reg_number: &RegNumber,
    now: DateTime<Utc>,
) -> Result<MarkEligibility, Error>
where
    A: AttendanceRepository + ?Sized,
{
    let latest = attendance
        .latest_since(reg_number, start_of_day(now))
        .await
        .map_err(map_attendance_error)?;
    Ok(window.evaluate(latest.map(|record| record.timestamp), now))
}

/// Conflict raised when a mark falls inside the window.
pub(crate) fn window_conflict(eligibility: MarkEligibility) -> Option<Error> {
    let MarkEligibility::Denied {
        last_marked,
        next_allowed,
        minutes_remaining,
    } = eligibility
    else {
        return None;
    };
    Some(
        Error::conflict(format!(
            "Attendance already marked. Please wait {minutes_remaining} minutes"
        ))
        .with_details(serde_json::json!({
            "last_marked": last_marked.to_rfc3339(),
            "next_allowed": next_allowed.to_rfc3339(),
            "minutes_remaining": minutes_remaining,
        })),
    )
}

fn day_range(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = date.and_time(NaiveTime::MIN).and_utc();
    (from, from + TimeDelta::days(1))
}

/// Attendance service implementing [`AttendanceTracking`].
pub struct AttendanceService<A, P, C, E: ?Sized> {
    attendance: Arc<A>,
    profiles: Arc<P>,
    courses: Arc<C>,
    engine: Arc<E>,
    clock: Arc<dyn Clock>,
    window: AttendanceWindow,
    limits: FrameLimits,
    gate: MarkGate,
}

impl<A, P, C, E: ?Sized> AttendanceService<A, P, C, E> {
    pub fn new(
        attendance: Arc<A>,
        profiles: Arc<P>,
        courses: Arc<C>,
        engine: Arc<E>,
        clock: Arc<dyn Clock>,
        window: AttendanceWindow,
        limits: FrameLimits,
    ) -> Self {
        Self {
            attendance,
            profiles,
            courses,
            engine,
            clock,
            window,
            limits,
            gate: MarkGate::new(),
        }
    }

    /// Share the per-student mark gate with the recognition service.
    #[must_use]
    pub fn with_mark_gate(mut self, gate: MarkGate) -> Self {
        self.gate = gate;
        self
    }
}

#[async_trait]
impl<A, P, C, E> AttendanceTracking for AttendanceService<A, P, C, E>
where
    A: AttendanceRepository,
    P: ProfileRepository,
    C: CourseRepository,
    E: FaceRecognitionEngine + ?Sized,
{
    async fn can_mark(&self, reg_number: &RegNumber) -> Result<MarkEligibility, Error> {
        check_window(
            self.attendance.as_ref(),
            self.window,
            reg_number,
            self.clock.utc(),
        )
        .await
    }

    async fn mark(&self, request: ManualMark) -> Result<AttendanceRecord, Error> {
        let ManualMark {
            reg_number,
            course_code,
            status,
            location,
        } = request;
        require_student(self.profiles.as_ref(), &reg_number).await?;
        require_course(self.courses.as_ref(), &course_code).await?;

        let _pass = self.gate.enter(&reg_number).await;
        let now = self.clock.utc();
        let eligibility =
            check_window(self.attendance.as_ref(), self.window, &reg_number, now).await?;
        if let Some(conflict) = window_conflict(eligibility) {
            return Err(conflict);
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            reg_number,
            status,
            method: AttendanceMethod::Manual,
            course_code,
            location,
            confidence: None,
            timestamp: now,
        };
        self.attendance
            .insert(&record)
            .await
            .map_err(map_attendance_error)?;
        info!(
            reg_number = %record.reg_number,
            course_code = %record.course_code,
            status = %record.status,
            "attendance marked"
        );
        Ok(record)
    }

    async fn stats(&self, reg_number: &RegNumber, days: u32) -> Result<AttendanceStats, Error> {
        let today = start_of_day(self.clock.utc());
        let from = today - TimeDelta::days(i64::from(days));
        let to = today + TimeDelta::days(1);
        let records = self
            .attendance
            .list_for_student(reg_number, from, to)
            .await
            .map_err(map_attendance_error)?;
        Ok(AttendanceStats::from_records(records))
    }

    async fn mark_absent(
        &self,
        course_code: &CourseCode,
        date: Option<NaiveDate>,
    ) -> Result<usize, Error> {
        require_course(self.courses.as_ref(), course_code).await?;
        let now = self.clock.utc();
        let date = date.unwrap_or_else(|| now.date_naive());

        let enrolled = self
            .courses
            .enrolled_students(course_code)
            .await
            .map_err(map_course_error)?;
        if enrolled.is_empty() {
            return Err(Error::invalid_request("No students enrolled in this course"));
        }

        let (from, to) = day_range(date);
        let recorded: HashSet<RegNumber> = self
            .attendance
            .list_for_course(course_code, from, to)
            .await
            .map_err(map_attendance_error)?
            .into_iter()
            .map(|record| record.reg_number)
            .collect();

        let timestamp = if date == now.date_naive() { now } else { from };
        let absent: Vec<AttendanceRecord> = enrolled
            .into_iter()
            .filter(|reg_number| !recorded.contains(reg_number))
            .map(|reg_number| AttendanceRecord {
                id: Uuid::new_v4(),
                reg_number,
                status: AttendanceStatus::Absent,
                method: AttendanceMethod::Automatic,
                course_code: course_code.clone(),
                location: None,
                confidence: None,
                timestamp,
            })
            .collect();
        if absent.is_empty() {
            debug!(course_code = %course_code, %date, "no students to mark absent");
            return Ok(0);
        }
        self.attendance
            .insert_many(&absent)
            .await
            .map_err(map_attendance_error)?;
        info!(course_code = %course_code, %date, count = absent.len(), "students marked absent");
        Ok(absent.len())
    }

    async fn course_report(
        &self,
        course_code: &CourseCode,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, Error> {
        require_course(self.courses.as_ref(), course_code).await?;
        let (from, to) = day_range(date);
        self.attendance
            .list_for_course(course_code, from, to)
            .await
            .map_err(map_attendance_error)
    }

    async fn register_face(
        &self,
        reg_number: &RegNumber,
        image_base64: &str,
    ) -> Result<(), Error> {
        require_student(self.profiles.as_ref(), reg_number).await?;
        let image = decode_image(image_base64, self.limits.max_frame_bytes)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.engine
            .enroll(reg_number, &image)
            .await
            .map_err(map_engine_error)?;
        info!(reg_number = %reg_number, "face registered");
        Ok(())
    }
}

#[cfg(test)]
#[path = "attendance_service_tests.rs"]
mod tests;
