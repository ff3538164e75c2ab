//! Attendance records and the marking window policy.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CourseCode, RegNumber};

/// Parse failure for attendance enumerations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttendanceValue {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownAttendanceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} value: {}", self.field, self.value)
    }
}

impl std::error::Error for UnknownAttendanceValue {}

/// Outcome recorded for a student in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Absent => "ABSENT",
            Self::Late => "LATE",
            Self::Excused => "EXCUSED",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = UnknownAttendanceValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRESENT" => Ok(Self::Present),
            "ABSENT" => Ok(Self::Absent),
            "LATE" => Ok(Self::Late),
            "EXCUSED" => Ok(Self::Excused),
            _ => Err(UnknownAttendanceValue {
                field: "status",
                value: s.to_owned(),
            }),
        }
    }
}

/// How an attendance record was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMethod {
    Manual,
    FaceRecognition,
    Automatic,
}

impl AttendanceMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::FaceRecognition => "face_recognition",
            Self::Automatic => "automatic",
        }
    }
}

impl fmt::Display for AttendanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceMethod {
    type Err = UnknownAttendanceValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "face_recognition" => Ok(Self::FaceRecognition),
            "automatic" => Ok(Self::Automatic),
            _ => Err(UnknownAttendanceValue {
                field: "method",
                value: s.to_owned(),
            }),
        }
    }
}

/// A single attendance mark.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub reg_number: RegNumber,
    pub status: AttendanceStatus,
    pub method: AttendanceMethod,
    pub course_code: CourseCode,
    pub location: Option<String>,
    /// Recognition confidence in `[0, 1]`; only set for face recognition.
    pub confidence: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Minimum gap enforced between two marks of the same student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceWindow(TimeDelta);

/// Default marking window.
pub const DEFAULT_WINDOW_HOURS: u32 = 2;

impl AttendanceWindow {
    pub fn from_hours(hours: u32) -> Self {
        Self(TimeDelta::hours(i64::from(hours)))
    }

    pub fn duration(&self) -> TimeDelta {
        self.0
    }

    /// Decide whether a new mark is allowed given the latest mark today.
    ///
    /// # Examples
    /// ```
    /// use campus_backend::domain::{AttendanceWindow, MarkEligibility};
    /// use chrono::{TimeDelta, Utc};
    ///
    /// let now = Utc::now();
    /// let window = AttendanceWindow::from_hours(2);
    /// assert_eq!(window.evaluate(None, now), MarkEligibility::Allowed);
    /// let denied = window.evaluate(Some(now - TimeDelta::minutes(30)), now);
    /// assert!(matches!(denied, MarkEligibility::Denied { minutes_remaining: 90, .. }));
    /// ```
    pub fn evaluate(
        &self,
        latest_today: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> MarkEligibility {
        let Some(last_marked) = latest_today else {
            return MarkEligibility::Allowed;
        };
        let next_allowed = last_marked + self.0;
        if now >= next_allowed {
            return MarkEligibility::Allowed;
        }
        let remaining = next_allowed - now;
        MarkEligibility::Denied {
            last_marked,
            next_allowed,
            minutes_remaining: remaining.num_minutes().max(1),
        }
    }
}

impl Default for AttendanceWindow {
    fn default() -> Self {
        Self::from_hours(DEFAULT_WINDOW_HOURS)
    }
}

/// Result of the marking window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkEligibility {
    Allowed,
    Denied {
        last_marked: DateTime<Utc>,
        next_allowed: DateTime<Utc>,
        minutes_remaining: i64,
    },
}

impl MarkEligibility {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Start of the UTC day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Aggregated attendance over a period.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
    /// Percentage of present or late records, rounded to two decimals.
    pub attendance_rate: f64,
    pub by_date: BTreeMap<NaiveDate, Vec<AttendanceRecord>>,
}

impl AttendanceStats {
    /// Summarise records into counts, rate and per-day groups.
    pub fn from_records(records: Vec<AttendanceRecord>) -> Self {
        let mut stats = Self {
            total: records.len(),
            present: 0,
            absent: 0,
            late: 0,
            excused: 0,
            attendance_rate: 0.0,
            by_date: BTreeMap::new(),
        };
        for record in records {
            match record.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Absent => stats.absent += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::Excused => stats.excused += 1,
            }
            stats
                .by_date
                .entry(record.timestamp.date_naive())
                .or_default()
                .push(record);
        }
        if stats.total > 0 {
            let attended = (stats.present + stats.late) as f64;
            let rate = attended / stats.total as f64 * 100.0;
            stats.attendance_rate = (rate * 100.0).round() / 100.0;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the marking window and statistics.

    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn record(status: AttendanceStatus, timestamp: DateTime<Utc>) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            reg_number: RegNumber::new("220001").expect("valid reg"),
            status,
            method: AttendanceMethod::Manual,
            course_code: CourseCode::new("CS101").expect("valid code"),
            location: None,
            confidence: None,
            timestamp,
        }
    }

    #[rstest]
    fn allows_when_no_mark_today(now: DateTime<Utc>) {
        assert!(AttendanceWindow::default().evaluate(None, now).is_allowed());
    }

    #[rstest]
    fn allows_once_window_has_elapsed(now: DateTime<Utc>) {
        let window = AttendanceWindow::from_hours(2);
        let eligibility = window.evaluate(Some(now - TimeDelta::hours(2)), now);
        assert_eq!(eligibility, MarkEligibility::Allowed);
    }

    #[rstest]
    fn denies_inside_window_with_remaining_minutes(now: DateTime<Utc>) {
        let window = AttendanceWindow::from_hours(2);
        let last = now - TimeDelta::minutes(45);
        match window.evaluate(Some(last), now) {
            MarkEligibility::Denied {
                last_marked,
                next_allowed,
                minutes_remaining,
            } => {
                assert_eq!(last_marked, last);
                assert_eq!(next_allowed, last + TimeDelta::hours(2));
                assert_eq!(minutes_remaining, 75);
            }
            MarkEligibility::Allowed => panic!("mark inside the window must be denied"),
        }
    }

    #[rstest]
    fn remaining_minutes_never_reports_zero(now: DateTime<Utc>) {
        let window = AttendanceWindow::from_hours(2);
        let last = now - TimeDelta::hours(2) + TimeDelta::seconds(20);
        assert!(matches!(
            window.evaluate(Some(last), now),
            MarkEligibility::Denied {
                minutes_remaining: 1,
                ..
            }
        ));
    }

    #[rstest]
    fn start_of_day_truncates_to_midnight(now: DateTime<Utc>) {
        let midnight = Utc
            .with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(start_of_day(now), midnight);
    }

    #[rstest]
    fn stats_count_statuses_and_round_rate(now: DateTime<Utc>) {
        let yesterday = now - TimeDelta::days(1);
        let stats = AttendanceStats::from_records(vec![
            record(AttendanceStatus::Present, now),
            record(AttendanceStatus::Late, yesterday),
            record(AttendanceStatus::Absent, yesterday),
        ]);

        assert_eq!(stats.total, 3);
        assert_eq!((stats.present, stats.late, stats.absent), (1, 1, 1));
        assert!((stats.attendance_rate - 66.67).abs() < f64::EPSILON);
        assert_eq!(stats.by_date.len(), 2);
        assert_eq!(
            stats.by_date.get(&yesterday.date_naive()).map(Vec::len),
            Some(2)
        );
    }

    #[rstest]
    fn stats_rate_is_zero_without_records() {
        let stats = AttendanceStats::from_records(Vec::new());
        assert_eq!(stats.total, 0);
        assert!(stats.attendance_rate.abs() < f64::EPSILON);
    }

    #[rstest]
    #[case("present", AttendanceStatus::Present)]
    #[case("LATE", AttendanceStatus::Late)]
    fn status_parses_any_case(#[case] raw: &str, #[case] expected: AttendanceStatus) {
        assert_eq!(raw.parse::<AttendanceStatus>(), Ok(expected));
    }

    #[rstest]
    fn unknown_method_is_rejected() {
        let error = "webcam".parse::<AttendanceMethod>().expect_err("unknown method");
        assert_eq!(error.field, "method");
    }
}
