//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed campus entities (profiles, courses,
//! attendance, notifications, exams) and the services that enforce their
//! rules. Services depend only on the traits in [`ports`], so inbound
//! adapters and tests can swap infrastructure freely.
//!
//! Public surface:
//! - Error and ErrorCode: transport-agnostic failure payload.
//! - Value types: UserId, Email, RegNumber, CourseCode and friends.
//! - Services: one per bounded area, each implementing a driving port.

pub mod attendance;
pub mod auth;
pub mod course;
pub mod error;
pub mod notification;
pub mod ports;
pub mod recognition;
pub mod schedule;
pub mod sign_up;
pub mod trace_id;
pub mod user;

mod attendance_service;
mod course_service;
mod mark_gate;
mod notification_service;
mod profile_service;
mod recognition_service;
mod schedule_service;

pub use self::attendance::{
    AttendanceMethod, AttendanceRecord, AttendanceStats, AttendanceStatus, AttendanceWindow,
    DEFAULT_WINDOW_HOURS, MarkEligibility, UnknownAttendanceValue, start_of_day,
};
pub use self::attendance_service::AttendanceService;
pub use self::auth::{Credentials, CredentialsValidationError, MIN_PASSWORD_LEN};
pub use self::course::{Course, CourseCode, CourseDraft, CourseValidationError};
pub use self::course_service::CourseService;
pub use self::error::{Error, ErrorCode, REDACTED_MESSAGE};
pub use self::mark_gate::{MarkGate, MarkPass};
pub use self::notification::{
    Notification, NotificationContent, NotificationValidationError, Priority,
};
pub use self::notification_service::NotificationService;
pub use self::profile_service::ProfileService;
pub use self::recognition::{
    DEFAULT_MAX_FRAME_BYTES, DEFAULT_THRESHOLD, FaceDetection, FrameLimits, FrameReport,
    FrameValidationError, OutcomeStatus, RecognisedStudent, RecognitionFrame, Reconciliation,
    StudentOutcome, Threshold, decode_image, reconcile,
};
pub use self::recognition_service::RecognitionService;
pub use self::schedule::{
    Assignment, AssignmentDraft, Exam, ExamDraft, ScheduleValidationError,
};
pub use self::schedule_service::ScheduleService;
pub use self::sign_up::{
    DepartmentDirectory, EmailClass, SignUpRuleError, academic_standing, batch_bounds,
    classify_email, next_reg_number,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Affiliation, DisplayName, Email, PhoneNumber, Profile, ProfileIdentity, RegNumber, Role,
    StudentDetails, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use campus_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
