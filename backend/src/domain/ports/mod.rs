//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`IdentityProvider`],
//! [`FaceRecognitionEngine`]) are implemented by outbound adapters. Driving
//! ports ([`UserProfiles`], [`CourseEnrollment`], [`AttendanceTracking`],
//! [`FrameProcessor`], [`NotificationInbox`], [`ScheduleManagement`]) are
//! implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod attendance_repository;
mod attendance_tracking;
mod course_enrollment;
mod course_repository;
mod face_recognition_engine;
mod frame_processor;
mod identity_provider;
mod notification_inbox;
mod notification_repository;
mod profile_repository;
mod schedule_management;
mod schedule_repository;
mod user_profiles;

#[cfg(test)]
pub use attendance_repository::MockAttendanceRepository;
pub use attendance_repository::{AttendanceRepository, AttendanceRepositoryError};
#[cfg(test)]
pub use attendance_tracking::MockAttendanceTracking;
pub use attendance_tracking::{AttendanceTracking, DEFAULT_STATS_DAYS, ManualMark};
#[cfg(test)]
pub use course_enrollment::MockCourseEnrollment;
pub use course_enrollment::{CourseEnrollment, CourseUpdate};
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError};
#[cfg(test)]
pub use face_recognition_engine::MockFaceRecognitionEngine;
pub use face_recognition_engine::{
    FaceRecognitionEngine, FaceRecognitionEngineError, UnconfiguredRecognitionEngine,
};
#[cfg(test)]
pub use frame_processor::MockFrameProcessor;
pub use frame_processor::{FrameProcessor, FrameRequest};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use notification_inbox::MockNotificationInbox;
pub use notification_inbox::{BroadcastRequest, NotificationInbox};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use schedule_management::MockScheduleManagement;
pub use schedule_management::{AssignmentUpdate, ExamUpdate, ScheduleManagement};
#[cfg(test)]
pub use schedule_repository::MockScheduleRepository;
pub use schedule_repository::{ScheduleRepository, ScheduleRepositoryError};
#[cfg(test)]
pub use user_profiles::MockUserProfiles;
pub use user_profiles::{ProfileUpdate, SignUpRequest, UserProfiles};
