//! In-memory repositories.
//!
//! Used when no database URL is configured and by tests that exercise whole
//! request flows. Each store guards its state with a `tokio::sync::RwLock`
//! and never fails with connection errors.

mod attendance;
mod courses;
mod notifications;
mod profiles;
mod schedule;

pub use attendance::InMemoryAttendanceRepository;
pub use courses::InMemoryCourseRepository;
pub use notifications::InMemoryNotificationRepository;
pub use profiles::InMemoryProfileRepository;
pub use schedule::InMemoryScheduleRepository;
