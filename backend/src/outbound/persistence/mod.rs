//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository translates between Diesel rows and domain aggregates and
//! nothing more. Rows (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; callers only see the port implementations, the
//! pool and the migration runner.
//!
//! # Example
//!
//! ```ignore
//! use campus_backend::outbound::persistence::{
//!     DbPool, DieselProfileRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! run_pending_migrations("postgres://localhost/campus").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/campus")).await?;
//! let profiles = DieselProfileRepository::new(pool);
//! ```

mod diesel_attendance_repository;
mod diesel_basic_error_mapping;
mod diesel_course_repository;
mod diesel_notification_repository;
mod diesel_profile_repository;
mod diesel_schedule_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_attendance_repository::DieselAttendanceRepository;
pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_schedule_repository::DieselScheduleRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
