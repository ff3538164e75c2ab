//! Builders wiring repositories and external adapters into handler state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use campus_backend::domain::ports::{
    AttendanceRepository, CourseRepository, FaceRecognitionEngine, IdentityProvider,
    NotificationRepository, ProfileRepository, ScheduleRepository,
};
use campus_backend::domain::{
    AttendanceService, AttendanceWindow, CourseService, DepartmentDirectory, FrameLimits,
    MarkGate, NotificationService, ProfileService, RecognitionService, ScheduleService,
};
use campus_backend::inbound::http::state::{HttpState, HttpStatePorts};
use campus_backend::inbound::ws::state::{OriginAllowList, WsState};
use campus_backend::outbound::memory::{
    InMemoryAttendanceRepository, InMemoryCourseRepository, InMemoryNotificationRepository,
    InMemoryProfileRepository, InMemoryScheduleRepository,
};
use campus_backend::outbound::persistence::{
    DbPool, DieselAttendanceRepository, DieselCourseRepository, DieselNotificationRepository,
    DieselProfileRepository, DieselScheduleRepository,
};

use super::ServerConfig;

/// One repository per aggregate, all backed by the same store.
struct Repositories<P, C, A, N, S> {
    profiles: Arc<P>,
    courses: Arc<C>,
    attendance: Arc<A>,
    notifications: Arc<N>,
    schedule: Arc<S>,
}

impl
    Repositories<
        DieselProfileRepository,
        DieselCourseRepository,
        DieselAttendanceRepository,
        DieselNotificationRepository,
        DieselScheduleRepository,
    >
{
    fn diesel(pool: &DbPool) -> Self {
        Self {
            profiles: Arc::new(DieselProfileRepository::new(pool.clone())),
            courses: Arc::new(DieselCourseRepository::new(pool.clone())),
            attendance: Arc::new(DieselAttendanceRepository::new(pool.clone())),
            notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
            schedule: Arc::new(DieselScheduleRepository::new(pool.clone())),
        }
    }
}

impl
    Repositories<
        InMemoryProfileRepository,
        InMemoryCourseRepository,
        InMemoryAttendanceRepository,
        InMemoryNotificationRepository,
        InMemoryScheduleRepository,
    >
{
    fn in_memory() -> Self {
        Self {
            profiles: Arc::new(InMemoryProfileRepository::new()),
            courses: Arc::new(InMemoryCourseRepository::new()),
            attendance: Arc::new(InMemoryAttendanceRepository::new()),
            notifications: Arc::new(InMemoryNotificationRepository::new()),
            schedule: Arc::new(InMemoryScheduleRepository::new()),
        }
    }
}

/// Adapters shared by every service regardless of the backing store.
struct Collaborators {
    identity: Arc<dyn IdentityProvider>,
    engine: Arc<dyn FaceRecognitionEngine>,
    clock: Arc<dyn Clock>,
    window: AttendanceWindow,
    limits: FrameLimits,
}

fn wire_services<P, C, A, N, S>(
    repos: Repositories<P, C, A, N, S>,
    collaborators: Collaborators,
) -> HttpStatePorts
where
    P: ProfileRepository + 'static,
    C: CourseRepository + 'static,
    A: AttendanceRepository + 'static,
    N: NotificationRepository + 'static,
    S: ScheduleRepository + 'static,
{
    let Repositories {
        profiles,
        courses,
        attendance,
        notifications,
        schedule,
    } = repos;
    let Collaborators {
        identity,
        engine,
        clock,
        window,
        limits,
    } = collaborators;
    let gate = MarkGate::new();

    HttpStatePorts {
        profiles: Arc::new(ProfileService::new(
            profiles.clone(),
            identity,
            Arc::new(DepartmentDirectory::default()),
            clock.clone(),
        )),
        courses: Arc::new(CourseService::new(courses.clone(), profiles.clone())),
        attendance: Arc::new(AttendanceService::new(
            attendance.clone(),
            profiles.clone(),
            courses.clone(),
            engine.clone(),
            clock.clone(),
            window,
            limits,
        )
        .with_mark_gate(gate.clone())),
        recognition: Arc::new(RecognitionService::new(
            attendance,
            profiles.clone(),
            engine,
            clock.clone(),
            window,
            limits,
        )
        .with_mark_gate(gate)),
        notifications: Arc::new(NotificationService::new(
            notifications,
            profiles.clone(),
            courses.clone(),
            clock,
        )),
        schedule: Arc::new(ScheduleService::new(schedule, profiles, courses)),
    }
}

/// Build HTTP state, choosing Diesel repositories when a pool is configured.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let collaborators = Collaborators {
        identity: config.identity.clone(),
        engine: config.engine.clone(),
        clock: Arc::new(DefaultClock),
        window: config.window,
        limits: config.limits,
    };
    let ports = match &config.db_pool {
        Some(pool) => wire_services(Repositories::diesel(pool), collaborators),
        None => wire_services(Repositories::in_memory(), collaborators),
    };
    web::Data::new(HttpState::new(ports))
}

/// Build WebSocket state sharing the recognition service with HTTP handlers.
pub(super) fn build_ws_state(config: &ServerConfig, http_state: &HttpState) -> web::Data<WsState> {
    let origins = OriginAllowList::new(config.allowed_origins.iter());
    web::Data::new(
        WsState::new(http_state.recognition.clone(), origins)
            .with_frame_limit(config.limits.max_frame_bytes),
    )
}
