//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. Only
//! compiled for tests or with the `test-support` feature.

pub mod clock {
    //! Deterministic clocks.

    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use mockable::Clock;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        pub fn advance(&self, delta: TimeDelta) {
            *self.lock_clock() += delta;
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.lock_clock() = now;
        }

        fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }

    /// Monday 2 March 2026, 10:00 UTC: semester one, mid-morning.
    pub fn fixture_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    /// A shareable clock pinned to [`fixture_now`].
    pub fn fixture_clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(fixture_now()))
    }
}

pub mod logs {
    //! Capture formatted log lines emitted on the current thread.

    use std::io;
    use std::sync::{Arc, Mutex, PoisonError};

    use tracing::subscriber::DefaultGuard;
    use tracing_subscriber::fmt::MakeWriter;

    /// Shared buffer a `fmt` subscriber writes into.
    #[derive(Clone, Default)]
    pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        /// Everything written so far, lossily decoded.
        pub fn contents(&self) -> String {
            let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Route this thread's events into a buffer until the guard drops.
    ///
    /// Only events from the current thread are seen, so pair it with a
    /// current-thread runtime such as plain `#[tokio::test]`.
    pub fn capture() -> (CapturedLogs, DefaultGuard) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }
}

pub mod harness {
    //! In-memory wiring of every service, for handler and integration tests.

    use std::sync::Arc;

    use mockable::Clock;

    use crate::domain::ports::{FaceRecognitionEngine, UnconfiguredRecognitionEngine};
    use crate::domain::{
        AttendanceService, AttendanceWindow, CourseService, DepartmentDirectory, FrameLimits,
        MarkGate, NotificationService, ProfileService, RecognitionService, ScheduleService,
    };
    use crate::inbound::http::state::{HttpState, HttpStatePorts};
    use crate::outbound::identity::LocalIdentityProvider;
    use crate::outbound::memory::{
        InMemoryAttendanceRepository, InMemoryCourseRepository, InMemoryNotificationRepository,
        InMemoryProfileRepository, InMemoryScheduleRepository,
    };

    /// In-memory repositories, exposed so tests can seed or inspect them.
    #[derive(Clone, Default)]
    pub struct MemoryStores {
        pub profiles: Arc<InMemoryProfileRepository>,
        pub courses: Arc<InMemoryCourseRepository>,
        pub attendance: Arc<InMemoryAttendanceRepository>,
        pub notifications: Arc<InMemoryNotificationRepository>,
        pub schedule: Arc<InMemoryScheduleRepository>,
        pub identity: Arc<LocalIdentityProvider>,
    }

    /// Build HTTP state over in-memory stores and the given engine.
    pub fn http_state(
        stores: &MemoryStores,
        engine: Arc<dyn FaceRecognitionEngine>,
        clock: Arc<dyn Clock>,
    ) -> HttpState {
        let window = AttendanceWindow::default();
        let limits = FrameLimits::default();
        let gate = MarkGate::new();
        HttpState::new(HttpStatePorts {
            profiles: Arc::new(ProfileService::new(
                stores.profiles.clone(),
                stores.identity.clone(),
                Arc::new(DepartmentDirectory::default()),
                clock.clone(),
            )),
            courses: Arc::new(CourseService::new(
                stores.courses.clone(),
                stores.profiles.clone(),
            )),
            attendance: Arc::new(AttendanceService::new(
                stores.attendance.clone(),
                stores.profiles.clone(),
                stores.courses.clone(),
                engine.clone(),
                clock.clone(),
                window,
                limits,
            )
            .with_mark_gate(gate.clone())),
            recognition: Arc::new(RecognitionService::new(
                stores.attendance.clone(),
                stores.profiles.clone(),
                engine,
                clock.clone(),
                window,
                limits,
            )
            .with_mark_gate(gate)),
            notifications: Arc::new(NotificationService::new(
                stores.notifications.clone(),
                stores.profiles.clone(),
                stores.courses.clone(),
                clock,
            )),
            schedule: Arc::new(ScheduleService::new(
                stores.schedule.clone(),
                stores.profiles.clone(),
                stores.courses.clone(),
            )),
        })
    }

    /// HTTP state with no recognition engine configured.
    pub fn http_state_without_engine(stores: &MemoryStores, clock: Arc<dyn Clock>) -> HttpState {
        http_state(stores, Arc::new(UnconfiguredRecognitionEngine), clock)
    }
}
