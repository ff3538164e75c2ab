//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AttendanceTracking, CourseEnrollment, FrameProcessor, NotificationInbox, ScheduleManagement,
    UserProfiles,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub profiles: Arc<dyn UserProfiles>,
    pub courses: Arc<dyn CourseEnrollment>,
    pub attendance: Arc<dyn AttendanceTracking>,
    pub recognition: Arc<dyn FrameProcessor>,
    pub notifications: Arc<dyn NotificationInbox>,
    pub schedule: Arc<dyn ScheduleManagement>,
}

/// Dependency bundle for HTTP and WebSocket handlers.
#[derive(Clone)]
pub struct HttpState {
    pub profiles: Arc<dyn UserProfiles>,
    pub courses: Arc<dyn CourseEnrollment>,
    pub attendance: Arc<dyn AttendanceTracking>,
    pub recognition: Arc<dyn FrameProcessor>,
    pub notifications: Arc<dyn NotificationInbox>,
    pub schedule: Arc<dyn ScheduleManagement>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use campus_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// # fn ports() -> HttpStatePorts { unimplemented!() }
    ///
    /// let state = HttpState::new(ports());
    /// let _profiles = Arc::clone(&state.profiles);
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            profiles,
            courses,
            attendance,
            recognition,
            notifications,
            schedule,
        } = ports;
        Self {
            profiles,
            courses,
            attendance,
            recognition,
            notifications,
            schedule,
        }
    }
}
