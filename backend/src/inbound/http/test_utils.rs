//! Test helpers for inbound HTTP components.

use actix_http::Request;
use actix_session::{Session, SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use std::sync::Arc;

use crate::domain::ports::{
    MockAttendanceTracking, MockCourseEnrollment, MockFrameProcessor, MockNotificationInbox,
    MockScheduleManagement, MockUserProfiles,
};
use crate::domain::{
    Affiliation, DisplayName, Email, Profile, ProfileIdentity, RegNumber, StudentDetails, UserId,
};
use crate::inbound::http::configure_gateway;
use crate::inbound::http::session::{ROLE_KEY, USER_ID_KEY};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

pub const LECTURER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
pub const STUDENT_ID: &str = "6b1f9e2c-1c1e-4a57-9d3c-2f6f8f7e4c21";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

fn affiliation() -> Affiliation {
    Affiliation {
        department: "Computer Science".to_owned(),
        faculty: "Faculty of Computing".to_owned(),
    }
}

pub fn lecturer_profile() -> Profile {
    Profile::lecturer(
        ProfileIdentity {
            user_id: UserId::new(LECTURER_ID).expect("fixture id"),
            email: Email::new("perera@cs.lk").expect("fixture email"),
            display_name: DisplayName::new("Dr Perera").expect("fixture name"),
            phone: None,
            affiliation: affiliation(),
        },
        "lecturer",
    )
}

pub fn student_profile() -> Profile {
    Profile::student(
        ProfileIdentity {
            user_id: UserId::new(STUDENT_ID).expect("fixture id"),
            email: Email::new("nimal.22@cs.lk").expect("fixture email"),
            display_name: DisplayName::new("Nimal").expect("fixture name"),
            phone: None,
            affiliation: affiliation(),
        },
        StudentDetails {
            reg_number: RegNumber::new("220001").expect("fixture reg"),
            year_of_study: 4,
            semester: 1,
        },
    )
}

/// Mocked driving ports; tests set expectations on the one under test.
#[derive(Default)]
pub struct MockPorts {
    pub profiles: MockUserProfiles,
    pub courses: MockCourseEnrollment,
    pub attendance: MockAttendanceTracking,
    pub recognition: MockFrameProcessor,
    pub notifications: MockNotificationInbox,
    pub schedule: MockScheduleManagement,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            profiles: Arc::new(self.profiles),
            courses: Arc::new(self.courses),
            attendance: Arc::new(self.attendance),
            recognition: Arc::new(self.recognition),
            notifications: Arc::new(self.notifications),
            schedule: Arc::new(self.schedule),
        })
    }
}

async fn seed_session(session: Session, path: web::Path<(String, String)>) -> HttpResponse {
    let (user_id, role) = path.into_inner();
    session.insert(USER_ID_KEY, user_id).expect("seed user id");
    session.insert(ROLE_KEY, role).expect("seed role");
    HttpResponse::Ok().finish()
}

/// Initialise the full gateway over `state`, plus a session seeding route.
pub async fn gateway_app(
    state: HttpState,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .configure(configure_gateway)
            .route("/__session/{user_id}/{role}", web::get().to(seed_session)),
    )
    .await
}

/// Obtain a session cookie carrying `profile`'s id and role.
pub async fn session_for<S>(app: &S, profile: &Profile) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let uri = format!(
        "/__session/{}/{}",
        profile.user_id(),
        profile.role().as_str()
    );
    let res = test::call_service(app, test::TestRequest::get().uri(&uri).to_request()).await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
