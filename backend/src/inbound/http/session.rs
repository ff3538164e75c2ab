//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as persisting the signed-in user or
//! requiring the lecturer role.

use std::str::FromStr;

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Profile, Role, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Identity of the signed-in caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: UserId,
    pub role: Role,
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated profile's id and role in the session cookie.
    pub fn persist_profile(&self, profile: &Profile) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, profile.user_id().as_ref())
            .and_then(|()| self.0.insert(ROLE_KEY, profile.role().as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop every value from the session.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Fetch the current user from the session, if present and intact.
    pub fn user(&self) -> Result<Option<SessionUser>, Error> {
        let read = |key: &str| {
            self.0
                .get::<String>(key)
                .map_err(|error| Error::internal(format!("failed to read session: {error}")))
        };
        let (Some(raw_id), Some(raw_role)) = (read(USER_ID_KEY)?, read(ROLE_KEY)?) else {
            return Ok(None);
        };
        match (UserId::new(&raw_id), Role::from_str(&raw_role)) {
            (Ok(user_id), Ok(role)) => Ok(Some(SessionUser { user_id, role })),
            (id, role) => {
                tracing::warn!(
                    id_valid = id.is_ok(),
                    role_valid = role.is_ok(),
                    "invalid session cookie contents"
                );
                Ok(None)
            }
        }
    }

    /// Require an authenticated user or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<SessionUser, Error> {
        self.user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require a signed-in lecturer; students receive `403 Forbidden`.
    pub fn require_lecturer(&self) -> Result<SessionUser, Error> {
        let user = self.require_user()?;
        if user.role != Role::Lecturer {
            return Err(Error::forbidden("lecturer role required"));
        }
        Ok(user)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use actix_session::Session;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use super::*;
    use crate::inbound::http::test_utils::{lecturer_profile, test_session_middleware};

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    session.persist_profile(&lecturer_profile())?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/set-raw/{id}/{role}",
                web::get().to(
                    |session: Session, path: web::Path<(String, String)>| async move {
                        let (id, role) = path.into_inner();
                        session.insert(USER_ID_KEY, id).expect("set user id");
                        session.insert(ROLE_KEY, role).expect("set role");
                        HttpResponse::Ok()
                    },
                ),
            )
            .route(
                "/lecturer",
                web::get().to(|session: SessionContext| async move {
                    let user = session.require_lecturer()?;
                    Ok::<_, Error>(HttpResponse::Ok().body(user.user_id.to_string()))
                }),
            )
    }

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn round_trips_lecturer() {
        let app = test::init_service(session_test_app()).await;
        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/lecturer")
                .cookie(session_cookie(&set_res))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, lecturer_profile().user_id().to_string());
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/lecturer").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", "student", StatusCode::FORBIDDEN)]
    #[case("not-a-uuid", "lecturer", StatusCode::UNAUTHORIZED)]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", "dean", StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn lecturer_gate_rejects_other_sessions(
        #[case] id: &str,
        #[case] role: &str,
        #[case] expected: StatusCode,
    ) {
        let app = test::init_service(session_test_app()).await;
        let set_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/set-raw/{id}/{role}"))
                .to_request(),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/lecturer")
                .cookie(session_cookie(&set_res))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), expected);
    }
}
