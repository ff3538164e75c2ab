//! Account and profile HTTP handlers.
//!
//! ```text
//! POST /api-gateway/user-profile/sign-up {"email":"nimal.22@cs.lk","password":"secret1","username":"Nimal"}
//! POST /api-gateway/user-profile/sign-in {"email":"nimal.22@cs.lk","password":"secret1"}
//! POST /api-gateway/user-profile/sign-out
//! GET  /api-gateway/user-profile/get-user/{email}
//! PUT  /api-gateway/user-profile/update-profile/{email}
//! GET  /api-gateway/lecturers
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ProfileUpdate, SignUpRequest};
use crate::domain::{
    Credentials, CredentialsValidationError, DisplayName, Error, PhoneNumber, Profile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, invalid_value_error, missing_field_error, parse_email,
    required_text,
};

const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const USERNAME: FieldName = FieldName::new("username");

/// Sign-up request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignUpBody {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Display name shown to other users.
    pub username: Option<String>,
}

/// Sign-in request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignInBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Contact fields a profile owner may change.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateProfileBody {
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

/// Profile as returned to the SPA.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    #[schema(example = "student")]
    pub role: String,
    pub department: String,
    pub faculty: String,
    pub reg_number: Option<String>,
    pub year_of_study: Option<i32>,
    pub semester: Option<u8>,
    pub designation: Option<String>,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        let student = profile.student_details();
        Self {
            user_id: profile.user_id().to_string(),
            email: profile.email().to_string(),
            display_name: profile.display_name().to_string(),
            phone: profile.phone().map(|phone| phone.as_ref().to_owned()),
            role: profile.role().as_str().to_owned(),
            department: profile.affiliation().department.clone(),
            faculty: profile.affiliation().faculty.clone(),
            reg_number: student.map(|details| details.reg_number.to_string()),
            year_of_study: student.map(|details| details.year_of_study),
            semester: student.map(|details| details.semester),
            designation: profile.designation().map(str::to_owned),
        }
    }
}

pub(crate) fn profile_list(profiles: &[Profile]) -> Vec<ProfileResponse> {
    profiles.iter().map(ProfileResponse::from).collect()
}

fn map_credentials_error(error: CredentialsValidationError) -> Error {
    let field = match error {
        CredentialsValidationError::InvalidEmail => EMAIL,
        CredentialsValidationError::EmptyPassword
        | CredentialsValidationError::PasswordTooShort { .. } => PASSWORD,
    };
    invalid_field_error(field, error)
}

fn parse_sign_up(body: SignUpBody) -> Result<SignUpRequest, Error> {
    let email = required_text(body.email, EMAIL)?;
    let password = body.password.ok_or_else(|| missing_field_error(PASSWORD))?;
    let username = required_text(body.username, USERNAME)?;
    let credentials =
        Credentials::for_sign_up(&email, &password).map_err(map_credentials_error)?;
    let display_name = DisplayName::new(username.clone())
        .map_err(|err| invalid_value_error(USERNAME, &username, err))?;
    Ok(SignUpRequest {
        credentials,
        display_name,
    })
}

fn parse_update(body: UpdateProfileBody) -> Result<ProfileUpdate, Error> {
    let display_name = body
        .display_name
        .map(|raw| {
            DisplayName::new(raw.clone())
                .map_err(|err| invalid_value_error(FieldName::new("display_name"), &raw, err))
        })
        .transpose()?;
    let phone = body
        .phone
        .map(|raw| {
            PhoneNumber::new(&raw)
                .map_err(|err| invalid_value_error(FieldName::new("phone"), &raw, err))
        })
        .transpose()?;
    Ok(ProfileUpdate {
        display_name,
        phone,
    })
}

/// Register an account and create its profile.
#[utoipa::path(
    post,
    path = "/api-gateway/user-profile/sign-up",
    request_body = SignUpBody,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["user-profile"],
    operation_id = "signUp",
    security([])
)]
#[post("/user-profile/sign-up")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignUpBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_sign_up(payload.into_inner())?;
    let profile = state.profiles.sign_up(request).await?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(&profile)))
}

/// Verify credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api-gateway/user-profile/sign-in",
    request_body = SignInBody,
    responses(
        (status = 200, description = "Signed in", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["user-profile"],
    operation_id = "signIn",
    security([])
)]
#[post("/user-profile/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInBody>,
) -> ApiResult<HttpResponse> {
    let SignInBody { email, password } = payload.into_inner();
    let email = required_text(email, EMAIL)?;
    let password = password.unwrap_or_default();
    let credentials =
        Credentials::try_from_parts(&email, &password).map_err(map_credentials_error)?;
    let profile = state.profiles.sign_in(&credentials).await?;
    session.persist_profile(&profile)?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(&profile)))
}

/// Clear the session cookie.
#[utoipa::path(
    post,
    path = "/api-gateway/user-profile/sign-out",
    responses((status = 204, description = "Signed out")),
    tags = ["user-profile"],
    operation_id = "signOut"
)]
#[post("/user-profile/sign-out")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Fetch a profile by email.
#[utoipa::path(
    get,
    path = "/api-gateway/user-profile/get-user/{email}",
    params(("email" = String, Path, description = "Institutional email address")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["user-profile"],
    operation_id = "getUser"
)]
#[get("/user-profile/get-user/{email}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileResponse>> {
    session.require_user()?;
    let email = parse_email(&path.into_inner(), EMAIL)?;
    let profile = state.profiles.get_user(&email).await?;
    Ok(web::Json(ProfileResponse::from(&profile)))
}

/// Update the caller's own display name or phone number.
#[utoipa::path(
    put,
    path = "/api-gateway/user-profile/update-profile/{email}",
    params(("email" = String, Path, description = "Institutional email address")),
    request_body = UpdateProfileBody,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the profile owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["user-profile"],
    operation_id = "updateProfile"
)]
#[put("/user-profile/update-profile/{email}")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateProfileBody>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user = session.require_user()?;
    let email = parse_email(&path.into_inner(), EMAIL)?;
    let update = parse_update(payload.into_inner())?;
    let profile = state
        .profiles
        .update_profile(&user.user_id, &email, update)
        .await?;
    Ok(web::Json(ProfileResponse::from(&profile)))
}

/// List lecturer profiles for course forms.
#[utoipa::path(
    get,
    path = "/api-gateway/lecturers",
    responses(
        (status = 200, description = "Lecturers", body = [ProfileResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["user-profile"],
    operation_id = "listLecturers"
)]
#[get("/lecturers")]
pub async fn list_lecturers(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ProfileResponse>>> {
    session.require_user()?;
    let lecturers = state.profiles.list_lecturers().await?;
    Ok(web::Json(profile_list(&lecturers)))
}

#[cfg(test)]
#[path = "user_profiles_tests.rs"]
mod tests;
