//! Account and profile service.
//!
//! Implements the [`UserProfiles`] driving port over a profile repository and
//! an identity provider. Sign-up derives role, department and (for students)
//! registration number and academic standing from the email address.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, ProfileRepository, ProfileRepositoryError,
    ProfileUpdate, SignUpRequest, UserProfiles,
};
use crate::domain::{
    Credentials, DepartmentDirectory, Email, EmailClass, Error, Profile, ProfileIdentity, Role,
    SignUpRuleError, StudentDetails, UserId, academic_standing, batch_bounds, classify_email,
    next_reg_number,
};

/// Designation given to lecturers at sign-up.
pub const DEFAULT_DESIGNATION: &str = "lecturer";

pub(crate) fn map_profile_error(error: ProfileRepositoryError) -> Error {
    match error {
        ProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("profile repository unavailable: {message}"))
        }
        ProfileRepositoryError::Query { message } => {
            Error::internal(format!("profile repository error: {message}"))
        }
        ProfileRepositoryError::Duplicate { .. } => Error::conflict("User already exists"),
    }
}

fn map_identity_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::AlreadyRegistered { .. } => {
            Error::conflict("Email already registered")
        }
        IdentityProviderError::InvalidCredentials => {
            Error::unauthorized("Invalid email or password")
        }
        IdentityProviderError::Unavailable { message } => {
            Error::service_unavailable(format!("identity provider unavailable: {message}"))
        }
        IdentityProviderError::Rejected { message } => Error::invalid_request(message),
    }
}

fn map_rule_error(error: SignUpRuleError) -> Error {
    match error {
        SignUpRuleError::RegNumberExhausted { .. } => Error::conflict(error.to_string()),
        SignUpRuleError::UnrecognisedEmail | SignUpRuleError::UnknownDepartment { .. } => {
            Error::invalid_request(error.to_string())
        }
    }
}

/// Profile service implementing [`UserProfiles`].
pub struct ProfileService<P, I: ?Sized> {
    profiles: Arc<P>,
    identity: Arc<I>,
    departments: Arc<DepartmentDirectory>,
    clock: Arc<dyn Clock>,
}

impl<P, I: ?Sized> ProfileService<P, I> {
    pub fn new(
        profiles: Arc<P>,
        identity: Arc<I>,
        departments: Arc<DepartmentDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            profiles,
            identity,
            departments,
            clock,
        }
    }
}

impl<P, I> ProfileService<P, I>
where
    P: ProfileRepository,
    I: IdentityProvider + ?Sized,
{
    async fn require_by_email(&self, email: &Email) -> Result<Profile, Error> {
        self.profiles
            .find_by_email(email)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    async fn student_details(&self, batch: u8) -> Result<StudentDetails, Error> {
        let latest = self
            .profiles
            .latest_reg_number_in(batch_bounds(batch))
            .await
            .map_err(map_profile_error)?;
        let reg_number = next_reg_number(batch, latest.as_ref()).map_err(map_rule_error)?;
        let (year_of_study, semester) = academic_standing(batch, self.clock.utc());
        Ok(StudentDetails {
            reg_number,
            year_of_study,
            semester,
        })
    }
}

#[async_trait]
impl<P, I> UserProfiles for ProfileService<P, I>
where
    P: ProfileRepository,
    I: IdentityProvider + ?Sized,
{
    async fn sign_up(&self, request: SignUpRequest) -> Result<Profile, Error> {
        let SignUpRequest {
            credentials,
            display_name,
        } = request;
        let class = classify_email(credentials.email()).map_err(map_rule_error)?;
        let affiliation = self
            .departments
            .resolve(class.department_code())
            .map_err(map_rule_error)?
            .clone();

        let existing = self
            .profiles
            .find_by_email(credentials.email())
            .await
            .map_err(map_profile_error)?;
        if existing.is_some() {
            return Err(Error::conflict("Email already registered"));
        }

        let details = match class {
            EmailClass::Student { batch, .. } => Some(self.student_details(batch).await?),
            EmailClass::Lecturer { .. } => None,
        };

        let user_id = self
            .identity
            .register(&credentials, class.role(), &display_name)
            .await
            .map_err(map_identity_error)?;

        let identity = ProfileIdentity {
            user_id,
            email: credentials.email().clone(),
            display_name,
            phone: None,
            affiliation,
        };
        let profile = match details {
            Some(details) => Profile::student(identity, details),
            None => Profile::lecturer(identity, DEFAULT_DESIGNATION),
        };
        if let Err(error) = self.profiles.create(&profile).await {
            // The identity account already exists and is not rolled back.
            warn!(
                user_id = %profile.user_id(),
                error = %error,
                "profile creation failed after identity registration; account orphaned"
            );
            return Err(map_profile_error(error));
        }

        info!(
            user_id = %profile.user_id(),
            role = %profile.role(),
            reg_number = ?profile.reg_number(),
            "profile created"
        );
        Ok(profile)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Profile, Error> {
        let user_id = self
            .identity
            .verify(credentials)
            .await
            .map_err(map_identity_error)?;
        self.profiles
            .find_by_id(&user_id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found("profile not found for account"))
    }

    async fn get_user(&self, email: &Email) -> Result<Profile, Error> {
        self.require_by_email(email).await
    }

    async fn get_by_id(&self, user_id: &UserId) -> Result<Profile, Error> {
        self.profiles
            .find_by_id(user_id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    async fn update_profile(
        &self,
        actor: &UserId,
        email: &Email,
        update: ProfileUpdate,
    ) -> Result<Profile, Error> {
        let profile = self.require_by_email(email).await?;
        if profile.user_id() != actor {
            return Err(Error::forbidden("You can only update your own profile"));
        }
        let updated = profile.with_contact(update.display_name, update.phone);
        self.profiles
            .update(&updated)
            .await
            .map_err(map_profile_error)?;
        Ok(updated)
    }

    async fn list_lecturers(&self) -> Result<Vec<Profile>, Error> {
        self.profiles
            .list_by_role(Role::Lecturer)
            .await
            .map_err(map_profile_error)
    }
}

#[cfg(test)]
#[path = "profile_service_tests.rs"]
mod tests;
