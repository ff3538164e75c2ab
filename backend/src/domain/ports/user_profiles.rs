//! Driving port for account and profile use-cases.
//!
//! Inbound adapters call this port to register, authenticate and maintain
//! profiles without knowing which identity provider or datastore backs them.

use async_trait::async_trait;

use crate::domain::{Credentials, DisplayName, Email, Error, PhoneNumber, Profile, UserId};

/// Sign-up input after payload validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub credentials: Credentials,
    pub display_name: DisplayName,
}

/// Contact fields a profile owner may change. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<DisplayName>,
    pub phone: Option<PhoneNumber>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfiles: Send + Sync {
    /// Register an account and create its profile.
    async fn sign_up(&self, request: SignUpRequest) -> Result<Profile, Error>;

    /// Verify credentials and return the matching profile.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Profile, Error>;

    async fn get_user(&self, email: &Email) -> Result<Profile, Error>;

    /// Load a profile by account id; used to resolve the session user.
    async fn get_by_id(&self, user_id: &UserId) -> Result<Profile, Error>;

    /// Update contact fields; only the owner (`actor`) may do so.
    async fn update_profile(
        &self,
        actor: &UserId,
        email: &Email,
        update: ProfileUpdate,
    ) -> Result<Profile, Error>;

    async fn list_lecturers(&self) -> Result<Vec<Profile>, Error>;
}
