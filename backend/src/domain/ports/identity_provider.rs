//! Port for the account store that owns passwords.
//!
//! Profiles live in the campus datastore; credentials live with the identity
//! provider. Both share the [`UserId`] the provider assigns at registration.

use async_trait::async_trait;

use crate::domain::{Credentials, DisplayName, Role, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The email is already registered.
        AlreadyRegistered { email: String } =>
            "account already registered: {email}",
        /// Email and password did not match an account.
        InvalidCredentials =>
            "invalid email or password",
        /// The provider could not be reached or timed out.
        Unavailable { message: String } =>
            "identity provider unavailable: {message}",
        /// The provider answered with an unexpected response.
        Rejected { message: String } =>
            "identity provider rejected the request: {message}",
    }
}

/// Account registration and password verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return its identifier.
    async fn register(
        &self,
        credentials: &Credentials,
        role: Role,
        display_name: &DisplayName,
    ) -> Result<UserId, IdentityProviderError>;

    /// Verify a password and return the account identifier.
    async fn verify(&self, credentials: &Credentials) -> Result<UserId, IdentityProviderError>;
}
