//! Port for campus profile persistence.

use std::ops::RangeInclusive;

use async_trait::async_trait;

use crate::domain::{Email, Profile, RegNumber, Role, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "profile repository query failed: {message}",
        /// A profile with the same email or registration number exists.
        Duplicate { message: String } =>
            "profile already exists: {message}",
    }
}

/// Port for reading and writing profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert a new profile.
    async fn create(&self, profile: &Profile) -> Result<(), ProfileRepositoryError>;

    /// Replace the mutable fields of an existing profile.
    async fn update(&self, profile: &Profile) -> Result<(), ProfileRepositoryError>;

    async fn find_by_id(&self, user_id: &UserId)
    -> Result<Option<Profile>, ProfileRepositoryError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Profile>, ProfileRepositoryError>;

    async fn find_by_reg_number(
        &self,
        reg_number: &RegNumber,
    ) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Resolve many students at once; unknown numbers are skipped.
    async fn find_by_reg_numbers(
        &self,
        reg_numbers: &[RegNumber],
    ) -> Result<Vec<Profile>, ProfileRepositoryError>;

    async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>, ProfileRepositoryError>;

    /// Highest registration number whose numeric value falls in `bounds`.
    async fn latest_reg_number_in(
        &self,
        bounds: RangeInclusive<u64>,
    ) -> Result<Option<RegNumber>, ProfileRepositoryError>;
}
