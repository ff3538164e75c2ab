//! Profile store keyed by user id.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{Email, Profile, RegNumber, Role, UserId};

#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<UserId, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(existing: &Profile, candidate: &Profile) -> bool {
    existing.email() == candidate.email()
        || existing
            .reg_number()
            .is_some_and(|reg| Some(reg) == candidate.reg_number())
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(profile.user_id())
            || profiles.values().any(|existing| clashes(existing, profile))
        {
            return Err(ProfileRepositoryError::duplicate(profile.email().as_ref()));
        }
        profiles.insert(profile.user_id().clone(), profile.clone());
        Ok(())
    }

    async fn update(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(profile.user_id()) {
            Some(slot) => {
                *slot = profile.clone();
                Ok(())
            }
            None => Err(ProfileRepositoryError::query(format!(
                "no profile for user {}",
                profile.user_id()
            ))),
        }
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Profile>, ProfileRepositoryError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.values().find(|p| p.email() == email).cloned())
    }

    async fn find_by_reg_number(
        &self,
        reg_number: &RegNumber,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .find(|p| p.reg_number() == Some(reg_number))
            .cloned())
    }

    async fn find_by_reg_numbers(
        &self,
        reg_numbers: &[RegNumber],
    ) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let profiles = self.profiles.read().await;
        Ok(reg_numbers
            .iter()
            .filter_map(|reg| profiles.values().find(|p| p.reg_number() == Some(reg)))
            .cloned()
            .collect())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let profiles = self.profiles.read().await;
        let mut matching: Vec<Profile> = profiles
            .values()
            .filter(|p| p.role() == role)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.display_name().as_ref().cmp(b.display_name().as_ref()));
        Ok(matching)
    }

    async fn latest_reg_number_in(
        &self,
        bounds: RangeInclusive<u64>,
    ) -> Result<Option<RegNumber>, ProfileRepositoryError> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .filter_map(Profile::reg_number)
            .filter(|reg| bounds.contains(&reg.value()))
            .max_by_key(|reg| reg.value())
            .cloned())
    }
}
