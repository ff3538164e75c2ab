//! Process-local account store.
//!
//! Passwords are stored as `hex(sha256(salt || password))` with a random
//! 16-byte salt per account. Intermediate buffers holding the password are
//! wiped on drop.

use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use zeroize::Zeroizing;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Credentials, DisplayName, Role, UserId};

const SALT_LEN: usize = 16;

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    salt: [u8; SALT_LEN],
    digest: String,
}

#[derive(Debug, Default)]
pub struct LocalIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn account_key(credentials: &Credentials) -> String {
    credentials.email().as_ref().to_lowercase()
}

fn digest(salt: &[u8; SALT_LEN], password: &str) -> String {
    let mut input = Zeroizing::new(Vec::with_capacity(SALT_LEN + password.len()));
    input.extend_from_slice(salt);
    input.extend_from_slice(password.as_bytes());
    hex::encode(Sha256::digest(input.as_slice()))
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn register(
        &self,
        credentials: &Credentials,
        _role: Role,
        _display_name: &DisplayName,
    ) -> Result<UserId, IdentityProviderError> {
        let key = account_key(credentials);
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(IdentityProviderError::already_registered(key));
        }
        let salt: [u8; SALT_LEN] = rand::random();
        let account = Account {
            user_id: UserId::random(),
            salt,
            digest: digest(&salt, credentials.password()),
        };
        let user_id = account.user_id.clone();
        accounts.insert(key, account);
        Ok(user_id)
    }

    async fn verify(&self, credentials: &Credentials) -> Result<UserId, IdentityProviderError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&account_key(credentials))
            .ok_or_else(IdentityProviderError::invalid_credentials)?;
        if digest(&account.salt, credentials.password()) != account.digest {
            return Err(IdentityProviderError::invalid_credentials());
        }
        Ok(account.user_id.clone())
    }
}
