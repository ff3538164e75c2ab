//! GoTrue-compatible hosted identity provider.
//!
//! Sign-up posts to `/auth/v1/signup` with the role and display name as user
//! metadata; sign-in uses the password grant at
//! `/auth/v1/token?grant_type=password`. Both answer with the account id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Credentials, DisplayName, Role, UserId};

/// Identity provider backed by a hosted GoTrue service.
pub struct GoTrueIdentityProvider {
    client: Client,
    signup_url: Url,
    token_url: Url,
    api_key: Zeroizing<String>,
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Serialize)]
struct SignUpMetadata<'a> {
    role: &'a str,
    display_name: &'a str,
}

#[derive(Serialize)]
struct PasswordGrantBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: String,
}

/// Sign-up answers with the user, either bare or wrapped in a session.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccountResponseDto {
    Session { user: UserDto },
    User(UserDto),
}

impl AccountResponseDto {
    fn into_user_id(self) -> Result<UserId, IdentityProviderError> {
        let (Self::Session { user } | Self::User(user)) = self;
        UserId::new(&user.id)
            .map_err(|err| IdentityProviderError::rejected(format!("invalid user id: {err}")))
    }
}

impl GoTrueIdentityProvider {
    /// Build a client for the provider at `base` authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint URLs are invalid or the client
    /// cannot be constructed.
    pub fn new(
        base: &Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| IdentityProviderError::unavailable(err.to_string()))?;
        let join = |path: &str| {
            base.join(path).map_err(|err| {
                IdentityProviderError::unavailable(format!("invalid identity url: {err}"))
            })
        };
        Ok(Self {
            client,
            signup_url: join("/auth/v1/signup")?,
            token_url: join("/auth/v1/token?grant_type=password")?,
            api_key: Zeroizing::new(api_key.into()),
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<(StatusCode, Vec<u8>), IdentityProviderError> {
        let response = self
            .client
            .post(url.clone())
            .header("apikey", self.api_key.as_str())
            .bearer_auth(self.api_key.as_str())
            .json(body)
            .send()
            .await
            .map_err(|err| IdentityProviderError::unavailable(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| IdentityProviderError::unavailable(err.to_string()))?;
        Ok((status, bytes.to_vec()))
    }
}

fn parse_account(body: &[u8]) -> Result<UserId, IdentityProviderError> {
    serde_json::from_slice::<AccountResponseDto>(body)
        .map_err(|err| IdentityProviderError::rejected(format!("unexpected response: {err}")))?
        .into_user_id()
}

fn status_message(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), trimmed.chars().take(160).collect::<String>())
    }
}

fn looks_registered(body: &[u8]) -> bool {
    let text = String::from_utf8_lossy(body).to_lowercase();
    text.contains("already registered") || text.contains("user_already_exists")
}

#[async_trait]
impl IdentityProvider for GoTrueIdentityProvider {
    async fn register(
        &self,
        credentials: &Credentials,
        role: Role,
        display_name: &DisplayName,
    ) -> Result<UserId, IdentityProviderError> {
        let body = SignUpBody {
            email: credentials.email().as_ref(),
            password: credentials.password(),
            data: SignUpMetadata {
                role: role.as_str(),
                display_name: display_name.as_ref(),
            },
        };
        let (status, bytes) = self.post(&self.signup_url, &body).await?;
        if status.is_success() {
            return parse_account(&bytes);
        }
        if status == StatusCode::CONFLICT
            || (status == StatusCode::UNPROCESSABLE_ENTITY && looks_registered(&bytes))
        {
            return Err(IdentityProviderError::already_registered(
                credentials.email().as_ref(),
            ));
        }
        Err(map_failure(status, &bytes))
    }

    async fn verify(&self, credentials: &Credentials) -> Result<UserId, IdentityProviderError> {
        let body = PasswordGrantBody {
            email: credentials.email().as_ref(),
            password: credentials.password(),
        };
        let (status, bytes) = self.post(&self.token_url, &body).await?;
        if status.is_success() {
            return parse_account(&bytes);
        }
        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            return Err(IdentityProviderError::invalid_credentials());
        }
        Err(map_failure(status, &bytes))
    }
}

fn map_failure(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let message = status_message(status, body);
    if status.is_server_error() {
        IdentityProviderError::unavailable(message)
    } else {
        IdentityProviderError::rejected(message)
    }
}
