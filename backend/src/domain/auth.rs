//! Credentials exchanged with the identity provider.
//!
//! Handlers build [`Credentials`] from raw payload strings so services never
//! see unvalidated emails or blank passwords.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::Email;

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    InvalidEmail,
    EmptyPassword,
    PasswordTooShort { min: usize },
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is invalid"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated email and password pair.
///
/// ## Invariants
/// - `email` is a syntactically valid address.
/// - `password` is non-empty and keeps caller whitespace; it is wiped on drop.
///
/// # Examples
/// ```
/// use campus_backend::domain::Credentials;
///
/// let creds = Credentials::try_from_parts(" nimal.22@cs.lk ", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "nimal.22@cs.lk");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: Email,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials for signing in.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(|_| CredentialsValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Construct credentials for a new account, enforcing the length rule.
    pub fn for_sign_up(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let credentials = Self::try_from_parts(email, password)?;
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CredentialsValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(credentials)
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialsValidationError::InvalidEmail)]
    #[case("not-an-email", "pw", CredentialsValidationError::InvalidEmail)]
    #[case("kamal@ee.lk", "", CredentialsValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = Credentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn sign_up_requires_minimum_length() {
        assert_eq!(
            Credentials::for_sign_up("kamal@ee.lk", "short"),
            Err(CredentialsValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN
            })
        );
        assert!(Credentials::for_sign_up("kamal@ee.lk", " padded ").is_ok());
    }
}
