//! Session cookie settings derived from [`AppSettings`].
//!
//! Debug builds tolerate a missing key file and loose cookie toggles with a
//! warning; release builds reject them so a misconfigured deployment fails at
//! startup instead of issuing forgeable cookies.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use zeroize::Zeroize;

use super::AppSettings;

const SESSION_KEY_MIN_LEN: usize = 64;
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require a real key and consistent cookie flags.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("invalid session_same_site '{value}'; expected {expected}")]
    InvalidSameSite {
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("session_same_site=None requires cookie_secure=true")]
    InsecureSameSiteNone,
    #[error("session_allow_ephemeral must be false in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from application settings and build mode.
///
/// # Errors
/// Returns [`SessionConfigError`] when release-mode invariants are violated
/// or the key file cannot be used.
pub fn session_settings(
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    if settings.session_allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let cookie_secure = settings.cookie_secure();
    let same_site = same_site(settings.session_same_site.as_deref(), mode, cookie_secure)?;
    let key = session_key(
        settings.session_key_path(),
        mode,
        settings.session_allow_ephemeral,
    )?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn same_site(
    value: Option<&str>,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = value else {
        return Ok(if mode.is_debug() {
            SameSite::Lax
        } else {
            SameSite::Strict
        });
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("session_same_site=None without a secure cookie; browsers may reject it");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ => Err(SessionConfigError::InvalidSameSite {
            value: value.to_owned(),
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn session_key(
    path: PathBuf,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for session configuration validation.

    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[derive(Debug)]
    struct TempKeyFile {
        path: PathBuf,
    }

    impl TempKeyFile {
        fn new(len: usize) -> std::io::Result<Self> {
            let path = std::env::temp_dir().join(format!("session-key-{}", Uuid::new_v4()));
            std::fs::write(&path, vec![b'a'; len])?;
            Ok(Self { path })
        }
    }

    impl Drop for TempKeyFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    fn settings_with_key(path: PathBuf) -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: None,
            recognition_url: None,
            recognition_timeout_ms: None,
            identity_url: None,
            identity_api_key: None,
            session_key_file: Some(path),
            cookie_secure: None,
            session_same_site: Some("Strict".to_owned()),
            session_allow_ephemeral: false,
            attendance_window_hours: None,
            default_threshold: None,
            max_frame_bytes: None,
            allowed_origins: Vec::new(),
        }
    }

    fn missing_key_path() -> PathBuf {
        std::env::temp_dir().join(format!("missing-key-{}", Uuid::new_v4()))
    }

    fn expect_error(
        result: Result<SessionSettings, SessionConfigError>,
        label: &str,
    ) -> SessionConfigError {
        match result {
            Ok(_) => panic!("{label}"),
            Err(error) => error,
        }
    }

    #[rstest]
    fn release_accepts_complete_settings() {
        let key_file = TempKeyFile::new(SESSION_KEY_MIN_LEN).expect("key file");
        let settings = settings_with_key(key_file.path.clone());

        let session = session_settings(&settings, BuildMode::Release).expect("valid settings");
        assert!(session.cookie_secure);
        assert_eq!(session.same_site, SameSite::Strict);
    }

    #[rstest]
    fn release_rejects_short_key() {
        let key_file = TempKeyFile::new(SESSION_KEY_MIN_LEN - 1).expect("key file");
        let settings = settings_with_key(key_file.path.clone());

        let err = expect_error(
            session_settings(&settings, BuildMode::Release),
            "expected short key to fail",
        );
        assert!(matches!(err, SessionConfigError::KeyTooShort { .. }));
    }

    #[rstest]
    fn release_rejects_missing_key_file() {
        let settings = settings_with_key(missing_key_path());

        let err = expect_error(
            session_settings(&settings, BuildMode::Release),
            "expected unreadable key to fail",
        );
        assert!(matches!(err, SessionConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn release_rejects_ephemeral_keys() {
        let mut settings = settings_with_key(missing_key_path());
        settings.session_allow_ephemeral = true;

        let err = expect_error(
            session_settings(&settings, BuildMode::Release),
            "expected ephemeral to be rejected",
        );
        assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
    }

    #[rstest]
    fn debug_generates_key_when_file_missing() {
        let mut settings = settings_with_key(missing_key_path());
        settings.session_same_site = None;

        let session = session_settings(&settings, BuildMode::Debug).expect("debug fallback");
        assert_eq!(session.same_site, SameSite::Lax);
    }

    #[rstest]
    #[case(BuildMode::Release, false)]
    #[case(BuildMode::Debug, true)]
    fn same_site_none_requires_secure_cookie_in_release(
        #[case] mode: BuildMode,
        #[case] accepted: bool,
    ) {
        let key_file = TempKeyFile::new(SESSION_KEY_MIN_LEN).expect("key file");
        let mut settings = settings_with_key(key_file.path.clone());
        settings.cookie_secure = Some(false);
        settings.session_same_site = Some("None".to_owned());

        let result = session_settings(&settings, mode);
        assert_eq!(result.is_ok(), accepted);
    }

    #[rstest]
    fn unknown_same_site_is_rejected() {
        let key_file = TempKeyFile::new(SESSION_KEY_MIN_LEN).expect("key file");
        let mut settings = settings_with_key(key_file.path.clone());
        settings.session_same_site = Some("sometimes".to_owned());

        let err = expect_error(
            session_settings(&settings, BuildMode::Debug),
            "expected invalid SameSite to fail",
        );
        assert!(matches!(err, SessionConfigError::InvalidSameSite { .. }));
    }
}
