//! Application settings loaded via OrthoConfig.
//!
//! Values merge CLI flags, `CAMPUS_*` environment variables and defaults.
//! Optional fields fall back to the constants below through accessors so the
//! raw struct mirrors exactly what the operator supplied.

pub mod session;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    AttendanceWindow, DEFAULT_MAX_FRAME_BYTES, DEFAULT_WINDOW_HOURS, FrameLimits,
    FrameValidationError, Threshold,
};

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_RECOGNITION_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SESSION_KEY_PATH: &str = "/var/run/secrets/session_key";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";

/// Settings for the campus gateway process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPUS")]
pub struct AppSettings {
    /// HTTP listen address.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Base URL of the face-recognition engine.
    pub recognition_url: Option<String>,
    /// Per-request timeout towards the recognition engine.
    pub recognition_timeout_ms: Option<u64>,
    /// GoTrue-compatible identity endpoint.
    pub identity_url: Option<String>,
    /// API key sent to the identity endpoint.
    pub identity_api_key: Option<String>,
    /// File holding the cookie signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`; defaults to `true`. Environment and
    /// file only, since a `SetTrue` flag always reports `false`.
    #[ortho_config(skip_cli)]
    pub cookie_secure: Option<bool>,
    /// `SameSite` policy for the session cookie (`Strict`, `Lax` or `None`).
    pub session_same_site: Option<String>,
    /// Permit a generated session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Minimum gap in hours between two marks for one student.
    pub attendance_window_hours: Option<u32>,
    /// Recognition threshold applied when a frame omits one.
    pub default_threshold: Option<f64>,
    /// Largest decoded frame accepted over the WebSocket.
    pub max_frame_bytes: Option<usize>,
    /// WebSocket Origin allow-list. The environment form is comma separated;
    /// a single origin is accepted as well.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl AppSettings {
    /// Return the listen address, defaulting to `0.0.0.0:4000`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Return the recognition engine timeout.
    pub fn recognition_timeout(&self) -> Duration {
        Duration::from_millis(
            self.recognition_timeout_ms
                .unwrap_or(DEFAULT_RECOGNITION_TIMEOUT_MS),
        )
    }

    /// Whether the session cookie carries the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Return the session key path, falling back to the mounted secret.
    pub fn session_key_path(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_PATH))
    }

    /// Return the attendance window.
    pub fn attendance_window(&self) -> AttendanceWindow {
        AttendanceWindow::from_hours(
            self.attendance_window_hours
                .unwrap_or(DEFAULT_WINDOW_HOURS),
        )
    }

    /// Return validated frame limits.
    ///
    /// # Errors
    /// Returns [`FrameValidationError`] when the configured threshold lies
    /// outside `0..=1`.
    pub fn frame_limits(&self) -> Result<FrameLimits, FrameValidationError> {
        let default_threshold = match self.default_threshold {
            Some(value) => Threshold::new(value)?,
            None => Threshold::default(),
        };
        Ok(FrameLimits {
            default_threshold,
            max_frame_bytes: self.max_frame_bytes.unwrap_or(DEFAULT_MAX_FRAME_BYTES),
        })
    }

    /// Return the WebSocket Origin allow-list entries.
    pub fn allowed_origins(&self) -> Vec<String> {
        let origins: Vec<String> = self
            .allowed_origins
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect();
        if origins.is_empty() {
            vec![DEFAULT_ALLOWED_ORIGINS.to_owned()]
        } else {
            origins
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "CAMPUS_BIND_ADDR",
        "CAMPUS_DATABASE_URL",
        "CAMPUS_RECOGNITION_URL",
        "CAMPUS_RECOGNITION_TIMEOUT_MS",
        "CAMPUS_COOKIE_SECURE",
        "CAMPUS_ATTENDANCE_WINDOW_HOURS",
        "CAMPUS_DEFAULT_THRESHOLD",
        "CAMPUS_MAX_FRAME_BYTES",
        "CAMPUS_ALLOWED_ORIGINS",
    ];

    /// Every known variable, unset unless `overrides` names it.
    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("campus-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:4000".parse().expect("addr"));
        assert!(settings.database_url.is_none());
        assert!(settings.cookie_secure());
        assert_eq!(settings.recognition_timeout(), Duration::from_secs(5));
        assert_eq!(settings.attendance_window(), AttendanceWindow::default());
        assert_eq!(
            settings.frame_limits().expect("default limits"),
            FrameLimits::default()
        );
        assert_eq!(settings.allowed_origins(), vec!["http://localhost:5173"]);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("CAMPUS_BIND_ADDR", "127.0.0.1:9000"),
            ("CAMPUS_DATABASE_URL", "postgres://localhost/campus"),
            ("CAMPUS_RECOGNITION_TIMEOUT_MS", "750"),
            ("CAMPUS_COOKIE_SECURE", "false"),
            ("CAMPUS_ATTENDANCE_WINDOW_HOURS", "3"),
            ("CAMPUS_MAX_FRAME_BYTES", "1024"),
            (
                "CAMPUS_ALLOWED_ORIGINS",
                "https://campus.example, https://*.campus.example",
            ),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/campus")
        );
        assert!(!settings.cookie_secure());
        assert_eq!(settings.recognition_timeout(), Duration::from_millis(750));
        assert_eq!(settings.attendance_window(), AttendanceWindow::from_hours(3));
        assert_eq!(
            settings.frame_limits().expect("limits").max_frame_bytes,
            1024
        );
        assert_eq!(
            settings.allowed_origins(),
            vec!["https://campus.example", "https://*.campus.example"]
        );
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    fn cookie_secure_follows_environment(#[case] raw: &str, #[case] expected: bool) {
        let _guard = lock_env(env_with(&[("CAMPUS_COOKIE_SECURE", raw)]));

        let settings = load_from_empty_args();
        assert_eq!(settings.cookie_secure(), expected);
    }

    #[rstest]
    #[case("https://campus.example", &["https://campus.example"])]
    #[case(
        "https://campus.example,http://localhost:5173",
        &["https://campus.example", "http://localhost:5173"]
    )]
    fn allowed_origins_accept_single_and_listed_values(
        #[case] raw: &str,
        #[case] expected: &[&str],
    ) {
        let _guard = lock_env(env_with(&[("CAMPUS_ALLOWED_ORIGINS", raw)]));

        let settings = load_from_empty_args();
        assert_eq!(settings.allowed_origins(), expected);
    }

    #[rstest]
    fn out_of_range_threshold_is_rejected() {
        let _guard = lock_env(env_with(&[("CAMPUS_DEFAULT_THRESHOLD", "1.5")]));

        let settings = load_from_empty_args();
        assert!(settings.frame_limits().is_err());
    }
}
