//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use campus_backend::domain::ports::{
    FaceRecognitionEngine, IdentityProvider, UnconfiguredRecognitionEngine,
};
use campus_backend::domain::{AttendanceWindow, FrameLimits};
use campus_backend::outbound::identity::LocalIdentityProvider;
use campus_backend::outbound::persistence::DbPool;
use campus_backend::settings::session::SessionSettings;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
///
/// Without further calls the server runs on in-memory stores with local
/// credentials and no recognition engine.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) identity: Arc<dyn IdentityProvider>,
    pub(crate) engine: Arc<dyn FaceRecognitionEngine>,
    pub(crate) window: AttendanceWindow,
    pub(crate) limits: FrameLimits,
    pub(crate) allowed_origins: Vec<String>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            identity: Arc::new(LocalIdentityProvider::new()),
            engine: Arc::new(UnconfiguredRecognitionEngine),
            window: AttendanceWindow::default(),
            limits: FrameLimits::default(),
            allowed_origins: Vec::new(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool; Diesel repositories replace the
    /// in-memory stores.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn with_recognition_engine(mut self, engine: Arc<dyn FaceRecognitionEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Override the marking window and frame limits.
    #[must_use]
    pub fn with_attendance_rules(mut self, window: AttendanceWindow, limits: FrameLimits) -> Self {
        self.window = window;
        self.limits = limits;
        self
    }

    /// Set the WebSocket Origin allow-list.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
