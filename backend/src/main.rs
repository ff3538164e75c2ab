//! Backend entry-point: loads settings, wires adapters and runs the gateway.

mod server;

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use color_eyre::eyre::{WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use campus_backend::inbound::http::health::HealthState;
use campus_backend::outbound::identity::GoTrueIdentityProvider;
use campus_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use campus_backend::outbound::recognition::HttpRecognitionEngine;
use campus_backend::settings::AppSettings;
use campus_backend::settings::session::{BuildMode, session_settings};
use server::{ServerConfig, create_server};

const IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

fn parse_url(raw: &str, name: &str) -> color_eyre::Result<Url> {
    Url::parse(raw).wrap_err_with(|| format!("invalid {name}"))
}

async fn configure(settings: &AppSettings) -> color_eyre::Result<ServerConfig> {
    let session = session_settings(settings, BuildMode::from_debug_assertions())
        .wrap_err("session configuration")?;
    let limits = settings
        .frame_limits()
        .wrap_err("invalid default_threshold")?;
    let mut config = ServerConfig::new(session, settings.bind_addr())
        .with_attendance_rules(settings.attendance_window(), limits)
        .with_allowed_origins(settings.allowed_origins());

    match settings.database_url.as_deref() {
        Some(url) => {
            run_pending_migrations(url)
                .await
                .wrap_err("database migrations")?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .wrap_err("database pool")?;
            config = config.with_db_pool(pool);
        }
        None => warn!("database_url not set; using in-memory stores"),
    }

    if let Some(raw) = settings.identity_url.as_deref() {
        let api_key = settings
            .identity_api_key
            .clone()
            .ok_or_else(|| eyre!("identity_api_key is required with identity_url"))?;
        let provider =
            GoTrueIdentityProvider::new(&parse_url(raw, "identity_url")?, api_key, IDENTITY_TIMEOUT)
                .wrap_err("identity provider")?;
        config = config.with_identity(Arc::new(provider));
    }

    match settings.recognition_url.as_deref() {
        Some(raw) => {
            let engine = HttpRecognitionEngine::new(
                &parse_url(raw, "recognition_url")?,
                settings.recognition_timeout(),
            )
            .wrap_err("recognition engine")?;
            config = config.with_recognition_engine(Arc::new(engine));
        }
        None => warn!("recognition_url not set; face recognition is disabled"),
    }

    #[cfg(feature = "metrics")]
    {
        let prometheus = PrometheusMetricsBuilder::new("campus")
            .endpoint("/metrics")
            .build()
            .map_err(|err| eyre!("configure Prometheus metrics: {err}"))?;
        config = config.with_metrics(Some(prometheus));
    }

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = configure(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %settings.bind_addr(), "starting campus gateway");
    create_server(health_state, config)?.await?;
    Ok(())
}
