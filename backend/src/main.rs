//! Backend entry-point: loads settings, prepares adapters, serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use encore::inbound::http::health::HealthState;
use encore::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use encore::outbound::persistence::{DbPool, run_migrations};
use encore::outbound::ticketmaster::TicketmasterEventSource;
use encore::settings::AppSettings;
use server::{ServerConfig, create_server};

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

    let settings = AppSettings::load().map_err(|e| eyre!("failed to load settings: {e}"))?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session signing key loaded"
    );

    let database_url = settings.database_url.clone();
    let applied = web::block(move || run_migrations(&database_url))
        .await
        .wrap_err("migration task failed")?
        .wrap_err("database migrations failed")?;
    info!(applied, "database migrations complete");

    let pool = DbPool::new(settings.pool_config())
        .await
        .wrap_err("failed to build database pool")?;
    let events = TicketmasterEventSource::new(settings.ticketmaster())
        .wrap_err("failed to build ticketing client")?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(session, settings.bind_addr(), pool, Arc::new(events));
    info!(addr = %settings.bind_addr(), "starting HTTP server");
    let server = create_server(health_state, config)?;
    server.await?;
    Ok(())
}
