//! Application settings loaded via OrthoConfig.
//!
//! Values come from `ENCORE_*` environment variables, an optional config
//! file, or command-line flags. Session cookie settings are read separately
//! by [`crate::inbound::http::session_config`].

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;
use crate::outbound::ticketmaster::TicketmasterSettings;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080));

/// Process-wide configuration for the API server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ENCORE")]
pub struct AppSettings {
    /// Listener address; `0.0.0.0:8080` when unset.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string.
    pub database_url: String,
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Ticketing API base URL, e.g. `https://app.ticketmaster.com/discovery/v2`.
    pub ticketmaster_url_base: String,
    pub ticketmaster_key: String,
    /// Upstream request timeout; no retries are attempted.
    #[ortho_config(default = 10)]
    pub ticketmaster_timeout_secs: u64,
}

impl AppSettings {
    /// Return the configured listener address, falling back to the default.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Pool settings for [`crate::outbound::persistence::DbPool`].
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.database_url.as_str()).with_max_size(self.db_max_connections)
    }

    /// Connection settings for the ticketing adapter.
    pub fn ticketmaster(&self) -> TicketmasterSettings {
        TicketmasterSettings {
            base_url: self.ticketmaster_url_base.clone(),
            api_key: self.ticketmaster_key.clone(),
            timeout: Duration::from_secs(self.ticketmaster_timeout_secs),
        }
    }
}
