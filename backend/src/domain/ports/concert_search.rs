//! Driving port for browsing concerts from the ticketing provider.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{ConcertId, Error};

/// Preset search areas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Location {
    /// No geographic restriction.
    #[default]
    All,
    /// Kitchener-Waterloo.
    Kw,
    /// Toronto.
    To,
}

impl Location {
    /// Search centre sent upstream, if any.
    pub const fn latlong(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Kw => Some("43.449791,-80.489090"),
            Self::To => Some("43.653225,-79.383186"),
        }
    }
}

/// Location code was not `ALL`, `KW` or `TO`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown location: {0}")]
pub struct UnknownLocation(pub String);

impl FromStr for Location {
    type Err = UnknownLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(Self::All),
            "KW" => Ok(Self::Kw),
            "TO" => Ok(Self::To),
            other => Err(UnknownLocation(other.to_owned())),
        }
    }
}

/// Validated browse filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub keyword: Option<String>,
    pub location: Location,
    /// Restrict to events going on sale from today.
    pub onsale_soon: bool,
    pub venue_id: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConcertSearch: Send + Sync {
    /// Upstream events matching `filters`, soonest first.
    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Value>, Error>;

    /// A single upstream event.
    async fn concert(&self, id: &ConcertId) -> Result<Value, Error>;
}
