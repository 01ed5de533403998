//! Driven port for the third-party ticketing search API.
//!
//! The domain owns the query shape; the adapter adds provider constants
//! (radius, category, sort order, API key) and speaks HTTP.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::ConcertId;

use super::define_port_error;

/// One upstream search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Exact event lookup; when set the search filters are ignored.
    pub id: Option<ConcertId>,
    pub keyword: Option<String>,
    /// `"lat,long"` centre for the radius search.
    pub latlong: Option<&'static str>,
    pub venue_id: Option<String>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub onsale_start_date_time: Option<DateTime<Utc>>,
}

impl EventQuery {
    /// Query for a single event by id.
    pub fn by_id(id: ConcertId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

/// One page of upstream results. Events stay opaque JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPage {
    pub total_count: u64,
    pub events: Vec<Value>,
}

define_port_error! {
    /// Errors surfaced while calling the ticketing API.
    pub enum EventSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "event source transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } => "event source timeout: {message}",
        /// Non-success HTTP status.
        Status { status: u16, message: String } => "event source returned {status}: {message}",
        /// Response body could not be decoded.
        Decode { message: String } => "event source decode failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn search(&self, query: &EventQuery) -> Result<EventPage, EventSourceError>;
}
