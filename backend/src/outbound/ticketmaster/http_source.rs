//! Reqwest-backed ticketing event source.
//!
//! This adapter owns transport details only: query parameters, timeout and
//! HTTP error mapping, and JSON decoding into `EventPage`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};

use super::dto::SearchResponseDto;
use crate::domain::ports::{EventPage, EventQuery, EventSource, EventSourceError};

const SEARCH_RADIUS_KM: &str = "20";
const CLASSIFICATION: &str = "Music";
const SORT_ORDER: &str = "date,asc";
const UPSTREAM_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Connection settings for the ticketing API.
#[derive(Debug, Clone)]
pub struct TicketmasterSettings {
    /// Base URL, e.g. `https://app.ticketmaster.com/discovery/v2`.
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Event source that performs HTTP GET requests against `<base>/events`.
pub struct TicketmasterEventSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

/// Failure building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum TicketmasterSetupError {
    #[error("invalid ticketing base URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl TicketmasterEventSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL does not parse or the reqwest
    /// client cannot be constructed.
    pub fn new(settings: TicketmasterSettings) -> Result<Self, TicketmasterSetupError> {
        let endpoint = events_endpoint(&settings.base_url)?;
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key,
        })
    }
}

#[async_trait]
impl EventSource for TicketmasterEventSource {
    async fn search(&self, query: &EventQuery) -> Result<EventPage, EventSourceError> {
        let params = build_params(&self.api_key, query);
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&params)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_page(body.as_ref())
    }
}

fn events_endpoint(base_url: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}/events", base_url.trim_end_matches('/')))
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format(UPSTREAM_DATE_FORMAT).to_string()
}

fn build_params(api_key: &str, query: &EventQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("apikey", api_key.to_owned())];
    if let Some(id) = &query.id {
        params.push(("id", id.as_str().to_owned()));
        params.push(("includeTest", "no".to_owned()));
        return params;
    }

    params.extend([
        ("radius", SEARCH_RADIUS_KM.to_owned()),
        ("unit", "km".to_owned()),
        ("classificationName", CLASSIFICATION.to_owned()),
        ("includeTest", "no".to_owned()),
        ("sort", SORT_ORDER.to_owned()),
    ]);
    if let Some(keyword) = &query.keyword {
        params.push(("keyword", keyword.clone()));
    }
    if let Some(latlong) = query.latlong {
        params.push(("latlong", latlong.to_owned()));
    }
    if let Some(venue_id) = &query.venue_id {
        params.push(("venueId", venue_id.clone()));
    }
    if let Some(start) = query.start_date_time {
        params.push(("startDateTime", format_instant(start)));
    }
    if let Some(onsale) = query.onsale_start_date_time {
        params.push(("onsaleStartDateTime", format_instant(onsale)));
    }
    params
}

fn parse_page(body: &[u8]) -> Result<EventPage, EventSourceError> {
    let decoded: SearchResponseDto = serde_json::from_slice(body).map_err(|error| {
        EventSourceError::decode(format!("invalid search payload: {error}"))
    })?;
    Ok(decoded.into_page())
}

fn map_transport_error(error: reqwest::Error) -> EventSourceError {
    if error.is_timeout() {
        EventSourceError::timeout(error.to_string())
    } else {
        EventSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EventSourceError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            EventSourceError::timeout(format!("status {}", status.as_u16()))
        }
        _ => EventSourceError::status(status.as_u16(), body_preview(body)),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
