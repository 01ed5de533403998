//! Ticketing API outbound adapter.
//!
//! A thin HTTP implementation of the `EventSource` port against the
//! Ticketmaster Discovery `events` endpoint.

mod dto;
mod http_source;

pub use http_source::{TicketmasterEventSource, TicketmasterSettings, TicketmasterSetupError};
