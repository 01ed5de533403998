//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only see driving ports, so they
//! stay testable without a database or the ticketing API.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, ConcertSearch, FavoritesCommand, FavoritesQuery, LoginService,
    MatchesQuery, MatchingCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub concerts: Arc<dyn ConcertSearch>,
    pub favorites: Arc<dyn FavoritesCommand>,
    pub favorites_query: Arc<dyn FavoritesQuery>,
    pub matching: Arc<dyn MatchingCommand>,
    pub matches: Arc<dyn MatchesQuery>,
}
