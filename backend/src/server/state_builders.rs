//! Wiring of repositories and the event source into domain services.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use encore::domain::ports::{ConcertRepository, EventSource, MatchingRepository, UserRepository};
use encore::domain::{AccountService, ConcertSearchService, FavoritesService, MatchingService};
use encore::inbound::http::state::HttpState;
use encore::outbound::persistence::{
    DieselConcertRepository, DieselMatchingRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Build handler state from arbitrary driven adapters.
pub fn build_http_state_from<U, C, M, E>(
    users: Arc<U>,
    concerts: Arc<C>,
    matchings: Arc<M>,
    events: Arc<E>,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    U: UserRepository + 'static,
    C: ConcertRepository + 'static,
    M: MatchingRepository + 'static,
    E: EventSource + 'static,
{
    let accounts = Arc::new(AccountService::new(users.clone()));
    let favorites = Arc::new(FavoritesService::new(concerts.clone(), events.clone()));
    let matching = Arc::new(MatchingService::new(users, concerts, matchings));
    let search = Arc::new(ConcertSearchService::new(events, clock));

    HttpState {
        login: accounts.clone(),
        accounts: accounts.clone(),
        accounts_query: accounts,
        concerts: search,
        favorites: favorites.clone(),
        favorites_query: favorites,
        matching: matching.clone(),
        matches: matching,
    }
}

/// Build handler state backed by PostgreSQL and the configured event source.
pub fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let pool = &config.db_pool;
    web::Data::new(build_http_state_from(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselConcertRepository::new(pool.clone())),
        Arc::new(DieselMatchingRepository::new(pool.clone())),
        config.events.clone(),
        Arc::new(DefaultClock),
    ))
}
