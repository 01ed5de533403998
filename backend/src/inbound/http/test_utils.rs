//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::domain::ports::{
    MockAccountCommand, MockAccountQuery, MockConcertSearch, MockFavoritesCommand,
    MockFavoritesQuery, MockLoginService, MockMatchesQuery, MockMatchingCommand,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Cookie session middleware with a fresh key and `Secure` disabled.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Mock driving ports; set expectations on the ones a test exercises.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub accounts: MockAccountCommand,
    pub accounts_query: MockAccountQuery,
    pub concerts: MockConcertSearch,
    pub favorites: MockFavoritesCommand,
    pub favorites_query: MockFavoritesQuery,
    pub matching: MockMatchingCommand,
    pub matches: MockMatchesQuery,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            login: Arc::new(self.login),
            accounts: Arc::new(self.accounts),
            accounts_query: Arc::new(self.accounts_query),
            concerts: Arc::new(self.concerts),
            favorites: Arc::new(self.favorites),
            favorites_query: Arc::new(self.favorites_query),
            matching: Arc::new(self.matching),
            matches: Arc::new(self.matches),
        })
    }
}

/// A fixed signed-in member for handler tests.
pub fn fixture_user() -> UserId {
    UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id")
}

/// Test-only route that signs in [`fixture_user`].
pub async fn sign_in(session: SessionContext) -> Result<HttpResponse, Error> {
    session.persist_user(&fixture_user())?;
    Ok(HttpResponse::Ok().finish())
}
