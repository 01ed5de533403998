//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler, the schema wrappers for domain
//! types that do not derive `ToSchema`, and the session cookie security
//! scheme. Swagger UI serves it in debug builds and `openapi-dump` prints it
//! for external tooling.

use crate::inbound::http::concerts::{ConcertBody, ConcertIdsBody, ConcertRequest, ConcertsBody};
use crate::inbound::http::matchings::{
    CandidateBody, DeleteMatchRequest, MatchBody, MatchesBody, MatchingsBody, ReviewRequest,
};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, MemberBody, MessageBody, ProfileBody,
};
use crate::inbound::http::users::{
    LoginRequest, ProfileRequest, RegisterRequest, RegisteredBody, UserBody, UserEnvelope,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Encore API",
        description = "Concert discovery, favorites and mutual matching between members."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::concerts::search_concerts,
        crate::inbound::http::concerts::get_concert,
        crate::inbound::http::concerts::favorite_concert,
        crate::inbound::http::concerts::unfavorite_concert,
        crate::inbound::http::concerts::favorite_concerts,
        crate::inbound::http::concerts::favorite_concert_ids,
        crate::inbound::http::matchings::discover_matchings,
        crate::inbound::http::matchings::review_matching,
        crate::inbound::http::matchings::list_matches,
        crate::inbound::http::matchings::delete_match,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        MessageBody,
        ProfileBody,
        MemberBody,
        RegisterRequest,
        LoginRequest,
        ProfileRequest,
        RegisteredBody,
        UserBody,
        UserEnvelope,
        ConcertRequest,
        ConcertsBody,
        ConcertBody,
        ConcertIdsBody,
        ReviewRequest,
        DeleteMatchRequest,
        CandidateBody,
        MatchBody,
        MatchingsBody,
        MatchesBody,
    )),
    tags(
        (name = "users", description = "Registration, login and profiles"),
        (name = "concerts", description = "Concert search and favorites"),
        (name = "matchings", description = "Candidate review and confirmed matches"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
