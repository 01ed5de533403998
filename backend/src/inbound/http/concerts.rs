//! Concert search and favoriting handlers.
//!
//! ```text
//! GET  /api/v1/concerts?query=drake&location=KW&onsaleSoon=true
//! GET  /api/v1/concerts/{id}
//! POST /api/v1/concerts/favorite   {"concert":"G5vYZ9..."}
//! POST /api/v1/concerts/unfavorite {"concert":"G5vYZ9..."}
//! GET  /api/v1/concerts/favorites
//! GET  /api/v1/concerts/favorites/ids
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{Location, SearchFilters};
use crate::domain::{ConcertId, Error, FavoriteOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, MessageBody};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, invalid_value_error, parse_optional_rfc3339_timestamp,
    require_concert_id,
};

/// Query string for `GET /api/v1/concerts`.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text keyword.
    pub query: Option<String>,
    /// One of `ALL`, `KW`, `TO`.
    pub location: Option<String>,
    /// Only events going on sale from today.
    #[serde(default)]
    pub onsale_soon: bool,
    pub venue_id: Option<String>,
    /// RFC 3339 lower bound on the event start.
    pub start_date: Option<String>,
}

impl SearchParams {
    fn into_filters(self) -> Result<SearchFilters, Error> {
        let location = match self.location.as_deref().map(str::trim) {
            None | Some("") => Location::default(),
            Some(raw) => raw.parse::<Location>().map_err(|err| {
                invalid_value_error(
                    FieldName::new("location"),
                    ErrorCode::InvalidLocation,
                    err.to_string(),
                    raw,
                )
            })?,
        };
        let start_date =
            parse_optional_rfc3339_timestamp(self.start_date, FieldName::new("startDate"))?;
        Ok(SearchFilters {
            keyword: self.query,
            location,
            onsale_soon: self.onsale_soon,
            venue_id: self.venue_id.filter(|venue| !venue.trim().is_empty()),
            start_date,
        })
    }
}

/// Body for favorite and unfavorite requests.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ConcertRequest {
    /// External ticketing id.
    pub concert: Option<String>,
}

/// `{"concerts": [...]}` of raw upstream events.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConcertsBody {
    #[schema(value_type = Vec<Object>)]
    pub concerts: Vec<Value>,
}

/// `{"concert": {...}}` for a single upstream event.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConcertBody {
    #[schema(value_type = Object)]
    pub concert: Value,
}

/// `{"concerts": ["id", ...]}` of favorited external ids.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConcertIdsBody {
    pub concerts: Vec<String>,
}

/// Search upcoming music events.
#[utoipa::path(
    get,
    path = "/api/v1/concerts",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching events", body = ConcertsBody),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Ticketing API unavailable", body = ErrorSchema)
    ),
    tags = ["concerts"],
    operation_id = "searchConcerts"
)]
#[get("/concerts")]
pub async fn search_concerts(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<ConcertsBody>> {
    session.require_user_id()?;
    let filters = params.into_inner().into_filters()?;
    let concerts = state.concerts.search(&filters).await?;
    Ok(web::Json(ConcertsBody { concerts }))
}

/// Favorited events, fetched fresh from the ticketing API.
#[utoipa::path(
    get,
    path = "/api/v1/concerts/favorites",
    responses(
        (status = 200, description = "Favorited events", body = ConcertsBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Ticketing API unavailable", body = ErrorSchema)
    ),
    tags = ["concerts"],
    operation_id = "listFavoriteConcerts"
)]
#[get("/concerts/favorites")]
pub async fn favorite_concerts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ConcertsBody>> {
    let user = session.require_user_id()?;
    let concerts = state.favorites_query.favorite_events(&user).await?;
    Ok(web::Json(ConcertsBody { concerts }))
}

/// Favorited external ids, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/concerts/favorites/ids",
    responses(
        (status = 200, description = "Favorited ids", body = ConcertIdsBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["concerts"],
    operation_id = "listFavoriteConcertIds"
)]
#[get("/concerts/favorites/ids")]
pub async fn favorite_concert_ids(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ConcertIdsBody>> {
    let user = session.require_user_id()?;
    let ids = state.favorites_query.favorite_ids(&user).await?;
    Ok(web::Json(ConcertIdsBody {
        concerts: ids.into_iter().map(String::from).collect(),
    }))
}

/// One event by external id.
#[utoipa::path(
    get,
    path = "/api/v1/concerts/{id}",
    params(("id" = String, Path, description = "External ticketing id")),
    responses(
        (status = 200, description = "Event", body = ConcertBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such event", body = ErrorSchema),
        (status = 503, description = "Ticketing API unavailable", body = ErrorSchema)
    ),
    tags = ["concerts"],
    operation_id = "getConcert"
)]
#[get("/concerts/{id}")]
pub async fn get_concert(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ConcertBody>> {
    session.require_user_id()?;
    let id = ConcertId::new(path.into_inner())
        .map_err(|_| Error::not_found("Concert not found"))?;
    let concert = state.concerts.concert(&id).await?;
    Ok(web::Json(ConcertBody { concert }))
}

/// Add a concert to the caller's favorites. Idempotent.
#[utoipa::path(
    post,
    path = "/api/v1/concerts/favorite",
    request_body = ConcertRequest,
    responses(
        (status = 201, description = "Favorited", body = MessageBody),
        (status = 200, description = "Already favorited", body = MessageBody),
        (status = 400, description = "Missing concert id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["concerts"],
    operation_id = "favoriteConcert"
)]
#[post("/concerts/favorite")]
pub async fn favorite_concert(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ConcertRequest>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let concert = require_concert_id(payload.concert.as_deref())?;
    let response = match state.favorites.favorite(&user, &concert).await? {
        FavoriteOutcome::Created => {
            HttpResponse::Created().json(MessageBody::new("Concert favorited successfully"))
        }
        FavoriteOutcome::AlreadyFavorited => {
            HttpResponse::Ok().json(MessageBody::new("Concert already favorited"))
        }
    };
    Ok(response)
}

/// Remove a concert from the caller's favorites.
#[utoipa::path(
    post,
    path = "/api/v1/concerts/unfavorite",
    request_body = ConcertRequest,
    responses(
        (status = 200, description = "Unfavorited", body = MessageBody),
        (status = 400, description = "Missing id or not favorited", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown concert", body = ErrorSchema)
    ),
    tags = ["concerts"],
    operation_id = "unfavoriteConcert"
)]
#[post("/concerts/unfavorite")]
pub async fn unfavorite_concert(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ConcertRequest>,
) -> ApiResult<web::Json<MessageBody>> {
    let user = session.require_user_id()?;
    let concert = require_concert_id(payload.concert.as_deref())?;
    state.favorites.unfavorite(&user, &concert).await?;
    Ok(web::Json(MessageBody::new("Concert unfavorited successfully")))
}
