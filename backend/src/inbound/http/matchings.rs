//! Matching engine handlers.
//!
//! ```text
//! GET    /api/v1/matchings
//! POST   /api/v1/matchings/review {"matchingId":"...","decision":"YES"}
//! GET    /api/v1/matches
//! DELETE /api/v1/matches          {"username":"ada","concertIds":["G5v..."]}
//! ```

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Candidate, ConcertId, ConfirmedMatch, Decision, Error, MatchingError, MatchingId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, MemberBody, MessageBody};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, field_error, missing_field_error,
};

/// Pending matching with the concerts both members favorited.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateBody {
    /// Matching record to review.
    pub id: String,
    #[serde(flatten)]
    pub member: MemberBody,
    pub concerts: Vec<String>,
}

impl From<&Candidate> for CandidateBody {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.matching_id.to_string(),
            member: MemberBody::from(&candidate.member),
            concerts: concert_strings(&candidate.concerts),
        }
    }
}

/// Mutual match as seen by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchBody {
    #[serde(flatten)]
    pub member: MemberBody,
    pub concerts: Vec<String>,
}

impl From<&ConfirmedMatch> for MatchBody {
    fn from(confirmed: &ConfirmedMatch) -> Self {
        Self {
            member: MemberBody::from(&confirmed.member),
            concerts: concert_strings(&confirmed.concerts),
        }
    }
}

fn concert_strings(ids: &[ConcertId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_owned()).collect()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchingsBody {
    pub matchings: Vec<CandidateBody>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchesBody {
    pub matches: Vec<MatchBody>,
}

/// Review verdict. `decision` is exactly `YES` or `NO`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub matching_id: Option<String>,
    #[schema(example = "YES")]
    pub decision: Option<String>,
}

impl ReviewRequest {
    /// Every malformed review is reported like any other unprocessable one.
    fn parse(&self) -> Result<(MatchingId, Decision), MatchingError> {
        let matching = self
            .matching_id
            .as_deref()
            .and_then(|raw| raw.parse::<MatchingId>().ok())
            .ok_or(MatchingError::NotProcessable)?;
        let decision = self
            .decision
            .as_deref()
            .and_then(|raw| raw.parse::<Decision>().ok())
            .ok_or(MatchingError::NotProcessable)?;
        Ok((matching, decision))
    }
}

/// Unmatch request.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMatchRequest {
    pub username: Option<String>,
    /// Concerts to unfavorite for both members.
    pub concert_ids: Option<Vec<String>>,
}

impl DeleteMatchRequest {
    fn parse(&self) -> Result<(&str, Vec<ConcertId>), Error> {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| missing_field_error(FieldName::new("username")))?;
        let concerts = self
            .concert_ids
            .iter()
            .flatten()
            .map(|raw| {
                ConcertId::new(raw).map_err(|err| {
                    field_error(
                        FieldName::new("concertIds"),
                        ErrorCode::InvalidConcertId,
                        err.to_string(),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((username, concerts))
    }
}

/// Refresh and list pending candidates sharing concerts with the caller.
#[utoipa::path(
    get,
    path = "/api/v1/matchings",
    responses(
        (status = 200, description = "Candidates", body = MatchingsBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["matchings"],
    operation_id = "discoverMatchings"
)]
#[get("/matchings")]
pub async fn discover_matchings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MatchingsBody>> {
    let user = session.require_user_id()?;
    let candidates = state.matching.discover_candidates(&user).await?;
    Ok(web::Json(MatchingsBody {
        matchings: candidates.iter().map(CandidateBody::from).collect(),
    }))
}

/// Record the caller's verdict on one of their pending matchings.
#[utoipa::path(
    post,
    path = "/api/v1/matchings/review",
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Processed", body = MessageBody),
        (status = 400, description = "Matching not processable", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["matchings"],
    operation_id = "reviewMatching"
)]
#[post("/matchings/review")]
pub async fn review_matching(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<web::Json<MessageBody>> {
    let user = session.require_user_id()?;
    let (matching, decision) = payload.parse()?;
    state.matching.review(&user, &matching, decision).await?;
    Ok(web::Json(MessageBody::new("Matching processed successfully")))
}

/// Members who accepted the caller and were accepted back.
#[utoipa::path(
    get,
    path = "/api/v1/matches",
    responses(
        (status = 200, description = "Confirmed matches", body = MatchesBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["matchings"],
    operation_id = "listMatches"
)]
#[get("/matches")]
pub async fn list_matches(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MatchesBody>> {
    let user = session.require_user_id()?;
    let matches = state.matches.confirmed_matches(&user).await?;
    Ok(web::Json(MatchesBody {
        matches: matches.iter().map(MatchBody::from).collect(),
    }))
}

/// Unmatch and unfavorite the shared concerts for both members.
///
/// Steps already applied stay applied when a later unfavorite fails.
#[utoipa::path(
    delete,
    path = "/api/v1/matches",
    request_body = DeleteMatchRequest,
    responses(
        (status = 200, description = "Match deleted", body = MessageBody),
        (status = 400, description = "Missing username or concert ids", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown username", body = ErrorSchema),
        (status = 500, description = "Partially applied", body = ErrorSchema)
    ),
    tags = ["matchings"],
    operation_id = "deleteMatch"
)]
#[delete("/matches")]
pub async fn delete_match(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DeleteMatchRequest>,
) -> ApiResult<web::Json<MessageBody>> {
    let user = session.require_user_id()?;
    let (username, concerts) = payload.parse()?;
    state.matching.delete_match(&user, username, &concerts).await?;
    Ok(web::Json(MessageBody::new("Match deleted successfully")))
}
