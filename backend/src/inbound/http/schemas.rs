//! OpenAPI schemas and shared response bodies.
//!
//! Domain types do not derive `ToSchema`; the wrappers here register their
//! shape with utoipa. Response bodies reused by several handler modules
//! also live here.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Member, UserProfile};

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Failed to process matching")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field-level context, e.g. `{"field": "term"}`.
    details: Option<serde_json::Value>,
}

/// `{"message": "..."}` acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public profile fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    #[schema(example = "/avatars/1.jpg")]
    pub profile_photo: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "2B")]
    pub term: String,
    #[schema(example = "Mathematics")]
    pub faculty: String,
    pub favorite_artists: Vec<String>,
    pub favorite_genres: Vec<String>,
}

impl From<&UserProfile> for ProfileBody {
    fn from(profile: &UserProfile) -> Self {
        Self {
            profile_photo: profile.profile_photo.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            term: profile.term.clone(),
            faculty: profile.faculty.clone(),
            favorite_artists: profile.favorite_artists.clone(),
            favorite_genres: profile.favorite_genres.clone(),
        }
    }
}

/// Another member as shown in candidate and match lists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberBody {
    pub username: String,
    pub display_name: String,
    pub profile: ProfileBody,
}

impl From<&Member> for MemberBody {
    fn from(member: &Member) -> Self {
        Self {
            username: member.username.as_str().to_owned(),
            display_name: member.profile.display_name(),
            profile: ProfileBody::from(&member.profile),
        }
    }
}
