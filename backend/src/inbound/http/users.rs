//! Account and profile handlers.
//!
//! ```text
//! POST /api/v1/register {"username":"ada","email":"ada@uwaterloo.ca","password":"..."}
//! POST /api/v1/login    {"username":"ada","password":"..."}
//! GET  /api/v1/users/me
//! PUT  /api/v1/users/me/profile {"term":"2B","favoriteArtists":["Drake"]}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Account, Error, LoginCredentials, LoginValidationError, ProfilePatch, Registration,
    RegistrationValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ProfileBody};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/v1/register`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Body for `PUT /api/v1/users/me/profile`. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub profile_photo: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub term: Option<String>,
    pub faculty: Option<String>,
    pub favorite_artists: Option<Vec<String>>,
    pub favorite_genres: Option<Vec<String>>,
}

impl From<ProfileRequest> for ProfilePatch {
    fn from(value: ProfileRequest) -> Self {
        Self {
            profile_photo: value.profile_photo,
            first_name: value.first_name,
            last_name: value.last_name,
            term: value.term,
            faculty: value.faculty,
            favorite_artists: value.favorite_artists,
            favorite_genres: value.favorite_genres,
        }
    }
}

/// The signed-in member.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserBody {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub profile: ProfileBody,
}

impl From<&Account> for UserBody {
    fn from(account: &Account) -> Self {
        Self {
            id: account.member.id.to_string(),
            username: account.member.username.as_str().to_owned(),
            email: account.email.as_str().to_owned(),
            profile: ProfileBody::from(&account.member.profile),
        }
    }
}

/// `{"user": {...}}` envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserBody,
}

/// Response to a successful registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisteredBody {
    pub id: String,
    pub username: String,
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let field = err.field();
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": field, "code": format!("invalid_{field}") }))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Create an account together with its default profile.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisteredBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&username, &email, &password)
        .map_err(map_registration_error)?;
    let id = state.accounts.register(&registration).await?;
    Ok(HttpResponse::Created().json(RegisteredBody {
        id: id.to_string(),
        username: registration.username().as_str().to_owned(),
    }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session cleared"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// The signed-in member with profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserEnvelope>> {
    let user_id = session.require_user_id()?;
    let account = state.accounts_query.current_account(&user_id).await?;
    Ok(web::Json(UserEnvelope {
        user: UserBody::from(&account),
    }))
}

/// Update profile fields of the signed-in member.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserEnvelope),
        (status = 400, description = "Invalid profile field", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/me/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserEnvelope>> {
    let user_id = session.require_user_id()?;
    let account = state
        .accounts
        .update_profile(&user_id, payload.into_inner().into())
        .await?;
    Ok(web::Json(UserEnvelope {
        user: UserBody::from(&account),
    }))
}

#[cfg(test)]
mod tests;
