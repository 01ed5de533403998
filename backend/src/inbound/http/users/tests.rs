//! Tests for account and profile handlers.

use super::*;
use crate::domain::{EmailAddress, Member, UserId, UserProfile, Username};
use crate::inbound::http::test_utils::{
    MockPorts, fixture_user, session_cookie, sign_in, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

fn account(id: UserId) -> Account {
    let mut profile = UserProfile::default();
    profile.first_name = "Ada".into();
    profile.term = "2B".into();
    Account {
        member: Member {
            id,
            username: Username::new("ada").expect("valid"),
            profile,
        },
        email: EmailAddress::new("ada@uwaterloo.ca").expect("valid"),
    }
}

macro_rules! app {
    ($ports:expr) => {
        actix_test::init_service(
            App::new()
                .app_data($ports.into_state())
                .wrap(test_session_middleware())
                .route("/sign-in", web::get().to(sign_in))
                .service(
                    web::scope("/api/v1")
                        .service(register)
                        .service(login)
                        .service(logout)
                        .service(current_user)
                        .service(update_profile),
                ),
        )
        .await
    };
}

async fn body_json(response: actix_web::dev::ServiceResponse) -> Value {
    let bytes = actix_test::read_body(response).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}

#[actix_web::test]
async fn register_creates_account() {
    let created = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_register()
        .withf(|reg| reg.username().as_str() == "ada" && reg.email().as_str() == "ada@uwaterloo.ca")
        .times(1)
        .return_once(move |_| Ok(created));
    let app = app!(ports);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({"username": "ada", "email": "ada@uwaterloo.ca", "password": "correct horse"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["id"], created.to_string());
    assert_eq!(body["username"], "ada");
}

#[rstest]
#[case("a", "ada@uwaterloo.ca", "hunter2222", "username")]
#[case("ada", "not-an-email", "hunter2222", "email")]
#[case("ada", "ada@uwaterloo.ca", "short", "password")]
#[actix_web::test]
async fn register_rejects_invalid_fields(
    #[case] username: &str,
    #[case] email: &str,
    #[case] password: &str,
    #[case] field: &str,
) {
    let mut ports = MockPorts::default();
    ports.accounts.expect_register().never();
    let app = app!(ports);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({"username": username, "email": email, "password": password}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn register_surfaces_duplicate_username_conflict() {
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_register()
        .return_once(|_| Err(Error::conflict("username is already taken")));
    let app = app!(ports);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({"username": "ada", "email": "ada@uwaterloo.ca", "password": "hunter2222"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[rstest]
#[case("   ", "password", "empty_username")]
#[case("ada", "", "empty_password")]
#[actix_web::test]
async fn login_rejects_blank_credentials(
    #[case] username: &str,
    #[case] password: &str,
    #[case] code: &str,
) {
    let mut ports = MockPorts::default();
    ports.login.expect_authenticate().never();
    let app = app!(ports);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"username": username, "password": password}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["details"]["code"], code);
}

#[actix_web::test]
async fn login_wrong_password_is_unauthorised() {
    let mut ports = MockPorts::default();
    ports
        .login
        .expect_authenticate()
        .return_once(|_| Err(Error::unauthorized("invalid credentials")));
    let app = app!(ports);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"username": "ada", "password": "wrong"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.response().cookies().all(|c| c.name() != "session"));
}

#[actix_web::test]
async fn login_then_me_returns_account() {
    let user = fixture_user();
    let mut ports = MockPorts::default();
    ports
        .login
        .expect_authenticate()
        .withf(|creds| creds.username() == "ada")
        .return_once(move |_| Ok(user));
    ports
        .accounts_query
        .expect_current_account()
        .with(eq(user))
        .return_once(move |id| Ok(account(*id)));
    let app = app!(ports);

    let login_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"username": "ada", "password": "hunter2222"}))
            .to_request(),
    )
    .await;
    assert_eq!(login_res.status(), StatusCode::OK);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(session_cookie(&login_res))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["user"]["username"], "ada");
    assert_eq!(body["user"]["email"], "ada@uwaterloo.ca");
    assert_eq!(body["user"]["profile"]["firstName"], "Ada");
    assert_eq!(body["user"]["profile"]["profilePhoto"], "/avatars/1.jpg");
}

#[rstest]
#[case(actix_test::TestRequest::get().uri("/api/v1/users/me"))]
#[case(actix_test::TestRequest::put().uri("/api/v1/users/me/profile").set_json(json!({})))]
#[case(actix_test::TestRequest::post().uri("/api/v1/logout"))]
#[actix_web::test]
async fn session_routes_require_login(#[case] request: actix_test::TestRequest) {
    let app = app!(MockPorts::default());
    let res = actix_test::call_service(&app, request.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn update_profile_forwards_patch() {
    let user = fixture_user();
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_update_profile()
        .withf(move |id, patch| {
            *id == user
                && patch.term.as_deref() == Some("3A")
                && patch.favorite_artists == Some(vec!["Drake".to_owned()])
                && patch.first_name.is_none()
        })
        .return_once(move |id, _| {
            let mut updated = account(*id);
            updated.member.profile.term = "3A".into();
            Ok(updated)
        });
    let app = app!(ports);

    let sign_in_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/sign-in").to_request(),
    )
    .await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/users/me/profile")
            .cookie(session_cookie(&sign_in_res))
            .set_json(json!({"term": "3A", "favoriteArtists": ["Drake"]}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["user"]["profile"]["term"], "3A");
}

#[actix_web::test]
async fn logout_purges_session() {
    let app = app!(MockPorts::default());
    let sign_in_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/sign-in").to_request(),
    )
    .await;
    let cookie = session_cookie(&sign_in_res);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let removal = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("removal cookie");
    assert_eq!(removal.value(), "");
}
