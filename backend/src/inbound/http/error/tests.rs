//! Tests for HTTP error mapping.

use super::*;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn internal_error_case() -> Error {
    Error::internal("partial unmatch failure")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"concert": "vv1"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn render(error: Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(&error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    (status, header, payload)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(internal_error_case: Error) {
    let (status, header, payload) = render(internal_error_case).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.code(), ErrorCode::InternalError);
    assert_eq!(payload.message(), "Internal server error");
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let error = Error::invalid_request("Failed to process matching")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"code": "matching_not_processable"}));
    let (status, header, payload) = render(error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.message(), "Failed to process matching");
    assert_eq!(
        payload.details(),
        Some(&json!({"code": "matching_not_processable"}))
    );
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let (status, header, payload) = render(Error::not_found("Concert not found")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(header.is_none());
    assert_eq!(payload.trace_id(), None);
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}

mod extractor_errors {
    use super::*;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Deserialize)]
    struct Body {
        #[allow(dead_code, reason = "only deserialised")]
        concert: String,
    }

    #[derive(Deserialize)]
    struct Params {
        #[allow(dead_code, reason = "only deserialised")]
        onsale_soon: bool,
    }

    async fn accept_body(_: web::Json<Body>) -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    async fn accept_query(_: web::Query<Params>) -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[rstest]
    #[case("{not json", "application/json")]
    #[case(r#"{"concert": 7}"#, "application/json")]
    #[case(r#"{"concert": "x"}"#, "text/plain")]
    #[actix_web::test]
    async fn malformed_bodies_render_as_invalid_json(
        #[case] body: &'static str,
        #[case] content_type: &'static str,
    ) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .route("/", web::post().to(accept_body)),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/")
                .insert_header(("content-type", content_type))
                .set_payload(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let payload: Value = actix_test::read_body_json(res).await;
        assert_eq!(payload["code"], "invalid_request");
        assert_eq!(payload["details"]["code"], "invalid_json");
    }

    #[actix_web::test]
    async fn bad_query_strings_render_as_invalid_query() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .route("/", web::get().to(accept_query)),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/?onsale_soon=maybe")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let payload: Value = actix_test::read_body_json(res).await;
        assert_eq!(payload["details"]["code"], "invalid_query");
    }
}
