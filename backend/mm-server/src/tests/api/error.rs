use crate::ApiError;

use mm_core::RateLimiter;
use mm_sse::{EventType, SseError};

use std::panic::Location;
use std::str::FromStr;

use axum::response::IntoResponse;
use error_location::ErrorLocation;
use http::StatusCode;
use http_body_util::BodyExt;

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn given_validation_error_when_rendered_then_400_with_field() {
    let error = ApiError::validation("client_id is required", "client_id");

    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "client_id is required");
    assert_eq!(json["error"]["field"], "client_id");
}

#[tokio::test]
async fn given_exhausted_limiter_when_converted_then_429_with_retry_after() {
    // Given
    let limiter = RateLimiter::new(1, 60).unwrap();
    limiter.check("tab-1").unwrap();
    let core_error = limiter.check("tab-1").unwrap_err();

    // When
    let response = ApiError::from(core_error).into_response();

    // Then
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[http::header::RETRY_AFTER], "60");
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn given_unknown_event_type_when_converted_then_400_on_type_field() {
    let sse_error = EventType::from_str("meeting:exploded").unwrap_err();

    let response = ApiError::from(sse_error).into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["field"], "type");
}

#[tokio::test]
async fn given_transport_error_when_converted_then_500_without_field() {
    let response = ApiError::from(SseError::sink_closed()).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    assert!(json["error"].get("field").is_none());
}

#[tokio::test]
async fn given_unavailable_error_when_rendered_then_503() {
    let error = ApiError::Unavailable {
        message: "Server is shutting down".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "UNAVAILABLE");
}
