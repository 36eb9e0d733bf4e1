//! Router-level tests for the site API.
//!
//! Every request here must be resolved by the validation or auth-extraction
//! layers; none may reach an external provider.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use sentryline_integration_tests::test_app;

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_health_returns_ok() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/nope")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Verification endpoint
// =============================================================================

#[tokio::test]
async fn test_verify_missing_token_is_400() {
    let response = test_app()
        .oneshot(json_post(
            "/api/verify-recaptcha",
            r#"{"action":"login"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing reCAPTCHA token");
}

#[tokio::test]
async fn test_verify_blank_token_is_400() {
    let response = test_app()
        .oneshot(json_post(
            "/api/verify-recaptcha",
            r#"{"token":"   ","action":"login"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_missing_action_is_400() {
    let response = test_app()
        .oneshot(json_post(
            "/api/verify-recaptcha",
            r#"{"token":"tok"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing expected action");
}

// =============================================================================
// Assistant endpoints
// =============================================================================

#[tokio::test]
async fn test_chat_blank_query_is_400() {
    let response = test_app()
        .oneshot(json_post("/api/assistant/chat", r#"{"query":"  "}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Query must not be empty");
}

#[tokio::test]
async fn test_search_blank_query_is_400() {
    let response = test_app()
        .oneshot(json_post("/api/assistant/search", r#"{"query":""}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Auth endpoints
// =============================================================================

#[tokio::test]
async fn test_signup_missing_password_is_400() {
    let response = test_app()
        .oneshot(json_post(
            "/api/auth/signup",
            r#"{"email":"a@b.c","password":""}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_invalid_email_is_400() {
    let response = test_app()
        .oneshot(json_post(
            "/api/auth/signup",
            r#"{"email":"not-an-email","password":"hunter22"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid email address");
}

#[tokio::test]
async fn test_google_blank_token_is_400() {
    let response = test_app()
        .oneshot(json_post("/api/auth/google", r#"{"idToken":" "}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_invalid_uid_is_400() {
    let response = test_app()
        .oneshot(json_post("/api/auth/logout", r#"{"uid":"users/abc"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_valid_uid_is_204() {
    // Logging out a uid with no live session is a no-op, not an error.
    let response = test_app()
        .oneshot(json_post("/api/auth/logout", r#"{"uid":"abc123"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_password_reset_invalid_email_is_400() {
    let response = test_app()
        .oneshot(json_post(
            "/api/auth/password-reset",
            r#"{"email":"missing-at-sign"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Profile endpoints
// =============================================================================

#[tokio::test]
async fn test_profile_without_bearer_is_401() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/profile")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_without_uid_header_is_401() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/profile")
                .header(header::AUTHORIZATION, "Bearer some-token")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_patch_bad_uid_is_401() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/profile")
                .header(header::AUTHORIZATION, "Bearer some-token")
                .header("x-user-id", "not a uid")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"phone":"5551234"}"#))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
