//! HTTP route handlers for the site API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Health check
//!
//! # Verification
//! POST /api/verify-recaptcha      - Assess a frontend reCAPTCHA token
//!
//! # Assistant
//! POST /api/assistant/chat        - Answer a visitor question
//! POST /api/assistant/search      - Rank supplied content against a query
//!
//! # Auth
//! POST /api/auth/signup           - Create an email/password account
//! POST /api/auth/login            - Email/password sign-in
//! POST /api/auth/google           - Google federated sign-in
//! POST /api/auth/logout           - Tear down the server-side session state
//! POST /api/auth/password-reset   - Dispatch a password-reset email
//!
//! # Profile (requires bearer id token)
//! GET   /api/profile              - Read the caller's profile
//! PATCH /api/profile              - Partial profile update
//! ```

pub mod assistant;
pub mod auth;
pub mod profile;
pub mod recaptcha;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the assistant routes router.
pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(assistant::chat))
        .route("/search", post(assistant::search))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/google", post(auth::google))
        .route("/logout", post(auth::logout))
        .route("/password-reset", post(auth::password_reset))
}

/// Create all API routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/verify-recaptcha", post(recaptcha::verify))
        .nest("/api/assistant", assistant_routes())
        .nest("/api/auth", auth_routes())
        .route(
            "/api/profile",
            get(profile::show).patch(profile::update),
        )
}
