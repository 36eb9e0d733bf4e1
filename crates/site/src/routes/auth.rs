//! Auth endpoints: thin JSON wrappers over the profile service.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use sentryline_core::Uid;

use crate::error::{AppError, Result};
use crate::firebase::AuthSession;
use crate::state::AppState;

/// Request body for `POST /api/auth/signup`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /api/auth/google`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest {
    /// Google-issued id token from the frontend sign-in flow.
    pub id_token: String,
}

/// Request body for `POST /api/auth/logout`.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub uid: String,
}

/// Request body for `POST /api/auth/password-reset`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// A session as returned to the frontend. The tokens belong to the signed-in
/// user; this is the one place they legitimately leave the process.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBody {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl From<AuthSession> for SessionBody {
    fn from(session: AuthSession) -> Self {
        Self {
            uid: session.uid.into_inner(),
            email: session.email,
            id_token: session.id_token.expose_secret().to_string(),
            refresh_token: session.refresh_token.expose_secret().to_string(),
            expires_in: session.expires_in,
        }
    }
}

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SessionBody>> {
    if request.password.is_empty() {
        return Err(AppError::BadRequest("Missing password".to_string()));
    }

    let session = state
        .profiles()
        .sign_up_with_email(&request.email, &request.password, &request.display_name)
        .await?;
    Ok(Json(session.into()))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionBody>> {
    if request.password.is_empty() {
        return Err(AppError::BadRequest("Missing password".to_string()));
    }

    let session = state
        .profiles()
        .sign_in_with_email(&request.email, &request.password)
        .await?;
    Ok(Json(session.into()))
}

/// `POST /api/auth/google`
pub async fn google(
    State(state): State<AppState>,
    Json(request): Json<GoogleRequest>,
) -> Result<Json<SessionBody>> {
    if request.id_token.trim().is_empty() {
        return Err(AppError::BadRequest("Missing Google id token".to_string()));
    }

    let session = state
        .profiles()
        .sign_in_with_google(request.id_token.trim())
        .await?;
    Ok(Json(session.into()))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode> {
    let uid = Uid::parse(&request.uid)
        .map_err(|e| AppError::BadRequest(format!("Invalid uid: {e}")))?;
    state.profiles().sign_out(&uid).await;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/auth/password-reset`
pub async fn password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<StatusCode> {
    state.profiles().send_password_reset(&request.email).await?;
    Ok(StatusCode::NO_CONTENT)
}
