//! Profile endpoints.
//!
//! The caller proves who they are with the Firebase id token in the
//! `Authorization` header; the database enforces that the token actually
//! grants access to `users/{uid}`, so a forged uid fails at the provider.

use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, header, request::Parts},
};
use secrecy::SecretString;

use sentryline_core::Uid;

use crate::error::{AppError, Result};
use crate::models::profile::{ProfileUpdate, UserProfile};
use crate::state::AppState;

/// Header carrying the caller's uid alongside the bearer token.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, extracted from request headers.
#[derive(Clone)]
pub struct UserIdentity {
    pub uid: Uid,
    pub id_token: SecretString,
}

impl std::fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserIdentity")
            .field("uid", &self.uid)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let uid = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing user id header".to_string()))?;
        let uid =
            Uid::parse(uid).map_err(|e| AppError::Unauthorized(format!("Invalid uid: {e}")))?;

        Ok(Self {
            uid,
            id_token: SecretString::from(token.to_string()),
        })
    }
}

/// `GET /api/profile`
pub async fn show(
    State(state): State<AppState>,
    identity: UserIdentity,
) -> Result<Json<UserProfile>> {
    let profile = state
        .profiles()
        .profile(&identity.uid, &identity.id_token)
        .await?;
    Ok(Json(profile))
}

/// `PATCH /api/profile`
pub async fn update(
    State(state): State<AppState>,
    identity: UserIdentity,
    Json(update): Json<ProfileUpdate>,
) -> Result<StatusCode> {
    state
        .profiles()
        .update_profile(&identity.uid, &update, &identity.id_token)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    async fn extract(request: Request<Body>) -> Result<UserIdentity> {
        let (mut parts, _) = request.into_parts();
        UserIdentity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_identity_from_headers() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer eyJtoken")
            .header(USER_ID_HEADER, "abc123")
            .body(Body::empty())
            .expect("request");

        let identity = extract(request).await.expect("identity");
        assert_eq!(identity.uid.as_str(), "abc123");
    }

    #[tokio::test]
    async fn test_missing_bearer_is_unauthorized() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "abc123")
            .body(Body::empty())
            .expect("request");

        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_uid_is_unauthorized() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer t")
            .header(USER_ID_HEADER, "users/abc")
            .body(Body::empty())
            .expect("request");

        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_debug_redacts_token() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer super_secret_token")
            .header(USER_ID_HEADER, "abc123")
            .body(Body::empty())
            .expect("request");

        let identity = extract(request).await.expect("identity");
        let debug_output = format!("{identity:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
