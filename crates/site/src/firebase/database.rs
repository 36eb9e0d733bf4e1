//! Realtime Database REST client for `users/{uid}`.
//!
//! Requests are authorized with the signed-in user's id token, so the
//! database's own security rules decide access; this process adds no
//! authorization of its own. Besides plain CRUD, the database exposes an SSE
//! change feed which backs the profile mirror.

use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use sentryline_core::Uid;

use crate::config::FirebaseConfig;
use crate::models::profile::{ProfileUpdate, UserProfile};

use super::error::FirebaseError;

/// A change event from the database's SSE feed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileEvent {
    /// The value at `path` was replaced.
    Put {
        /// Path relative to the subscribed location (`/` is the root).
        path: String,
        /// New value; `null` means deleted.
        data: serde_json::Value,
    },
    /// Children at `path` were merged.
    Patch {
        /// Path relative to the subscribed location.
        path: String,
        /// Merged children.
        data: serde_json::Value,
    },
    /// Periodic keep-alive.
    KeepAlive,
    /// The server revoked the subscription (rules changed, location deleted).
    Cancel,
    /// The auth token expired; the subscriber must reconnect.
    AuthRevoked,
}

/// Realtime Database client.
#[derive(Clone)]
pub struct RealtimeDbClient {
    inner: Arc<RealtimeDbClientInner>,
}

struct RealtimeDbClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl RealtimeDbClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &FirebaseConfig, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(RealtimeDbClientInner {
                client,
                base_url: config.database_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    fn profile_url(&self, uid: &Uid, id_token: &SecretString) -> String {
        format!(
            "{}/users/{}.json?auth={}",
            self.inner.base_url,
            uid,
            urlencoding::encode(id_token.expose_secret())
        )
    }

    /// Fetch the profile record, `None` when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError::Api` when the database rules reject the read.
    #[instrument(skip(self, id_token), fields(uid = %uid))]
    pub async fn get_profile(
        &self,
        uid: &Uid,
        id_token: &SecretString,
    ) -> Result<Option<UserProfile>, FirebaseError> {
        let response = self
            .inner
            .client
            .get(self.profile_url(uid, id_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FirebaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // An absent record reads as JSON `null`.
        response
            .json::<Option<UserProfile>>()
            .await
            .map_err(|e| FirebaseError::Parse(e.to_string()))
    }

    /// Write the full profile record.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError::Api` when the database rules reject the write.
    #[instrument(skip(self, profile, id_token), fields(uid = %uid))]
    pub async fn put_profile(
        &self,
        uid: &Uid,
        profile: &UserProfile,
        id_token: &SecretString,
    ) -> Result<(), FirebaseError> {
        let response = self
            .inner
            .client
            .put(self.profile_url(uid, id_token))
            .json(profile)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FirebaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Merge a partial update into the profile record.
    ///
    /// Only the fields set on `update` are written; the database merges them
    /// natively (last write wins, no coordination here).
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError::Api` when the database rules reject the write.
    #[instrument(skip(self, update, id_token), fields(uid = %uid))]
    pub async fn patch_profile(
        &self,
        uid: &Uid,
        update: &ProfileUpdate,
        id_token: &SecretString,
    ) -> Result<(), FirebaseError> {
        let response = self
            .inner
            .client
            .patch(self.profile_url(uid, id_token))
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FirebaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Subscribe to changes at `users/{uid}`.
    ///
    /// Returns a stream of [`ProfileEvent`]s parsed from the database's SSE
    /// feed. The stream ends when the server closes the connection; the
    /// caller owns reconnection (the mirror simply drops its cache entry).
    ///
    /// # Errors
    ///
    /// Returns an error if the initial request fails.
    #[instrument(skip(self, id_token), fields(uid = %uid))]
    pub async fn subscribe(
        &self,
        uid: &Uid,
        id_token: &SecretString,
    ) -> Result<impl Stream<Item = Result<ProfileEvent, FirebaseError>> + use<>, FirebaseError>
    {
        let response = self
            .inner
            .client
            .get(self.profile_url(uid, id_token))
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FirebaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(stream! {
            use futures::StreamExt;

            let mut buffer = String::new();
            let mut byte_stream = std::pin::pin!(response.bytes_stream());

            while let Some(chunk_result) = byte_stream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        let text = match std::str::from_utf8(&chunk) {
                            Ok(t) => t,
                            Err(e) => {
                                yield Err(FirebaseError::Stream(format!("Invalid UTF-8: {e}")));
                                continue;
                            }
                        };

                        buffer.push_str(text);

                        // Process complete SSE events
                        while let Some(event) = extract_sse_event(&mut buffer) {
                            if let Some(parsed) = parse_profile_event(&event) {
                                yield parsed;
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(FirebaseError::Stream(e.to_string()));
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for RealtimeDbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeDbClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Extract a complete SSE event from the buffer.
///
/// Returns `Some(event)` if a complete event was found (and removes it from
/// buffer), or `None` if no complete event is available yet.
fn extract_sse_event(buffer: &mut String) -> Option<String> {
    // SSE events are separated by double newlines
    buffer.find("\n\n").map(|idx| {
        let event = buffer[..idx].to_string();
        *buffer = buffer[idx + 2..].to_string();
        event
    })
}

/// Payload of a put/patch event.
#[derive(Debug, Deserialize)]
struct ChangePayload {
    path: String,
    data: serde_json::Value,
}

/// Parse an SSE event block into a [`ProfileEvent`].
fn parse_profile_event(event: &str) -> Option<Result<ProfileEvent, FirebaseError>> {
    if event.trim().is_empty() {
        return None;
    }

    // SSE format: "event: <name>\ndata: <json>"
    let mut name = None;
    let mut data_line = None;

    for line in event.lines() {
        if let Some(stripped) = line.strip_prefix("event: ") {
            name = Some(stripped.trim());
        } else if let Some(stripped) = line.strip_prefix("data: ") {
            data_line = Some(stripped);
        }
    }

    match name? {
        "keep-alive" => Some(Ok(ProfileEvent::KeepAlive)),
        "cancel" => Some(Ok(ProfileEvent::Cancel)),
        "auth_revoked" => Some(Ok(ProfileEvent::AuthRevoked)),
        kind @ ("put" | "patch") => {
            let data = data_line?;
            match serde_json::from_str::<ChangePayload>(data) {
                Ok(payload) => Some(Ok(if kind == "put" {
                    ProfileEvent::Put {
                        path: payload.path,
                        data: payload.data,
                    }
                } else {
                    ProfileEvent::Patch {
                        path: payload.path,
                        data: payload.data,
                    }
                })),
                Err(e) => Some(Err(FirebaseError::Parse(format!(
                    "Failed to parse change event: {e}"
                )))),
            }
        }
        other => Some(Err(FirebaseError::Stream(format!(
            "unexpected event type: {other}"
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sse_event() {
        let mut buffer =
            "event: put\ndata: {\"path\":\"/\",\"data\":null}\n\nevent: keep-alive\ndata: null\n\n"
                .to_string();

        let event1 = extract_sse_event(&mut buffer);
        assert!(event1.is_some());
        assert!(event1.expect("no event").contains("put"));

        let event2 = extract_sse_event(&mut buffer);
        assert!(event2.is_some());

        let event3 = extract_sse_event(&mut buffer);
        assert!(event3.is_none());
    }

    #[test]
    fn test_extract_sse_event_incomplete() {
        let mut buffer = "event: put\ndata: {\"partial".to_string();
        let event = extract_sse_event(&mut buffer);
        assert!(event.is_none());
        assert_eq!(buffer, "event: put\ndata: {\"partial");
    }

    #[test]
    fn test_parse_put_event() {
        let event = "event: put\ndata: {\"path\":\"/\",\"data\":{\"displayName\":\"Dana\"}}";
        let parsed = parse_profile_event(event)
            .expect("event expected")
            .expect("parse ok");
        assert!(matches!(
            parsed,
            ProfileEvent::Put { path, data } if path == "/" && data["displayName"] == "Dana"
        ));
    }

    #[test]
    fn test_parse_patch_event() {
        let event = "event: patch\ndata: {\"path\":\"/address\",\"data\":{\"city\":\"Lisbon\"}}";
        let parsed = parse_profile_event(event)
            .expect("event expected")
            .expect("parse ok");
        assert!(matches!(parsed, ProfileEvent::Patch { path, .. } if path == "/address"));
    }

    #[test]
    fn test_parse_keep_alive() {
        let event = "event: keep-alive\ndata: null";
        let parsed = parse_profile_event(event)
            .expect("event expected")
            .expect("parse ok");
        assert_eq!(parsed, ProfileEvent::KeepAlive);
    }

    #[test]
    fn test_parse_auth_revoked() {
        let event = "event: auth_revoked\ndata: \"token expired\"";
        let parsed = parse_profile_event(event)
            .expect("event expected")
            .expect("parse ok");
        assert_eq!(parsed, ProfileEvent::AuthRevoked);
    }

    #[test]
    fn test_parse_empty_event() {
        assert!(parse_profile_event("").is_none());
    }
}
