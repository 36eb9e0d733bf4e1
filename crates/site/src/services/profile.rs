//! Auth/profile service.
//!
//! Wraps the Firebase clients with the account flows the site exposes and
//! maintains the profile mirror: a per-uid cached copy of `users/{uid}`
//! kept current by the database's SSE change feed. The subscription is the
//! one resource with a lifecycle here - it is started on sign-in and must be
//! torn down on sign-out so no listener outlives its session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use moka::future::Cache;
use secrecy::SecretString;
use tokio::task::JoinHandle;
use tracing::{instrument, warn};

use sentryline_core::{AuthProvider, Email, EmailError, Uid};

use crate::firebase::{
    AuthSession, FirebaseAuthClient, FirebaseError, GoogleSignIn, ProfileEvent, RealtimeDbClient,
};
use crate::models::profile::{ProfileUpdate, UserProfile};

/// Mirror capacity; the site never has more concurrent sessions than this.
const MIRROR_CAPACITY: u64 = 10_000;

/// Errors that can occur in the profile service.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The email failed structural validation before any network call.
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    /// A Firebase operation failed.
    #[error(transparent)]
    Firebase(#[from] FirebaseError),

    /// No profile record exists for the user.
    #[error("profile not found")]
    NotFound,
}

/// Per-uid cached profiles plus their feeding subscriptions.
struct ProfileMirror {
    cache: Cache<Uid, UserProfile>,
    /// Subscription tasks by uid. Guarded by a sync mutex; critical sections
    /// never await.
    subscriptions: Mutex<HashMap<Uid, JoinHandle<()>>>,
}

impl ProfileMirror {
    fn new() -> Self {
        Self {
            cache: Cache::new(MIRROR_CAPACITY),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Replace any existing subscription task for this uid.
    fn track(&self, uid: Uid, handle: JoinHandle<()>) {
        let mut subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = subscriptions.insert(uid, handle) {
            previous.abort();
        }
    }

    /// Tear down the subscription and drop the cached profile.
    async fn teardown(&self, uid: &Uid) {
        let handle = {
            let mut subscriptions = self
                .subscriptions
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            subscriptions.remove(uid)
        };
        if let Some(handle) = handle {
            handle.abort();
        }
        self.cache.invalidate(uid).await;
    }
}

impl Drop for ProfileMirror {
    fn drop(&mut self) {
        let subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for handle in subscriptions.values() {
            handle.abort();
        }
    }
}

/// Auth/profile service.
#[derive(Clone)]
pub struct ProfileService {
    inner: Arc<ProfileServiceInner>,
}

struct ProfileServiceInner {
    auth: FirebaseAuthClient,
    db: RealtimeDbClient,
    mirror: ProfileMirror,
    base_url: String,
}

impl ProfileService {
    /// Create a new service.
    #[must_use]
    pub fn new(auth: FirebaseAuthClient, db: RealtimeDbClient, base_url: String) -> Self {
        Self {
            inner: Arc::new(ProfileServiceInner {
                auth,
                db,
                mirror: ProfileMirror::new(),
                base_url,
            }),
        }
    }

    /// Create an email/password account and write its initial profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Email` for a structurally invalid address and
    /// `ProfileError::Firebase` for provider rejections (duplicate email,
    /// weak password) or a failed profile write.
    #[instrument(skip(self, password))]
    pub async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthSession, ProfileError> {
        let email = Email::parse(email)?;
        let session = self.inner.auth.sign_up(&email, password).await?;

        let profile = UserProfile::new(display_name, email.as_str(), AuthProvider::Email);
        self.inner
            .db
            .put_profile(&session.uid, &profile, &session.id_token)
            .await?;

        self.start_mirror(&session, Some(profile));
        Ok(session)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Firebase` with
    /// `AuthApiError::InvalidLoginCredentials` for a wrong pair.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ProfileError> {
        let email = Email::parse(email)?;
        let session = self.inner.auth.sign_in(&email, password).await?;
        self.start_mirror(&session, None);
        Ok(session)
    }

    /// Sign in with a Google id token.
    ///
    /// First-ever login writes a fresh profile with `provider: google`.
    /// Returning logins refresh only name/email/photo, and only when the
    /// stored record's provider is `google` - an email-password account with
    /// the same address is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Firebase` when the provider rejects the token
    /// or a profile read/write fails.
    #[instrument(skip(self, google_id_token))]
    pub async fn sign_in_with_google(
        &self,
        google_id_token: &str,
    ) -> Result<AuthSession, ProfileError> {
        let sign_in = self
            .inner
            .auth
            .sign_in_with_google(google_id_token, &self.inner.base_url)
            .await?;

        let profile = self.reconcile_google_profile(&sign_in).await?;
        let GoogleSignIn { session, .. } = sign_in;

        self.start_mirror(&session, Some(profile));
        Ok(session)
    }

    /// Apply the Google-login profile rules and return the stored record.
    async fn reconcile_google_profile(
        &self,
        sign_in: &GoogleSignIn,
    ) -> Result<UserProfile, ProfileError> {
        let session = &sign_in.session;
        let existing = self
            .inner
            .db
            .get_profile(&session.uid, &session.id_token)
            .await?;

        match existing {
            None => {
                let mut profile =
                    UserProfile::new(&sign_in.display_name, &sign_in.email, AuthProvider::Google);
                profile.photo_url.clone_from(&sign_in.photo_url);
                self.inner
                    .db
                    .put_profile(&session.uid, &profile, &session.id_token)
                    .await?;
                Ok(profile)
            }
            Some(mut profile) if profile.provider == AuthProvider::Google => {
                let update = ProfileUpdate::google_refresh(
                    &sign_in.display_name,
                    &sign_in.email,
                    &sign_in.photo_url,
                );
                self.inner
                    .db
                    .patch_profile(&session.uid, &update, &session.id_token)
                    .await?;
                profile.apply(&update);
                Ok(profile)
            }
            // The account was created another way; do not overwrite it.
            Some(profile) => Ok(profile),
        }
    }

    /// Sign out: tear down the mirror subscription and cached profile.
    ///
    /// The hosted provider holds no server-side session for us to revoke;
    /// dropping the tokens client-side ends the session.
    #[instrument(skip(self))]
    pub async fn sign_out(&self, uid: &Uid) {
        self.inner.mirror.teardown(uid).await;
    }

    /// Read the user's profile, preferring the mirror.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` when no record exists.
    #[instrument(skip(self, id_token))]
    pub async fn profile(
        &self,
        uid: &Uid,
        id_token: &SecretString,
    ) -> Result<UserProfile, ProfileError> {
        if let Some(profile) = self.inner.mirror.cache.get(uid).await {
            return Ok(profile);
        }

        let profile = self
            .inner
            .db
            .get_profile(uid, id_token)
            .await?
            .ok_or(ProfileError::NotFound)?;
        self.inner.mirror.cache.insert(uid.clone(), profile.clone()).await;
        Ok(profile)
    }

    /// Apply a partial profile update.
    ///
    /// Pass-through to the database PATCH; concurrent writers are not
    /// coordinated (last write wins, as the database does natively).
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Firebase` when the database rejects the write.
    #[instrument(skip(self, update, id_token))]
    pub async fn update_profile(
        &self,
        uid: &Uid,
        update: &ProfileUpdate,
        id_token: &SecretString,
    ) -> Result<(), ProfileError> {
        if update.is_empty() {
            return Ok(());
        }

        self.inner.db.patch_profile(uid, update, id_token).await?;

        // Keep the mirror coherent even when no subscription is running.
        if let Some(mut profile) = self.inner.mirror.cache.get(uid).await {
            profile.apply(update);
            self.inner.mirror.cache.insert(uid.clone(), profile).await;
        }

        Ok(())
    }

    /// Dispatch a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Email` for an invalid address and
    /// `ProfileError::Firebase` when the provider rejects the dispatch.
    #[instrument(skip(self))]
    pub async fn send_password_reset(&self, email: &str) -> Result<(), ProfileError> {
        let email = Email::parse(email)?;
        self.inner.auth.send_password_reset(&email).await?;
        Ok(())
    }

    /// Seed the mirror and start the change subscription for a session.
    fn start_mirror(&self, session: &AuthSession, seed: Option<UserProfile>) {
        let uid = session.uid.clone();
        let id_token = session.id_token.clone();
        let db = self.inner.db.clone();
        let cache = self.inner.mirror.cache.clone();

        let task_uid = uid.clone();
        let handle = tokio::spawn(async move {
            if let Some(profile) = seed {
                cache.insert(task_uid.clone(), profile).await;
            }
            run_subscription(db, cache, task_uid, id_token).await;
        });

        self.inner.mirror.track(uid, handle);
    }
}

/// Consume the change feed for one uid until it ends or auth is revoked.
async fn run_subscription(
    db: RealtimeDbClient,
    cache: Cache<Uid, UserProfile>,
    uid: Uid,
    id_token: SecretString,
) {
    let stream = match db.subscribe(&uid, &id_token).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(uid = %uid, error = %e, "profile subscription failed to start");
            return;
        }
    };

    let mut stream = std::pin::pin!(stream);
    while let Some(event) = stream.next().await {
        match event {
            Ok(ProfileEvent::Put { path, data }) if path == "/" => {
                match serde_json::from_value::<Option<UserProfile>>(data) {
                    Ok(Some(profile)) => cache.insert(uid.clone(), profile).await,
                    Ok(None) => cache.invalidate(&uid).await,
                    Err(e) => {
                        warn!(uid = %uid, error = %e, "unparseable profile snapshot");
                        cache.invalidate(&uid).await;
                    }
                }
            }
            // Sub-path puts and patches: refetch rather than splice JSON.
            Ok(ProfileEvent::Put { .. } | ProfileEvent::Patch { .. }) => {
                match db.get_profile(&uid, &id_token).await {
                    Ok(Some(profile)) => cache.insert(uid.clone(), profile).await,
                    Ok(None) => cache.invalidate(&uid).await,
                    Err(e) => {
                        warn!(uid = %uid, error = %e, "profile refetch failed");
                    }
                }
            }
            Ok(ProfileEvent::KeepAlive) => {}
            Ok(ProfileEvent::Cancel | ProfileEvent::AuthRevoked) => {
                cache.invalidate(&uid).await;
                return;
            }
            Err(e) => {
                warn!(uid = %uid, error = %e, "profile subscription error");
            }
        }
    }

    // Stream ended; the cached copy can no longer be trusted.
    cache.invalidate(&uid).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProfileService>();
    }

    #[test]
    fn test_profile_error_display() {
        let err = ProfileError::NotFound;
        assert_eq!(err.to_string(), "profile not found");
    }
}
