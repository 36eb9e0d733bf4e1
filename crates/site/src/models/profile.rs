//! User profile record mirrored from the realtime database.
//!
//! The database owns the record at `users/{uid}`; this process only holds a
//! cached mirror. Field names follow the stored JSON, including the legacy
//! `photoURL` casing.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use sentryline_core::AuthProvider;

/// A user's profile record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name shown in the account area.
    #[serde(default)]
    pub display_name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Phone number, national format.
    #[serde(default)]
    pub phone: String,
    /// Dialing prefix (e.g., "+44").
    #[serde(default)]
    pub country_code: String,
    /// Country of residence.
    #[serde(default)]
    pub country: String,
    /// Postal address.
    #[serde(default)]
    pub address: Address,
    /// Self-reported gender.
    #[serde(default)]
    pub gender: String,
    /// Avatar URL.
    #[serde(rename = "photoURL", default)]
    pub photo_url: String,
    /// How the account was created.
    pub provider: AuthProvider,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
}

impl UserProfile {
    /// A fresh profile for a new sign-up, stamped with the current time.
    #[must_use]
    pub fn new(display_name: &str, email: &str, provider: AuthProvider) -> Self {
        Self {
            display_name: display_name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            country_code: String::new(),
            country: String::new(),
            address: Address::default(),
            gender: String::new(),
            photo_url: String::new(),
            provider,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(v) = &update.display_name {
            self.display_name.clone_from(v);
        }
        if let Some(v) = &update.email {
            self.email.clone_from(v);
        }
        if let Some(v) = &update.phone {
            self.phone.clone_from(v);
        }
        if let Some(v) = &update.country_code {
            self.country_code.clone_from(v);
        }
        if let Some(v) = &update.country {
            self.country.clone_from(v);
        }
        if let Some(v) = &update.address {
            self.address = v.clone();
        }
        if let Some(v) = &update.gender {
            self.gender.clone_from(v);
        }
        if let Some(v) = &update.photo_url {
            self.photo_url.clone_from(v);
        }
    }
}

/// Postal address fields on the profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub street: String,
}

/// A partial profile update.
///
/// Serialized with absent fields skipped so a PATCH only touches the fields
/// the caller set. `provider` and `createdAt` are deliberately not updatable
/// through this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update touches no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.country_code.is_none()
            && self.country.is_none()
            && self.address.is_none()
            && self.gender.is_none()
            && self.photo_url.is_none()
    }

    /// The refresh written on a returning Google login: name, email, photo
    /// only.
    #[must_use]
    pub fn google_refresh(display_name: &str, email: &str, photo_url: &str) -> Self {
        Self {
            display_name: Some(display_name.to_string()),
            email: Some(email.to_string()),
            photo_url: Some(photo_url.to_string()),
            ..Self::default()
        }
    }
}
