//! Records held by the session store.
//!
//! Field names serialize in camelCase so the persisted association lists keep
//! the same shape as the browser local-storage entries they mirror.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Channel the one-time code is delivered through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    #[default]
    Email,
    Phone,
}

impl VerificationMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VerificationMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            other => Err(format!("unknown verification method: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: String,
    pub name: String,
    pub flag: String,
    pub phone_code: String,
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.flag, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Image as a `data:` URL.
    pub avatar: Option<String>,
    pub username: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub country: Country,
    pub phone: String,
    pub website: String,
    pub is_verified: bool,
    pub verification_method: VerificationMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn from_registration(id: Uuid, data: RegistrationData, now: DateTime<Utc>) -> Self {
        Self {
            id,
            avatar: data.avatar,
            username: data.username,
            email: data.email,
            birth_date: data.birth_date,
            country: data.country,
            phone: data.phone,
            website: data.website,
            is_verified: false,
            verification_method: data.verification_method,
            created_at: now,
            updated_at: now,
        }
    }

    /// Where the code for this user goes: the email address or the phone number.
    #[must_use]
    pub fn destination(&self) -> &str {
        match self.verification_method {
            VerificationMethod::Email => &self.email,
            VerificationMethod::Phone => &self.phone,
        }
    }

    /// Merge the mutable profile fields and bump `updated_at`.
    ///
    /// Identity and verification fields are never touched.
    pub(crate) fn apply(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(birth_date) = update.birth_date {
            self.birth_date = birth_date;
        }
        if let Some(country) = update.country {
            self.country = country;
        }
        if let Some(website) = update.website {
            self.website = website;
        }
        self.updated_at = now;
    }
}

/// Everything needed to create a [`User`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
    pub avatar: Option<String>,
    pub username: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub country: Country,
    pub phone: String,
    pub website: String,
    pub verification_method: VerificationMethod,
}

/// Partial profile edit. `None` leaves a field as it is; for the avatar,
/// `Some(None)` removes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub avatar: Option<Option<String>>,
    pub username: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub country: Option<Country>,
    pub website: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_avatar(mut self, avatar: Option<String>) -> Self {
        self.avatar = Some(avatar);
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    #[must_use]
    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: Country) -> Self {
        self.country = Some(country);
        self
    }

    #[must_use]
    pub fn with_website(mut self, website: String) -> Self {
        self.website = Some(website);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.avatar.is_none()
            && self.username.is_none()
            && self.birth_date.is_none()
            && self.country.is_none()
            && self.website.is_none()
    }
}

/// Where a verification session stands at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Expired,
    Exhausted,
}

/// A time-boxed, attempt-limited challenge for one user and one code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSession {
    user_id: Uuid,
    code: String,
    method: VerificationMethod,
    expires_at: DateTime<Utc>,
    attempts: u32,
    max_attempts: u32,
}

impl VerificationSession {
    pub(crate) fn new(
        user_id: Uuid,
        code: String,
        method: VerificationMethod,
        now: DateTime<Utc>,
        ttl: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            user_id,
            code,
            method,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            attempts: 0,
            max_attempts,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    #[must_use]
    pub fn method(&self) -> VerificationMethod {
        self.method
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Expiry takes precedence over exhaustion, mirroring the verification order.
    #[must_use]
    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        if self.is_expired(now) {
            SessionState::Expired
        } else if self.is_exhausted() {
            SessionState::Exhausted
        } else {
            SessionState::Active
        }
    }

    /// Seconds left before expiry, zero once expired.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.expires_at - now).num_seconds()).unwrap_or(0)
    }

    pub(crate) fn code_matches(&self, code: &str) -> bool {
        self.code == code
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    #[cfg(test)]
    pub(crate) fn code(&self) -> &str {
        &self.code
    }
}

/// The signed-in user; exists only while authenticated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user: User,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn country() -> Country {
        Country {
            code: "DE".to_string(),
            name: "Germany".to_string(),
            flag: "🇩🇪".to_string(),
            phone_code: "+49".to_string(),
        }
    }

    pub(crate) fn registration(username: &str, email: &str) -> RegistrationData {
        RegistrationData {
            avatar: None,
            username: username.to_string(),
            email: email.to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap_or_default(),
            country: country(),
            phone: "+49 30 1234567".to_string(),
            website: "https://example.com".to_string(),
            verification_method: VerificationMethod::Email,
        }
    }
}
