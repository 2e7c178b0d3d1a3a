//! # Onboard (registration, verification & profile flow)
//!
//! `onboard` drives a user through registration, a time-boxed one-time-code
//! verification step, and profile editing, on top of an in-memory mock data
//! layer mirrored best-effort to a key/value store.
//!
//! ## Session Store
//!
//! [`store::SessionStore`] owns users, verification sessions and the
//! current-session pointer. A verification session is usable only while
//! `now <= expires_at` and `attempts < max_attempts`:
//!
//! - **Code:** 6 digits, uniform over `100000..=999999`, surfaced through a
//!   [`delivery::CodeNotifier`] (the mock email/SMS channel).
//! - **Expiry:** 2 minutes by default, always checked before the attempt limit.
//! - **Attempts:** 3 by default; mismatches still count, so three wrong guesses
//!   exhaust the session and a new code has to be requested.
//!
//! ## Auth Facade
//!
//! [`facade::AuthFacade`] holds the store, publishes the current user and a
//! loading flag through a `watch` channel and listener callbacks, and asks the
//! injected [`navigation::Navigator`] for `/profile` once a consumer sitting on
//! an unauthenticated screen becomes authenticated.
//!
//! ## Persistence
//!
//! Users, sessions and the current user are written to a
//! [`storage::Storage`] after every mutation as JSON association lists keyed by
//! id. Read and write failures are logged and swallowed.

pub mod cli;
pub mod clock;
pub mod countdown;
pub mod countries;
pub mod delivery;
pub mod error;
pub mod facade;
pub mod model;
pub mod navigation;
pub mod storage;
pub mod store;
pub mod validate;

pub use error::Error;
pub use facade::{AuthFacade, AuthState};
pub use model::{AuthUser, Country, ProfileUpdate, RegistrationData, User, VerificationMethod};
pub use store::{SessionStore, StoreConfig};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
