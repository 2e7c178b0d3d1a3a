//! Users, verification sessions and the current-session pointer.
//!
//! Flow Overview:
//! 1) `register_user` creates an unverified user (email and username are unique).
//! 2) `send_verification_code` opens a session with a fresh 6-digit code and
//!    hands the code to the `CodeNotifier`.
//! 3) `verify_code` checks expiry, then the attempt limit, counts the attempt,
//!    and only then compares codes. A match verifies the user, drops the
//!    session and makes the user current.
//!
//! Requesting another code leaves earlier sessions in place; callers simply
//! stop using their ids.
//!
//! Every mutation is mirrored to the `Storage`. Storage failures are logged and
//! never reach the caller.

mod config;
mod persist;

pub use config::{MAX_CODE_TTL_SECONDS, StoreConfig};

use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::delivery::{CodeNotifier, LogCodeNotifier, Notification};
use crate::error::Error;
use crate::model::{AuthUser, ProfileUpdate, RegistrationData, User, VerificationSession};
use crate::storage::{MemoryStorage, Storage};

use self::persist::{CURRENT_USER_KEY, SESSIONS_KEY, USERS_KEY};

pub struct SessionStore {
    config: StoreConfig,
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, VerificationSession>,
    current_user: Option<AuthUser>,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn CodeNotifier>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Build a store and hydrate it from `storage`.
    pub fn new(
        config: StoreConfig,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn CodeNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut store = Self {
            config: config.normalize(),
            users: HashMap::new(),
            sessions: HashMap::new(),
            current_user: None,
            storage,
            notifier,
            clock,
        };
        store.load_from_storage();
        store
    }

    /// Store backed by process memory, logging codes, on the system clock.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self::new(
            StoreConfig::new(),
            Arc::new(MemoryStorage::new()),
            Arc::new(LogCodeNotifier),
            Arc::new(SystemClock),
        )
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub fn user(&self, user_id: Uuid) -> Option<&User> {
        self.users.get(&user_id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    #[must_use]
    pub fn session(&self, session_id: Uuid) -> Option<&VerificationSession> {
        self.sessions.get(&session_id)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&AuthUser> {
        self.current_user.as_ref()
    }

    /// Create an unverified user.
    ///
    /// # Errors
    /// Returns `Error::DuplicateUser` if the email or the username is taken.
    pub fn register_user(&mut self, data: RegistrationData) -> Result<Uuid, Error> {
        let taken = self
            .users
            .values()
            .any(|user| user.email == data.email || user.username == data.username);
        if taken {
            debug!(username = %data.username, "registration rejected: duplicate user");
            return Err(Error::DuplicateUser);
        }

        let user_id = Uuid::new_v4();
        let user = User::from_registration(user_id, data, self.clock.now());
        info!(%user_id, username = %user.username, "user registered");

        self.users.insert(user_id, user);
        self.save_to_storage();

        Ok(user_id)
    }

    /// Open a new verification session and deliver its code.
    ///
    /// # Errors
    /// Returns `Error::UserNotFound` if `user_id` is unknown.
    pub fn send_verification_code(&mut self, user_id: Uuid) -> Result<Uuid, Error> {
        let user = self.users.get(&user_id).ok_or(Error::UserNotFound)?;

        let session_id = Uuid::new_v4();
        let code = generate_code();
        let session = VerificationSession::new(
            user_id,
            code.clone(),
            user.verification_method,
            self.clock.now(),
            self.config.code_ttl(),
            self.config.max_attempts(),
        );
        debug!(
            %user_id,
            %session_id,
            expires_at = %session.expires_at(),
            "verification session created"
        );

        let notification =
            Notification::new(user_id, user.verification_method, user.destination(), &code);
        self.sessions.insert(session_id, session);
        self.save_to_storage();

        self.notifier.notify(&notification);

        Ok(session_id)
    }

    /// Check `code` against the session.
    ///
    /// Order matters: expiry, then the attempt limit, then the attempt is
    /// counted, then the code is compared. A mismatch therefore still uses up
    /// an attempt.
    ///
    /// # Errors
    /// - `Error::SessionNotFound` for an unknown (or already used) session.
    /// - `Error::CodeExpired` once the session's deadline has passed.
    /// - `Error::AttemptsExceeded` when no attempts remain.
    /// - `Error::CodeMismatch` when the code is wrong.
    /// - `Error::UserNotFound` if the session's owner no longer exists.
    pub fn verify_code(&mut self, session_id: Uuid, code: &str) -> Result<AuthUser, Error> {
        let now = self.clock.now();
        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(Error::SessionNotFound)?;

        if session.is_expired(now) {
            warn!(%session_id, "verification rejected: code expired");
            return Err(Error::CodeExpired);
        }

        if session.is_exhausted() {
            warn!(%session_id, "verification rejected: attempts exceeded");
            return Err(Error::AttemptsExceeded);
        }

        session.record_attempt();

        if !session.code_matches(code) {
            warn!(
                %session_id,
                attempts = session.attempts(),
                max_attempts = session.max_attempts(),
                "verification rejected: code mismatch"
            );
            self.save_to_storage();
            return Err(Error::CodeMismatch);
        }

        let user_id = session.user_id();
        let Some(user) = self.users.get_mut(&user_id) else {
            warn!(%session_id, %user_id, "verification rejected: owner missing");
            self.save_to_storage();
            return Err(Error::UserNotFound);
        };
        user.is_verified = true;
        user.updated_at = now;

        let auth = AuthUser { user: user.clone() };
        self.current_user = Some(auth.clone());
        self.sessions.remove(&session_id);
        self.save_to_storage();

        info!(%user_id, %session_id, "user verified");

        Ok(auth)
    }

    /// Merge the editable profile fields of `user_id`.
    ///
    /// # Errors
    /// Returns `Error::UserNotFound` if `user_id` is unknown.
    pub fn update_profile(&mut self, user_id: Uuid, update: ProfileUpdate) -> Result<User, Error> {
        let user = self.users.get_mut(&user_id).ok_or(Error::UserNotFound)?;
        user.apply(update, self.clock.now());
        let updated = user.clone();

        if let Some(current) = self.current_user.as_mut() {
            if current.user.id == user_id {
                current.user = updated.clone();
            }
        }

        self.save_to_storage();
        debug!(%user_id, "profile updated");

        Ok(updated)
    }

    /// Forget the current user.
    pub fn logout(&mut self) {
        if let Some(current) = self.current_user.take() {
            debug!(user_id = %current.user.id, "logged out");
        }
        self.save_to_storage();
    }

    fn save_to_storage(&self) {
        let storage = self.storage.as_ref();
        if let Err(err) = persist::save_entries(storage, USERS_KEY, &self.users) {
            error!("Error saving {USERS_KEY} to storage: {err:#}");
        }
        if let Err(err) = persist::save_entries(storage, SESSIONS_KEY, &self.sessions) {
            error!("Error saving {SESSIONS_KEY} to storage: {err:#}");
        }
        if let Err(err) = persist::save_current_user(storage, self.current_user.as_ref()) {
            error!("Error saving {CURRENT_USER_KEY} to storage: {err:#}");
        }
    }

    fn load_from_storage(&mut self) {
        let storage = self.storage.as_ref();
        match persist::load_entries(storage, USERS_KEY) {
            Ok(users) => self.users = users,
            Err(err) => error!("Error loading {USERS_KEY} from storage: {err:#}"),
        }
        match persist::load_entries(storage, SESSIONS_KEY) {
            Ok(sessions) => self.sessions = sessions,
            Err(err) => error!("Error loading {SESSIONS_KEY} from storage: {err:#}"),
        }
        match persist::load_current_user(storage) {
            Ok(current) => self.current_user = current,
            Err(err) => error!("Error loading {CURRENT_USER_KEY} from storage: {err:#}"),
        }
        debug!(
            users = self.users.len(),
            sessions = self.sessions.len(),
            authenticated = self.current_user.is_some(),
            "store hydrated"
        );
    }
}

/// Uniform over `100000..=999999`. Not cryptographically secure.
fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}
