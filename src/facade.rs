//! Observable auth state on top of the session store.
//!
//! The facade owns a [`SessionStore`] and keeps two pieces of state for its
//! consumers: the signed-in user and a loading flag. Every change is published
//! to `watch` subscribers and to registered listeners, in that order, and the
//! derived values (`is_authenticated`, `profile`) are computed from the latest
//! published state so they can never drift.
//!
//! Consumers sitting on an unauthenticated screen are sent to the profile
//! screen as soon as a user signs in.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::model::{AuthUser, ProfileUpdate, RegistrationData, User};
use crate::navigation::{Navigator, Screen};
use crate::store::SessionStore;

/// Snapshot published after every facade mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub current_user: Option<AuthUser>,
    pub is_loading: bool,
}

impl AuthState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    #[must_use]
    pub fn profile(&self) -> Option<&User> {
        self.current_user.as_ref().map(|auth| &auth.user)
    }
}

pub type Listener = Box<dyn Fn(&AuthState) + Send + Sync>;

pub struct AuthFacade {
    store: SessionStore,
    state: watch::Sender<AuthState>,
    listeners: Vec<Listener>,
    navigator: Arc<dyn Navigator>,
    latency: Duration,
}

impl AuthFacade {
    /// Wrap `store`, adopting whichever user it already has signed in.
    pub fn new(store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        let initial = AuthState {
            current_user: store.current_user().cloned(),
            is_loading: false,
        };
        let (state, _) = watch::channel(initial);
        let facade = Self {
            store,
            state,
            listeners: Vec::new(),
            navigator,
            latency: Duration::ZERO,
        };
        if facade.is_authenticated() {
            facade.redirect_to_profile();
        }
        facade
    }

    /// Simulated round-trip time awaited while `is_loading` is set.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn profile(&self) -> Option<User> {
        self.state.borrow().profile().cloned()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Receiver that always holds the latest [`AuthState`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Call `listener` after every state change.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// # Errors
    /// Returns `Error::DuplicateUser` if the email or username is taken.
    pub async fn register(&mut self, data: RegistrationData) -> Result<Uuid, Error> {
        self.start_loading().await;
        let result = self.store.register_user(data);
        self.publish(|state| state.is_loading = false);
        result
    }

    /// # Errors
    /// Returns `Error::UserNotFound` if `user_id` is unknown.
    pub async fn send_verification_code(&mut self, user_id: Uuid) -> Result<Uuid, Error> {
        self.start_loading().await;
        let result = self.store.send_verification_code(user_id);
        self.publish(|state| state.is_loading = false);
        result
    }

    /// On success the verified user becomes the current user.
    ///
    /// # Errors
    /// Passes through every [`SessionStore::verify_code`] failure.
    pub async fn verify_code(&mut self, session_id: Uuid, code: &str) -> Result<AuthUser, Error> {
        self.start_loading().await;
        let result = self.store.verify_code(session_id, code);
        self.publish(|state| {
            state.is_loading = false;
            if let Ok(auth) = &result {
                state.current_user = Some(auth.clone());
            }
        });
        result
    }

    /// Edit the signed-in user's profile.
    ///
    /// # Errors
    /// Returns `Error::NotAuthenticated` when nobody is signed in, otherwise
    /// passes through [`SessionStore::update_profile`] failures.
    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<User, Error> {
        let user_id = self
            .state
            .borrow()
            .profile()
            .map(|user| user.id)
            .ok_or(Error::NotAuthenticated)?;

        self.start_loading().await;
        let result = self.store.update_profile(user_id, update);
        self.publish(|state| {
            state.is_loading = false;
            if let (Ok(user), Some(current)) = (&result, state.current_user.as_mut()) {
                current.user = user.clone();
            }
        });
        result
    }

    /// Sign out and go back to the root screen.
    pub async fn logout(&mut self) {
        self.start_loading().await;
        self.store.logout();
        self.publish(|state| {
            state.is_loading = false;
            state.current_user = None;
        });
        self.navigator.navigate(Screen::Root);
    }

    async fn start_loading(&mut self) {
        self.publish(|state| state.is_loading = true);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn publish<F>(&mut self, modify: F)
    where
        F: FnOnce(&mut AuthState),
    {
        let was_authenticated = self.is_authenticated();
        self.state.send_modify(modify);

        let snapshot = self.state();
        for listener in &self.listeners {
            listener(&snapshot);
        }

        if !was_authenticated && snapshot.is_authenticated() {
            self.redirect_to_profile();
        }
    }

    fn redirect_to_profile(&self) {
        let current = self.navigator.current();
        if current.is_unauthenticated() {
            debug!(from = %current, "authenticated, redirecting to profile");
            self.navigator.navigate(Screen::Profile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::delivery::InboxCodeNotifier;
    use crate::model::fixtures::registration;
    use crate::navigation::HistoryNavigator;
    use crate::storage::MemoryStorage;
    use crate::store::StoreConfig;
    use anyhow::{Context, Result};
    use std::sync::Mutex;

    struct Harness {
        facade: AuthFacade,
        inbox: Arc<InboxCodeNotifier>,
        navigator: Arc<HistoryNavigator>,
        storage: Arc<MemoryStorage>,
    }

    fn harness(start: Screen) -> Harness {
        let inbox = Arc::new(InboxCodeNotifier::new());
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(HistoryNavigator::new(start));
        let store = SessionStore::new(
            StoreConfig::new(),
            storage.clone(),
            inbox.clone(),
            Arc::new(SystemClock),
        );
        Harness {
            facade: AuthFacade::new(store, navigator.clone()),
            inbox,
            navigator,
            storage,
        }
    }

    async fn sign_in(h: &mut Harness, username: &str) -> Result<AuthUser> {
        let email = format!("{username}@example.com");
        let user_id = h.facade.register(registration(username, &email)).await?;
        let session_id = h.facade.send_verification_code(user_id).await?;
        let code = h.inbox.last_code().context("no code sent")?;
        Ok(h.facade.verify_code(session_id, &code).await?)
    }

    #[tokio::test]
    async fn starts_signed_out() {
        let h = harness(Screen::Register);
        assert!(!h.facade.is_authenticated());
        assert!(!h.facade.is_loading());
        assert_eq!(h.facade.profile(), None);
    }

    #[tokio::test]
    async fn verify_adopts_user_and_redirects() -> Result<()> {
        let mut h = harness(Screen::Verify);
        let auth = sign_in(&mut h, "alice").await?;

        assert!(h.facade.is_authenticated());
        assert_eq!(h.facade.profile(), Some(auth.user));
        assert_eq!(h.navigator.current(), Screen::Profile);
        Ok(())
    }

    #[tokio::test]
    async fn redirect_skips_screens_that_are_not_for_visitors() -> Result<()> {
        let mut h = harness(Screen::Profile);
        sign_in(&mut h, "alice").await?;
        assert_eq!(h.navigator.history(), vec![Screen::Profile]);
        Ok(())
    }

    #[tokio::test]
    async fn failed_verification_keeps_user_signed_out() -> Result<()> {
        let mut h = harness(Screen::Verify);
        let user_id = h.facade.register(registration("alice", "alice@example.com")).await?;
        let session_id = h.facade.send_verification_code(user_id).await?;

        let result = h.facade.verify_code(session_id, "not-a-code").await;
        assert_eq!(result, Err(Error::CodeMismatch));
        assert!(!h.facade.is_authenticated());
        assert!(!h.facade.is_loading());
        assert_eq!(h.navigator.current(), Screen::Verify);
        Ok(())
    }

    #[tokio::test]
    async fn loading_is_reset_after_failure() -> Result<()> {
        let mut h = harness(Screen::Register);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        h.facade.on_change(move |state| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(state.is_loading);
            }
        });

        let result = h.facade.send_verification_code(Uuid::new_v4()).await;
        assert_eq!(result, Err(Error::UserNotFound));
        assert!(!h.facade.is_loading());

        let seen = seen.lock().map(|seen| seen.clone()).unwrap_or_default();
        assert_eq!(seen, vec![true, false]);
        Ok(())
    }

    #[tokio::test]
    async fn update_profile_requires_sign_in() -> Result<()> {
        let mut h = harness(Screen::Profile);
        h.facade.register(registration("alice", "alice@example.com")).await?;

        let result = h
            .facade
            .update_profile(ProfileUpdate::new().with_username("alicia".into()))
            .await;
        assert_eq!(result, Err(Error::NotAuthenticated));
        assert!(h.facade.store().users().all(|user| user.username == "alice"));
        Ok(())
    }

    #[tokio::test]
    async fn update_profile_replaces_held_user() -> Result<()> {
        let mut h = harness(Screen::Register);
        sign_in(&mut h, "alice").await?;

        let updated = h
            .facade
            .update_profile(ProfileUpdate::new().with_website("https://alicia.dev".into()))
            .await?;
        assert_eq!(updated.website, "https://alicia.dev");
        assert_eq!(h.facade.profile(), Some(updated));
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_user_and_goes_home() -> Result<()> {
        let mut h = harness(Screen::Register);
        sign_in(&mut h, "alice").await?;

        h.facade.logout().await;
        assert!(!h.facade.is_authenticated());
        assert_eq!(h.navigator.current(), Screen::Root);
        assert_eq!(h.facade.store().current_user(), None);
        Ok(())
    }

    #[tokio::test]
    async fn logout_goes_through_loading() -> Result<()> {
        let mut h = harness(Screen::Register);
        sign_in(&mut h, "alice").await?;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        h.facade.on_change(move |state| {
            if let Ok(mut seen) = sink.lock() {
                seen.push((state.is_loading, state.is_authenticated()));
            }
        });

        h.facade.logout().await;
        let seen = seen.lock().map(|seen| seen.clone()).unwrap_or_default();
        assert_eq!(seen, vec![(true, true), (false, false)]);
        Ok(())
    }

    #[tokio::test]
    async fn subscribers_see_latest_state() -> Result<()> {
        let mut h = harness(Screen::Register);
        let mut rx = h.facade.subscribe();
        sign_in(&mut h, "alice").await?;

        assert!(rx.has_changed()?);
        let state = rx.borrow_and_update().clone();
        assert!(state.is_authenticated());
        assert!(!state.is_loading);
        Ok(())
    }

    #[tokio::test]
    async fn adopts_persisted_user_on_construction() -> Result<()> {
        let mut h = harness(Screen::Register);
        let auth = sign_in(&mut h, "alice").await?;

        let navigator = Arc::new(HistoryNavigator::new(Screen::Root));
        let store = SessionStore::new(
            StoreConfig::new(),
            h.storage.clone(),
            h.inbox.clone(),
            Arc::new(SystemClock),
        );
        let facade = AuthFacade::new(store, navigator.clone());
        assert_eq!(facade.profile(), Some(auth.user));
        assert_eq!(navigator.current(), Screen::Profile);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_awaited_while_loading() -> Result<()> {
        let mut h = harness(Screen::Register);
        h.facade = AuthFacade::new(SessionStore::ephemeral(), h.navigator.clone())
            .with_latency(Duration::from_millis(1_000));

        let started = tokio::time::Instant::now();
        h.facade.register(registration("alice", "alice@example.com")).await?;
        assert!(started.elapsed() >= Duration::from_millis(1_000));
        assert!(!h.facade.is_loading());
        Ok(())
    }
}
