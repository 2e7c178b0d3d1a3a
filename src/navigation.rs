//! Screens, route resolution and the auth/guest guards.
//!
//! Guards are UX only: they decide where a consumer should be, they do not
//! protect data. The store accepts any call regardless of screen.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::facade::AuthState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    Root,
    Register,
    Verify,
    Profile,
}

impl Screen {
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Register => "/register",
            Self::Verify => "/verify",
            Self::Profile => "/profile",
        }
    }

    /// Exact match on a known path.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "" => Some(Self::Root),
            "/register" => Some(Self::Register),
            "/verify" => Some(Self::Verify),
            "/profile" => Some(Self::Profile),
            _ => None,
        }
    }

    /// Route table: the root and unknown paths land on registration.
    #[must_use]
    pub fn resolve(path: &str) -> Self {
        match Self::from_path(path) {
            Some(Self::Root) | None => Self::Register,
            Some(screen) => screen,
        }
    }

    /// Screens meant for visitors who are not signed in.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Root | Self::Register | Self::Verify)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where the consumer currently is, and how to move it.
pub trait Navigator: Send + Sync {
    fn current(&self) -> Screen;
    fn navigate(&self, screen: Screen);
}

/// Keeps every visited screen; the last one is current.
#[derive(Debug)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Screen>>,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new(start: Screen) -> Self {
        Self {
            history: Mutex::new(vec![start]),
        }
    }

    #[must_use]
    pub fn history(&self) -> Vec<Screen> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(Screen::Root)
    }
}

impl Navigator for HistoryNavigator {
    fn current(&self) -> Screen {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
            .unwrap_or(Screen::Root)
    }

    fn navigate(&self, screen: Screen) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.last() != Some(&screen) {
            history.push(screen);
        }
    }
}

/// Lets authenticated consumers through; sends everyone else to registration.
pub fn auth_guard(state: &AuthState, navigator: &dyn Navigator) -> bool {
    if state.is_authenticated() {
        return true;
    }
    navigator.navigate(Screen::Register);
    false
}

/// Lets visitors through; sends signed-in users to their profile.
pub fn guest_guard(state: &AuthState, navigator: &dyn Navigator) -> bool {
    if !state.is_authenticated() {
        return true;
    }
    navigator.navigate(Screen::Profile);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuthUser, User, fixtures::registration};
    use chrono::Utc;
    use uuid::Uuid;

    fn signed_in() -> AuthState {
        let user = User::from_registration(Uuid::new_v4(), registration("alice", "a@x.io"), Utc::now());
        AuthState {
            current_user: Some(AuthUser { user }),
            is_loading: false,
        }
    }

    #[test]
    fn paths_round_trip() {
        for screen in [Screen::Root, Screen::Register, Screen::Verify, Screen::Profile] {
            assert_eq!(Screen::from_path(screen.path()), Some(screen));
        }
        assert_eq!(Screen::from_path("/verify?userId=abc"), Some(Screen::Verify));
        assert_eq!(Screen::from_path("/profile/"), Some(Screen::Profile));
        assert_eq!(Screen::from_path("/nowhere"), None);
    }

    #[test]
    fn resolve_redirects_root_and_unknown_paths() {
        assert_eq!(Screen::resolve("/"), Screen::Register);
        assert_eq!(Screen::resolve(""), Screen::Register);
        assert_eq!(Screen::resolve("/does-not-exist"), Screen::Register);
        assert_eq!(Screen::resolve("/profile"), Screen::Profile);
    }

    #[test]
    fn history_navigator_skips_repeats() {
        let navigator = HistoryNavigator::new(Screen::Register);
        navigator.navigate(Screen::Verify);
        navigator.navigate(Screen::Verify);
        navigator.navigate(Screen::Profile);
        assert_eq!(
            navigator.history(),
            vec![Screen::Register, Screen::Verify, Screen::Profile]
        );
        assert_eq!(navigator.current(), Screen::Profile);
    }

    #[test]
    fn auth_guard_redirects_visitors() {
        let navigator = HistoryNavigator::new(Screen::Profile);
        assert!(!auth_guard(&AuthState::default(), &navigator));
        assert_eq!(navigator.current(), Screen::Register);

        let navigator = HistoryNavigator::new(Screen::Profile);
        assert!(auth_guard(&signed_in(), &navigator));
        assert_eq!(navigator.current(), Screen::Profile);
    }

    #[test]
    fn guest_guard_redirects_signed_in_users() {
        let navigator = HistoryNavigator::new(Screen::Register);
        assert!(!guest_guard(&signed_in(), &navigator));
        assert_eq!(navigator.current(), Screen::Profile);

        let navigator = HistoryNavigator::new(Screen::Verify);
        assert!(guest_guard(&AuthState::default(), &navigator));
        assert_eq!(navigator.current(), Screen::Verify);
    }
}
