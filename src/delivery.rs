//! Delivery channel for one-time codes.
//!
//! There is no real email or SMS provider: the session store hands every
//! generated code to a `CodeNotifier`, which decides how to surface it. The
//! default for local use is `LogCodeNotifier`, which logs the code and returns;
//! the CLI uses `ConsoleCodeNotifier` so the code shows up like a transient
//! notification. A real provider only needs to implement the trait.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::model::VerificationMethod;

/// How long a notification stays visible.
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub user_id: Uuid,
    pub method: VerificationMethod,
    /// Email address or phone number, depending on `method`.
    pub destination: String,
    pub code: String,
    pub duration: Duration,
}

impl Notification {
    #[must_use]
    pub fn new(user_id: Uuid, method: VerificationMethod, destination: &str, code: &str) -> Self {
        Self {
            user_id,
            method,
            destination: destination.to_string(),
            code: code.to_string(),
            duration: NOTIFICATION_DURATION,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        format!("Verification code for {}: {}", self.method, self.code)
    }
}

/// Code delivery abstraction used by the session store.
pub trait CodeNotifier: Send + Sync {
    /// Surface the code. Delivery is fire-and-forget.
    fn notify(&self, notification: &Notification);
}

/// Logs the code instead of sending it anywhere.
#[derive(Clone, Debug, Default)]
pub struct LogCodeNotifier;

impl CodeNotifier for LogCodeNotifier {
    fn notify(&self, notification: &Notification) {
        info!(
            user_id = %notification.user_id,
            method = %notification.method,
            destination = %notification.destination,
            "{}",
            notification.message()
        );
    }
}

/// Prints the code to stdout as a banner.
#[derive(Clone, Debug, Default)]
pub struct ConsoleCodeNotifier;

impl CodeNotifier for ConsoleCodeNotifier {
    fn notify(&self, notification: &Notification) {
        println!(
            "\n  >> {} (sent to {}, visible for {}s)\n",
            notification.message(),
            notification.destination,
            notification.duration.as_secs()
        );
    }
}

/// Keeps every notification in memory, like an inbox nobody reads.
#[derive(Debug, Default)]
pub struct InboxCodeNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl InboxCodeNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Code of the most recent notification.
    #[must_use]
    pub fn last_code(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|notification| notification.code.clone())
    }
}

impl CodeNotifier for InboxCodeNotifier {
    fn notify(&self, notification: &Notification) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_method_and_code() {
        let notification = Notification::new(
            Uuid::nil(),
            VerificationMethod::Phone,
            "+1 555 0100",
            "482913",
        );
        assert_eq!(notification.message(), "Verification code for phone: 482913");
        assert_eq!(notification.duration, Duration::from_secs(10));
    }

    #[test]
    fn inbox_keeps_notifications_in_order() {
        let inbox = InboxCodeNotifier::new();
        assert_eq!(inbox.last_code(), None);
        for code in ["111111", "222222"] {
            inbox.notify(&Notification::new(
                Uuid::nil(),
                VerificationMethod::Email,
                "a@example.com",
                code,
            ));
        }
        assert_eq!(inbox.notifications().len(), 2);
        assert_eq!(inbox.last_code().as_deref(), Some("222222"));
    }
}
