use thiserror::Error;

/// Failures reported by the session store and the auth facade.
///
/// Every variant is recoverable; callers surface the message and decide
/// whether to retry (resubmit, or request a new code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("User with this email or username already exists")]
    DuplicateUser,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid verification session")]
    SessionNotFound,
    #[error("Verification code expired")]
    CodeExpired,
    #[error("Maximum verification attempts exceeded")]
    AttemptsExceeded,
    #[error("Invalid verification code")]
    CodeMismatch,
    #[error("No authenticated user")]
    NotAuthenticated,
}

impl Error {
    /// Whether the current session is spent and only a new code can help.
    #[must_use]
    pub fn requires_new_code(&self) -> bool {
        matches!(
            self,
            Self::CodeExpired | Self::AttemptsExceeded | Self::SessionNotFound
        )
    }
}
