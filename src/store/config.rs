use chrono::Duration;

const DEFAULT_CODE_TTL_SECONDS: i64 = 2 * 60;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Longest a code may stay valid: one day.
pub const MAX_CODE_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Clone, Copy, Debug)]
pub struct StoreConfig {
    code_ttl_seconds: i64,
    max_attempts: u32,
}

impl StoreConfig {
    /// Default config: codes live for 2 minutes and allow 3 attempts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            code_ttl_seconds: DEFAULT_CODE_TTL_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_code_ttl_seconds(mut self, seconds: i64) -> Self {
        self.code_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Clamp nonsensical values: a session lives between one second and one
    /// day, and allows at least one attempt.
    #[must_use]
    pub fn normalize(self) -> Self {
        Self {
            code_ttl_seconds: self.code_ttl_seconds.clamp(1, MAX_CODE_TTL_SECONDS),
            max_attempts: self.max_attempts.max(1),
        }
    }

    #[must_use]
    pub fn code_ttl_seconds(&self) -> i64 {
        self.code_ttl_seconds
    }

    #[must_use]
    pub fn code_ttl(&self) -> Duration {
        Duration::seconds(self.code_ttl_seconds.clamp(1, MAX_CODE_TTL_SECONDS))
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
