//! One-second countdown shown while a verification code is valid.
//!
//! The countdown ticks on its own tokio task and publishes the seconds left
//! through a `watch` channel. It only drives what the consumer shows; the
//! session store enforces expiry on its own clock.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

const TICK: Duration = Duration::from_secs(1);

pub struct Countdown {
    remaining: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Start counting down from `seconds`. Must be called within a tokio runtime.
    #[must_use]
    pub fn start(seconds: u64) -> Self {
        let (tx, remaining) = watch::channel(seconds);
        let task = tokio::spawn(async move {
            let mut ticker = interval(TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            let mut left = seconds;
            while left > 0 {
                ticker.tick().await;
                left -= 1;
                if tx.send(left).is_err() {
                    break;
                }
            }
        });
        Self { remaining, task }
    }

    /// Cancel the running countdown and start a new one.
    pub fn restart(&mut self, seconds: u64) {
        *self = Self::start(seconds);
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    /// True once the countdown has reached zero.
    #[must_use]
    pub fn can_request_new_code(&self) -> bool {
        self.remaining() == 0
    }

    #[must_use]
    pub fn formatted(&self) -> String {
        format_remaining(self.remaining())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }

    /// Resolve when the countdown reaches zero.
    pub async fn finished(&self) {
        let mut remaining = self.remaining.clone();
        // An error means the ticking task is gone, which only happens at zero
        // or after the countdown was dropped.
        let _ = remaining.wait_for(|left| *left == 0).await;
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// `m:ss`, e.g. `2:00` or `0:07`.
#[must_use]
pub fn format_remaining(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
