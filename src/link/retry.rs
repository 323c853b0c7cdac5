//! Non-blocking retry throttle.
//!
//! Replaces "try, sleep a second, try again" loops: the gate remembers
//! when the last attempt happened and how many were made, and the caller
//! asks it once per loop pass whether another attempt is allowed.

use crate::config::RetryPolicy;

/// Attempt bookkeeping for one retried operation.
#[derive(Debug, Clone)]
pub struct RetryGate {
    policy: RetryPolicy,
    attempts: u32,
    last_attempt_ms: Option<u64>,
}

impl RetryGate {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            last_attempt_ms: None,
        }
    }

    fn interval_elapsed(&self, now_ms: u64) -> bool {
        self.last_attempt_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= self.policy.interval_ms as u64)
    }

    fn budget_spent(&self) -> bool {
        self.policy.max_attempts != 0 && self.attempts >= self.policy.max_attempts
    }

    /// Claim an attempt if the interval has passed and the budget allows.
    pub fn try_begin(&mut self, now_ms: u64) -> bool {
        if self.budget_spent() || !self.interval_elapsed(now_ms) {
            return false;
        }
        self.attempts += 1;
        self.last_attempt_ms = Some(now_ms);
        true
    }

    /// Every attempt is spent and the last one has had a full interval to
    /// succeed.
    pub fn is_exhausted(&self, now_ms: u64) -> bool {
        self.budget_spent() && self.interval_elapsed(now_ms)
    }

    /// Forget past attempts (call after a success).
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.last_attempt_ms = None;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
