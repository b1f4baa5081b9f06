// src/retry.rs
use std::{fmt::Display, thread, time::Duration};

use crate::error::Retryable;
use crate::progress::Progress;

/// How often and how patiently a transient failure is retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included. `0` is treated as `1`.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self { max_attempts, backoff }
    }

    pub const fn once() -> Self {
        Self { max_attempts: 1, backoff: Duration::ZERO }
    }

    fn attempts(&self) -> u32 { self.max_attempts.max(1) }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// policy runs out of attempts. `op` receives the 1-based attempt number.
pub fn retry<T, E, F>(policy: RetryPolicy, sink: &dyn Progress, what: &str, mut op: F) -> Result<T, E>
where
    E: Retryable + Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let total = policy.attempts();
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt < total => {
                sink.warn(&format!("Retry {attempt}/{total}: {what}: {e}"));
                if !policy.backoff.is_zero() {
                    thread::sleep(policy.backoff);
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
