//! Fixed-delay retry that a cleared running flag can interrupt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::ApiError;
use crate::common::constants::CANCEL_POLL_INTERVAL;
use crate::common::utils::plural;
use crate::time_source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Call `op` (with the 1-based attempt number) until it succeeds, the
    /// attempts run out, or `running` is cleared.
    pub fn run<T>(
        &self,
        running: &AtomicBool,
        mut op: impl FnMut(u32) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut attempt = 0;
        loop {
            if !running.load(Ordering::SeqCst) {
                return Err(ApiError::Cancelled);
            }
            attempt += 1;

            let error = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if attempt >= self.max_attempts {
                return Err(error);
            }

            log_warning!("{error}");
            log_indented!("Retrying in {}", plural(self.delay.as_secs(), "second"));
            wait_cancellable(self.delay, running)?;
        }
    }
}

fn wait_cancellable(delay: Duration, running: &AtomicBool) -> Result<(), ApiError> {
    let mut waited = Duration::ZERO;
    while waited < delay {
        if !running.load(Ordering::SeqCst) || time_source::simulation_ended() {
            return Err(ApiError::Cancelled);
        }
        let slice = CANCEL_POLL_INTERVAL.min(delay - waited);
        time_source::sleep(slice);
        waited += slice;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Log;

    #[test]
    fn test_succeeds_after_failures() {
        Log::set_enabled(false);
        let running = AtomicBool::new(true);
        let result = RetryPolicy::bounded(Duration::ZERO, 5).run(&running, |attempt| {
            if attempt < 3 {
                Err(ApiError::Status(503))
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_bounded_policy_returns_last_error() {
        Log::set_enabled(false);
        let running = AtomicBool::new(true);
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::bounded(Duration::ZERO, 2).run(&running, |_| {
            calls += 1;
            Err(ApiError::Status(500))
        });
        assert!(matches!(result, Err(ApiError::Status(500))));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_single_attempt_does_not_wait() {
        let running = AtomicBool::new(true);
        let mut calls = 0;
        let result: Result<(), _> =
            RetryPolicy::bounded(Duration::from_secs(300), 1).run(&running, |_| {
                calls += 1;
                Err(ApiError::Status(400))
            });
        assert!(matches!(result, Err(ApiError::Status(400))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_cleared_flag_cancels_before_first_attempt() {
        let running = AtomicBool::new(false);
        let result: Result<(), _> =
            RetryPolicy::bounded(Duration::ZERO, 5).run(&running, |_| unreachable!());
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[test]
    fn test_cancel_during_wait() {
        Log::set_enabled(false);
        let running = AtomicBool::new(true);
        let result: Result<(), _> =
            RetryPolicy::bounded(Duration::from_secs(30), 5).run(&running, |_| {
                running.store(false, Ordering::SeqCst);
                Err(ApiError::Status(502))
            });
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }
}
