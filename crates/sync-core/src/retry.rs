//! Bounded fixed-interval retry
//!
//! The connectivity probe waits out tunnel startup with a constant sleep
//! between attempts. The interval is deliberately fixed rather than
//! exponential: the remote either comes up within the budget or the
//! session aborts. Cancellation stops the loop at the next slice of the
//! interval sleep.

use std::thread;
use std::time::Duration;

use backoff::backoff::{Backoff, Constant};

use crate::cancel::CancelToken;

/// Granularity of the cancellable interval sleep.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Retry bounds: total attempt count and the fixed sleep between failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

/// Constant-interval backoff that gives up after a fixed number of
/// retries.
struct BoundedConstant {
    delay: Constant,
    remaining: u32,
}

impl BoundedConstant {
    fn new(policy: RetryPolicy) -> Self {
        Self {
            delay: Constant::new(policy.interval),
            // first attempt is not a retry
            remaining: policy.max_attempts.saturating_sub(1),
        }
    }
}

impl Backoff for BoundedConstant {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.delay.next_backoff()
    }

    fn reset(&mut self) {
        self.delay.reset();
    }
}

/// Run `op` up to `policy.max_attempts` times, sleeping `policy.interval`
/// between failed attempts. `op` receives the 1-based attempt number.
///
/// Returns the first success, or the last error once the budget is spent
/// or `cancel` fires; the caller decides whether a cancelled loop counts
/// as its own failure kind.
pub fn retry_bounded<T, E, F>(
    policy: RetryPolicy,
    cancel: &CancelToken,
    mut op: F,
) -> std::result::Result<T, E>
where
    F: FnMut(u32) -> std::result::Result<T, E>,
{
    let mut backoff = BoundedConstant::new(policy);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) => match backoff.next_backoff() {
                Some(delay) if !cancel.is_cancelled() => {
                    sleep_cancellable(delay, cancel);
                    if cancel.is_cancelled() {
                        return Err(e);
                    }
                }
                _ => return Err(e),
            },
        }
    }
}

/// Sleep `duration` in small slices, returning early once `cancel` fires.
fn sleep_cancellable(duration: Duration, cancel: &CancelToken) {
    let mut remaining = duration;
    while !remaining.is_zero() && !cancel.is_cancelled() {
        let slice = remaining.min(SLEEP_SLICE);
        thread::sleep(slice);
        remaining -= slice;
    }
}
