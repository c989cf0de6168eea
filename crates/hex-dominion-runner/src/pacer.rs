//! Turn pacing and the single-run guard.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Run `turn` and wait until at least `min` has passed.
///
/// The wait starts together with the turn, so a slow turn adds no extra
/// delay.
pub async fn paced<F: Future>(min: Duration, turn: F) -> F::Output {
    let (output, ()) = tokio::join!(turn, tokio::time::sleep(min));
    output
}

/// Holds the running flag for the duration of one loop run.
///
/// The flag is cleared on drop, including when the loop bails out early.
#[derive(Debug)]
pub(crate) struct RunningGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunningGuard<'a> {
    /// Set the flag, or return `None` if it is already set.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
