//! A cancellable fixed-period loop for repeated pin or bus work.
//!
//! The original interrupt-handler-pokes-a-global shape is replaced by a
//! [CancelToken]: the handler's only job is to call
//! [cancel](CancelToken::cancel), and the [Runner] observes the token at a
//! well-defined point between iterations. Work in flight always finishes
//! before the loop exits, so cancellation can never leave a transaction
//! half-clocked.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::Error;

/// A one-shot cancellation flag, shared by cloning.
///
/// Cancelling is a single atomic store, safe to do from a signal handler.
/// There is no way back: once cancelled, a token stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Default::default()
    }

    /// Mark the token cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Has the token been cancelled?
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Runs one unit of work per period until cancelled.
#[derive(Debug)]
pub struct Runner {
    period: Duration,
    token: CancelToken,
}

impl Runner {
    /// A loop with a fixed period between steps.
    ///
    /// # Panics
    /// Panics if `period` is zero.
    pub fn new(period: Duration, token: CancelToken) -> Self {
        assert!(!period.is_zero(), "loop period must be positive");
        Self { period, token }
    }

    /// Run `step` once per period until the token is cancelled, then
    /// return `Ok(())`.
    ///
    /// Each iteration runs one step, sleeps for the period, and then
    /// re-checks the token, so a step in flight always completes. A step
    /// error is logged and the loop keeps its cadence, except
    /// [Error::BusNotEnabled], which cannot succeed on retry and ends the
    /// loop immediately.
    ///
    /// Consumes the runner: a finished loop cannot be restarted.
    pub fn run(self, mut step: impl FnMut() -> Result<(), Error>) -> Result<(), Error> {
        while !self.token.is_cancelled() {
            match step() {
                Ok(()) => {}
                Err(Error::BusNotEnabled) => return Err(Error::BusNotEnabled),
                Err(e) => log::warn!("step failed: {}", e),
            }
            std::thread::sleep(self.period);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fast(token: CancelToken) -> Runner {
        Runner::new(Duration::from_millis(1), token)
    }

    #[test]
    #[should_panic]
    fn zero_period_panics() {
        Runner::new(Duration::ZERO, CancelToken::new());
    }

    #[test]
    fn cancelled_before_start_runs_nothing() {
        let token = CancelToken::new();
        token.cancel();

        let mut steps = 0;
        fast(token).run(|| {
            steps += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(steps, 0);
    }

    #[test]
    fn step_in_flight_completes() {
        let token = CancelToken::new();
        let handle = token.clone();

        let mut steps = 0;
        fast(token).run(|| {
            steps += 1;
            if steps == 3 {
                // cancellation arrives mid-step; this step still finishes
                // and no further step runs
                handle.cancel();
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(steps, 3);
    }

    #[test]
    fn transient_errors_keep_the_loop_alive() {
        let token = CancelToken::new();
        let handle = token.clone();

        let mut steps = 0;
        fast(token).run(|| {
            steps += 1;
            if steps == 3 {
                handle.cancel();
                return Ok(());
            }
            Err(Error::WrongDirection)
        })
        .unwrap();
        assert_eq!(steps, 3);
    }

    #[test]
    fn dead_bus_ends_the_loop() {
        let token = CancelToken::new();

        let mut steps = 0;
        let result = fast(token).run(|| {
            steps += 1;
            Err(Error::BusNotEnabled)
        });
        assert_eq!(result, Err(Error::BusNotEnabled));
        assert_eq!(steps, 1);
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
