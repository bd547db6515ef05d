use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;

use crate::core::ConsulError;

use super::constants::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY};

/// The future returned by one invocation of an [`Operation`] and by [`Retrier::run`].
pub type Attempt<'a> = BoxFuture<'a, Result<(), ConsulError>>;

/// A zero-argument fallible operation that a [`Retrier`] may invoke several times.
///
/// Invocations are strictly sequential: the strategy awaits each attempt before deciding
/// whether to start another one.
pub trait Operation: Send {
    /// Runs one attempt.
    fn call(&mut self) -> Attempt<'_>;
}

impl<F> Operation for F
where
    F: FnMut() -> Attempt<'static> + Send,
{
    fn call(&mut self) -> Attempt<'_> {
        (self)()
    }
}

/// A pluggable retry strategy.
///
/// `run` executes `op`, and on failure decides how many more times and with what delay
/// to invoke it again. It resolves to `Ok(())` as soon as one attempt succeeds, or to
/// the last attempt's error once it gives up.
pub trait Retrier: Send + Sync + fmt::Debug {
    /// Runs `op` according to this strategy's policy.
    fn run<'a>(&'a self, op: &'a mut dyn Operation) -> Attempt<'a>;
}

/// Retries with a fixed delay between attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantBackoff {
    /// Total number of attempts, including the first one.
    pub attempts: usize,
    /// Pause between two attempts.
    pub delay: Duration,
}

impl ConstantBackoff {
    pub fn new(attempts: usize, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

impl Default for ConstantBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl Retrier for ConstantBackoff {
    fn run<'a>(&'a self, op: &'a mut dyn Operation) -> Attempt<'a> {
        Box::pin(retry_loop(op, self.attempts, |_| self.delay))
    }
}

/// Retries with an exponentially growing delay.
/// The delay before retry `n` (1-based) is `base * factor^(n-1)`, capped at `max`.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    /// Total number of attempts, including the first one.
    pub attempts: usize,
    /// The initial backoff duration.
    pub base: Duration,
    /// The multiplicative factor for each subsequent retry.
    pub factor: f64,
    /// The maximum duration to wait between retries.
    pub max: Duration,
    /// Whether to apply random jitter (+/- 50%) to the delay.
    pub jitter: bool,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            attempts: 4,
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(3),
            jitter: true,
        }
    }
}

impl ExponentialBackoff {
    /// Delay applied after the `retry`-th failed attempt (1-based), before jitter.
    pub fn delay(&self, retry: usize) -> Duration {
        let exp = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.base.as_secs_f64() * self.factor.powi(exp);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            return self.max;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }

    fn jittered(&self, retry: usize) -> Duration {
        let delay = self.delay(retry);
        if self.jitter {
            let factor = rand::thread_rng().gen_range(0.5..1.5);
            Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(self.max)
        } else {
            delay
        }
    }
}

impl Retrier for ExponentialBackoff {
    fn run<'a>(&'a self, op: &'a mut dyn Operation) -> Attempt<'a> {
        Box::pin(retry_loop(op, self.attempts, |retry| self.jittered(retry)))
    }
}

/// Runs the operation exactly once.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRetry;

impl Retrier for NoRetry {
    fn run<'a>(&'a self, op: &'a mut dyn Operation) -> Attempt<'a> {
        op.call()
    }
}

async fn retry_loop<D>(op: &mut dyn Operation, attempts: usize, delay: D) -> Result<(), ConsulError>
where
    D: Fn(usize) -> Duration,
{
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op.call().await {
            Ok(()) => return Ok(()),
            Err(e) if attempt >= attempts || !e.is_retryable() => return Err(e),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, attempts, error = %_e, "attempt failed, backing off");
                tokio::time::sleep(delay(attempt)).await;
            }
        }
    }
}
