//! Retry layer with configurable backoff.
//!
//! Attempts are numbered from 1 and live only for one call. After a retryable
//! failure on attempt `k < max_attempts` the layer sleeps
//! `backoff.delay(k)` and tries again. The error of the final attempt is
//! returned verbatim.

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::{ApiError, ConfigError};
use crate::logger::Logger;
use crate::service::{ApiService, CallOptions, ServiceFuture, Verb};

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `attempt × unit` after attempt `attempt` failed.
    Linear { unit: Duration },
    /// Same delay after every failure.
    Fixed { delay: Duration },
    /// `unit` doubled per failed attempt, capped at `cap`. With `jitter` the
    /// delay is drawn uniformly from half to one and a half times that value.
    Exponential {
        unit: Duration,
        cap: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Linear {
            unit: Duration::from_secs(1),
        }
    }
}

impl Backoff {
    /// Delay to wait after the given (1-based) attempt failed.
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Linear { unit } => unit.saturating_mul(attempt),
            Self::Fixed { delay } => delay,
            Self::Exponential { unit, cap, jitter } => {
                let factor = 1_u32
                    .checked_shl(attempt.saturating_sub(1))
                    .unwrap_or(u32::MAX);
                let delay = unit.saturating_mul(factor).min(cap);
                if jitter {
                    spread(delay)
                } else {
                    delay
                }
            }
        }
    }
}

fn spread(delay: Duration) -> Duration {
    let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    let half = millis / 2;
    Duration::from_millis(fastrand::u64(half..=millis.saturating_add(half)))
}

/// Backoff family selected by name in configuration; the unit comes from
/// the backoff unit setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackoffKind {
    #[default]
    Linear,
    Fixed,
    Exponential,
}

impl BackoffKind {
    /// Exponential delays stop growing at this many units.
    pub const EXPONENTIAL_CAP_UNITS: u32 = 30;

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Fixed => "fixed",
            Self::Exponential => "exponential",
        }
    }

    pub fn with_unit(self, unit: Duration) -> Backoff {
        match self {
            Self::Linear => Backoff::Linear { unit },
            Self::Fixed => Backoff::Fixed { delay: unit },
            Self::Exponential => Backoff::Exponential {
                unit,
                cap: unit.saturating_mul(Self::EXPONENTIAL_CAP_UNITS),
                jitter: true,
            },
        }
    }
}

impl std::fmt::Display for BackoffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackoffKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "fixed" => Ok(Self::Fixed),
            "exponential" => Ok(Self::Exponential),
            _ => Err(ConfigError::InvalidBackoff {
                value: value.to_owned(),
            }),
        }
    }
}

/// Configuration for the retry layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Linear backoff of `attempt × unit`.
    pub fn linear(max_attempts: u32, unit: Duration) -> Self {
        Self::new(max_attempts, Backoff::Linear { unit })
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

/// Suspends the current task between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Outermost pipeline layer: re-invokes the inner service on failure.
#[derive(Clone)]
pub struct RetryService<S> {
    inner: S,
    config: RetryConfig,
    logger: Arc<dyn Logger>,
    sleeper: Arc<dyn Sleeper>,
}

impl<S> RetryService<S> {
    pub fn new(inner: S, config: RetryConfig, logger: Arc<dyn Logger>) -> Self {
        Self::with_sleeper(inner, config, logger, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        inner: S,
        config: RetryConfig,
        logger: Arc<dyn Logger>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            inner,
            config,
            logger,
            sleeper,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    async fn run<'a, T, F>(&'a self, verb: Verb, path: &'a str, call: F) -> Result<T, ApiError>
    where
        F: Fn() -> ServiceFuture<'a, T>,
    {
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            let error = match call().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() {
                return Err(error);
            }

            if attempt >= max_attempts {
                self.logger.error(&format!(
                    "{verb} {path} failed after {max_attempts} attempt(s): {error}"
                ));
                return Err(error);
            }

            let delay = self.config.delay_for_attempt(attempt);
            self.logger.warn(&format!(
                "{verb} {path} attempt {attempt}/{max_attempts} failed: {error}; retrying in {}ms",
                delay.as_millis()
            ));
            self.sleeper.sleep(delay).await;
        }

        self.logger.error(&format!(
            "{verb} {path} was not attempted: retry budget is {max_attempts}"
        ));
        Err(ApiError::RetryExhausted {
            attempts: max_attempts,
        })
    }
}

impl<S: ApiService> ApiService for RetryService<S> {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(self.run(Verb::Fetch, path, move || self.inner.fetch(path, options)))
    }

    fn send<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(self.run(Verb::Send, path, move || self.inner.send(path, body, options)))
    }

    fn replace<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(self.run(Verb::Replace, path, move || {
            self.inner.replace(path, body, options)
        }))
    }

    fn remove<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, ()> {
        Box::pin(self.run(Verb::Remove, path, move || self.inner.remove(path, options)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http_client::HttpError;
    use crate::logger::{LogLevel, MemoryLogger};
    use crate::testing::{RecordingSleeper, StubService};

    fn timeout() -> ApiError {
        ApiError::from(HttpError::new("timeout"))
    }

    fn retry(
        stub: StubService,
        max_attempts: u32,
    ) -> (RetryService<StubService>, Arc<MemoryLogger>, Arc<RecordingSleeper>) {
        let logger = Arc::new(MemoryLogger::new());
        let sleeper = Arc::new(RecordingSleeper::new());
        let service = RetryService::with_sleeper(
            stub,
            RetryConfig::linear(max_attempts, Duration::from_millis(100)),
            logger.clone(),
            sleeper.clone(),
        );
        (service, logger, sleeper)
    }

    #[test]
    fn linear_backoff_grows_by_one_unit_per_attempt() {
        let backoff = Backoff::Linear {
            unit: Duration::from_millis(100),
        };

        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(5), Duration::from_millis(500));
    }

    #[test]
    fn default_config_is_three_attempts_with_one_second_unit() {
        let config = RetryConfig::default();

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(2));
    }

    #[test]
    fn fixed_backoff_ignores_attempt_number() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(500),
        };

        assert_eq!(backoff.delay(1), Duration::from_millis(500));
        assert_eq!(backoff.delay(3), Duration::from_millis(500));
    }

    #[test]
    fn exponential_backoff_doubles_until_the_cap() {
        let backoff = Backoff::Exponential {
            unit: Duration::from_millis(100),
            cap: Duration::from_secs(1),
            jitter: false,
        };

        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(4), Duration::from_millis(800));
        assert_eq!(backoff.delay(5), Duration::from_secs(1));
        assert_eq!(backoff.delay(60), Duration::from_secs(1));
    }

    #[test]
    fn exponential_jitter_stays_within_half_of_the_delay() {
        let backoff = BackoffKind::Exponential.with_unit(Duration::from_millis(100));

        for _ in 0..10 {
            for attempt in 1..=5_u32 {
                let expected = 100 * 2_u128.pow(attempt - 1);
                let delay_ms = backoff.delay(attempt).as_millis();
                assert!(delay_ms >= expected / 2, "attempt={attempt}, delay_ms={delay_ms}");
                assert!(delay_ms <= expected * 3 / 2, "attempt={attempt}, delay_ms={delay_ms}");
            }
        }
    }

    #[test]
    fn backoff_kind_parses_names_case_insensitively() {
        assert_eq!("Fixed".parse::<BackoffKind>(), Ok(BackoffKind::Fixed));
        assert_eq!(" exponential ".parse::<BackoffKind>(), Ok(BackoffKind::Exponential));
        assert_eq!(
            "random".parse::<BackoffKind>(),
            Err(ConfigError::InvalidBackoff {
                value: String::from("random"),
            })
        );
        assert_eq!(
            BackoffKind::Fixed.with_unit(Duration::from_millis(40)),
            Backoff::Fixed {
                delay: Duration::from_millis(40),
            }
        );
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt_after_two_linear_waits() {
        let stub = StubService::failing_then(vec![timeout(), timeout()], json!({ "id": 1 }));
        let (service, _logger, sleeper) = retry(stub, 3);

        let value = service.fetch("/games/1", None).await.expect("third attempt succeeds");

        assert_eq!(value, json!({ "id": 1 }));
        assert_eq!(service.inner().call_count(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[tokio::test]
    async fn exhaustion_returns_the_last_underlying_error() {
        let stub = StubService::failing_then(
            vec![
                ApiError::from(HttpError::new("first")),
                ApiError::from(HttpError::new("second")),
            ],
            Value::Null,
        )
        .with_fallback_error(ApiError::from(HttpError::with_status(503, "third")));
        let (service, logger, sleeper) = retry(stub, 3);

        let error = service.fetch("/news", None).await.expect_err("all attempts fail");

        assert_eq!(error, ApiError::from(HttpError::with_status(503, "third")));
        assert_eq!(service.inner().call_count(), 3);
        assert_eq!(sleeper.delays().len(), 2);
        let errors = logger.records_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("failed after 3 attempt(s)"));
        assert_eq!(logger.records_at(LogLevel::Warn).len(), 2);
    }

    #[tokio::test]
    async fn zero_attempts_fails_with_retry_exhausted_without_calling_inner() {
        let (service, logger, sleeper) = retry(StubService::succeeding(Value::Null), 0);

        let error = service.remove("/teams/1", None).await.expect_err("no attempt is made");

        assert_eq!(error, ApiError::RetryExhausted { attempts: 0 });
        assert_eq!(service.inner().call_count(), 0);
        assert!(sleeper.delays().is_empty());
        assert_eq!(logger.records_at(LogLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn non_retryable_errors_are_returned_immediately() {
        let (service, _logger, sleeper) = retry(StubService::failing(ApiError::InvalidPath), 5);

        let error = service.send("", None, None).await.expect_err("invalid path");

        assert_eq!(error, ApiError::InvalidPath);
        assert_eq!(service.inner().call_count(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn concurrent_calls_keep_independent_attempt_counters() {
        let stub = StubService::failing_then(vec![timeout()], json!("ok"));
        let (service, _logger, sleeper) = retry(stub, 3);

        let (first, second) = tokio::join!(
            service.fetch("/a", None),
            service.replace("/b", None, None)
        );

        assert_eq!(first.expect("first call"), json!("ok"));
        assert_eq!(second.expect("second call"), json!("ok"));
        assert_eq!(service.inner().call_count(), 3);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(100)]);
    }
}
