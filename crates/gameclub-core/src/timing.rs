//! Timing layer: measures wall-clock duration of each call.
//!
//! The duration is recorded once per call on both outcomes. A successful call
//! logs `"<VERB> <path> took <ms>ms"`, a failed call logs
//! `"<VERB> <path> failed after <ms>ms"`, both at debug level with two decimal
//! places of a millisecond.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::error::ApiError;
use crate::logger::Logger;
use crate::service::{ApiService, CallOptions, ServiceFuture, Verb};

#[derive(Clone)]
pub struct TimingService<S> {
    inner: S,
    logger: Arc<dyn Logger>,
}

impl<S> TimingService<S> {
    pub fn new(inner: S, logger: Arc<dyn Logger>) -> Self {
        Self { inner, logger }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn timed<T, F>(&self, verb: Verb, path: &str, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let started = Instant::now();
        let result = call.await;
        let elapsed = format_millis(started.elapsed());

        match &result {
            Ok(_) => self.logger.debug(&format!("{verb} {path} took {elapsed}ms")),
            Err(_) => self
                .logger
                .debug(&format!("{verb} {path} failed after {elapsed}ms")),
        }
        result
    }
}

impl<S: ApiService> ApiService for TimingService<S> {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(self.timed(Verb::Fetch, path, self.inner.fetch(path, options)))
    }

    fn send<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(self.timed(Verb::Send, path, self.inner.send(path, body, options)))
    }

    fn replace<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(self.timed(Verb::Replace, path, self.inner.replace(path, body, options)))
    }

    fn remove<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, ()> {
        Box::pin(self.timed(Verb::Remove, path, self.inner.remove(path, options)))
    }
}

/// Milliseconds rounded to two decimal places.
pub fn format_millis(duration: Duration) -> String {
    format!("{:.2}", duration.as_secs_f64() * 1_000.0)
}

/// Parses the duration back out of a record written by [`TimingService`].
pub fn parse_logged_millis(message: &str) -> Option<f64> {
    message
        .rsplit(' ')
        .next()
        .and_then(|token| token.strip_suffix("ms"))
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::logger::{LogLevel, MemoryLogger};
    use crate::testing::StubService;

    #[test]
    fn millis_are_rounded_to_two_places() {
        assert_eq!(format_millis(Duration::from_micros(1_234)), "1.23");
        assert_eq!(format_millis(Duration::from_micros(5_678)), "5.68");
        assert_eq!(format_millis(Duration::ZERO), "0.00");
    }

    #[test]
    fn logged_millis_round_trip_through_the_message() {
        assert_eq!(parse_logged_millis("GET /games took 12.50ms"), Some(12.5));
        assert_eq!(parse_logged_millis("GET /games"), None);
    }

    #[tokio::test]
    async fn success_logs_one_debug_duration_and_returns_value_verbatim() {
        let logger = Arc::new(MemoryLogger::new());
        let service = TimingService::new(StubService::succeeding(json!([1, 2])), logger.clone());

        let value = service.fetch("/news", None).await.expect("call succeeds");

        assert_eq!(value, json!([1, 2]));
        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Debug);
        assert!(records[0].message.starts_with("GET /news took "));
        let millis = parse_logged_millis(&records[0].message).expect("duration is logged");
        assert!(millis >= 0.0);
    }

    #[tokio::test]
    async fn failure_is_timed_once_and_passed_through() {
        let logger = Arc::new(MemoryLogger::new());
        let service = TimingService::new(StubService::failing(ApiError::InvalidPath), logger.clone());

        let error = service.remove("/x", None).await.expect_err("call fails");

        assert_eq!(error, ApiError::InvalidPath);
        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].message.starts_with("DELETE /x failed after "));
    }

    #[tokio::test]
    async fn logged_duration_reflects_delegate_latency() {
        let logger = Arc::new(MemoryLogger::new());
        let stub = StubService::succeeding(Value::Null).with_latency(Duration::from_millis(20));
        let service = TimingService::new(stub, logger.clone());

        service.fetch("/slow", None).await.expect("call succeeds");

        let millis = parse_logged_millis(&logger.records()[0].message).expect("duration is logged");
        assert!(millis >= 20.0, "measured {millis}ms");
    }
}
