//! Deterministic doubles for exercising pipeline layers offline.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use crate::error::ApiError;
use crate::retry::Sleeper;
use crate::service::{ApiService, CallOptions, ServiceFuture, Verb};

/// Inner service whose outcomes are scripted up front.
///
/// Queued outcomes are consumed in call order; once the queue is empty every
/// call returns the fallback outcome.
#[derive(Debug)]
pub struct StubService {
    queued: Mutex<VecDeque<Result<Value, ApiError>>>,
    fallback: Result<Value, ApiError>,
    latency: Option<Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(Verb, String, Option<CallOptions>)>>,
}

impl StubService {
    fn with_fallback(fallback: Result<Value, ApiError>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            latency: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(value: Value) -> Self {
        Self::with_fallback(Ok(value))
    }

    pub fn failing(error: ApiError) -> Self {
        Self::with_fallback(Err(error))
    }

    /// Fails once per entry of `errors`, then succeeds with `value`.
    pub fn failing_then(errors: Vec<ApiError>, value: Value) -> Self {
        let stub = Self::succeeding(value);
        stub.queued
            .lock()
            .expect("stub queue lock is not poisoned")
            .extend(errors.into_iter().map(Err));
        stub
    }

    pub fn with_fallback_error(mut self, error: ApiError) -> Self {
        self.fallback = Err(error);
        self
    }

    /// Sleeps on the tokio timer before settling each call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(verb, path, options)` of every call, in call order.
    pub fn calls(&self) -> Vec<(Verb, String, Option<CallOptions>)> {
        self.seen
            .lock()
            .expect("stub call log lock is not poisoned")
            .clone()
    }

    fn next_outcome(&self) -> Result<Value, ApiError> {
        self.queued
            .lock()
            .expect("stub queue lock is not poisoned")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn call<'a>(
        &'a self,
        verb: Verb,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .expect("stub call log lock is not poisoned")
                .push((verb, path.to_owned(), options.cloned()));
            let outcome = self.next_outcome();
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            outcome
        })
    }
}

impl ApiService for StubService {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        self.call(Verb::Fetch, path, options)
    }

    fn send<'a>(
        &'a self,
        path: &'a str,
        _body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        self.call(Verb::Send, path, options)
    }

    fn replace<'a>(
        &'a self,
        path: &'a str,
        _body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        self.call(Verb::Replace, path, options)
    }

    fn remove<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, ()> {
        let call = self.call(Verb::Remove, path, options);
        Box::pin(async move { call.await.map(|_| ()) })
    }
}

/// Records requested delays and resumes immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .expect("sleeper lock is not poisoned")
            .clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.delays
            .lock()
            .expect("sleeper lock is not poisoned")
            .push(duration);
        Box::pin(std::future::ready(()))
    }
}
