//! Logging layer: records the start and outcome of every call.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ApiError;
use crate::logger::Logger;
use crate::service::{ApiService, CallOptions, ServiceFuture, Verb};

/// Wraps a service and logs before and after each call.
///
/// Failures are logged at error level and returned as-is; this layer never
/// alters the result.
#[derive(Clone)]
pub struct LoggingService<S> {
    inner: S,
    logger: Arc<dyn Logger>,
}

impl<S> LoggingService<S> {
    pub fn new(inner: S, logger: Arc<dyn Logger>) -> Self {
        Self { inner, logger }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn observe<T, F>(&self, verb: Verb, path: &str, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.logger.info(&format!("{verb} {path}"));
        match call.await {
            Ok(value) => {
                self.logger.info(&format!("{verb} {path} succeeded"));
                Ok(value)
            }
            Err(error) => {
                self.logger.error(&format!("{verb} {path} failed: {error}"));
                Err(error)
            }
        }
    }
}

impl<S: ApiService> ApiService for LoggingService<S> {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(self.observe(Verb::Fetch, path, self.inner.fetch(path, options)))
    }

    fn send<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(self.observe(Verb::Send, path, self.inner.send(path, body, options)))
    }

    fn replace<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(self.observe(Verb::Replace, path, self.inner.replace(path, body, options)))
    }

    fn remove<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, ()> {
        Box::pin(self.observe(Verb::Remove, path, self.inner.remove(path, options)))
    }
}
