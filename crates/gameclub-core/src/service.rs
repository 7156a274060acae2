//! The service contract shared by the executor and every wrapper layer.
//!
//! | Operation | Verb | Body | Returns |
//! |-----------|------|------|---------|
//! | [`ApiService::fetch`] | `GET` | - | decoded JSON |
//! | [`ApiService::send`] | `POST` | optional | decoded JSON |
//! | [`ApiService::replace`] | `PUT` | optional | decoded JSON |
//! | [`ApiService::remove`] | `DELETE` | - | `()` |
//!
//! The trait is object safe so a composed pipeline can be shared as
//! `Arc<dyn ApiService>`. Typed access lives in [`ApiServiceExt`].

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http_client::HttpMethod;

/// Boxed future returned by every service operation.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Per-call configuration forwarded untouched to the request executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub headers: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The four-verb capability set implemented by every pipeline layer.
pub trait ApiService: Send + Sync {
    fn fetch<'a>(&'a self, path: &'a str, options: Option<&'a CallOptions>)
        -> ServiceFuture<'a, Value>;

    fn send<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value>;

    fn replace<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value>;

    fn remove<'a>(&'a self, path: &'a str, options: Option<&'a CallOptions>)
        -> ServiceFuture<'a, ()>;
}

/// Operation names as they appear in log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Fetch,
    Send,
    Replace,
    Remove,
}

impl Verb {
    pub const fn method(self) -> HttpMethod {
        match self {
            Self::Fetch => HttpMethod::Get,
            Self::Send => HttpMethod::Post,
            Self::Replace => HttpMethod::Put,
            Self::Remove => HttpMethod::Delete,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.method().as_str())
    }
}

impl<S> ApiService for Arc<S>
where
    S: ApiService + ?Sized,
{
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        (**self).fetch(path, options)
    }

    fn send<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        (**self).send(path, body, options)
    }

    fn replace<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        (**self).replace(path, body, options)
    }

    fn remove<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, ()> {
        (**self).remove(path, options)
    }
}

/// Typed helpers that decode payloads into caller-chosen shapes.
///
/// Decoding happens after the pipeline settles, so a payload that does not
/// match `T` is reported as [`ApiError::Decode`] and is never retried.
pub trait ApiServiceExt: ApiService {
    fn fetch_as<'a, T>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, T>
    where
        T: DeserializeOwned + Send + 'a,
    {
        Box::pin(async move { decode(self.fetch(path, options).await?) })
    }

    fn send_as<'a, B, T>(
        &'a self,
        path: &'a str,
        body: &'a B,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send + 'a,
    {
        Box::pin(async move {
            let body = encode(body)?;
            decode(self.send(path, Some(&body), options).await?)
        })
    }

    fn replace_as<'a, B, T>(
        &'a self,
        path: &'a str,
        body: &'a B,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send + 'a,
    {
        Box::pin(async move {
            let body = encode(body)?;
            decode(self.replace(path, Some(&body), options).await?)
        })
    }
}

impl<S: ApiService + ?Sized> ApiServiceExt for S {}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|error| ApiError::encode(&error))
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|error| ApiError::decode(&error))
}
