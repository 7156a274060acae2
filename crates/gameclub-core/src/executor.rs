//! Innermost pipeline layer: one HTTP call per operation, no cross-cutting
//! behavior.

use std::sync::Arc;

use serde_json::Value;

use crate::error::ApiError;
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::service::{ApiService, CallOptions, ServiceFuture, Verb};

/// Timeout applied when the caller's [`CallOptions`] do not carry one.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Performs exactly one request against `base_url` and unwraps the payload.
#[derive(Clone)]
pub struct RequestExecutor {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    default_timeout_ms: u64,
}

impl RequestExecutor {
    pub fn new(base_url: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn execute(
        &self,
        verb: Verb,
        path: &str,
        body: Option<&Value>,
        options: Option<&CallOptions>,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(verb, path, body, options)?;
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let message = if response.body.trim().is_empty() {
                format!("{verb} {path} returned status {}", response.status)
            } else {
                response.body
            };
            return Err(HttpError::with_status(response.status, message).into());
        }

        Ok(response)
    }

    fn build_request(
        &self,
        verb: Verb,
        path: &str,
        body: Option<&Value>,
        options: Option<&CallOptions>,
    ) -> Result<HttpRequest, ApiError> {
        if path.is_empty() || path.trim() != path {
            return Err(ApiError::InvalidPath);
        }

        let mut url = join_url(&self.base_url, path);
        let mut request_timeout_ms = self.default_timeout_ms;
        let mut headers = Vec::new();

        if let Some(options) = options {
            if !options.query.is_empty() {
                let query = options
                    .query
                    .iter()
                    .map(|(name, value)| {
                        format!(
                            "{}={}",
                            urlencoding::encode(name),
                            urlencoding::encode(value)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("&");
                url.push(if url.contains('?') { '&' } else { '?' });
                url.push_str(&query);
            }
            if let Some(timeout) = options.timeout {
                request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            }
            headers.extend(options.headers.iter());
        }

        let mut request = HttpRequest::new(verb.method(), url)
            .with_header("accept", "application/json")
            .with_timeout_ms(request_timeout_ms);

        if let Some(body) = body {
            let encoded = serde_json::to_string(body).map_err(|error| ApiError::encode(&error))?;
            request = request
                .with_header("content-type", "application/json")
                .with_body(encoded);
        }

        for (name, value) in headers {
            request = request.with_header(name.as_str(), value.as_str());
        }

        Ok(request)
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("default_timeout_ms", &self.default_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl ApiService for RequestExecutor {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(async move {
            let response = self.execute(Verb::Fetch, path, None, options).await?;
            decode_payload(Verb::Fetch, path, &response)
        })
    }

    fn send<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(async move {
            let response = self.execute(Verb::Send, path, body, options).await?;
            decode_payload(Verb::Send, path, &response)
        })
    }

    fn replace<'a>(
        &'a self,
        path: &'a str,
        body: Option<&'a Value>,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, Value> {
        Box::pin(async move {
            let response = self.execute(Verb::Replace, path, body, options).await?;
            decode_payload(Verb::Replace, path, &response)
        })
    }

    fn remove<'a>(
        &'a self,
        path: &'a str,
        options: Option<&'a CallOptions>,
    ) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            self.execute(Verb::Remove, path, None, options).await?;
            Ok(())
        })
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// A 2xx body that is not JSON surfaces as a retryable transport error.
fn decode_payload(verb: Verb, path: &str, response: &HttpResponse) -> Result<Value, ApiError> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|error| {
        ApiError::from(HttpError::new(format!(
            "{verb} {path} returned malformed JSON: {error}"
        )))
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::http_client::{HttpMethod, ScriptedHttpClient};

    fn executor(client: &Arc<ScriptedHttpClient>) -> RequestExecutor {
        RequestExecutor::new("https://api.gameclub.test/", client.clone())
    }

    #[tokio::test]
    async fn fetch_joins_base_url_and_decodes_json() {
        let client = Arc::new(
            ScriptedHttpClient::new().with_response(HttpResponse::ok_json(r#"[{"id":1}]"#)),
        );

        let payload = executor(&client)
            .fetch("/games", None)
            .await
            .expect("fetch succeeds");

        assert_eq!(payload, json!([{ "id": 1 }]));
        let request = &client.requests()[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://api.gameclub.test/games");
        assert_eq!(request.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn options_are_applied_to_the_outgoing_request() {
        let client = Arc::new(ScriptedHttpClient::new().with_response(HttpResponse::ok_json("{}")));
        let options = CallOptions::new()
            .with_header("X-Club", "north")
            .with_query("q", "street fighter")
            .with_query("page", "2")
            .with_timeout(Duration::from_millis(750));

        executor(&client)
            .fetch("games", Some(&options))
            .await
            .expect("fetch succeeds");

        let request = &client.requests()[0];
        assert_eq!(
            request.url,
            "https://api.gameclub.test/games?q=street%20fighter&page=2"
        );
        assert_eq!(request.timeout_ms, 750);
        assert_eq!(request.headers.get("x-club").map(String::as_str), Some("north"));
    }

    #[tokio::test]
    async fn send_serializes_body_as_json() {
        let client = Arc::new(
            ScriptedHttpClient::new().with_response(HttpResponse::new(201, r#"{"id":9}"#)),
        );
        let body = json!({ "name": "Night Owls" });

        let payload = executor(&client)
            .send("/teams", Some(&body), None)
            .await
            .expect("send succeeds");

        assert_eq!(payload, json!({ "id": 9 }));
        let request = &client.requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body.as_deref(), Some(r#"{"name":"Night Owls"}"#));
        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn non_success_status_surfaces_as_transport_error() {
        let client = Arc::new(
            ScriptedHttpClient::new().with_response(HttpResponse::new(404, "game not found")),
        );

        let error = executor(&client)
            .replace("/games/4", None, None)
            .await
            .expect_err("404 must fail");

        assert_eq!(
            error,
            ApiError::Transport(HttpError::with_status(404, "game not found"))
        );
    }

    #[tokio::test]
    async fn transport_failure_is_propagated_unchanged() {
        let client = Arc::new(ScriptedHttpClient::new().with_error(HttpError::new("timeout")));

        let error = executor(&client)
            .fetch("/news", None)
            .await
            .expect_err("transport failure must surface");

        assert_eq!(error, ApiError::Transport(HttpError::new("timeout")));
    }

    #[tokio::test]
    async fn remove_accepts_empty_body() {
        let client = Arc::new(ScriptedHttpClient::new().with_response(HttpResponse::no_content()));

        executor(&client)
            .remove("/tournaments/3", None)
            .await
            .expect("delete succeeds");

        assert_eq!(client.requests()[0].method, HttpMethod::Delete);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_retryable_transport_error() {
        let client = Arc::new(
            ScriptedHttpClient::new().with_response(HttpResponse::ok_json("<html>oops</html>")),
        );

        let error = executor(&client)
            .fetch("/games", None)
            .await
            .expect_err("html is not json");

        assert!(matches!(error, ApiError::Transport(_)));
        assert!(error.is_retryable());
        assert!(error.to_string().contains("GET /games returned malformed JSON"));
    }

    #[tokio::test]
    async fn path_with_surrounding_whitespace_is_rejected() {
        let client = Arc::new(ScriptedHttpClient::new());

        let error = executor(&client)
            .fetch(" /games", None)
            .await
            .expect_err("padded path must fail");

        assert_eq!(error, ApiError::InvalidPath);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_path_is_rejected_without_network_traffic() {
        let client = Arc::new(ScriptedHttpClient::new());

        let error = executor(&client)
            .fetch("  ", None)
            .await
            .expect_err("empty path must fail");

        assert_eq!(error, ApiError::InvalidPath);
        assert_eq!(client.call_count(), 0);
    }
}
