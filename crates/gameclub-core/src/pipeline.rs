//! Assembly of the request pipeline.
//!
//! ```text
//! caller
//!   │
//!   ▼
//! RetryService ──▶ TimingService ──▶ LoggingService ──▶ RequestExecutor ──▶ HttpClient
//! ```
//!
//! The nesting order is decided here and nowhere else.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::executor::{RequestExecutor, DEFAULT_TIMEOUT_MS};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::logger::{Logger, TracingLogger};
use crate::observability::LoggingService;
use crate::retry::{RetryConfig, RetryService, Sleeper, TokioSleeper};
use crate::timing::TimingService;

/// The fully composed pipeline.
pub type GameClubService = RetryService<TimingService<LoggingService<RequestExecutor>>>;

/// Builds the pipeline for `base_url` with the default collaborators:
/// reqwest transport, `tracing` logger, three attempts with a linear one
/// second backoff unit.
pub fn create_api_service(base_url: impl Into<String>) -> GameClubService {
    ApiServiceBuilder::new(base_url).build()
}

/// Builder for a [`GameClubService`] with injected collaborators.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use std::time::Duration;
/// use gameclub_core::{ApiServiceBuilder, MemoryLogger, RetryConfig};
///
/// let logger = Arc::new(MemoryLogger::new());
/// let service = ApiServiceBuilder::new("https://club.example/api")
///     .with_logger(logger.clone())
///     .with_retry(RetryConfig::linear(1, Duration::from_millis(100)))
///     .build();
/// ```
pub struct ApiServiceBuilder {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    logger: Arc<dyn Logger>,
    retry: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    timeout_ms: u64,
}

impl ApiServiceBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: Arc::new(ReqwestHttpClient::new()),
            logger: Arc::new(TracingLogger),
            retry: RetryConfig::default(),
            sleeper: Arc::new(TokioSleeper),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url.clone())
            .with_retry(config.retry_config())
            .with_timeout_ms(config.timeout_ms())
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn build(self) -> GameClubService {
        let executor = RequestExecutor::new(self.base_url, self.http_client)
            .with_default_timeout_ms(self.timeout_ms);
        let logged = LoggingService::new(executor, self.logger.clone());
        let timed = TimingService::new(logged, self.logger.clone());
        RetryService::with_sleeper(timed, self.retry, self.logger, self.sleeper)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::http_client::{HttpError, HttpResponse, ScriptedHttpClient};
    use crate::logger::{LogLevel, MemoryLogger};
    use crate::service::ApiService;
    use crate::testing::RecordingSleeper;
    use crate::timing::parse_logged_millis;

    #[test]
    fn composed_layers_nest_in_fixed_order() {
        let service = create_api_service("https://club.example/api");

        let executor = service.inner().inner().inner();
        assert_eq!(executor.base_url(), "https://club.example/api");
        assert_eq!(service.config(), &RetryConfig::default());
    }

    #[tokio::test]
    async fn records_follow_the_layer_order_for_a_retried_call() {
        let http = Arc::new(
            ScriptedHttpClient::new()
                .with_error(HttpError::new("timeout"))
                .with_response(HttpResponse::ok_json(r#"{"id":1}"#)),
        );
        let logger = Arc::new(MemoryLogger::new());
        let sleeper = Arc::new(RecordingSleeper::new());
        let service = ApiServiceBuilder::new("https://club.example/api")
            .with_http_client(http.clone())
            .with_logger(logger.clone())
            .with_sleeper(sleeper.clone())
            .with_retry(RetryConfig::linear(3, Duration::from_millis(10)))
            .build();

        let value = service.fetch("/games/1", None).await.expect("second attempt wins");

        assert_eq!(value, json!({ "id": 1 }));
        let levels = logger
            .records()
            .into_iter()
            .map(|record| record.level)
            .collect::<Vec<_>>();
        assert_eq!(
            levels,
            vec![
                LogLevel::Info,
                LogLevel::Error,
                LogLevel::Debug,
                LogLevel::Warn,
                LogLevel::Info,
                LogLevel::Info,
                LogLevel::Debug,
            ]
        );
        let last = logger.records().pop().expect("timing record");
        assert!(parse_logged_millis(&last.message).is_some());
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(10)]);
        assert_eq!(http.call_count(), 2);
    }
}
