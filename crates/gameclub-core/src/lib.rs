//! # GameClub Core
//!
//! HTTP client pipeline and typed resource clients for the GameClub REST API.
//!
//! ## Overview
//!
//! Every call goes through a fixed chain of layers that all implement the
//! same four-verb [`ApiService`] contract:
//!
//! - **Retry** re-invokes the call with linear backoff
//! - **Timing** records how long each attempt took
//! - **Logging** records the start and outcome of each attempt
//! - **Executor** performs the single HTTP round trip
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Environment-driven client configuration |
//! | [`error`] | Core error types |
//! | [`executor`] | Innermost request executor |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`logger`] | Logging collaborator |
//! | [`observability`] | Logging layer |
//! | [`pipeline`] | Pipeline assembly |
//! | [`resources`] | Typed CRUD clients |
//! | [`retry`] | Retry layer and backoff strategies |
//! | [`service`] | Service contract and call options |
//! | `testing` | Offline doubles for tests (`testing` feature) |
//! | [`timing`] | Timing layer |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gameclub_core::{create_api_service, GameClubApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = Arc::new(create_api_service("http://localhost:3000/api"));
//!     let api = GameClubApi::new(service);
//!
//!     for game in api.games.list().await? {
//!         println!("{} ({})", game.title, game.genre);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ ResourceClient  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  RetryService   │────▶│ Sleeper          │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ TimingService   │────▶│ Logger           │
//! └────────┬────────┘     │ (tracing/memory) │
//!          │              └──────────────────┘
//!          ▼                       ▲
//! ┌─────────────────┐              │
//! │ LoggingService  │──────────────┘
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ RequestExecutor │────▶│ HTTP Client      │
//! └─────────────────┘     │ (reqwest/script) │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use gameclub_core::ApiError;
//!
//! fn describe(error: &ApiError) -> &'static str {
//!     match error {
//!         ApiError::Transport(inner) if inner.status() == Some(404) => "not found",
//!         ApiError::Transport(_) => "transport failure",
//!         ApiError::RetryExhausted { .. } => "retry disabled",
//!         ApiError::InvalidPath => "bad path",
//!         ApiError::Decode { .. } | ApiError::Encode { .. } => "payload mismatch",
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod http_client;
pub mod logger;
pub mod observability;
pub mod pipeline;
pub mod resources;
pub mod retry;
pub mod service;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod timing;

// Configuration
pub use config::ClientConfig;

// Error types
pub use error::{ApiError, ConfigError};

// Pipeline layers
pub use executor::RequestExecutor;
pub use observability::LoggingService;
pub use retry::{Backoff, BackoffKind, RetryConfig, RetryService, Sleeper, TokioSleeper};
pub use timing::TimingService;

// Assembly
pub use pipeline::{create_api_service, ApiServiceBuilder, GameClubService};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};

// Logging collaborator
pub use logger::{LogLevel, LogRecord, Logger, MemoryLogger, TracingLogger};

// Resource clients
pub use resources::{Game, GameClubApi, NewsArticle, Resource, ResourceClient, Team, Tournament};

// Service contract
pub use service::{ApiService, ApiServiceExt, CallOptions, ServiceFuture, Verb};
