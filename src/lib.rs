//! # OpenPlantbook API Client
//!
//! Production-ready Rust client for the OpenPlantbook plant-care API.
//!
//! ## Features
//!
//! - Plant search by common name and per-plant care details
//! - Two authentication schemes: static API key or OAuth2 client credentials
//! - Pluggable response caching with TTLs and a background expiry sweep
//! - Client-side rate limiting for the shared daily call budget
//!   (blocking or fail-fast)
//! - Typed error taxonomy with programmatic matching
//! - Cooperative cancellation on every operation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_plantbook::{create_client, CancellationToken, PlantbookConfig, SearchOptions};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PlantbookConfig::builder()
//!         .api_key(SecretString::new("your-api-key".to_string()))
//!         .build()?;
//!     let client = create_client(config)?;
//!
//!     let ctx = CancellationToken::new();
//!     let results = client
//!         .search_plants(&ctx, "monstera", &SearchOptions::default())
//!         .await?;
//!     for plant in results {
//!         println!("{} ({})", plant.alias, plant.pid);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `client` - Main client interface and factory functions
//! - `config` - Configuration builder and validation
//! - `auth` - Authentication resolution and providers
//! - `transport` - HTTP transport layer
//! - `cache` - Response caching
//! - `resilience` - Token-bucket rate limiting
//! - `errors` - Error taxonomy and classification
//! - `observability` - Structured logging capability
//! - `services` - API operations (plants)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod resilience;
pub mod services;
pub mod transport;

// Re-exports for convenience
pub use auth::{AuthProvider, OAuth2Provider, TokenAuthProvider};
pub use cache::{Cache, InMemoryCache, NoopCache};
pub use client::{create_client, create_client_from_env, PlantbookClient};
pub use config::{OAuth2Credentials, PlantbookConfig, PlantbookConfigBuilder};
pub use errors::{PlantbookError, PlantbookResult};
pub use observability::{Logger, NoopLogger, TracingLogger};
pub use resilience::{RateLimitBehavior, RateLimiter};
pub use services::plants::{
    DetailOptions, PlantDetails, PlantSearchResult, PlantsService, PlantsServiceImpl,
    SearchOptions,
};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Cancellation signal accepted by every operation.
pub use tokio_util::sync::CancellationToken;

/// The default OpenPlantbook API base URL
pub const DEFAULT_BASE_URL: &str = "https://open.plantbook.io/api/v1";

/// The default daily request budget (200 requests per day)
pub const DEFAULT_RATE_LIMIT: u32 = 200;

/// The default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Product-identifying User-Agent attached to every request
pub const USER_AGENT: &str = concat!("plantbook-rs/", env!("CARGO_PKG_VERSION"));
