//! Configuration types for the OpenPlantbook API client.
//!
//! The builder applies ordered configuration mutators; the first invalid
//! option wins and aborts construction. Invariants spanning several options
//! (exactly one authentication method) are checked in [`PlantbookConfigBuilder::build`].

use crate::cache::Cache;
use crate::errors::{PlantbookError, PlantbookResult};
use crate::observability::Logger;
use crate::resilience::RateLimitBehavior;
use crate::transport::HttpTransport;
use crate::{DEFAULT_BASE_URL, DEFAULT_RATE_LIMIT, DEFAULT_TIMEOUT_SECS};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;

/// OAuth2 client-credentials pair.
///
/// Both fields must be present; a partially-specified pair is a
/// configuration error, never silently treated as "no auth".
#[derive(Clone, Debug)]
pub struct OAuth2Credentials {
    /// OAuth2 client identifier
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: SecretString,
}

/// Immutable configuration for the OpenPlantbook API client.
///
/// Built via [`PlantbookConfig::builder`]; read-only after construction.
#[derive(Clone)]
pub struct PlantbookConfig {
    /// Base URL for the OpenPlantbook API, without trailing slash
    pub base_url: String,
    /// Static API key authentication, if configured
    pub api_key: Option<SecretString>,
    /// OAuth2 client-credentials authentication, if configured
    pub oauth2: Option<OAuth2Credentials>,
    /// Caller-supplied transport; bypasses authentication resolution
    pub transport: Option<Arc<dyn HttpTransport>>,
    /// Cache implementation; `None` selects the in-memory default
    pub cache: Option<Arc<dyn Cache>>,
    /// Daily request budget; `None` disables client-side rate limiting
    pub requests_per_day: Option<u32>,
    /// Reaction when the rate limiter has no token available
    pub rate_limit_behavior: RateLimitBehavior,
    /// Optional structured logger
    pub logger: Option<Arc<dyn Logger>>,
    /// Request timeout for the default transport
    pub timeout: Duration,
}

impl std::fmt::Debug for PlantbookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Trait-object fields are reported by presence only.
        f.debug_struct("PlantbookConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("oauth2", &self.oauth2)
            .field("transport", &self.transport.is_some())
            .field("cache", &self.cache.is_some())
            .field("requests_per_day", &self.requests_per_day)
            .field("rate_limit_behavior", &self.rate_limit_behavior)
            .field("logger", &self.logger.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PlantbookConfig {
    /// Creates a new configuration builder seeded with defaults.
    pub fn builder() -> PlantbookConfigBuilder {
        PlantbookConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// Reads `PLANTBOOK_API_KEY`, `PLANTBOOK_CLIENT_ID`,
    /// `PLANTBOOK_CLIENT_SECRET` and `PLANTBOOK_BASE_URL`. Supplying both
    /// credential schemes remains a hard configuration error; precedence
    /// rules belong to front-ends, not this library.
    pub fn from_env() -> PlantbookResult<Self> {
        let mut builder = Self::builder();

        if let Ok(key) = std::env::var("PLANTBOOK_API_KEY") {
            if !key.is_empty() {
                builder = builder.api_key(SecretString::new(key));
            }
        }

        let client_id = std::env::var("PLANTBOOK_CLIENT_ID").unwrap_or_default();
        let client_secret = std::env::var("PLANTBOOK_CLIENT_SECRET").unwrap_or_default();
        if !client_id.is_empty() || !client_secret.is_empty() {
            builder = builder.oauth2(client_id, SecretString::new(client_secret));
        }

        if let Ok(base_url) = std::env::var("PLANTBOOK_BASE_URL") {
            if !base_url.is_empty() {
                builder = builder.base_url(base_url);
            }
        }

        builder.build()
    }
}

/// Builder for [`PlantbookConfig`].
///
/// Each setter validates its input immediately; the first failure is
/// remembered and surfaced by [`Self::build`].
pub struct PlantbookConfigBuilder {
    base_url: String,
    api_key: Option<SecretString>,
    oauth2: Option<OAuth2Credentials>,
    transport: Option<Arc<dyn HttpTransport>>,
    cache: Option<Arc<dyn Cache>>,
    requests_per_day: Option<u32>,
    rate_limit_behavior: RateLimitBehavior,
    logger: Option<Arc<dyn Logger>>,
    timeout: Duration,
    error: Option<PlantbookError>,
}

impl Default for PlantbookConfigBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            oauth2: None,
            transport: None,
            cache: None,
            requests_per_day: Some(DEFAULT_RATE_LIMIT),
            rate_limit_behavior: RateLimitBehavior::default(),
            logger: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            error: None,
        }
    }
}

impl PlantbookConfigBuilder {
    fn fail(mut self, message: &str) -> Self {
        if self.error.is_none() {
            self.error = Some(PlantbookError::Config {
                message: message.to_string(),
            });
        }
        self
    }

    /// Sets static API key authentication. Rejects an empty key.
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        if api_key.expose_secret().is_empty() {
            return self.fail("API key cannot be empty");
        }
        self.api_key = Some(api_key);
        self
    }

    /// Sets OAuth2 client-credentials authentication. Rejects either field
    /// being empty.
    pub fn oauth2(mut self, client_id: impl Into<String>, client_secret: SecretString) -> Self {
        let client_id = client_id.into();
        if client_id.is_empty() || client_secret.expose_secret().is_empty() {
            return self.fail("client_id and client_secret cannot be empty");
        }
        self.oauth2 = Some(OAuth2Credentials {
            client_id,
            client_secret,
        });
        self
    }

    /// Sets a custom base URL (useful for testing). Rejects an empty URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return self.fail("base URL cannot be empty");
        }
        self.base_url = base_url;
        self
    }

    /// Supplies a custom transport.
    ///
    /// This bypasses authentication resolution entirely; the transport is
    /// then responsible for its own credentials.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom cache implementation.
    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the daily request budget. Rejects zero; recomputes the bucket
    /// refill interval.
    pub fn requests_per_day(mut self, requests_per_day: u32) -> Self {
        if requests_per_day == 0 {
            return self.fail("rate limit must be positive");
        }
        self.requests_per_day = Some(requests_per_day);
        self
    }

    /// Disables client-side rate limiting entirely (use with caution).
    pub fn disable_rate_limit(mut self) -> Self {
        self.requests_per_day = None;
        self
    }

    /// Selects how the client reacts when rate limited.
    pub fn rate_limit_behavior(mut self, behavior: RateLimitBehavior) -> Self {
        self.rate_limit_behavior = behavior;
        self
    }

    /// Injects a structured logger.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Sets the request timeout for the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration as a whole and builds it.
    ///
    /// Unless a custom transport was supplied, exactly one authentication
    /// method must be configured.
    pub fn build(self) -> PlantbookResult<PlantbookConfig> {
        if let Some(error) = self.error {
            return Err(error);
        }

        if self.transport.is_none() {
            match (&self.api_key, &self.oauth2) {
                (Some(_), Some(_)) => {
                    return Err(PlantbookError::Config {
                        message:
                            "multiple authentication methods provided (use only API key OR OAuth2)"
                                .to_string(),
                    });
                }
                (None, None) => {
                    return Err(PlantbookError::Config {
                        message:
                            "no authentication provided (set an API key or OAuth2 credentials)"
                                .to_string(),
                    });
                }
                _ => {}
            }
        }

        Ok(PlantbookConfig {
            base_url: self.base_url,
            api_key: self.api_key,
            oauth2: self.oauth2,
            transport: self.transport,
            cache: self.cache,
            requests_per_day: self.requests_per_day,
            rate_limit_behavior: self.rate_limit_behavior,
            logger: self.logger,
            timeout: self.timeout,
        })
    }
}
