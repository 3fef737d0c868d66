//! Plants service implementation: the unified request pipeline.
//!
//! Every operation runs the same sequence: validate input, check the cache,
//! acquire a rate permission, dispatch over the authenticated transport,
//! classify failures or decode success, populate the cache. Nothing is
//! retried; a classified failure is terminal for that call.

use super::types::{DetailOptions, PlantDetails, PlantSearchResult, SearchOptions, SearchResponse};
use crate::auth::AuthProvider;
use crate::cache::Cache;
use crate::errors::{classify_status, PlantbookError, PlantbookResult};
use crate::observability::Logger;
use crate::resilience::{RateLimitBehavior, RateLimiter};
use crate::transport::{HttpResponse, HttpTransport};
use crate::USER_AGENT;
use async_trait::async_trait;
use http::header::{ACCEPT, USER_AGENT as USER_AGENT_HEADER};
use http::{HeaderMap, HeaderValue, Method};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Cache lifetime for search results.
const SEARCH_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache lifetime for plant details; care ranges change rarely.
const DETAIL_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Plants service trait, object-safe for mocking.
#[async_trait]
pub trait PlantsService: Send + Sync {
    /// Searches for plants by alias/common name.
    async fn search(
        &self,
        ctx: &CancellationToken,
        query: &str,
        options: &SearchOptions,
    ) -> PlantbookResult<Vec<PlantSearchResult>>;

    /// Retrieves detailed plant care information.
    async fn details(
        &self,
        ctx: &CancellationToken,
        pid: &str,
        options: &DetailOptions,
    ) -> PlantbookResult<PlantDetails>;
}

/// Implementation of the plants service.
pub struct PlantsServiceImpl {
    transport: Arc<dyn HttpTransport>,
    auth: Option<Arc<dyn AuthProvider>>,
    cache: Arc<dyn Cache>,
    limiter: Option<RateLimiter>,
    rate_limit_behavior: RateLimitBehavior,
    base_url: String,
    logger: Option<Arc<dyn Logger>>,
}

impl PlantsServiceImpl {
    /// Creates a new plants service.
    ///
    /// `auth` is `None` only when a caller-supplied transport carries its
    /// own credentials; `limiter` is `None` when rate limiting is disabled.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth: Option<Arc<dyn AuthProvider>>,
        cache: Arc<dyn Cache>,
        limiter: Option<RateLimiter>,
        rate_limit_behavior: RateLimitBehavior,
        base_url: impl Into<String>,
        logger: Option<Arc<dyn Logger>>,
    ) -> Self {
        Self {
            transport,
            auth,
            cache,
            limiter,
            rate_limit_behavior,
            base_url: {
                let base: String = base_url.into();
                base.trim_end_matches('/').to_string()
            },
            logger,
        }
    }

    fn log_debug(&self, message: &str, fields: &[(&str, &str)]) {
        if let Some(logger) = &self.logger {
            logger.debug(message, fields);
        }
    }

    /// Consumes a rate permission according to the configured behavior.
    /// Skipped entirely when rate limiting is disabled; never reached on a
    /// cache hit.
    async fn acquire_rate_permit(&self, ctx: &CancellationToken) -> PlantbookResult<()> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        match self.rate_limit_behavior {
            RateLimitBehavior::Error => limiter.try_acquire(),
            RateLimitBehavior::Wait => limiter.acquire(ctx).await,
        }
    }

    /// Sends a GET request with auth and product-identifying headers,
    /// racing the caller's cancellation signal.
    async fn dispatch(
        &self,
        ctx: &CancellationToken,
        url: Url,
        operation: &str,
    ) -> PlantbookResult<HttpResponse> {
        let mut headers = match &self.auth {
            Some(auth) => auth.auth_headers().await?,
            None => HeaderMap::new(),
        };
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));

        tokio::select! {
            _ = ctx.cancelled() => Err(PlantbookError::Cancelled {
                operation: operation.to_string(),
            }),
            result = self.transport.send(Method::GET, url, headers, None) => result,
        }
    }

    async fn search_inner(
        &self,
        ctx: &CancellationToken,
        query: &str,
        options: &SearchOptions,
    ) -> PlantbookResult<Vec<PlantSearchResult>> {
        if query.is_empty() {
            return Err(PlantbookError::Validation {
                message: "query cannot be empty".to_string(),
            });
        }

        let cache_key = format!("search:{query}:{}:{}", options.limit, options.user_plants);
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(results) = serde_json::from_slice::<Vec<PlantSearchResult>>(&cached) {
                self.log_debug("cache hit for search", &[("query", query)]);
                return Ok(results);
            }
        }

        self.acquire_rate_permit(ctx).await?;

        let mut url = Url::parse(&format!("{}/plant/search", self.base_url))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("alias", query);
            if options.limit > 0 {
                pairs.append_pair("limit", &options.limit.to_string());
            }
            if options.user_plants {
                pairs.append_pair("userplant", "user");
            }
        }

        let response = self.dispatch(ctx, url, "search plants").await?;
        if !response.is_success() {
            return Err(classify_status(
                response.status,
                "/plant/search",
                &response.body,
            ));
        }

        let envelope: SearchResponse = serde_json::from_slice(&response.body)?;
        self.log_debug(
            "search completed",
            &[
                ("query", query),
                ("results", &envelope.results.len().to_string()),
            ],
        );

        if let Ok(data) = serde_json::to_vec(&envelope.results) {
            self.cache.set(&cache_key, data, SEARCH_CACHE_TTL);
        }

        Ok(envelope.results)
    }

    async fn details_inner(
        &self,
        ctx: &CancellationToken,
        pid: &str,
        options: &DetailOptions,
    ) -> PlantbookResult<PlantDetails> {
        if pid.is_empty() {
            return Err(PlantbookError::Validation {
                message: "pid cannot be empty".to_string(),
            });
        }

        let language = options.language.as_deref().unwrap_or("");
        let cache_key = format!("detail:{pid}:{language}");
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(details) = serde_json::from_slice::<PlantDetails>(&cached) {
                self.log_debug("cache hit for details", &[("pid", pid)]);
                return Ok(details);
            }
        }

        self.acquire_rate_permit(ctx).await?;

        let endpoint = format!("/plant/detail/{pid}");
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))?;
        if !language.is_empty() {
            url.query_pairs_mut().append_pair("lang", language);
        }

        let response = self.dispatch(ctx, url, "get plant details").await?;
        if !response.is_success() {
            return Err(classify_status(response.status, &endpoint, &response.body));
        }

        let details: PlantDetails = serde_json::from_slice(&response.body)?;
        self.log_debug("details retrieved", &[("pid", pid)]);

        if let Ok(data) = serde_json::to_vec(&details) {
            self.cache.set(&cache_key, data, DETAIL_CACHE_TTL);
        }

        Ok(details)
    }
}

#[async_trait]
impl PlantsService for PlantsServiceImpl {
    async fn search(
        &self,
        ctx: &CancellationToken,
        query: &str,
        options: &SearchOptions,
    ) -> PlantbookResult<Vec<PlantSearchResult>> {
        self.search_inner(ctx, query, options)
            .await
            .map_err(|e| e.with_operation("search plants"))
    }

    async fn details(
        &self,
        ctx: &CancellationToken,
        pid: &str,
        options: &DetailOptions,
    ) -> PlantbookResult<PlantDetails> {
        self.details_inner(ctx, pid, options)
            .await
            .map_err(|e| e.with_operation("get plant details"))
    }
}
