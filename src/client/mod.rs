//! Client interface and factory functions for the OpenPlantbook API.

use crate::auth;
use crate::cache::{Cache, InMemoryCache};
use crate::config::PlantbookConfig;
use crate::errors::PlantbookResult;
use crate::resilience::RateLimiter;
use crate::services::plants::{
    DetailOptions, PlantDetails, PlantSearchResult, PlantsService, PlantsServiceImpl,
    SearchOptions,
};
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// OpenPlantbook API client.
///
/// Cheap to clone; all internals are shared and read-only after
/// construction. Safe to use from concurrent tasks.
#[derive(Clone)]
pub struct PlantbookClient {
    plants: Arc<PlantsServiceImpl>,
}

impl PlantbookClient {
    /// Creates a new client from configuration.
    ///
    /// Resolves the authentication scheme, wires the transport, cache and
    /// rate limiter. Fails with a configuration error when the credential
    /// invariants do not hold.
    pub fn new(config: PlantbookConfig) -> PlantbookResult<Self> {
        let custom_transport = config.transport.is_some();
        let transport: Arc<dyn HttpTransport> = match &config.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(ReqwestTransport::new(config.timeout)?),
        };

        let auth = if custom_transport {
            // Documented escape hatch: the supplied transport carries its
            // own credentials.
            None
        } else {
            Some(auth::resolve(
                config.api_key.as_ref(),
                config.oauth2.as_ref(),
                &config.base_url,
                Arc::clone(&transport),
            )?)
        };

        if let Some(logger) = &config.logger {
            match &auth {
                Some(provider) => logger.debug(
                    "authentication configured",
                    &[("scheme", provider.scheme())],
                ),
                None => logger.debug("using custom transport", &[]),
            }
        }

        let cache: Arc<dyn Cache> = match &config.cache {
            Some(cache) => Arc::clone(cache),
            None => Arc::new(InMemoryCache::new()),
        };

        let limiter = config.requests_per_day.map(RateLimiter::per_day);

        let plants = Arc::new(PlantsServiceImpl::new(
            transport,
            auth,
            cache,
            limiter,
            config.rate_limit_behavior,
            config.base_url.clone(),
            config.logger.clone(),
        ));

        Ok(Self { plants })
    }

    /// Searches for plants by alias/common name.
    pub async fn search_plants(
        &self,
        ctx: &CancellationToken,
        query: &str,
        options: &SearchOptions,
    ) -> PlantbookResult<Vec<PlantSearchResult>> {
        self.plants.search(ctx, query, options).await
    }

    /// Retrieves detailed plant care information for a plant id.
    pub async fn get_plant_details(
        &self,
        ctx: &CancellationToken,
        pid: &str,
        options: &DetailOptions,
    ) -> PlantbookResult<PlantDetails> {
        self.plants.details(ctx, pid, options).await
    }

    /// Returns the plants service as a trait object, for callers that
    /// prefer to depend on the capability contract.
    pub fn plants(&self) -> Arc<dyn PlantsService> {
        self.plants.clone()
    }
}

/// Creates a new Plantbook client from configuration.
pub fn create_client(config: PlantbookConfig) -> PlantbookResult<PlantbookClient> {
    PlantbookClient::new(config)
}

/// Creates a new Plantbook client from environment variables.
pub fn create_client_from_env() -> PlantbookResult<PlantbookClient> {
    let config = PlantbookConfig::from_env()?;
    create_client(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PlantbookError;
    use secrecy::SecretString;

    fn key(value: &str) -> SecretString {
        SecretString::new(value.to_string())
    }

    #[test]
    fn create_client_with_api_key() {
        let config = PlantbookConfig::builder().api_key(key("test-key")).build().unwrap();
        assert!(create_client(config).is_ok());
    }

    #[test]
    fn create_client_with_oauth2() {
        let config = PlantbookConfig::builder()
            .oauth2("id", key("secret"))
            .build()
            .unwrap();
        assert!(create_client(config).is_ok());
    }

    #[test]
    fn both_auth_methods_fail_with_config_error() {
        let err = PlantbookConfig::builder()
            .api_key(key("k"))
            .oauth2("id", key("secret"))
            .build()
            .unwrap_err();
        assert!(matches!(err, PlantbookError::Config { .. }));
        assert!(err.to_string().contains("multiple authentication methods"));
    }

    #[test]
    fn neither_auth_method_fails_with_distinct_error() {
        let err = PlantbookConfig::builder().build().unwrap_err();
        assert!(matches!(err, PlantbookError::Config { .. }));
        assert!(err.to_string().contains("no authentication provided"));
    }
}
