//! Pipeline tests for the plants service.
//!
//! These use a recording mock transport so every test can assert both the
//! outcome and the exact traffic that reached the wire.

use super::*;
use crate::auth::TokenAuthProvider;
use crate::cache::{Cache, InMemoryCache, NoopCache};
use crate::errors::{PlantbookError, PlantbookResult};
use crate::resilience::{RateLimitBehavior, RateLimiter};
use crate::transport::{HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

// ============================================================================
// Mock transport
// ============================================================================

struct MockTransport {
    responses: Mutex<Vec<HttpResponse>>,
    requests: Mutex<Vec<(Method, Url, HeaderMap)>>,
    /// When set, `send` never completes; used for cancellation tests.
    hang: bool,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new()
        }
    }

    fn push_json(&self, status: u16, body: &str) {
        self.responses.lock().push(HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        });
    }

    fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn last_url(&self) -> Url {
        self.requests.lock().last().unwrap().1.clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        _body: Option<Bytes>,
    ) -> PlantbookResult<HttpResponse> {
        self.requests.lock().push((method, url, headers));

        if self.hang {
            std::future::pending::<()>().await;
        }

        let mut responses = self.responses.lock();
        if responses.is_empty() {
            return Err(PlantbookError::Internal {
                message: "no mock response configured".to_string(),
            });
        }
        Ok(responses.remove(0))
    }
}

// ============================================================================
// Helpers
// ============================================================================

const SEARCH_BODY: &str = r#"{
    "count": 2, "next": null, "previous": null,
    "results": [
        {"pid": "monstera deliciosa", "display_pid": "Monstera deliciosa",
         "alias": "monstera", "category": "Araceae"},
        {"pid": "monstera adansonii", "display_pid": "Monstera adansonii",
         "alias": "monkey mask", "category": "Araceae"}
    ]
}"#;

const DETAIL_BODY: &str = r#"{
    "pid": "monstera deliciosa", "display_pid": "Monstera deliciosa",
    "alias": "monstera",
    "max_light_lux": 30000, "min_light_lux": 1500,
    "max_temp": 32.5, "min_temp": 10.0,
    "max_env_humid": 85, "min_env_humid": 30,
    "max_soil_moist": 60, "min_soil_moist": 15,
    "max_soil_ec": 2000, "min_soil_ec": 350,
    "image_url": "https://example.test/monstera.jpg",
    "category": "Araceae"
}"#;

fn service_with(
    transport: Arc<MockTransport>,
    cache: Arc<dyn Cache>,
    limiter: Option<RateLimiter>,
    behavior: RateLimitBehavior,
) -> PlantsServiceImpl {
    let auth = Arc::new(TokenAuthProvider::new(SecretString::new(
        "test-key".to_string(),
    )));
    PlantsServiceImpl::new(
        transport,
        Some(auth),
        cache,
        limiter,
        behavior,
        "https://example.test/api/v1",
        None,
    )
}

fn default_service(transport: Arc<MockTransport>) -> PlantsServiceImpl {
    service_with(
        transport,
        Arc::new(InMemoryCache::new()),
        None,
        RateLimitBehavior::Wait,
    )
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn empty_query_fails_validation_without_network() {
    let transport = Arc::new(MockTransport::new());
    let service = default_service(transport.clone());
    let ctx = CancellationToken::new();

    let err = service
        .search(&ctx, "", &SearchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PlantbookError::Validation { .. }));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn empty_pid_fails_validation_without_network() {
    let transport = Arc::new(MockTransport::new());
    let service = default_service(transport.clone());
    let ctx = CancellationToken::new();

    let err = service
        .details(&ctx, "", &DetailOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PlantbookError::Validation { .. }));
    assert_eq!(transport.request_count(), 0);
}

// ============================================================================
// Request construction
// ============================================================================

#[tokio::test]
async fn search_builds_expected_request() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(200, SEARCH_BODY);
    let service = default_service(transport.clone());
    let ctx = CancellationToken::new();

    let results = service
        .search(
            &ctx,
            "monstera",
            &SearchOptions {
                limit: 10,
                user_plants: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].pid, "monstera deliciosa");

    let url = transport.last_url();
    assert_eq!(url.path(), "/api/v1/plant/search");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("alias".to_string(), "monstera".to_string()),
            ("limit".to_string(), "10".to_string()),
            ("userplant".to_string(), "user".to_string()),
        ]
    );

    let (_, _, headers) = transport.requests.lock()[0].clone();
    assert_eq!(headers.get("authorization").unwrap(), "Token test-key");
    assert_eq!(headers.get("accept").unwrap(), "application/json");
    assert!(headers
        .get("user-agent")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("plantbook-rs/"));
}

#[tokio::test]
async fn search_omits_optional_parameters_by_default() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(200, SEARCH_BODY);
    let service = default_service(transport.clone());
    let ctx = CancellationToken::new();

    service
        .search(&ctx, "monstera", &SearchOptions::default())
        .await
        .unwrap();

    let url = transport.last_url();
    assert_eq!(url.query(), Some("alias=monstera"));
}

#[tokio::test]
async fn details_builds_expected_request_with_language() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(200, DETAIL_BODY);
    let service = default_service(transport.clone());
    let ctx = CancellationToken::new();

    let details = service
        .details(
            &ctx,
            "monstera deliciosa",
            &DetailOptions {
                language: Some("de".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(details.max_temp, 32.5);
    assert_eq!(details.min_light_lux, 1500);

    let url = transport.last_url();
    assert_eq!(url.path(), "/api/v1/plant/detail/monstera%20deliciosa");
    assert_eq!(url.query(), Some("lang=de"));
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn second_identical_search_is_served_from_cache() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(200, SEARCH_BODY);
    let service = default_service(transport.clone());
    let ctx = CancellationToken::new();
    let options = SearchOptions::default();

    let first = service.search(&ctx, "monstera", &options).await.unwrap();
    let second = service.search(&ctx, "monstera", &options).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn different_options_bypass_the_cached_entry() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(200, SEARCH_BODY);
    transport.push_json(200, SEARCH_BODY);
    let service = default_service(transport.clone());
    let ctx = CancellationToken::new();

    service
        .search(&ctx, "monstera", &SearchOptions::default())
        .await
        .unwrap();
    service
        .search(
            &ctx,
            "monstera",
            &SearchOptions {
                limit: 5,
                user_plants: false,
            },
        )
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn cache_hit_skips_rate_governor() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(200, SEARCH_BODY);
    // One token per hour: a second wire call would fail fast.
    let service = service_with(
        transport.clone(),
        Arc::new(InMemoryCache::new()),
        Some(RateLimiter::new(Duration::from_secs(3600))),
        RateLimitBehavior::Error,
    );
    let ctx = CancellationToken::new();
    let options = SearchOptions::default();

    service.search(&ctx, "monstera", &options).await.unwrap();
    let cached = service.search(&ctx, "monstera", &options).await;

    assert!(cached.is_ok());
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn failed_responses_are_not_cached() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(500, "boom");
    transport.push_json(200, SEARCH_BODY);
    let service = default_service(transport.clone());
    let ctx = CancellationToken::new();
    let options = SearchOptions::default();

    assert!(service.search(&ctx, "monstera", &options).await.is_err());
    let results = service.search(&ctx, "monstera", &options).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(transport.request_count(), 2);
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn fail_fast_returns_rate_limited_with_future_retry_after() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(200, SEARCH_BODY);
    let service = service_with(
        transport.clone(),
        Arc::new(NoopCache::new()),
        Some(RateLimiter::new(Duration::from_secs(3600))),
        RateLimitBehavior::Error,
    );
    let ctx = CancellationToken::new();
    let options = SearchOptions::default();

    service.search(&ctx, "monstera", &options).await.unwrap();
    let before = chrono::Utc::now();
    let err = service.search(&ctx, "monstera", &options).await.unwrap_err();

    match err {
        PlantbookError::RateLimited { retry_after, .. } => assert!(retry_after > before),
        other => panic!("expected RateLimited, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn wait_behavior_blocks_until_token_refills() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(200, SEARCH_BODY);
    transport.push_json(200, SEARCH_BODY);
    let service = service_with(
        transport.clone(),
        Arc::new(NoopCache::new()),
        Some(RateLimiter::new(Duration::from_millis(100))),
        RateLimitBehavior::Wait,
    );
    let ctx = CancellationToken::new();
    let options = SearchOptions::default();

    let start = std::time::Instant::now();
    service.search(&ctx, "monstera", &options).await.unwrap();
    service.search(&ctx, "monstera", &options).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(80));
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn disabled_governor_never_throttles() {
    let transport = Arc::new(MockTransport::new());
    for _ in 0..5 {
        transport.push_json(200, SEARCH_BODY);
    }
    let service = service_with(
        transport.clone(),
        Arc::new(NoopCache::new()),
        None,
        RateLimitBehavior::Error,
    );
    let ctx = CancellationToken::new();

    for _ in 0..5 {
        service
            .search(&ctx, "monstera", &SearchOptions::default())
            .await
            .unwrap();
    }
    assert_eq!(transport.request_count(), 5);
}

// ============================================================================
// Error classification
// ============================================================================

#[tokio::test]
async fn http_statuses_map_onto_the_taxonomy() {
    let cases: Vec<(u16, fn(&PlantbookError) -> bool)> = vec![
        (401, |e| matches!(e, PlantbookError::Unauthorized { .. })),
        (403, |e| matches!(e, PlantbookError::Unauthorized { .. })),
        (404, |e| matches!(e, PlantbookError::NotFound { .. })),
        (429, |e| {
            matches!(e, PlantbookError::RateLimitExceeded { .. })
        }),
        (500, |e| {
            matches!(e, PlantbookError::Api { status: 500, .. })
        }),
    ];

    for (status, check) in cases {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(status, "error body");
        let service = default_service(transport);
        let ctx = CancellationToken::new();

        let err = service
            .search(&ctx, "monstera", &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(check(&err), "status {status} classified as {err:?}");
    }
}

#[tokio::test]
async fn malformed_success_body_is_internal_error() {
    let transport = Arc::new(MockTransport::new());
    transport.push_json(200, "{not json");
    let service = default_service(transport);
    let ctx = CancellationToken::new();

    let err = service
        .search(&ctx, "monstera", &SearchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PlantbookError::Internal { .. }));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn cancelling_mid_dispatch_returns_cancelled_promptly() {
    let transport = Arc::new(MockTransport::hanging());
    let service = default_service(transport);
    let ctx = CancellationToken::new();

    let cancel = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let start = std::time::Instant::now();
    let err = service
        .details(&ctx, "monstera deliciosa", &DetailOptions::default())
        .await
        .unwrap_err();

    match err {
        PlantbookError::Cancelled { operation } => {
            assert_eq!(operation, "get plant details");
        }
        other => panic!("expected Cancelled, got {other:?}"),
    }
    assert!(start.elapsed() < Duration::from_secs(1));
}
