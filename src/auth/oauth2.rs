//! OAuth2 client-credentials bearer authentication.
//!
//! RFC 6749 section 4.4, limited to what the Plantbook token endpoint
//! needs: exchange client id/secret for a bearer token at `<base>/token/`
//! and refresh it before expiry. This is a capability, not a general OAuth2
//! stack.

use crate::auth::AuthProvider;
use crate::config::OAuth2Credentials;
use crate::errors::{PlantbookError, PlantbookResult};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

/// Refresh this long before the reported expiry.
const EXPIRY_LEEWAY: Duration = Duration::from_secs(30);

/// Assumed token lifetime when the endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: SecretString,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_LEEWAY < self.expires_at
    }
}

/// Managed bearer-token authentication via the client-credentials grant.
///
/// The first request triggers a token exchange; subsequent requests reuse
/// the cached token until it nears expiry. The exchange goes through the
/// same transport as API calls.
pub struct OAuth2Provider {
    credentials: OAuth2Credentials,
    token_url: Url,
    transport: Arc<dyn HttpTransport>,
    token: Mutex<Option<CachedToken>>,
}

impl OAuth2Provider {
    /// Create a provider exchanging credentials at `<base_url>/token/`.
    pub fn new(
        credentials: OAuth2Credentials,
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> PlantbookResult<Self> {
        let token_url = Url::parse(&format!("{}/token/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            credentials,
            token_url,
            transport,
            token: Mutex::new(None),
        })
    }

    async fn fetch_token(&self) -> PlantbookResult<CachedToken> {
        let body: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair(
                "client_secret",
                self.credentials.client_secret.expose_secret(),
            )
            .finish();

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response = self
            .transport
            .send(
                Method::POST,
                self.token_url.clone(),
                headers,
                Some(Bytes::from(body)),
            )
            .await?;

        if !response.is_success() {
            return Err(PlantbookError::Unauthorized {
                message: format!(
                    "token request failed with status {}: {}",
                    response.status,
                    String::from_utf8_lossy(&response.body).trim()
                ),
            });
        }

        let token: TokenResponse = serde_json::from_slice(&response.body)?;
        let lifetime = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);

        Ok(CachedToken {
            access_token: SecretString::new(token.access_token),
            expires_at: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl AuthProvider for OAuth2Provider {
    async fn auth_headers(&self) -> PlantbookResult<HeaderMap> {
        let mut guard = self.token.lock().await;

        if !guard.as_ref().is_some_and(CachedToken::is_fresh) {
            *guard = Some(self.fetch_token().await?);
        }

        let token = guard.as_ref().ok_or_else(|| PlantbookError::Internal {
            message: "bearer token missing after refresh".to_string(),
        })?;

        let mut headers = HeaderMap::new();
        let value =
            HeaderValue::from_str(&format!("Bearer {}", token.access_token.expose_secret()))
                .map_err(|_| PlantbookError::Internal {
                    message: "bearer token contains invalid header characters".to_string(),
                })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn scheme(&self) -> &'static str {
        "oauth2"
    }
}
