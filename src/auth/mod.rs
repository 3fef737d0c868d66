//! Authentication for the OpenPlantbook API.
//!
//! Exactly one of two credential schemes may be configured: a static API
//! key (`Authorization: Token <key>`) or OAuth2 client credentials
//! exchanged for a bearer token. Resolution happens once at client
//! construction; a caller-supplied transport skips it entirely.

mod oauth2;

pub use oauth2::OAuth2Provider;

use crate::config::OAuth2Credentials;
use crate::errors::{PlantbookError, PlantbookResult};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Produces the authorization headers for outbound requests.
///
/// Headers are built fresh per request; caller-owned request state is never
/// mutated.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the headers to attach to an outbound request.
    ///
    /// May suspend to refresh a managed token.
    async fn auth_headers(&self) -> PlantbookResult<HeaderMap>;

    /// Human-readable name of the scheme, used for logging.
    fn scheme(&self) -> &'static str;
}

impl std::fmt::Debug for dyn AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthProvider")
            .field("scheme", &self.scheme())
            .finish()
    }
}

/// Static API key authentication: `Authorization: Token <key>`.
pub struct TokenAuthProvider {
    api_key: SecretString,
}

impl TokenAuthProvider {
    /// Create a provider for the given API key.
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn auth_headers(&self) -> PlantbookResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Token {}", self.api_key.expose_secret()))
            .map_err(|_| PlantbookError::Config {
                message: "API key contains invalid header characters".to_string(),
            })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn scheme(&self) -> &'static str {
        "api-key"
    }
}

/// Materializes an [`AuthProvider`] from the configured credential scheme.
///
/// Invoked once during client construction, after the exactly-one-method
/// invariant has been checked. Blank OAuth2 fields that slipped past the
/// option layer are still rejected here.
pub(crate) fn resolve(
    api_key: Option<&SecretString>,
    oauth2: Option<&OAuth2Credentials>,
    base_url: &str,
    transport: Arc<dyn HttpTransport>,
) -> PlantbookResult<Arc<dyn AuthProvider>> {
    match (api_key, oauth2) {
        (Some(_), Some(_)) => Err(PlantbookError::Config {
            message: "multiple authentication methods provided (use only API key OR OAuth2)"
                .to_string(),
        }),
        (None, None) => Err(PlantbookError::Config {
            message: "no authentication provided (set an API key or OAuth2 credentials)"
                .to_string(),
        }),
        (Some(key), None) => Ok(Arc::new(TokenAuthProvider::new(key.clone()))),
        (None, Some(credentials)) => {
            if credentials.client_id.is_empty()
                || credentials.client_secret.expose_secret().is_empty()
            {
                return Err(PlantbookError::Config {
                    message: "both client_id and client_secret required for OAuth2".to_string(),
                });
            }
            Ok(Arc::new(OAuth2Provider::new(
                credentials.clone(),
                base_url,
                transport,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ReqwestTransport;
    use std::time::Duration;

    fn stub_transport() -> Arc<dyn HttpTransport> {
        Arc::new(ReqwestTransport::new(Duration::from_secs(1)).unwrap())
    }

    #[tokio::test]
    async fn token_auth_builds_token_header() {
        let provider = TokenAuthProvider::new(SecretString::new("secret-key".to_string()));
        let headers = provider.auth_headers().await.unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Token secret-key");
        assert_eq!(provider.scheme(), "api-key");
    }

    #[test]
    fn resolve_rejects_both_methods() {
        let key = SecretString::new("key".to_string());
        let credentials = OAuth2Credentials {
            client_id: "id".to_string(),
            client_secret: SecretString::new("secret".to_string()),
        };

        let err = resolve(
            Some(&key),
            Some(&credentials),
            "https://example.test/api/v1",
            stub_transport(),
        )
        .unwrap_err();

        assert!(matches!(err, PlantbookError::Config { .. }));
        assert!(err.to_string().contains("multiple authentication methods"));
    }

    #[test]
    fn resolve_rejects_no_method() {
        let err = resolve(None, None, "https://example.test/api/v1", stub_transport())
            .unwrap_err();

        assert!(matches!(err, PlantbookError::Config { .. }));
        assert!(err.to_string().contains("no authentication provided"));
    }

    #[test]
    fn resolve_rejects_blank_oauth2_fields() {
        let credentials = OAuth2Credentials {
            client_id: "id".to_string(),
            client_secret: SecretString::new(String::new()),
        };

        let err = resolve(
            None,
            Some(&credentials),
            "https://example.test/api/v1",
            stub_transport(),
        )
        .unwrap_err();

        assert!(matches!(err, PlantbookError::Config { .. }));
    }

    #[test]
    fn resolve_picks_scheme_from_credentials() {
        let key = SecretString::new("key".to_string());
        let provider = resolve(
            Some(&key),
            None,
            "https://example.test/api/v1",
            stub_transport(),
        )
        .unwrap();
        assert_eq!(provider.scheme(), "api-key");

        let credentials = OAuth2Credentials {
            client_id: "id".to_string(),
            client_secret: SecretString::new("secret".to_string()),
        };
        let provider = resolve(
            None,
            Some(&credentials),
            "https://example.test/api/v1",
            stub_transport(),
        )
        .unwrap();
        assert_eq!(provider.scheme(), "oauth2");
    }
}
