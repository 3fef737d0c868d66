//! HTTP transport implementations.

use crate::errors::{PlantbookError, PlantbookResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A raw HTTP response as seen by the request pipeline.
///
/// The transport reports every status; classification of non-2xx responses
/// is the pipeline's job, not the transport's.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport trait for making requests to the OpenPlantbook API.
///
/// A caller-supplied implementation bypasses the client's authentication
/// resolution entirely; it is then responsible for its own credentials.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and return the raw response.
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> PlantbookResult<HttpResponse>;
}

/// Reqwest-based HTTP transport implementation.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new reqwest transport with the given request timeout.
    pub fn new(timeout: Duration) -> PlantbookResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlantbookError::Config {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> PlantbookResult<HttpResponse> {
        let mut request = self.client.request(method, url).headers(headers);

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reqwest_transport_creation() {
        let transport = ReqwestTransport::new(Duration::from_secs(30));
        assert!(transport.is_ok());
    }

    #[test]
    fn is_success_covers_2xx_only() {
        let mut response = HttpResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert!(response.is_success());

        response.status = 204;
        assert!(response.is_success());

        response.status = 301;
        assert!(!response.is_success());

        response.status = 404;
        assert!(!response.is_success());
    }
}
