//! Error types for the OpenPlantbook API client.
//!
//! Every failure mode has a fixed programmatic identity so that callers can
//! branch with `matches!` instead of inspecting message text. Errors are
//! wrapped with the failing operation's name without losing their kind.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for Plantbook operations
pub type PlantbookResult<T> = Result<T, PlantbookError>;

/// Main error type for the OpenPlantbook API client.
#[derive(Error, Debug, Clone)]
pub enum PlantbookError {
    /// Configuration error (invalid settings, missing or conflicting credentials)
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration issue
        message: String,
    },

    /// Validation error (caller-supplied input malformed)
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the validation issue
        message: String,
    },

    /// Authentication error (invalid credentials or expired token)
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Description of the authentication failure
        message: String,
    },

    /// Requested resource does not exist
    #[error("not found: {endpoint}")]
    NotFound {
        /// Endpoint path that returned 404
        endpoint: String,
    },

    /// Server-reported throttling (HTTP 429)
    #[error("rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Message from the server
        message: String,
    },

    /// Client-side rate limiting decision, distinct from server-reported 429
    #[error("rate limited: {message} (retry after {retry_after})")]
    RateLimited {
        /// Instant at which the next request may be attempted
        retry_after: DateTime<Utc>,
        /// Description of the throttling decision
        message: String,
    },

    /// Any other non-2xx API response
    #[error("API error (status {status}) at {endpoint}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Endpoint path that produced the error
        endpoint: String,
        /// Raw response body or message
        message: String,
    },

    /// Network error (connection failed, timeout, DNS issues)
    #[error("network error: {message}")]
    Network {
        /// Description of the network issue
        message: String,
    },

    /// Caller-requested cancellation, distinct from all API error kinds
    #[error("operation cancelled: {operation}")]
    Cancelled {
        /// Name of the cancelled operation
        operation: String,
    },

    /// Internal error (decode failures, unexpected conditions)
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal issue
        message: String,
    },
}

impl PlantbookError {
    /// Returns the HTTP status code if this error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PlantbookError::Api { status, .. } => Some(*status),
            PlantbookError::RateLimitExceeded { .. } => Some(429),
            PlantbookError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Returns the retry-after instant for client-side rate limiting.
    pub fn retry_after(&self) -> Option<DateTime<Utc>> {
        match self {
            PlantbookError::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Returns true for 4xx API errors.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status_code(), Some(code) if (400..500).contains(&code))
    }

    /// Returns true for 5xx API errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), Some(code) if code >= 500)
    }

    /// Prefixes the error message with the failing operation while keeping
    /// the error kind intact. `NotFound` and `Cancelled` already identify
    /// their context and pass through unchanged.
    pub(crate) fn with_operation(self, operation: &str) -> Self {
        let prefix = |message: String| format!("{operation}: {message}");
        match self {
            PlantbookError::Config { message } => PlantbookError::Config {
                message: prefix(message),
            },
            PlantbookError::Validation { message } => PlantbookError::Validation {
                message: prefix(message),
            },
            PlantbookError::Unauthorized { message } => PlantbookError::Unauthorized {
                message: prefix(message),
            },
            PlantbookError::RateLimitExceeded { message } => PlantbookError::RateLimitExceeded {
                message: prefix(message),
            },
            PlantbookError::RateLimited {
                retry_after,
                message,
            } => PlantbookError::RateLimited {
                retry_after,
                message: prefix(message),
            },
            PlantbookError::Api {
                status,
                endpoint,
                message,
            } => PlantbookError::Api {
                status,
                endpoint,
                message: prefix(message),
            },
            PlantbookError::Network { message } => PlantbookError::Network {
                message: prefix(message),
            },
            PlantbookError::Internal { message } => PlantbookError::Internal {
                message: prefix(message),
            },
            other @ (PlantbookError::NotFound { .. } | PlantbookError::Cancelled { .. }) => other,
        }
    }
}

/// Maps a non-2xx HTTP status onto the error taxonomy.
///
/// 401/403 become [`PlantbookError::Unauthorized`], 404 becomes
/// [`PlantbookError::NotFound`], 429 becomes
/// [`PlantbookError::RateLimitExceeded`]; everything else is a generic
/// [`PlantbookError::Api`] carrying the original status code.
pub(crate) fn classify_status(status: u16, endpoint: &str, body: &[u8]) -> PlantbookError {
    let body_text = String::from_utf8_lossy(body).trim().to_string();
    match status {
        401 | 403 => PlantbookError::Unauthorized {
            message: if body_text.is_empty() {
                "authentication failed".to_string()
            } else {
                body_text
            },
        },
        404 => PlantbookError::NotFound {
            endpoint: endpoint.to_string(),
        },
        429 => PlantbookError::RateLimitExceeded {
            message: if body_text.is_empty() {
                "too many requests".to_string()
            } else {
                body_text
            },
        },
        _ => PlantbookError::Api {
            status,
            endpoint: endpoint.to_string(),
            message: if body_text.is_empty() {
                format!("HTTP {status}")
            } else {
                body_text
            },
        },
    }
}

// Conversions from common error types
impl From<reqwest::Error> for PlantbookError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PlantbookError::Network {
                message: format!("request timed out: {err}"),
            }
        } else if err.is_connect() {
            PlantbookError::Network {
                message: format!("connection failed: {err}"),
            }
        } else {
            PlantbookError::Network {
                message: format!("network error: {err}"),
            }
        }
    }
}

impl From<serde_json::Error> for PlantbookError {
    fn from(err: serde_json::Error) -> Self {
        PlantbookError::Internal {
            message: format!("JSON serialization/deserialization error: {err}"),
        }
    }
}

impl From<url::ParseError> for PlantbookError {
    fn from(err: url::ParseError) -> Self {
        PlantbookError::Config {
            message: format!("invalid URL: {err}"),
        }
    }
}
