//! Error types for the boletines service and client

use thiserror::Error;

/// Result type alias for boletines operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal retry failure: embeds the last underlying message and the
    /// total number of attempts made.
    #[error("operation failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    #[error("Operation failed: {0}")]
    Other(String),
}

impl Error {
    /// Whether a retry could plausibly change the outcome.
    ///
    /// Only transient kinds qualify: network failures, server-side 5xx and
    /// rate limiting. Client errors (4xx) and parse failures are final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Api(ApiError::Network(_))
                | Error::Api(ApiError::ServerError(_))
                | Error::Api(ApiError::RateLimit(_))
        )
    }

    /// Human-facing message for display in call state.
    ///
    /// Prefers the server-provided message embedded in the variant, falls
    /// back to the error's own rendering, and never exposes a debug dump.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api(ApiError::NotFound(msg))
            | Error::Api(ApiError::BadRequest(msg))
            | Error::Api(ApiError::ServerError(msg))
                if !msg.is_empty() =>
            {
                msg.clone()
            }
            other => {
                let rendered = other.to_string();
                if rendered.is_empty() {
                    "Unknown error".to_string()
                } else {
                    rendered
                }
            }
        }
    }
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Check the configured API key.")]
    Unauthorized,

    #[error("Access denied. You don't have permission to access this resource.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(std::time::Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("News API key not configured. Set news.api_key or BOLETINES_NEWS_API_KEY.")]
    MissingNewsApiKey,

    #[error("Datastore service key not configured. Set database.service_key or BOLETINES_DB_SERVICE_KEY.")]
    MissingServiceKey,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Cache-related errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid invalidation pattern: {0}")]
    InvalidPattern(String),

    #[error("Failed to serialize cached value: {0}")]
    Serialize(String),
}

/// Bulletin store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The datastore reported that no row matched. Distinguished from
    /// generic failure so the HTTP surface can answer 404.
    #[error("no bulletin found with id {0}")]
    RowNotFound(i64),

    #[error("datastore error: {0}")]
    Backend(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
