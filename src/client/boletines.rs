//! Typed client for the bulletin REST API
//!
//! Maps bulletin intents to HTTP calls against `/api/boletines`, parses
//! the response envelope, and composes the cache and retry layers: reads
//! go through the injected cache with the request retried inside the
//! cache-miss path; mutations run once and invalidate the cached reads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::{cache_key, ApiCache, TtlTiers};
use crate::client::retry::{retry_with_backoff, RetryPolicy};
use crate::error::{ApiError, Result};
use crate::models::{
    ApiResponse, Boletin, BoletinChanges, BoletinEstadoRow, BoletinResumen, NewBoletin,
};

/// Bulletin operations exposed to front ends and tools
#[async_trait]
pub trait BoletinApi: Send + Sync {
    /// List all bulletins, newest registration first
    async fn list(&self) -> Result<Vec<BoletinResumen>>;

    /// List bulletins with their derived elapsed-day counts
    async fn estado(&self) -> Result<Vec<BoletinEstadoRow>>;

    /// Fetch one bulletin by id
    async fn get(&self, id: i64) -> Result<Boletin>;

    /// Register a new bulletin
    async fn create(&self, nuevo: &NewBoletin) -> Result<Boletin>;

    /// Apply a partial update; absent fields are untouched
    async fn update(&self, id: i64, changes: &BoletinChanges) -> Result<Boletin>;

    /// Delete a bulletin
    async fn delete(&self, id: i64) -> Result<()>;
}

/// REST client for the bulletin service
pub struct BoletinClient {
    http: HttpClient,
    base_url: String,
    policy: RetryPolicy,
    cache: Option<Arc<ApiCache>>,
    tiers: TtlTiers,
}

impl BoletinClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:5000/api`
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            policy,
            cache: None,
            tiers: TtlTiers::default(),
        })
    }

    /// Attach a cache for the read operations
    pub fn with_cache(mut self, cache: Arc<ApiCache>, tiers: TtlTiers) -> Self {
        self.cache = Some(cache);
        self.tiers = tiers;
        self
    }

    /// Drop every cached bulletin read after a mutation
    fn invalidate_reads(&self) {
        if let Some(ref cache) = self.cache {
            match cache.clear(Some("^boletines_")) {
                Ok(removed) if removed > 0 => {
                    log::debug!("invalidated {} cached bulletin reads", removed)
                }
                Ok(_) => {}
                Err(e) => log::warn!("cache invalidation failed: {}", e),
            }
        }
    }

    async fn request_envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse<T>> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status.is_success() {
            response.json::<ApiResponse<T>>().await.map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse envelope: {}", e)).into()
            })
        } else {
            Err(Self::error_from_response(status, response).await)
        }
    }

    /// Extract the envelope's message from an error body so callers see
    /// the server's wording, not a status code.
    async fn error_from_response(status: StatusCode, response: reqwest::Response) -> crate::error::Error {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse<Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or(body);

        let api_error = match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(Duration::from_secs(60)),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::BadRequest(message)
            }
            status if status.is_server_error() => ApiError::ServerError(message),
            status => ApiError::InvalidResponse(format!("Unexpected status code: {}", status)),
        };
        api_error.into()
    }

    async fn fetch_data<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
    ) -> Result<T> {
        let envelope = retry_with_backoff(operation, self.policy, || {
            self.request_envelope::<T>(Method::GET, path, None)
        })
        .await
        .inspect_err(|e| log::error!("{} failed: {}", operation, e))?;

        envelope.data.ok_or_else(|| {
            ApiError::InvalidResponse("success envelope without data".to_string()).into()
        })
    }
}

#[async_trait]
impl BoletinApi for BoletinClient {
    async fn list(&self) -> Result<Vec<BoletinResumen>> {
        let key = cache_key("boletines_list", &[]);
        match &self.cache {
            Some(cache) => {
                cache
                    .cached(&key, self.tiers.default, || {
                        self.fetch_data("list_boletines", "/boletines")
                    })
                    .await
            }
            None => self.fetch_data("list_boletines", "/boletines").await,
        }
    }

    async fn estado(&self) -> Result<Vec<BoletinEstadoRow>> {
        let key = cache_key("boletines_estado", &[]);
        match &self.cache {
            Some(cache) => {
                cache
                    .cached(&key, self.tiers.default, || {
                        self.fetch_data("estado_boletines", "/boletines/estado")
                    })
                    .await
            }
            None => {
                self.fetch_data("estado_boletines", "/boletines/estado")
                    .await
            }
        }
    }

    async fn get(&self, id: i64) -> Result<Boletin> {
        let id_string = id.to_string();
        let key = cache_key("boletines_get", &[("id", id_string.as_str())]);
        let path = format!("/boletines/{}", id);

        match &self.cache {
            Some(cache) => {
                cache
                    .cached(&key, self.tiers.default, || {
                        self.fetch_data("get_boletin", &path)
                    })
                    .await
            }
            None => self.fetch_data("get_boletin", &path).await,
        }
    }

    async fn create(&self, nuevo: &NewBoletin) -> Result<Boletin> {
        let body = serde_json::to_value(nuevo)?;
        let envelope = self
            .request_envelope::<Boletin>(Method::POST, "/boletines", Some(&body))
            .await
            .inspect_err(|e| log::error!("create_boletin failed: {}", e))?;

        self.invalidate_reads();
        envelope.data.ok_or_else(|| {
            ApiError::InvalidResponse("success envelope without data".to_string()).into()
        })
    }

    async fn update(&self, id: i64, changes: &BoletinChanges) -> Result<Boletin> {
        let body = serde_json::to_value(changes)?;
        let path = format!("/boletines/{}", id);
        let envelope = self
            .request_envelope::<Boletin>(Method::PUT, &path, Some(&body))
            .await
            .inspect_err(|e| log::error!("update_boletin {} failed: {}", id, e))?;

        self.invalidate_reads();
        envelope.data.ok_or_else(|| {
            ApiError::InvalidResponse("success envelope without data".to_string()).into()
        })
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let path = format!("/boletines/{}", id);
        self.request_envelope::<Value>(Method::DELETE, &path, None)
            .await
            .inspect_err(|e| log::error!("delete_boletin {} failed: {}", id, e))?;

        self.invalidate_reads();
        Ok(())
    }
}
