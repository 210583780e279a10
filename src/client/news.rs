//! News-search API client
//!
//! Wraps the external news provider: fixed API-key header, default locale
//! parameters merged under caller overrides, calendar date windows, and a
//! caching wrapper with tiered TTLs.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use crate::cache::{cache_key, ApiCache, TtlTiers};
use crate::client::sources::{SourceCategory, SourceSelection, Trend};
use crate::config::NewsConfig;
use crate::error::{ApiError, ConfigError, Result};
use crate::models::{NewsSearchResponse, SourcesResponse};

/// Provider allows 5 requests per second on the standard plan
const RATE_LIMIT_PER_SECOND: u32 = 5;

/// News-search operations
///
/// The provider-backed client implements the four wire operations; the
/// composed searches are defaulted on the trait so caching wrappers get
/// them for free.
#[async_trait]
pub trait NewsApi: Send + Sync {
    /// Full-text search. Caller params override the client defaults.
    async fn search(&self, query: &str, params: &[(&str, &str)]) -> Result<NewsSearchResponse>;

    /// Most recent headlines under the default locale filters
    async fn latest_headlines(&self, params: &[(&str, &str)]) -> Result<NewsSearchResponse>;

    /// Available source domains. No default locale merging: the provider
    /// treats this endpoint's filters as exact.
    async fn sources(&self, params: &[(&str, &str)]) -> Result<SourcesResponse>;

    /// Articles similar to the one at `url`
    async fn similar(&self, url: &str, params: &[(&str, &str)]) -> Result<NewsSearchResponse>;

    /// Search restricted to the curated source tiers, over a three-month
    /// window ending today.
    async fn search_by_sources(
        &self,
        query: &str,
        selection: &SourceSelection,
        params: &[(&str, &str)],
    ) -> Result<NewsSearchResponse> {
        let mut built = source_window_params(3);
        built.push(("search_in".to_string(), "title,summary,content".to_string()));
        built.push(("sort_by".to_string(), "relevancy".to_string()));
        built.push(("sources".to_string(), selection.domains().join(",")));
        built.push(("ranked_only".to_string(), "true".to_string()));
        built.push(("page_size".to_string(), "20".to_string()));

        let merged = append_overrides(built, params);
        let refs = as_refs(&merged);
        self.search(query, &refs).await
    }

    /// Search scientific agricultural sources with topic filters
    async fn search_agricultural_science(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<NewsSearchResponse> {
        let mut built = source_window_params(3);
        built.push((
            "topic".to_string(),
            "science,environment,agriculture".to_string(),
        ));
        built.push(("sort_by".to_string(), "relevancy".to_string()));
        built.push((
            "sources".to_string(),
            SourceSelection::Categories(vec![SourceCategory::Cientificas])
                .domains()
                .join(","),
        ));
        built.push(("ranked_only".to_string(), "true".to_string()));
        built.push(("page_size".to_string(), "20".to_string()));

        let merged = append_overrides(built, params);
        let refs = as_refs(&merged);
        self.search(query, &refs).await
    }

    /// Monitor one agricultural trend, newest first
    async fn monitor_trend(
        &self,
        trend: Trend,
        params: &[(&str, &str)],
    ) -> Result<NewsSearchResponse> {
        let mut built = source_window_params(3);
        built.push(("sort_by".to_string(), "date".to_string()));
        built.push(("search_in".to_string(), "title,summary,content".to_string()));
        built.push(("page_size".to_string(), "20".to_string()));

        let merged = append_overrides(built, params);
        let refs = as_refs(&merged);
        self.search(trend.query(), &refs).await
    }
}

/// The calendar date `months` months before `date`.
///
/// Rollover rule: subtraction clamps to the last valid day of the target
/// month (May 31 minus 3 months is Feb 28, or Feb 29 in a leap year).
pub fn date_months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

/// `(from, to)` window ending today, both as calendar dates
pub fn search_window(months: u32) -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    (date_months_before(today, months), today)
}

fn source_window_params(months: u32) -> Vec<(String, String)> {
    let (from, to) = search_window(months);
    vec![
        ("from".to_string(), from.format("%Y-%m-%d").to_string()),
        ("to".to_string(), to.format("%Y-%m-%d").to_string()),
    ]
}

fn append_overrides(
    mut base: Vec<(String, String)>,
    overrides: &[(&str, &str)],
) -> Vec<(String, String)> {
    base.extend(
        overrides
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    base
}

fn as_refs(params: &[(String, String)]) -> Vec<(&str, &str)> {
    params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

/// Provider-backed client
pub struct NewsClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    lang: String,
    countries: String,
    page_size: u32,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl NewsClient {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ConfigError::MissingNewsApiKey)?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            std::num::NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(std::num::NonZeroU32::MIN),
        );

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key,
            lang: config.lang.clone(),
            countries: config.countries.clone(),
            page_size: config.page_size,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Default parameters merged under every search-like request
    fn default_params(&self) -> Vec<(String, String)> {
        vec![
            ("lang".to_string(), self.lang.clone()),
            ("countries".to_string(), self.countries.clone()),
            ("page_size".to_string(), self.page_size.to_string()),
        ]
    }

    /// Merge layers into the final query set. Later layers win on key
    /// collision, so caller overrides beat the client defaults.
    fn merge_params(layers: &[&[(String, String)]]) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        for layer in layers {
            for (k, v) in layer.iter() {
                merged.insert(k.clone(), v.clone());
            }
        }
        merged
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        let query: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let data = response.json::<T>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(data)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }
}

#[async_trait]
impl NewsApi for NewsClient {
    async fn search(&self, query: &str, params: &[(&str, &str)]) -> Result<NewsSearchResponse> {
        let q = vec![("q".to_string(), query.to_string())];
        let overrides = append_overrides(Vec::new(), params);
        let merged = Self::merge_params(&[&q, &self.default_params(), &overrides]);

        self.get_json("/search", &merged).await.inspect_err(|e| {
            log::error!("news search failed for {:?}: {}", query, e);
        })
    }

    async fn latest_headlines(&self, params: &[(&str, &str)]) -> Result<NewsSearchResponse> {
        let overrides = append_overrides(Vec::new(), params);
        let merged = Self::merge_params(&[&self.default_params(), &overrides]);

        self.get_json("/latest_headlines", &merged)
            .await
            .inspect_err(|e| {
                log::error!("latest headlines failed: {}", e);
            })
    }

    async fn sources(&self, params: &[(&str, &str)]) -> Result<SourcesResponse> {
        let overrides = append_overrides(Vec::new(), params);
        let merged = Self::merge_params(&[&overrides]);

        self.get_json("/sources", &merged).await.inspect_err(|e| {
            log::error!("sources lookup failed: {}", e);
        })
    }

    async fn similar(&self, url: &str, params: &[(&str, &str)]) -> Result<NewsSearchResponse> {
        let base = vec![("url".to_string(), url.to_string())];
        let overrides = append_overrides(Vec::new(), params);
        let merged = Self::merge_params(&[&base, &self.default_params(), &overrides]);

        self.get_json("/search_similar", &merged)
            .await
            .inspect_err(|e| {
                log::error!("similar search failed for {:?}: {}", url, e);
            })
    }
}

/// Caching wrapper for any [`NewsApi`] implementation.
///
/// Read operations are cached under tiered TTLs: volatile search results
/// briefly, the near-static source list for an hour. The cache instance
/// is injected so call sites (and tests) control its lifetime.
pub struct CachedNewsClient<C: NewsApi> {
    inner: Arc<C>,
    cache: Arc<ApiCache>,
    tiers: TtlTiers,
}

impl<C: NewsApi> CachedNewsClient<C> {
    pub fn new(inner: C, cache: Arc<ApiCache>, tiers: TtlTiers) -> Self {
        Self {
            inner: Arc::new(inner),
            cache,
            tiers,
        }
    }
}

#[async_trait]
impl<C: NewsApi + 'static> NewsApi for CachedNewsClient<C> {
    async fn search(&self, query: &str, params: &[(&str, &str)]) -> Result<NewsSearchResponse> {
        let mut key_params = vec![("q", query)];
        key_params.extend_from_slice(params);
        let key = cache_key("news_search", &key_params);

        self.cache
            .cached(&key, self.tiers.search, || self.inner.search(query, params))
            .await
    }

    async fn latest_headlines(&self, params: &[(&str, &str)]) -> Result<NewsSearchResponse> {
        let key = cache_key("news_headlines", params);

        self.cache
            .cached(&key, self.tiers.search, || {
                self.inner.latest_headlines(params)
            })
            .await
    }

    async fn sources(&self, params: &[(&str, &str)]) -> Result<SourcesResponse> {
        let key = cache_key("news_sources", params);

        self.cache
            .cached(&key, self.tiers.sources, || self.inner.sources(params))
            .await
    }

    async fn similar(&self, url: &str, params: &[(&str, &str)]) -> Result<NewsSearchResponse> {
        let mut key_params = vec![("url", url)];
        key_params.extend_from_slice(params);
        let key = cache_key("news_similar", &key_params);

        self.cache
            .cached(&key, self.tiers.search, || self.inner.similar(url, params))
            .await
    }
}
