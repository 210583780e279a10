//! Wire types for the news-search API

use serde::{Deserialize, Serialize};

/// One article as returned by the search and headline endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,

    pub link: String,

    /// Short summary the provider extracts from the body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Source domain without scheme (e.g. "fao.org")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_url: Option<String>,

    /// Provider's source rank; lower is more prominent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// Response shape shared by search, latest-headlines and similar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSearchResponse {
    pub status: String,

    #[serde(default)]
    pub total_hits: u64,

    #[serde(default)]
    pub page: u32,

    #[serde(default)]
    pub total_pages: u32,

    #[serde(default)]
    pub page_size: u32,

    #[serde(default)]
    pub articles: Vec<Article>,
}

/// Response of the sources endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub sources: Vec<String>,
}
