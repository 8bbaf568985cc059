//! Bibliographic search abstraction
//!
//! Provides a unified interface over an external scholarly-search service.
//! A query yields a lazy, potentially unbounded stream of candidate records;
//! the concrete client pages through the remote API on demand. Service
//! unavailability and timeouts surface as `ScholarUnavailable` /
//! `ScholarTimeout` so callers can degrade softly.

mod sync;

pub use sync::{CitationSyncService, SyncReport, SyncState, SYNC_COOLDOWN_HOURS};

use crate::config::ScholarConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;

/// Trait for bibliographic candidate search
#[async_trait]
pub trait BibliographicSearch: Send + Sync {
    /// Start a search, returning a lazy stream of candidate records.
    ///
    /// Each record is the raw JSON object reported by the remote service;
    /// field extraction is the caller's concern. Fails with
    /// `ScholarUnavailable` / `ScholarTimeout` when the service cannot be
    /// reached.
    async fn search(&self, query: &str) -> Result<BoxStream<'static, Result<Value>>>;
}

/// Google-Scholar-style search client (SerpAPI wire format)
pub struct SerpScholarClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    page_size: usize,
    timeout_ms: u64,
}

const DEFAULT_BASE_URL: &str = "https://serpapi.com";

impl SerpScholarClient {
    /// Create a new client from configuration; the request timeout is owned
    /// here so a hung remote can never stall the surrounding request.
    pub fn from_config(config: &ScholarConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "scholar.api_key is required for the search client".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            page_size: config.page_size.max(1),
            timeout_ms: config.timeout_secs * 1000,
        })
    }
}

/// Paging state threaded through the lazy candidate stream
struct PageCursor {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    query: String,
    page_size: usize,
    timeout_ms: u64,
    offset: usize,
    buffer: VecDeque<Value>,
    exhausted: bool,
}

async fn fetch_page(cursor: &PageCursor) -> Result<Vec<Value>> {
    let url = format!("{}/search.json", cursor.base_url.trim_end_matches('/'));

    let response = cursor
        .client
        .get(&url)
        .query(&[
            ("engine", "google_scholar"),
            ("q", cursor.query.as_str()),
            ("api_key", cursor.api_key.as_str()),
            ("start", &cursor.offset.to_string()),
            ("num", &cursor.page_size.to_string()),
        ])
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AppError::ScholarTimeout {
                    timeout_ms: cursor.timeout_ms,
                }
            } else {
                AppError::ScholarUnavailable {
                    message: e.to_string(),
                }
            }
        })?;

    if !response.status().is_success() {
        return Err(AppError::ScholarUnavailable {
            message: format!("search service returned {}", response.status()),
        });
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| AppError::ScholarUnavailable {
            message: format!("invalid search response: {}", e),
        })?;

    let results = body
        .get("organic_results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(results)
}

#[async_trait]
impl BibliographicSearch for SerpScholarClient {
    async fn search(&self, query: &str) -> Result<BoxStream<'static, Result<Value>>> {
        use futures::StreamExt;

        let mut cursor = PageCursor {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            query: query.to_string(),
            page_size: self.page_size,
            timeout_ms: self.timeout_ms,
            offset: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        };

        // First page fetched eagerly so unavailability surfaces here, not
        // mid-stream.
        let first = fetch_page(&cursor).await?;
        cursor.exhausted = first.len() < cursor.page_size;
        cursor.offset = first.len();
        cursor.buffer.extend(first);

        let stream = futures::stream::try_unfold(cursor, |mut cursor| async move {
            loop {
                if let Some(candidate) = cursor.buffer.pop_front() {
                    return Ok(Some((candidate, cursor)));
                }
                if cursor.exhausted {
                    return Ok(None);
                }

                let page = fetch_page(&cursor).await?;
                cursor.exhausted = page.len() < cursor.page_size;
                cursor.offset += page.len();
                cursor.buffer.extend(page);

                if cursor.buffer.is_empty() {
                    return Ok(None);
                }
            }
        })
        .boxed();

        Ok(stream)
    }
}
