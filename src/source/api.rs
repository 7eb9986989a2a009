use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::cache::{get_cache_path, CacheConfig, ResponseCache};
use super::filter::CollegeFilter;
use super::CollegeSource;
use crate::college::{CollegeRecord, Comparison, Exam, NewComparison, NewReview, Review};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Could not reach the API at {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API returned {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Connection failures, timeouts and 5xx/429 responses are worth retrying
    fn is_transient(&self) -> bool {
        match self {
            ApiError::Request { source, .. } => source.is_timeout() || source.is_connect(),
            ApiError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Decode { .. } => false,
        }
    }
}

/// Data source backed by the college directory HTTP API
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    cache: Option<ResponseCache>,
}

impl ApiClient {
    pub fn new(base_url: &str, cache_config: CacheConfig, ttl: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot have paths appended: {}", base_url);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("college-compare/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let cache = cache_config
            .enabled
            .then(|| ResponseCache::new(get_cache_path(), ttl));

        Ok(Self { http, base, cache })
    }

    /// Replace the response cache, e.g. with one in a temporary directory
    pub fn with_cache(mut self, cache: Option<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Base URL with path segments appended, keeping any base path (e.g. `/api`)
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET returning `None` on 404. Retried and cached.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        if let Some(ref cache) = self.cache {
            if let Some(body) = cache.get(url.as_str()) {
                match serde_json::from_slice(&body) {
                    Ok(value) => {
                        tracing::debug!(%url, "cache hit");
                        return Ok(Some(value));
                    }
                    Err(e) => tracing::debug!(%url, error = %e, "discarding unreadable cache entry"),
                }
            }
        }

        let Some(body) = self.fetch(&url).await? else {
            return Ok(None);
        };

        let value = serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })?;

        if let Some(ref cache) = self.cache {
            cache.put(url.as_str(), &body);
        }
        Ok(Some(value))
    }

    async fn fetch(&self, url: &Url) -> Result<Option<Vec<u8>>, ApiError> {
        // Retry strategy: exponential backoff with 3 attempts
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(3);

        RetryIf::spawn(
            retry_strategy,
            || async move {
                tracing::debug!(%url, "GET");
                let response = self
                    .http
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|source| ApiError::Request {
                        url: url.to_string(),
                        source,
                    })?;

                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if !status.is_success() {
                    return Err(ApiError::Status {
                        status,
                        url: url.to_string(),
                    });
                }

                let bytes = response.bytes().await.map_err(|source| ApiError::Request {
                    url: url.to_string(),
                    source,
                })?;
                Ok(Some(bytes.to_vec()))
            },
            |e: &ApiError| {
                let retry = e.is_transient();
                if retry {
                    tracing::warn!(error = %e, "request failed, retrying");
                }
                retry
            },
        )
        .await
    }

    /// POST once (no retry) and drop cached GETs so later reads see the change
    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
            }
            .into());
        }

        let bytes = response.bytes().await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        if let Some(ref cache) = self.cache {
            cache.invalidate_all();
        }

        let value = serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })?;
        Ok(value)
    }

    fn colleges_url(&self, filter: &CollegeFilter) -> Url {
        let mut url = self.endpoint(&["colleges"]);
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }
}

#[derive(Serialize)]
struct PredictRequest {
    score: f64,
}

#[async_trait]
impl CollegeSource for ApiClient {
    async fn list_colleges(&self, filter: &CollegeFilter) -> Result<Vec<CollegeRecord>> {
        let url = self.colleges_url(filter);
        Ok(self.get_json(url).await?.unwrap_or_default())
    }

    async fn get_college(&self, id: u64) -> Result<Option<CollegeRecord>> {
        let id = id.to_string();
        self.get_json(self.endpoint(&["colleges", &id])).await
    }

    async fn create_college(&self, college: CollegeRecord) -> Result<CollegeRecord> {
        self.post_json(self.endpoint(&["colleges"]), &college).await
    }

    async fn list_exams(&self) -> Result<Vec<Exam>> {
        Ok(self
            .get_json(self.endpoint(&["exams"]))
            .await?
            .unwrap_or_default())
    }

    async fn get_exam(&self, id: u64) -> Result<Option<Exam>> {
        let id = id.to_string();
        self.get_json(self.endpoint(&["exams", &id])).await
    }

    async fn reviews_for(&self, college_id: u64) -> Result<Vec<Review>> {
        let id = college_id.to_string();
        Ok(self
            .get_json(self.endpoint(&["colleges", &id, "reviews"]))
            .await?
            .unwrap_or_default())
    }

    async fn create_review(&self, college_id: u64, review: NewReview) -> Result<Review> {
        let id = college_id.to_string();
        self.post_json(self.endpoint(&["colleges", &id, "reviews"]), &review)
            .await
    }

    async fn create_comparison(&self, comparison: NewComparison) -> Result<Comparison> {
        self.post_json(self.endpoint(&["comparisons"]), &comparison)
            .await
    }

    async fn get_comparison(&self, id: u64) -> Result<Option<Comparison>> {
        let id = id.to_string();
        self.get_json(self.endpoint(&["comparisons", &id])).await
    }

    async fn predict_colleges(&self, score: f64, limit: usize) -> Result<Vec<CollegeRecord>> {
        let mut colleges: Vec<CollegeRecord> = self
            .post_json(self.endpoint(&["predict-colleges"]), &PredictRequest { score })
            .await?;
        colleges.truncate(limit);
        Ok(colleges)
    }

    fn refresh(&self) {
        if let Some(ref cache) = self.cache {
            cache.invalidate_all();
        }
    }

    fn describe(&self) -> String {
        format!("API {}", self.base)
    }
}
