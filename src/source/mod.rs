pub mod api;
pub mod cache;
pub mod filter;
pub mod memory;

pub use api::ApiClient;
pub use cache::{get_cache_path, CacheConfig, ResponseCache};
pub use filter::{apply_filter, predict, CollegeFilter, DEFAULT_PREDICTION_LIMIT};
pub use memory::InMemoryStore;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::college::{CollegeRecord, Comparison, Exam, NewComparison, NewReview, Review};
use crate::config::{Config, SourceKind};

/// Read/write access to colleges and their related records.
///
/// Lookups by id return `Ok(None)` for unknown ids; `Err` is reserved for
/// the source itself failing (I/O, network, malformed payloads).
#[async_trait]
pub trait CollegeSource: Send + Sync {
    async fn list_colleges(&self, filter: &CollegeFilter) -> Result<Vec<CollegeRecord>>;

    async fn get_college(&self, id: u64) -> Result<Option<CollegeRecord>>;

    /// Store a new college. The id of the argument is ignored and reassigned.
    async fn create_college(&self, college: CollegeRecord) -> Result<CollegeRecord>;

    async fn list_exams(&self) -> Result<Vec<Exam>>;

    async fn get_exam(&self, id: u64) -> Result<Option<Exam>>;

    async fn reviews_for(&self, college_id: u64) -> Result<Vec<Review>>;

    async fn create_review(&self, college_id: u64, review: NewReview) -> Result<Review>;

    async fn create_comparison(&self, comparison: NewComparison) -> Result<Comparison>;

    async fn get_comparison(&self, id: u64) -> Result<Option<Comparison>>;

    /// Colleges whose cutoff is within reach of `score`, best ranked first
    async fn predict_colleges(&self, score: f64, limit: usize) -> Result<Vec<CollegeRecord>>;

    /// Drop cached responses so the next read goes to the backing store
    fn refresh(&self) {}

    /// Human-readable description for logs and the status bar
    fn describe(&self) -> String;
}

/// Build the data source selected by the config
pub fn build_source(config: &Config, cache_config: &CacheConfig) -> Result<Arc<dyn CollegeSource>> {
    match config.source.kind {
        SourceKind::Local => {
            let store = match config.source.fixture {
                Some(ref path) => InMemoryStore::from_fixture(path)?,
                None => InMemoryStore::seeded()?,
            };
            tracing::debug!(source = %store.describe(), "using local store");
            Ok(Arc::new(store))
        }
        SourceKind::Remote => {
            let url = config
                .source
                .api_url
                .as_deref()
                .context("source.api_url is required for a remote source")?;
            let client = ApiClient::new(url, cache_config.clone(), config.source.cache_ttl())?;
            tracing::debug!(source = %client.describe(), "using remote API");
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_local_source_uses_seed_data() {
        let config = Config::default();
        let source = build_source(&config, &CacheConfig { enabled: false }).unwrap();
        let colleges = source.list_colleges(&CollegeFilter::default()).await.unwrap();
        assert!(!colleges.is_empty());
    }

    #[test]
    fn test_build_remote_without_url_fails() {
        let mut config = Config::default();
        config.source.kind = SourceKind::Remote;
        assert!(build_source(&config, &CacheConfig { enabled: false }).is_err());
    }
}
