use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Configuration for HTTP response caching
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
}

/// Get the platform-appropriate cache directory for college-compare
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("college-compare/http-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/college-compare/http-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Clear the HTTP cache directory
pub fn clear_cache() -> Result<()> {
    let cache_path = get_cache_path();
    match std::fs::remove_dir_all(&cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A cached response body with the time it was stored
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    stored_at: u64, // Unix timestamp
    body: Vec<u8>,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: u64) -> bool {
        now.saturating_sub(self.stored_at) < ttl.as_secs()
    }
}

/// GET response cache keyed by URL.
///
/// Entries live in memory for the session and on disk (cacache) across
/// runs. Stale entries are ignored rather than deleted.
#[derive(Clone)]
pub struct ResponseCache {
    memory: Arc<Mutex<HashMap<String, CacheEntry>>>,
    cache_path: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(cache_path: PathBuf, ttl: Duration) -> Self {
        Self {
            memory: Arc::new(Mutex::new(HashMap::new())),
            cache_path,
            ttl,
        }
    }

    /// Fresh body for `url`, checking memory first and then disk
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let now = now_secs();
        if let Ok(memory) = self.memory.lock() {
            if let Some(entry) = memory.get(url) {
                if entry.is_fresh(self.ttl, now) {
                    return Some(entry.body.clone());
                }
            }
        }

        let entry = self.load_from_disk(url)?;
        if !entry.is_fresh(self.ttl, now) {
            return None;
        }
        let body = entry.body.clone();
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(url.to_string(), entry);
        }
        Some(body)
    }

    /// Store a body in memory and on disk. Disk errors are logged, not returned.
    pub fn put(&self, url: &str, body: &[u8]) {
        let entry = CacheEntry {
            stored_at: now_secs(),
            body: body.to_vec(),
        };

        if let Ok(serialized) = serde_json::to_vec(&entry) {
            if let Err(e) = cacache::write_sync(&self.cache_path, url, &serialized) {
                tracing::debug!(%url, error = %e, "failed to write cache entry");
            }
        }

        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(url.to_string(), entry);
        }
    }

    /// Forget in-memory entries so the next read goes to disk or network
    pub fn clear_memory(&self) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.clear();
        }
    }

    /// Drop everything, including disk entries, so the next read hits the network
    pub fn invalidate_all(&self) {
        self.clear_memory();
        if let Err(e) = cacache::clear_sync(&self.cache_path) {
            tracing::debug!(error = %e, "failed to clear disk cache");
        }
    }

    fn load_from_disk(&self, url: &str) -> Option<CacheEntry> {
        let bytes = cacache::read_sync(&self.cache_path, url).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}
