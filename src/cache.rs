//! Audit result caching — file-backed key-value store with TTL.
//!
//! The pipeline treats this as a plain read-through/write-through contract:
//! get before fetching, set with expiry after a successful audit. Keys are a
//! stable FNV-1a hash of the URL so the filename never leaks query strings.
//!
//! ## LRU eviction
//!
//! When the cache exceeds `max_entries`, the least-recently-accessed entry
//! is evicted (both from the index and from disk).

use crate::auditor::AuditResult;
use anyhow::{Context, Result};
use fnv::FnvHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Default maximum number of cached results before LRU eviction.
const DEFAULT_MAX_ENTRIES: usize = 256;

/// Stable cache key for a URL.
pub fn url_key(url: &str) -> String {
    let mut hasher = FnvHasher::default();
    hasher.write(url.as_bytes());
    format!("{:016x}", hasher.finish())
}

/// Cache entry with metadata.
struct CacheEntry {
    path: PathBuf,
    cached_at: SystemTime,
    ttl: Duration,
    /// When the entry was last accessed (for LRU).
    last_accessed: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        SystemTime::now()
            .duration_since(self.cached_at)
            .map(|elapsed| elapsed > self.ttl)
            .unwrap_or(true)
    }

    fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// File-backed audit result cache with TTL and LRU eviction.
pub struct AuditCache {
    cache_dir: PathBuf,
    index: HashMap<String, CacheEntry>,
    default_ttl: Duration,
    max_entries: usize,
}

impl AuditCache {
    /// Create a cache in the given directory.
    ///
    /// Scans for existing `.json` entries and rebuilds the in-memory index
    /// so results cached by earlier runs remain visible.
    pub fn new(cache_dir: PathBuf, default_ttl: Duration) -> Result<Self> {
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("failed to create cache dir: {}", cache_dir.display()))?;

        let mut index = HashMap::new();
        if let Ok(entries) = fs::read_dir(&cache_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        let cached_at = entry
                            .metadata()
                            .and_then(|m| m.modified())
                            .unwrap_or_else(|_| SystemTime::now());
                        index.insert(
                            stem.to_string(),
                            CacheEntry {
                                path,
                                cached_at,
                                ttl: default_ttl,
                                last_accessed: Instant::now(),
                            },
                        );
                    }
                }
            }
        }

        tracing::debug!(
            "AuditCache initialized: {} entries from {}",
            index.len(),
            cache_dir.display()
        );

        Ok(Self {
            cache_dir,
            index,
            default_ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
        })
    }

    /// Load a fresh cached result for the URL, if one exists.
    pub fn get(&mut self, url: &str) -> Option<AuditResult> {
        let key = url_key(url);
        let entry = self.index.get_mut(&key)?;
        if entry.is_expired() {
            return None;
        }
        entry.touch();

        let data = fs::read(&entry.path).ok()?;
        serde_json::from_slice(&data).ok()
    }

    /// Cache an audit result with the default TTL.
    ///
    /// If the cache is full, the least-recently-used entry is evicted first.
    pub fn put(&mut self, url: &str, result: &AuditResult) -> Result<PathBuf> {
        let key = url_key(url);
        if self.index.len() >= self.max_entries && !self.index.contains_key(&key) {
            self.evict_lru();
        }

        let path = self.cache_dir.join(format!("{key}.json"));
        let data = serde_json::to_vec(result)?;
        fs::write(&path, data)
            .with_context(|| format!("failed to write cache file: {}", path.display()))?;

        self.index.insert(
            key,
            CacheEntry {
                path: path.clone(),
                cached_at: SystemTime::now(),
                ttl: self.default_ttl,
                last_accessed: Instant::now(),
            },
        );

        Ok(path)
    }

    /// Invalidate (remove) a cached result.
    pub fn invalidate(&mut self, url: &str) {
        let key = url_key(url);
        if let Some(entry) = self.index.remove(&key) {
            let _ = fs::remove_file(&entry.path);
        }
    }

    /// Remove every cached entry.
    pub fn clear(&mut self) -> usize {
        let count = self.index.len();
        for (_, entry) in self.index.drain() {
            let _ = fs::remove_file(&entry.path);
        }
        count
    }

    fn evict_lru(&mut self) {
        // Expired entries go first.
        let expired: Vec<String> = self
            .index
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        if !expired.is_empty() {
            for key in expired {
                if let Some(entry) = self.index.remove(&key) {
                    let _ = fs::remove_file(&entry.path);
                }
            }
            return;
        }

        if let Some(lru_key) = self
            .index
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone())
        {
            tracing::info!("evicting LRU cache entry: {lru_key}");
            if let Some(entry) = self.index.remove(&lru_key) {
                let _ = fs::remove_file(&entry.path);
            }
        }
    }

    /// Number of cached results (including expired).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}
