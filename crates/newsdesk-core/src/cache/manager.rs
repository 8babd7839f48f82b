use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// News list pages change often.
pub const LIST_TTL_SECS: i64 = 300;

/// Details and categories rarely change.
pub const DETAIL_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
    pub ttl_secs: i64,
}

impl<T> CachedData<T> {
    pub fn new(data: T, ttl_secs: i64) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
            ttl_secs,
        }
    }

    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.cached_at).num_seconds()
    }

    pub fn is_stale(&self) -> bool {
        self.age_secs() >= self.ttl_secs
    }
}

/// File-backed JSON cache, one file per key.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Keys become file names, so anything outside `[A-Za-z0-9_-]` is replaced.
    fn file_stem(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect()
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", Self::file_stem(key)))
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", key))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", key))?;

        Ok(Some(cached))
    }

    /// The cached value if present and not stale. Read errors count as a miss.
    pub fn load_fresh<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.load::<T>(key) {
            Ok(Some(cached)) if !cached.is_stale() => {
                debug!(cache = key, age_secs = cached.age_secs(), "Cache hit");
                Some(cached.data)
            }
            Ok(_) => None,
            Err(e) => {
                debug!(cache = key, error = %e, "Failed to load cache entry");
                None
            }
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, data: &T, ttl_secs: i64) -> Result<()> {
        let cached = CachedData::new(data, ttl_secs);
        let path = self.cache_path(key);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file: {}", key))?;
        Ok(())
    }

    pub fn invalidate(&self, key: &str) -> Result<()> {
        let path = self.cache_path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Remove every entry whose key starts with `prefix`. Returns how many
    /// entries were removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> Result<usize> {
        let stem_prefix = Self::file_stem(prefix);
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            let is_match = path.extension().is_some_and(|ext| ext == "json")
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.starts_with(&stem_prefix));
            if is_match {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        debug!(prefix, removed, "Invalidated cache entries");
        Ok(removed)
    }

    pub fn clear(&self) -> Result<usize> {
        self.invalidate_prefix("")
    }
}

// ============================================================================
// Tests
// ============================================================================
