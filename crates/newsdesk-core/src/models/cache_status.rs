use serde::{Deserialize, Serialize};

use super::envelope::default_code;

/// Body of `GET /api/cache/status`. The backend puts these fields at the top
/// level instead of under `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    #[serde(default = "default_code")]
    pub code: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub redis_version: Option<String>,
    /// Human readable, e.g. `1.02M`
    #[serde(default)]
    pub used_memory: Option<String>,
    #[serde(default)]
    pub connected_clients: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    /// Set when the backend cannot reach its cache
    #[serde(default)]
    pub error: Option<String>,
}

impl CacheStatus {
    pub fn is_connected(&self) -> bool {
        self.status == "connected"
    }
}
