//! The `{code, message, data}` wrapper the backend puts around payloads.

use serde::Deserialize;

/// Envelope code meaning success.
pub const CODE_OK: i64 = 200;

pub(crate) fn default_code() -> i64 {
    CODE_OK
}

/// A body without `code` is treated as a success.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_code")]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub from_cache: bool,
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}
