//! Data models for the news backend.
//!
//! - `NewsItem`, `NewsPage`, `Category`: read models
//! - `NewNews`, `NewsUpdate`: write payloads
//! - `Envelope`: the `{code, message, data}` response wrapper
//! - `LoginRequest`, `LoginData`: login exchange
//! - `CacheStatus`: backend cache health

pub mod cache_status;
pub mod envelope;
pub mod news;
pub mod user;

pub use cache_status::CacheStatus;
pub use envelope::{Envelope, CODE_OK};
pub use news::{Category, CreatedNews, NewNews, NewsItem, NewsPage, NewsUpdate};
pub use user::{LoginData, LoginRequest};
