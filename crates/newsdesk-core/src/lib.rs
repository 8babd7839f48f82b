//! Core library for newsdesk.
//!
//! The centre of the crate is the HTTP interceptor pipeline in [`api`]:
//! every call made through [`HttpClient`] gets the session token attached
//! on the way out, and on the way back every failure is classified, shown to
//! the user once through a [`Notifier`], and returned to the caller. A 401
//! also drops the session held by the injected [`SessionContext`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use newsdesk_core::{ClientConfig, HttpClient, NewsApi, NewsQuery, SessionContext, TracingNotifier};
//!
//! # async fn run() -> Result<(), newsdesk_core::ApiError> {
//! let session = SessionContext::new();
//! let http = HttpClient::new(ClientConfig::from_env(None), session, Arc::new(TracingNotifier))?;
//! let news = NewsApi::new(http);
//! news.login("alice", "secret").await?;
//! let page = news.list_news(NewsQuery::default(), false).await?;
//! println!("{} items", page.total);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod notify;
pub mod utils;

pub use api::{ApiError, ErrorKind, HttpClient, NewsApi, NewsQuery, RequestDescriptor};
pub use auth::{CredentialStore, SessionContext, SessionData, SessionState};
pub use cache::CacheManager;
pub use config::{ClientConfig, Settings};
pub use notify::{MemoryNotifier, Notifier, TracingNotifier};
