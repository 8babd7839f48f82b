//! HTTP client module for the news backend.
//!
//! - `HttpClient`: reqwest wrapper that runs every call through the
//!   interceptor pipeline (token attachment, error classification, user
//!   notification, session teardown on 401)
//! - `NewsApi`: typed news endpoints on top of `HttpClient`
//! - `ApiError` / `ErrorKind`: the failure taxonomy and its user messages

pub mod client;
pub mod error;
pub mod interceptor;
pub mod news;

pub use client::HttpClient;
pub use error::{ApiError, ErrorKind, GENERIC_FAILURE_MESSAGE};
pub use interceptor::{
    AuthInterceptor, ErrorInterceptor, RequestDescriptor, RequestInterceptor, ResponseInterceptor,
};
pub use news::{NewsApi, NewsQuery};
