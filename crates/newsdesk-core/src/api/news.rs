//! Typed access to the news backend.
//!
//! `NewsApi` is a thin layer over [`HttpClient`]: it builds descriptors for
//! each endpoint, unwraps the response envelope, and keeps a local cache of
//! reads when one is configured. Error reporting is left to the pipeline.

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::{SessionContext, SessionData};
use crate::cache::{CacheManager, DETAIL_TTL_SECS, LIST_TTL_SECS};
use crate::models::{
    CacheStatus, Category, CreatedNews, Envelope, LoginData, LoginRequest, NewNews, NewsItem,
    NewsPage, NewsUpdate, CODE_OK,
};

use super::{ApiError, HttpClient, RequestDescriptor};

const LOGIN_PATH: &str = "/api/user/login";
const NEWS_PATH: &str = "/api/news";
const CACHE_CLEAR_PATH: &str = "/api/cache/clear";
const CACHE_STATUS_PATH: &str = "/api/cache/status";

const CATEGORIES_CACHE_KEY: &str = "news_categories";
const LIST_CACHE_PREFIX: &str = "news_list_";

/// Parameters of `GET /api/news/list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsQuery {
    pub category_id: i64,
    pub page: u32,
    pub page_size: u32,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            category_id: 1,
            page: 1,
            page_size: 10,
        }
    }
}

impl NewsQuery {
    fn path(&self) -> String {
        format!(
            "{}/list?category_id={}&page={}&page_size={}",
            NEWS_PATH, self.category_id, self.page, self.page_size
        )
    }

    fn cache_key(&self) -> String {
        format!(
            "{}p{}_s{}",
            list_prefix(self.category_id),
            self.page,
            self.page_size
        )
    }
}

fn list_prefix(category_id: i64) -> String {
    format!("{}c{}_", LIST_CACHE_PREFIX, category_id)
}

fn detail_key(id: i64) -> String {
    format!("news_detail_{}", id)
}

pub struct NewsApi {
    http: HttpClient,
    cache: Option<CacheManager>,
}

impl NewsApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http, cache: None }
    }

    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn session(&self) -> &SessionContext {
        self.http.session()
    }

    pub fn cache(&self) -> Option<&CacheManager> {
        self.cache.as_ref()
    }

    // ===== Session =====

    /// Exchange username and password for a token and store it in the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionData, ApiError> {
        let request = self
            .http
            .request(Method::POST, LOGIN_PATH)
            .json(&LoginRequest { username, password })
            .map_err(|e| self.http.fail(e))?;
        let login: LoginData = self.data(self.call(request).await?)?;

        let data = SessionData::new(login.token, username);
        if let Err(e) = self.session().login(data.clone()) {
            warn!(error = %e, "Failed to save session");
        }
        Ok(data)
    }

    /// Forget the token locally. There is no server-side logout.
    pub fn logout(&self) -> anyhow::Result<()> {
        self.session().logout()
    }

    // ===== Reads =====

    pub async fn list_news(&self, query: NewsQuery, use_cache: bool) -> Result<NewsPage, ApiError> {
        let key = query.cache_key();
        if use_cache {
            if let Some(page) = self.cached::<NewsPage>(&key) {
                return Ok(page);
            }
        }

        let request = self.http.request(Method::GET, query.path());
        let page: NewsPage = self.data(self.call(request).await?)?;
        self.store(&key, &page, LIST_TTL_SECS);
        Ok(page)
    }

    pub async fn news_detail(&self, id: i64, use_cache: bool) -> Result<NewsItem, ApiError> {
        let key = detail_key(id);
        if use_cache {
            if let Some(item) = self.cached::<NewsItem>(&key) {
                return Ok(item);
            }
        }

        let request = self
            .http
            .request(Method::GET, format!("{}/detail?id={}", NEWS_PATH, id));
        let item: NewsItem = self.data(self.call(request).await?)?;
        self.store(&key, &item, DETAIL_TTL_SECS);
        Ok(item)
    }

    pub async fn categories(&self, use_cache: bool) -> Result<Vec<Category>, ApiError> {
        if use_cache {
            if let Some(categories) = self.cached::<Vec<Category>>(CATEGORIES_CACHE_KEY) {
                return Ok(categories);
            }
        }

        let request = self
            .http
            .request(Method::GET, format!("{}/categories", NEWS_PATH));
        let categories: Vec<Category> = self.data(self.call(request).await?)?;
        self.store(CATEGORIES_CACHE_KEY, &categories, DETAIL_TTL_SECS);
        Ok(categories)
    }

    // ===== Writes =====

    pub async fn add_news(&self, news: &NewNews) -> Result<CreatedNews, ApiError> {
        let request = self
            .http
            .request(Method::POST, format!("{}/add", NEWS_PATH))
            .json(news)
            .map_err(|e| self.http.fail(e))?;
        let created: CreatedNews = self.data(self.call(request).await?)?;
        self.invalidate_prefix(&list_prefix(news.category_id));
        Ok(created)
    }

    pub async fn update_news(&self, id: i64, update: &NewsUpdate) -> Result<(), ApiError> {
        let request = self
            .http
            .request(Method::PUT, format!("{}/{}", NEWS_PATH, id))
            .json(update)
            .map_err(|e| self.http.fail(e))?;
        self.call::<serde_json::Value>(request).await?;
        // The old category is unknown here, so drop every list page
        self.invalidate_news(id);
        Ok(())
    }

    pub async fn delete_news(&self, id: i64) -> Result<(), ApiError> {
        let request = self
            .http
            .request(Method::DELETE, format!("{}/{}", NEWS_PATH, id));
        self.call::<serde_json::Value>(request).await?;
        self.invalidate_news(id);
        Ok(())
    }

    // ===== Server cache =====

    /// Drop backend cache keys matching `pattern`; `*` clears everything.
    /// Returns the server's summary.
    pub async fn clear_server_cache(&self, pattern: &str) -> Result<String, ApiError> {
        let request = self
            .http
            .request(Method::POST, CACHE_CLEAR_PATH)
            .query("pattern", pattern);
        let envelope: Envelope<serde_json::Value> = self.call(request).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    /// Health of the backend cache. A disconnected cache is reported by the
    /// server as code 500 and fails like any other error code.
    pub async fn cache_status(&self) -> Result<CacheStatus, ApiError> {
        let request = self.http.request(Method::GET, CACHE_STATUS_PATH);
        let status: CacheStatus = self.http.send_json(request).await?;
        let message = status.message.clone().or_else(|| status.error.clone());
        self.check_code(status.code, message)?;
        Ok(status)
    }

    // ===== Helpers =====

    /// Send through the pipeline and unwrap the envelope. A non-200 envelope
    /// code is classified like an HTTP status of the same value.
    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<Envelope<T>, ApiError> {
        let envelope: Envelope<T> = self.http.send_json(request).await?;
        self.check_code(envelope.code, envelope.message.clone())?;
        if envelope.from_cache {
            debug!("Backend served response from its cache");
        }
        Ok(envelope)
    }

    fn check_code(&self, code: i64, message: Option<String>) -> Result<(), ApiError> {
        if code == CODE_OK {
            return Ok(());
        }
        // Codes outside the u16 range cannot be HTTP statuses; 0 keeps them
        // in the generic branch.
        let status = u16::try_from(code).unwrap_or(0);
        let body = message.clone().unwrap_or_default();
        Err(self.http.fail(ApiError::from_parts(status, message, &body)))
    }

    fn data<T>(&self, envelope: Envelope<T>) -> Result<T, ApiError> {
        envelope.data.ok_or_else(|| {
            self.http.fail(ApiError::InvalidResponse(
                "Response envelope has no data".to_string(),
            ))
        })
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.cache.as_ref()?.load_fresh(key)
    }

    fn store<T: serde::Serialize>(&self, key: &str, data: &T, ttl_secs: i64) {
        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.save(key, data, ttl_secs) {
                warn!(cache = key, error = %e, "Failed to write cache");
            }
        }
    }

    fn invalidate_prefix(&self, prefix: &str) {
        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.invalidate_prefix(prefix) {
                warn!(prefix, error = %e, "Failed to invalidate cache");
            }
        }
    }

    fn invalidate_news(&self, id: i64) {
        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.invalidate(&detail_key(id)) {
                warn!(id, error = %e, "Failed to invalidate cached detail");
            }
        }
        self.invalidate_prefix(LIST_CACHE_PREFIX);
    }
}
