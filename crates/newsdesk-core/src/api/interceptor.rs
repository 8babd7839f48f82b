//! Request and response interceptors.
//!
//! Every call made through [`HttpClient`](super::HttpClient) passes its
//! [`RequestDescriptor`] through the request interceptors in order, and every
//! outcome through the response interceptors. The two default stages are
//! [`AuthInterceptor`] (attach the session token) and [`ErrorInterceptor`]
//! (notify the user, drop the session on 401).

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, Response};
use serde::Serialize;
use tracing::warn;

use crate::auth::SessionContext;
use crate::notify::Notifier;

use super::ApiError;

/// One outgoing call before it is handed to the transport.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the configured base URL, or an absolute URL.
    pub url: String,
    pub headers: HeaderMap,
    /// Query parameters, encoded by the transport.
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            method,
            url: url.into(),
            headers,
            query: Vec::new(),
            body: None,
            timeout,
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::RequestConfig(format!("Failed to serialize body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Stage run on every outgoing request.
pub trait RequestInterceptor: Send + Sync {
    fn on_request(&self, request: RequestDescriptor) -> Result<RequestDescriptor, ApiError>;
}

/// Stage run on every completed call.
pub trait ResponseInterceptor: Send + Sync {
    fn on_success(&self, _response: &Response) {}

    /// Called exactly once per failed call. The error is returned to the
    /// caller afterwards whatever the stage does.
    fn on_failure(&self, error: &ApiError);
}

/// Copies the session token verbatim into the `Authorization` header.
pub struct AuthInterceptor {
    session: SessionContext,
}

impl AuthInterceptor {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }
}

impl RequestInterceptor for AuthInterceptor {
    fn on_request(&self, mut request: RequestDescriptor) -> Result<RequestDescriptor, ApiError> {
        if let Some(token) = self.session.token() {
            let mut value = HeaderValue::from_str(&token).map_err(|e| {
                ApiError::RequestConfig(format!("Invalid Authorization header value: {}", e))
            })?;
            value.set_sensitive(true);
            request.headers.insert(header::AUTHORIZATION, value);
        }
        Ok(request)
    }
}

/// Turns failures into user notifications and logs the user out on 401.
pub struct ErrorInterceptor {
    session: SessionContext,
    notifier: Arc<dyn Notifier>,
}

impl ErrorInterceptor {
    pub fn new(session: SessionContext, notifier: Arc<dyn Notifier>) -> Self {
        Self { session, notifier }
    }
}

impl ResponseInterceptor for ErrorInterceptor {
    fn on_failure(&self, error: &ApiError) {
        warn!(kind = ?error.kind(), status = ?error.status(), error = %error, "Request failed");
        if error.is_auth_expired() {
            self.session.invalidate();
        }
        self.notifier.notify(error.user_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SessionData, SessionState};
    use crate::notify::MemoryNotifier;

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor::new(Method::GET, "/api/news/list", Duration::from_secs(10))
    }

    #[test]
    fn test_descriptor_defaults() {
        let request = descriptor();
        assert_eq!(request.header(header::CONTENT_TYPE), Some("application/json"));
        assert!(request.header(header::AUTHORIZATION).is_none());
        assert_eq!(request.timeout, Duration::from_millis(10_000));
        assert!(request.body.is_none());
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_query_params_keep_order() {
        let request = descriptor().query("pattern", "news:*").query("dry_run", "1");
        assert_eq!(
            request.query,
            vec![
                ("pattern".to_string(), "news:*".to_string()),
                ("dry_run".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_auth_interceptor_attaches_token_verbatim() {
        let session = SessionContext::new();
        session.login(SessionData::new("abc123", "alice")).unwrap();
        let interceptor = AuthInterceptor::new(session);

        let request = interceptor.on_request(descriptor()).unwrap();
        assert_eq!(request.header(header::AUTHORIZATION), Some("abc123"));
        assert_eq!(request.header(header::CONTENT_TYPE), Some("application/json"));
    }

    #[test]
    fn test_auth_interceptor_anonymous_leaves_headers() {
        let interceptor = AuthInterceptor::new(SessionContext::new());
        let before = descriptor();
        let after = interceptor.on_request(before.clone()).unwrap();
        assert_eq!(before.headers, after.headers);
    }

    #[test]
    fn test_auth_interceptor_rejects_unencodable_token() {
        let session = SessionContext::new();
        session.login(SessionData::new("bad\ntoken", "alice")).unwrap();
        let interceptor = AuthInterceptor::new(session);

        let err = interceptor.on_request(descriptor()).unwrap_err();
        assert!(matches!(err, ApiError::RequestConfig(_)));
    }

    #[test]
    fn test_error_interceptor_401_clears_session() {
        let session = SessionContext::new();
        session.login(SessionData::new("abc123", "alice")).unwrap();
        let notifier = MemoryNotifier::new();
        let interceptor = ErrorInterceptor::new(session.clone(), Arc::new(notifier.clone()));

        interceptor.on_failure(&ApiError::from_status(401, r#"{"message":"token expired"}"#));

        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(notifier.messages(), vec!["session expired, please log in again"]);
    }

    #[test]
    fn test_error_interceptor_other_statuses_keep_session() {
        let session = SessionContext::new();
        session.login(SessionData::new("abc123", "alice")).unwrap();
        let notifier = MemoryNotifier::new();
        let interceptor = ErrorInterceptor::new(session.clone(), Arc::new(notifier.clone()));

        for status in [403, 404, 500] {
            interceptor.on_failure(&ApiError::from_status(status, ""));
        }

        assert_eq!(session.token().as_deref(), Some("abc123"));
        assert_eq!(
            notifier.messages(),
            vec![
                "no permission to access",
                "requested resource not found",
                "server error, please try again later",
            ]
        );
    }
}
