//! HTTP client with the interceptor pipeline built in.
//!
//! Call sites build a [`RequestDescriptor`], hand it to [`HttpClient::execute`]
//! or [`HttpClient::send_json`], and get back either the untouched response or
//! a classified [`ApiError`]. Authentication and user-facing error reporting
//! happen inside the pipeline, so call sites never repeat them.

use std::sync::Arc;

use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::SessionContext;
use crate::config::ClientConfig;
use crate::notify::Notifier;

use super::interceptor::{
    AuthInterceptor, ErrorInterceptor, RequestDescriptor, RequestInterceptor,
    ResponseInterceptor,
};
use super::ApiError;

/// Clone is cheap - reqwest::Client and the interceptor lists are shared.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
    session: SessionContext,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl HttpClient {
    /// Create a client with the default auth and error stages installed.
    pub fn new(
        config: ClientConfig,
        session: SessionContext,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::from_transport)?;

        Ok(Self {
            client,
            request_interceptors: vec![Arc::new(AuthInterceptor::new(session.clone()))],
            response_interceptors: vec![Arc::new(ErrorInterceptor::new(
                session.clone(),
                notifier,
            ))],
            config,
            session,
        })
    }

    /// Append a request stage after the built-in ones.
    pub fn with_request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    /// Append a response stage after the built-in ones.
    pub fn with_response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a descriptor for `path` with the configured timeout.
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestDescriptor {
        RequestDescriptor::new(method, path, self.config.timeout)
    }

    /// Run a call through the pipeline. Success responses are returned
    /// unmodified; failures are reported once and returned.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Response, ApiError> {
        match self.dispatch(request).await {
            Ok(response) => {
                for interceptor in &self.response_interceptors {
                    interceptor.on_success(&response);
                }
                Ok(response)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Like [`execute`](Self::execute), then decode the JSON payload.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        let url = response.url().to_string();
        // Stalled or truncated bodies count as no response
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.fail(ApiError::from_transport(e)))?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            self.fail(ApiError::InvalidResponse(format!(
                "Failed to parse JSON response from {}: {}",
                url, e
            )))
        })
    }

    /// Run the failure stages for an error found after the transport
    /// succeeded, e.g. an error code inside a response envelope.
    pub fn fail(&self, error: ApiError) -> ApiError {
        for interceptor in &self.response_interceptors {
            interceptor.on_failure(&error);
        }
        error
    }

    async fn dispatch(&self, request: RequestDescriptor) -> Result<Response, ApiError> {
        let mut request = request;
        for interceptor in &self.request_interceptors {
            request = interceptor.on_request(request)?;
        }

        let url = self.config.resolve_url(&request.url);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers)
            .timeout(request.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(ApiError::from_transport)?;
        Self::check_response(response).await
    }

    /// Check if response is successful, returning a classified error with
    /// the body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            // The status alone decides the classification
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                    String::new()
                }
            };
            debug!(status = status.as_u16(), "Error status received");
            Err(ApiError::from_status(status.as_u16(), &body))
        }
    }
}
