use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session expired: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request failed with status {status}: {body}")]
    Status {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request configuration error: {0}")]
    RequestConfig(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Classification of a failed call. Every `ApiError` maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AuthExpired,
    Forbidden,
    NotFound,
    ServerError,
    OtherHttp,
    NetworkUnreachable,
    RequestMalformed,
    InvalidResponse,
}

/// Fallback toast text when the server gave us nothing better.
pub const GENERIC_FAILURE_MESSAGE: &str = "request failed, please try again later";

/// Toast text per error kind. `OtherHttp` prefers the server-supplied message
/// and is resolved in [`ApiError::user_message`].
const NOTICES: &[(ErrorKind, &str)] = &[
    (ErrorKind::AuthExpired, "session expired, please log in again"),
    (ErrorKind::Forbidden, "no permission to access"),
    (ErrorKind::NotFound, "requested resource not found"),
    (ErrorKind::ServerError, "server error, please try again later"),
    (ErrorKind::NetworkUnreachable, "network error, please check your connection"),
    (ErrorKind::RequestMalformed, "request configuration error"),
    (ErrorKind::OtherHttp, GENERIC_FAILURE_MESSAGE),
    (ErrorKind::InvalidResponse, GENERIC_FAILURE_MESSAGE),
];

impl ErrorKind {
    /// Fixed notification text for this kind.
    pub fn notice(self) -> &'static str {
        NOTICES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, text)| *text)
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pull the `message` field out of a JSON error body, if there is one.
    pub fn server_message(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    /// Classify an error status and its raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        Self::from_parts(status, Self::server_message(body), body)
    }

    /// Classify an error status whose message has already been extracted,
    /// e.g. from a response envelope.
    pub fn from_parts(status: u16, message: Option<String>, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status {
            401 => ApiError::Unauthorized(truncated),
            403 => ApiError::Forbidden(truncated),
            404 => ApiError::NotFound(truncated),
            500 => ApiError::ServerError(truncated),
            _ => ApiError::Status {
                status,
                message,
                body: truncated,
            },
        }
    }

    /// Classify a failure raised by the transport before any status arrived.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::RequestConfig(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized(_) => ErrorKind::AuthExpired,
            ApiError::Forbidden(_) => ErrorKind::Forbidden,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::ServerError(_) => ErrorKind::ServerError,
            ApiError::Status { .. } => ErrorKind::OtherHttp,
            ApiError::Network(_) => ErrorKind::NetworkUnreachable,
            ApiError::RequestConfig(_) => ErrorKind::RequestMalformed,
            ApiError::InvalidResponse(_) => ErrorKind::InvalidResponse,
        }
    }

    /// HTTP (or envelope) status for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::ServerError(_) => Some(500),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.as_str(),
            other => other.kind().notice(),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        self.kind() == ErrorKind::AuthExpired
    }
}
