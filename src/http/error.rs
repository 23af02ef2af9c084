//! Error classification.
//!
//! Every failure a handler can report is an [`AppError`] with one of a
//! closed set of [`ErrorKind`]s. The kind fixes both the wire code and the
//! HTTP status:
//!
//! | Kind | Wire code | Status |
//! |---|---|---|
//! | `BadRequest` | `BAD_REQUEST` | 400 |
//! | `Unauthorized` | `UNAUTHORIZED` | 401 |
//! | `Forbidden` | `FORBIDDEN` | 403 |
//! | `NotFound` | `NOT_FOUND` | 404 |
//! | `Conflict` | `CONFLICT` | 409 |
//! | `Internal` | `INTERNAL_ERROR` | 500 |
//! | `Timeout` | `TIMEOUT` | 504 |
//!
//! The wrapped cause is for server-side logs only. Rendering to the wire
//! lives in [`crate::http::response`].

use std::borrow::Cow;
use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

/// Boxed cause carried by an [`AppError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Client-visible message for [`ErrorKind::Internal`].
pub const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Client-visible message for [`ErrorKind::Timeout`].
pub const TIMEOUT_MESSAGE: &str = "The request took too long to complete";

/// Closed set of error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
    /// Downstream processing exceeded the per-request deadline.
    Timeout,
}

impl ErrorKind {
    /// Every kind, in table order.
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::Internal,
        ErrorKind::Timeout,
    ];

    /// Stable machine-readable code sent to clients.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A classified failure.
///
/// `message` is safe to show to clients. `source` is only ever logged.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxError>,
}

impl AppError {
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Internal error without a recorded cause.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal, INTERNAL_MESSAGE)
    }

    /// Internal error wrapping `cause`. The cause text never reaches the client.
    pub fn from_cause(cause: impl Into<BoxError>) -> Self {
        Self::internal().with_cause(cause)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, TIMEOUT_MESSAGE)
    }

    /// Attach a diagnostic cause.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.source = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// Client-safe message.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Cause chain rendered for logs, outermost first.
    pub(crate) fn cause_chain(&self) -> Option<String> {
        let mut current: Option<&(dyn std::error::Error + 'static)> =
            self.source.as_deref().map(|e| e as &(dyn std::error::Error + 'static));
        let mut parts = Vec::new();
        while let Some(err) = current {
            parts.push(err.to_string());
            current = err.source();
        }
        (!parts.is_empty()).then(|| parts.join(": "))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}
