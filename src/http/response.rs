//! Response envelope.
//!
//! # Responsibilities
//! - Wrap every JSON body in the `{ "success": .., ... }` envelope
//! - Attach pagination metadata to list responses
//! - Render [`AppError`] as the error envelope
//! - Log server-side failures with their cause
//!
//! # Design Decisions
//! - Bodies are serialized up front so a serialization failure can still
//!   become a well-formed error envelope
//! - `204 No Content` never carries a body or a content type
//! - Causes are logged, never echoed to the client

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::http::error::AppError;

/// Handler return type.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Continuation data for paginated lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Opaque continuation token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl PaginationMeta {
    /// An empty cursor is treated as no cursor.
    pub fn new(cursor: impl Into<String>, has_more: bool, total: Option<u64>) -> Self {
        let cursor = cursor.into();
        Self {
            cursor: (!cursor.is_empty()).then_some(cursor),
            has_more,
            total,
        }
    }

    /// Final page: nothing more to fetch.
    pub fn last_page(total: Option<u64>) -> Self {
        Self {
            cursor: None,
            has_more: false,
            total,
        }
    }
}

/// `error` member of the failure envelope.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

/// Wire envelope. `success` is derived from the variant.
#[derive(Debug)]
enum Envelope<'a, T> {
    Success { data: Option<&'a T> },
    Paginated { data: &'a T, meta: &'a PaginationMeta },
    Error(ErrorBody<'a>),
}

impl<T: Serialize> Serialize for Envelope<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Envelope::Success { data } => {
                let len = 1 + data.is_some() as usize;
                let mut state = serializer.serialize_struct("Envelope", len)?;
                state.serialize_field("success", &true)?;
                match data {
                    Some(data) => state.serialize_field("data", data)?,
                    None => state.skip_field("data")?,
                }
                state.end()
            }
            Envelope::Paginated { data, meta } => {
                let mut state = serializer.serialize_struct("Envelope", 3)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.serialize_field("meta", meta)?;
                state.end()
            }
            Envelope::Error(error) => {
                let mut state = serializer.serialize_struct("Envelope", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

/// A successful handler outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// 200 with `data`, or without it when `None`.
    Success(Option<T>),
    /// 201 with `data`.
    Created(T),
    /// 204, empty body.
    NoContent,
    /// 200 with `data` and `meta`.
    Paginated(T, PaginationMeta),
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse::Success(Some(data))
    }

    /// 200 with the `data` member omitted.
    pub fn ok_empty() -> Self {
        ApiResponse::Success(None)
    }

    pub fn created(data: T) -> Self {
        ApiResponse::Created(data)
    }

    pub fn no_content() -> Self {
        ApiResponse::NoContent
    }

    pub fn paginated(data: T, meta: PaginationMeta) -> Self {
        ApiResponse::Paginated(data, meta)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiResponse::Success(_) | ApiResponse::Paginated(..) => StatusCode::OK,
            ApiResponse::Created(_) => StatusCode::CREATED,
            ApiResponse::NoContent => StatusCode::NO_CONTENT,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = match &self {
            ApiResponse::Success(data) => Envelope::Success { data: data.as_ref() },
            ApiResponse::Created(data) => Envelope::Success { data: Some(data) },
            ApiResponse::Paginated(data, meta) => Envelope::Paginated { data, meta },
            ApiResponse::NoContent => {
                return no_content();
            }
        };

        match serde_json::to_vec(&envelope) {
            Ok(bytes) => json_response(status, bytes),
            Err(e) => AppError::from_cause(e).into_response(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                status = status.as_u16(),
                cause = self.cause_chain().as_deref().unwrap_or("none"),
                "Request failed"
            );
        } else {
            tracing::debug!(
                code = self.code(),
                status = status.as_u16(),
                message = self.message(),
                "Request rejected"
            );
        }

        let envelope: Envelope<'_, ()> = Envelope::Error(ErrorBody {
            code: self.code(),
            message: self.message(),
        });

        match serde_json::to_vec(&envelope) {
            Ok(bytes) => json_response(status, bytes),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize error envelope");
                status.into_response()
            }
        }
    }
}

fn json_response(status: StatusCode, bytes: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn no_content() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}
