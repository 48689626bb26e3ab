use reqwest::StatusCode;

use crate::error::{ApiError, ApiResult, Operation};
use crate::util::compact_text;

/// Outcome of one HTTP exchange: status plus the decoded body, if any.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    operation: Operation,
    status: StatusCode,
    body: Option<T>,
    error_text: Option<String>,
}

impl<T> ApiResponse<T> {
    pub(super) const fn success(operation: Operation, status: StatusCode, body: Option<T>) -> Self {
        Self {
            operation,
            status,
            body,
            error_text: None,
        }
    }

    pub(super) fn failure(operation: Operation, status: StatusCode, raw_body: &[u8]) -> Self {
        let error_text = parse_error_text(raw_body);
        Self {
            operation,
            status,
            body: None,
            error_text,
        }
    }

    pub const fn operation(&self) -> Operation {
        self.operation
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub const fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    /// Server-provided error text for non-2xx responses.
    pub fn error_text(&self) -> Option<&str> {
        self.error_text.as_deref()
    }

    /// `Ok(body)` for a 2xx with a body; `EmptyBody` or `Http` otherwise.
    pub fn into_body(self) -> ApiResult<T> {
        let operation = self.operation;
        self.into_optional_body()?
            .ok_or(ApiError::EmptyBody { operation })
    }

    /// Like [`Self::into_body`] but a missing 2xx body is not an error.
    pub fn into_optional_body(self) -> ApiResult<Option<T>> {
        if self.status.is_success() {
            return Ok(self.body);
        }
        let message = self.error_text.unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
        Err(ApiError::Http {
            operation: self.operation,
            status: self.status.as_u16(),
            message,
        })
    }
}

#[derive(serde::Deserialize)]
struct ErrorPayload {
    error: Option<String>,
    message: Option<String>,
}

fn parse_error_text(raw_body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw_body);
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(&text) {
        if let Some(message) = payload.message.or(payload.error) {
            let message = compact_text(&message);
            if !message.is_empty() {
                return Some(message);
            }
        }
    }

    let compacted = compact_text(&text);
    if compacted.is_empty() {
        None
    } else {
        Some(compacted)
    }
}
