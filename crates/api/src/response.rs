//! Response envelope shared by every endpoint.
//!
//! All responses, success or failure, carry
//! `{status: "success"|"error", message, data?|errors?}`.

use serde::Serialize;

/// Envelope status tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// The response envelope.
///
/// `data` is present on success when the operation returns a body; `errors`
/// is present on validation failures that carry field-level detail.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success envelope with a data payload.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success envelope without a payload.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    /// Error envelope.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    /// Error envelope with field-level detail.
    #[must_use]
    pub fn error_with_details(message: impl Into<String>, errors: serde_json::Value) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
            errors: Some(errors),
        }
    }
}
