use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// e.g. `invalid_request_error`, `authentication_error`, `rate_limit_error`,
    /// `overloaded_error`.
    #[serde(rename = "type", default)]
    pub r#type: String,
    #[serde(default)]
    pub message: String,
}

/// `{"type": "error", "error": {"type": ..., "message": ...}}`
///
/// The top-level `type` is the discriminant: an empty value means the body is
/// not an error envelope at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type", default)]
    pub r#type: String,
    #[serde(default)]
    pub error: ErrorDetail,
}
