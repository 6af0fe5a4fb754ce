use serde::{Deserialize, Serialize};

/// The uniform error shape returned to callers regardless of which vendor
/// served the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    pub message: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub code: String,
}

impl NormalizedError {
    pub fn new(
        message: impl Into<String>,
        r#type: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            r#type: r#type.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: NormalizedError,
}

impl From<NormalizedError> for ErrorEnvelope {
    fn from(error: NormalizedError) -> Self {
        Self { error }
    }
}
