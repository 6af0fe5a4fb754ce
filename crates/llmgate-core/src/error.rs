use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

use llmgate_protocol::canonical::NormalizedError;
use llmgate_provider_core::{ProviderError, UpstreamFailure, UpstreamTransportErrorKind};

/// Non-standard "client closed request".
pub const STATUS_CLIENT_CLOSED: u16 = 499;

const RETRY_LATER: &str = "upstream service unavailable, please retry later";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no channel serves model {model}")]
    NoChannel { model: String },
    #[error("channel {0} not found")]
    ChannelNotFound(i64),
    #[error("channel configuration: {0}")]
    Configuration(ProviderError),
    #[error("upstream transport ({}): {message}", .kind.as_str())]
    Transport {
        kind: UpstreamTransportErrorKind,
        message: String,
    },
    #[error("upstream returned HTTP {status} without a recognizable error body")]
    UpstreamProtocol { status: u16, body: Bytes },
    #[error("upstream error {status}: {}", .error.message)]
    Vendor { status: u16, error: NormalizedError },
    #[error("{0}")]
    Decode(ProviderError),
    #[error("request cancelled")]
    Cancelled,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) | GatewayError::Configuration(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::ChannelNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::NoChannel { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Transport { kind, .. } if kind.is_timeout() => {
                StatusCode::GATEWAY_TIMEOUT
            }
            GatewayError::Transport { .. } | GatewayError::UpstreamProtocol { .. } => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Vendor { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Cancelled => {
                StatusCode::from_u16(STATUS_CLIENT_CLOSED).unwrap_or(StatusCode::BAD_REQUEST)
            }
        }
    }

    /// Caller-facing error. Raw transport text and unrecognized upstream
    /// bodies never appear here.
    pub fn to_normalized(&self) -> NormalizedError {
        match self {
            GatewayError::InvalidRequest(detail) => {
                NormalizedError::new(detail.clone(), "invalid_request_error", "invalid_request")
            }
            GatewayError::NoChannel { .. } => {
                NormalizedError::new(self.to_string(), "service_unavailable", "no_channel")
            }
            GatewayError::ChannelNotFound(_) => {
                NormalizedError::new(self.to_string(), "not_found_error", "channel_not_found")
            }
            GatewayError::Configuration(err) => {
                NormalizedError::new(err.to_string(), "configuration_error", "channel_config")
            }
            GatewayError::Transport { kind, .. } => {
                let code = if kind.is_timeout() {
                    "upstream_timeout"
                } else {
                    "upstream_unavailable"
                };
                NormalizedError::new(RETRY_LATER, "upstream_error", code)
            }
            GatewayError::UpstreamProtocol { status, .. } => NormalizedError::new(
                format!("upstream returned HTTP {status}"),
                "upstream_error",
                "bad_upstream_response",
            ),
            GatewayError::Vendor { error, .. } => error.clone(),
            GatewayError::Decode(err) => {
                NormalizedError::new(err.to_string(), "internal_error", "decode_failed")
            }
            GatewayError::Cancelled => {
                NormalizedError::new("request cancelled", "cancelled", "client_closed_request")
            }
        }
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        if err.is_configuration() {
            GatewayError::Configuration(err)
        } else {
            GatewayError::Decode(err)
        }
    }
}

impl From<UpstreamFailure> for GatewayError {
    fn from(failure: UpstreamFailure) -> Self {
        match failure {
            UpstreamFailure::Transport { kind, message } => {
                GatewayError::Transport { kind, message }
            }
            UpstreamFailure::Http {
                status,
                decoded: Some(error),
                ..
            } => GatewayError::Vendor { status, error },
            UpstreamFailure::Http {
                status,
                body,
                decoded: None,
                ..
            } => GatewayError::UpstreamProtocol { status, body },
        }
    }
}
