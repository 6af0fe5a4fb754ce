use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use llmgate_protocol::canonical::{
    ChatCompletionRequest, ChatCompletionResponse, FinishReason, ModelList, NormalizedError, Role,
};

use crate::channel::{ChannelBinding, VendorKind};
use crate::errors::ProviderResult;
use crate::headers::{Headers, common_headers, header_get, header_merge};
use crate::static_config::ProviderStaticConfig;
use crate::url::{join_url, resolve_base_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamHttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Bytes>,
}

impl UpstreamHttpRequest {
    pub fn get(url: String, headers: Headers) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers,
            body: None,
        }
    }

    pub fn post(url: String, headers: Headers, body: Bytes) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamHttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl UpstreamHttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamTransportErrorKind {
    Timeout,
    ReadTimeout,
    Connect,
    Dns,
    Tls,
    Other,
}

impl UpstreamTransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamTransportErrorKind::Timeout => "timeout",
            UpstreamTransportErrorKind::ReadTimeout => "read_timeout",
            UpstreamTransportErrorKind::Connect => "connect",
            UpstreamTransportErrorKind::Dns => "dns",
            UpstreamTransportErrorKind::Tls => "tls",
            UpstreamTransportErrorKind::Other => "other",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            UpstreamTransportErrorKind::Timeout | UpstreamTransportErrorKind::ReadTimeout
        )
    }
}

/// What the transport hands back when a call does not produce a 2xx.
#[derive(Debug, Clone)]
pub enum UpstreamFailure {
    /// The request never produced an HTTP response. `message` is the raw
    /// transport text and must not reach the caller.
    Transport {
        kind: UpstreamTransportErrorKind,
        message: String,
    },
    /// Non-success status. `decoded` is the adapter hook's verdict on `body`.
    Http {
        status: u16,
        headers: Headers,
        body: Bytes,
        decoded: Option<NormalizedError>,
    },
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamFailure::Transport { kind, message } => {
                write!(f, "upstream transport error ({}): {message}", kind.as_str())
            }
            UpstreamFailure::Http {
                status, decoded, ..
            } => match decoded {
                Some(err) => write!(f, "upstream HTTP {status}: {}", err.message),
                None => write!(f, "upstream HTTP {status}"),
            },
        }
    }
}

impl std::error::Error for UpstreamFailure {}

/// Vendor error-envelope decoder, invoked by the transport on non-success
/// status. `None` means the body is not a recognizable vendor error.
pub type ErrorDecodeHook = fn(&[u8]) -> Option<NormalizedError>;

/// Per-channel outbound transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportConfig {
    pub proxy: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(600),
        }
    }
}

/// Per-call context: trace id plus the caller's inbound headers, for adapters
/// that forward selected ones (e.g. `anthropic-version`).
#[derive(Debug, Clone, Default)]
pub struct UpstreamCtx {
    pub trace_id: String,
    pub headers: Headers,
}

impl UpstreamCtx {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// One upstream vendor, bound to one channel for the lifetime of one call.
///
/// Adapters never perform IO: they build requests and decode bodies. The
/// provided methods carry the behavior shared by every vendor.
pub trait ProviderAdapter: Send + Sync {
    fn vendor(&self) -> VendorKind;

    fn static_config(&self) -> &'static ProviderStaticConfig;

    fn binding(&self) -> &ChannelBinding;

    /// Auth and version headers specific to the vendor.
    fn vendor_headers(&self, ctx: &UpstreamCtx) -> Headers;

    fn build_headers(&self, ctx: &UpstreamCtx) -> Headers {
        let mut headers = common_headers();
        header_merge(&mut headers, self.vendor_headers(ctx));
        headers
    }

    /// Opt-in for the Cloudflare AI gateway `/v1` rewrite.
    fn strips_gateway_version(&self) -> bool {
        false
    }

    fn base_url(&self) -> String {
        resolve_base_url(
            self.binding().base_url.as_deref(),
            self.static_config().base_url,
        )
    }

    fn build_url(&self, path: &str) -> String {
        join_url(&self.base_url(), path, self.strips_gateway_version())
    }

    fn transport(&self) -> &TransportConfig {
        &self.binding().transport
    }

    fn normalize_role(&self, role: Role) -> &'static str;

    fn normalize_finish_reason(&self, reason: &str) -> FinishReason;

    fn error_hook(&self) -> ErrorDecodeHook;

    fn decode_error(&self, body: &[u8]) -> Option<NormalizedError> {
        (self.error_hook())(body)
    }

    /// Encodes the vendor body, overlays the channel's custom params and
    /// attaches URL and headers.
    fn build_chat_request(
        &self,
        request: &ChatCompletionRequest,
        ctx: &UpstreamCtx,
    ) -> ProviderResult<UpstreamHttpRequest>;

    fn decode_chat_response(
        &self,
        response: &UpstreamHttpResponse,
    ) -> ProviderResult<ChatCompletionResponse>;

    fn build_models_request(&self, ctx: &UpstreamCtx) -> ProviderResult<UpstreamHttpRequest> {
        Ok(UpstreamHttpRequest::get(
            self.build_url(self.static_config().model_list),
            self.build_headers(ctx),
        ))
    }

    fn decode_models_response(&self, response: &UpstreamHttpResponse) -> ProviderResult<ModelList>;
}
