//! Core provider abstractions for llmgate.
//!
//! This crate intentionally does **not** depend on any concrete HTTP client.
//! Adapters build `UpstreamHttpRequest`s and decode bodies; a higher layer
//! performs the IO and calls back into the adapter's error-decode hook.

pub mod channel;
pub mod custom_params;
pub mod errors;
pub mod headers;
pub mod provider;
pub mod static_config;
pub mod url;

pub use channel::{Channel, ChannelBinding, Credential, VendorKind};
pub use custom_params::{CustomParams, RESERVED_KEYS};
pub use errors::{ProviderError, ProviderResult};
pub use headers::{Headers, common_headers, header_get, header_merge, header_remove, header_set};
pub use provider::{
    ErrorDecodeHook, HttpMethod, ProviderAdapter, TransportConfig, UpstreamCtx, UpstreamFailure,
    UpstreamHttpRequest, UpstreamHttpResponse, UpstreamTransportErrorKind,
};
pub use static_config::ProviderStaticConfig;
pub use url::{CLOUDFLARE_AI_GATEWAY_PREFIX, join_url, resolve_base_url};
