//! Gateway runtime: channel lookup, upstream IO and the caller-facing HTTP
//! surface. Vendor translation lives in `llmgate-provider-impl`.

pub mod channels;
pub mod core;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod upstream_client;

pub use channels::{ChannelSource, StaticChannels};
pub use core::{Core, CoreState};
pub use error::GatewayError;
pub use gateway::Gateway;
pub use handler::REQUEST_ID_HEADER;
pub use upstream_client::{
    UpstreamClient, UpstreamConnector, UpstreamFuture, WreqConnector, WreqUpstreamClient,
};
