//! Built-in vendor adapters and the factory that binds them to channels.
//!
//! This crate does not perform network IO. Adapters build
//! `UpstreamHttpRequest`s and decode upstream bodies.

mod auth_extractor;
mod factory;
mod providers;

pub use factory::{FactoryConfig, ProviderFactory};
pub use providers::claude::{CLAUDE_STATIC_CONFIG, ClaudeAdapter, decode_claude_error};
pub use providers::openai::{
    DEEPSEEK_STATIC_CONFIG, OPENAI_STATIC_CONFIG, OpenAIAdapter, decode_openai_error,
};
