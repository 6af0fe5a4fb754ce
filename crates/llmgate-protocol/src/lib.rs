//! Wire types for llmgate.
//!
//! `canonical` is the vendor-agnostic chat-completion protocol callers speak.
//! The vendor modules hold the upstream request/response/error envelopes that
//! adapters translate to and from.

pub mod canonical;
pub mod claude;
pub mod openai;
