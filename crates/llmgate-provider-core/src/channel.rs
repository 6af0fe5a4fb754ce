use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::custom_params::CustomParams;
use crate::provider::TransportConfig;

/// Opaque vendor secret. `Debug` never prints the value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// Administrator-configured upstream account. Owned by the configuration layer;
/// the adapter layer only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Vendor identity tag, resolved by the factory.
    pub vendor: String,
    #[serde(default)]
    pub credential: Credential,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub custom_params: Value,
    /// Models this channel serves. Empty means "any".
    #[serde(default)]
    pub models: Vec<String>,
}

impl Channel {
    pub fn serves(&self, model: &str) -> bool {
        self.models.is_empty() || self.models.iter().any(|item| item == model)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorKind {
    Claude,
    OpenAI,
    DeepSeek,
}

impl VendorKind {
    pub const ALL: [VendorKind; 3] = [VendorKind::Claude, VendorKind::OpenAI, VendorKind::DeepSeek];

    pub fn as_str(&self) -> &'static str {
        match self {
            VendorKind::Claude => "claude",
            VendorKind::OpenAI => "openai",
            VendorKind::DeepSeek => "deepseek",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("claude") || value.eq_ignore_ascii_case("anthropic") {
            Some(VendorKind::Claude)
        } else if value.eq_ignore_ascii_case("openai") {
            Some(VendorKind::OpenAI)
        } else if value.eq_ignore_ascii_case("deepseek") {
            Some(VendorKind::DeepSeek)
        } else {
            None
        }
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything an adapter needs from its channel, validated once by the factory.
#[derive(Debug, Clone)]
pub struct ChannelBinding {
    pub channel_id: i64,
    pub channel_name: String,
    pub credential: Credential,
    pub base_url: Option<String>,
    pub custom_params: CustomParams,
    pub transport: TransportConfig,
}
