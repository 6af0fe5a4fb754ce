use std::time::Duration;

use tracing::debug;

use llmgate_provider_core::{
    Channel, ChannelBinding, CustomParams, ProviderAdapter, ProviderError, ProviderResult,
    TransportConfig, VendorKind,
};

use crate::providers::claude::ClaudeAdapter;
use crate::providers::openai::OpenAIAdapter;

/// Process-wide knobs every adapter is built with.
#[derive(Debug, Clone)]
pub struct FactoryConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Used when a channel has no proxy of its own.
    pub default_proxy: Option<String>,
    /// `None` enables every known vendor.
    pub enabled_vendors: Option<Vec<String>>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            connect_timeout: transport.connect_timeout,
            request_timeout: transport.request_timeout,
            default_proxy: None,
            enabled_vendors: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderFactory {
    config: FactoryConfig,
    enabled: Option<Vec<VendorKind>>,
}

impl ProviderFactory {
    /// Fails on an allow-list entry that names no known vendor.
    pub fn new(config: FactoryConfig) -> ProviderResult<Self> {
        let enabled = match &config.enabled_vendors {
            None => None,
            Some(names) => Some(
                names
                    .iter()
                    .map(|name| {
                        VendorKind::parse(name)
                            .ok_or_else(|| ProviderError::UnknownVendor(name.clone()))
                    })
                    .collect::<ProviderResult<Vec<_>>>()?,
            ),
        };
        Ok(Self { config, enabled })
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn is_enabled(&self, vendor: VendorKind) -> bool {
        self.enabled
            .as_ref()
            .is_none_or(|enabled| enabled.contains(&vendor))
    }

    /// Binds a new adapter to `channel`. No network IO happens here.
    pub fn create(&self, channel: &Channel) -> ProviderResult<Box<dyn ProviderAdapter>> {
        let vendor = VendorKind::parse(&channel.vendor)
            .ok_or_else(|| ProviderError::UnknownVendor(channel.vendor.clone()))?;
        if !self.is_enabled(vendor) {
            return Err(ProviderError::VendorDisabled(vendor.as_str()));
        }
        if channel.credential.is_blank() {
            return Err(ProviderError::MissingCredential {
                channel_id: channel.id,
            });
        }
        let binding = ChannelBinding {
            channel_id: channel.id,
            channel_name: channel.name.clone(),
            credential: channel.credential.clone(),
            base_url: channel.base_url.clone(),
            custom_params: CustomParams::parse(&channel.custom_params)?,
            transport: self.transport_for(channel),
        };
        debug!(
            event = "adapter_created",
            channel_id = channel.id,
            vendor = vendor.as_str(),
            proxied = binding.transport.proxy.is_some(),
        );
        Ok(match vendor {
            VendorKind::Claude => Box::new(ClaudeAdapter::new(binding)),
            VendorKind::OpenAI => Box::new(OpenAIAdapter::openai(binding)),
            VendorKind::DeepSeek => Box::new(OpenAIAdapter::deepseek(binding)),
        })
    }

    fn transport_for(&self, channel: &Channel) -> TransportConfig {
        let proxy = channel
            .proxy
            .as_deref()
            .map(str::trim)
            .filter(|proxy| !proxy.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.default_proxy.clone());
        TransportConfig {
            proxy,
            connect_timeout: self.config.connect_timeout,
            request_timeout: self.config.request_timeout,
        }
    }
}
