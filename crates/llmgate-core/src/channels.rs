use std::collections::BTreeSet;

use llmgate_provider_core::Channel;

/// Where the gateway looks up channels. Selection policy lives behind this
/// trait; the gateway itself never balances or fails over.
pub trait ChannelSource: Send + Sync {
    fn select(&self, model: &str) -> Option<&Channel>;

    fn get(&self, id: i64) -> Option<&Channel>;

    /// Every model name some channel advertises, sorted and deduplicated.
    fn models(&self) -> Vec<String>;
}

/// Fixed channel list loaded at startup. The first channel serving a model wins.
#[derive(Debug, Clone, Default)]
pub struct StaticChannels {
    channels: Vec<Channel>,
}

impl StaticChannels {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl ChannelSource for StaticChannels {
    fn select(&self, model: &str) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.serves(model))
    }

    fn get(&self, id: i64) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.id == id)
    }

    fn models(&self) -> Vec<String> {
        self.channels
            .iter()
            .flat_map(|channel| channel.models.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn channels() -> StaticChannels {
        StaticChannels::new(
            serde_json::from_value(json!([
                { "id": 1, "vendor": "claude", "credential": "a", "models": ["claude-sonnet-4-5"] },
                { "id": 2, "vendor": "openai", "credential": "b", "models": ["gpt-4o", "claude-sonnet-4-5"] },
                { "id": 3, "vendor": "deepseek", "credential": "c" }
            ]))
            .unwrap(),
        )
    }

    #[test]
    fn first_listing_channel_wins() {
        let channels = channels();
        assert_eq!(channels.select("claude-sonnet-4-5").unwrap().id, 1);
        assert_eq!(channels.select("gpt-4o").unwrap().id, 2);
    }

    #[test]
    fn catch_all_channel_takes_unlisted_models() {
        assert_eq!(channels().select("deepseek-chat").unwrap().id, 3);
        assert!(StaticChannels::default().select("anything").is_none());
    }

    #[test]
    fn models_are_deduplicated() {
        assert_eq!(
            channels().models(),
            vec!["claude-sonnet-4-5".to_string(), "gpt-4o".to_string()]
        );
        assert_eq!(channels().get(2).unwrap().vendor, "openai");
        assert!(channels().get(9).is_none());
    }
}
