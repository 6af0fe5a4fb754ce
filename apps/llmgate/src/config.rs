use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use llmgate_common::{GlobalConfig, GlobalConfigPatch};
use llmgate_provider_core::Channel;

use crate::cli::Cli;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigFile {
    #[serde(flatten)]
    pub(crate) global: GlobalConfigPatch,
    #[serde(default)]
    pub(crate) channels: Vec<Channel>,
}

impl ConfigFile {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("parse config file {}", path.display()))
    }
}

/// CLI flags > config file > built-in defaults.
pub(crate) fn resolve(cli: &Cli, file: ConfigFile) -> anyhow::Result<(GlobalConfig, Vec<Channel>)> {
    let mut patch = file.global;
    patch.overlay(cli.patch());
    let global = patch.into_config()?;

    let mut seen = std::collections::HashSet::new();
    for channel in &file.channels {
        if !seen.insert(channel.id) {
            anyhow::bail!("duplicate channel id {}", channel.id);
        }
    }
    Ok((global, file.channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(value: serde_json::Value) -> ConfigFile {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn cli_beats_file_beats_defaults() {
        let cli = Cli {
            port: Some(9999),
            ..Cli::default()
        };
        let (global, channels) = resolve(
            &cli,
            file(json!({
                "host": "0.0.0.0",
                "port": 8000,
                "request_timeout_secs": 120,
                "channels": [
                    { "id": 1, "vendor": "claude", "credential": "sk-ant", "models": ["claude-sonnet-4-5"] }
                ]
            })),
        )
        .unwrap();
        assert_eq!(global.bind_addr(), "0.0.0.0:9999");
        assert_eq!(global.request_timeout_secs, 120);
        assert_eq!(global.connect_timeout_secs, 5);
        assert_eq!(channels.len(), 1);
    }

    #[test]
    fn duplicate_channel_ids_are_rejected() {
        let err = resolve(
            &Cli::default(),
            file(json!({
                "channels": [
                    { "id": 1, "vendor": "claude" },
                    { "id": 1, "vendor": "openai" }
                ]
            })),
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate channel id 1"));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let (global, channels) = resolve(&Cli::default(), file(json!({}))).unwrap();
        assert_eq!(global.bind_addr(), "127.0.0.1:8787");
        assert!(channels.is_empty());
    }
}
