use std::path::PathBuf;

use clap::Parser;

use llmgate_common::GlobalConfigPatch;

#[derive(Parser, Debug, Default)]
#[command(name = "llmgate", version, about)]
pub(crate) struct Cli {
    /// JSON config file holding global settings and channels.
    #[arg(long, env = "LLMGATE_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, env = "LLMGATE_HOST")]
    pub(crate) host: Option<String>,
    #[arg(long, env = "LLMGATE_PORT")]
    pub(crate) port: Option<u16>,
    /// Default outbound proxy for channels without their own.
    #[arg(long, env = "LLMGATE_PROXY")]
    pub(crate) proxy: Option<String>,
    #[arg(long)]
    pub(crate) connect_timeout_secs: Option<u64>,
    #[arg(long)]
    pub(crate) request_timeout_secs: Option<u64>,
    /// Comma-separated vendor allow-list, e.g. `claude,openai`.
    #[arg(long, value_delimiter = ',')]
    pub(crate) enabled_vendors: Option<Vec<String>>,
}

impl Cli {
    pub(crate) fn patch(&self) -> GlobalConfigPatch {
        GlobalConfigPatch {
            host: self.host.clone(),
            port: self.port,
            proxy: self.proxy.clone(),
            connect_timeout_secs: self.connect_timeout_secs,
            request_timeout_secs: self.request_timeout_secs,
            enabled_vendors: self.enabled_vendors.clone(),
        }
    }
}
