use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

mod cli;
mod config;

use llmgate_core::{Core, Gateway, StaticChannels, WreqConnector};
use llmgate_provider_impl::{FactoryConfig, ProviderFactory};

use crate::cli::Cli;
use crate::config::ConfigFile;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("llmgate failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let (config, channels) = config::resolve(&cli, file)?;
    info!(
        host = %config.host,
        port = config.port,
        proxy = %config.proxy.as_deref().unwrap_or(""),
        connect_timeout_secs = config.connect_timeout_secs,
        request_timeout_secs = config.request_timeout_secs,
        channels = channels.len(),
        "config loaded"
    );
    if channels.is_empty() {
        warn!("no channels configured; every chat completion will fail");
    }

    let factory = ProviderFactory::new(FactoryConfig {
        connect_timeout: config.connect_timeout(),
        request_timeout: config.request_timeout(),
        default_proxy: config.proxy.clone(),
        enabled_vendors: config.enabled_vendors.clone(),
    })
    .context("build provider factory")?;

    // Surface bad channels at startup; they are still rejected per request.
    for channel in &channels {
        if let Err(err) = factory.create(channel) {
            warn!(channel_id = channel.id, vendor = %channel.vendor, error = %err, "channel unusable");
        }
    }

    let gateway = Gateway::new(
        factory,
        Arc::new(StaticChannels::new(channels)),
        Arc::new(WreqConnector::new()),
    );
    let app = Core::new(gateway).router();

    let bind = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!(addr = %bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("llmgate=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
