use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use llmgate_protocol::canonical::{ChatCompletionRequest, ChatCompletionResponse, ModelEntry, ModelList};
use llmgate_provider_core::{
    Channel, ProviderAdapter, UpstreamCtx, UpstreamFailure, UpstreamHttpRequest,
    UpstreamHttpResponse, UpstreamTransportErrorKind,
};
use llmgate_provider_impl::ProviderFactory;

use crate::channels::ChannelSource;
use crate::error::GatewayError;
use crate::upstream_client::UpstreamConnector;

/// Ties channel lookup, adapter construction and upstream IO together for one
/// caller request at a time. Holds no per-request state.
pub struct Gateway {
    factory: ProviderFactory,
    channels: Arc<dyn ChannelSource>,
    connector: Arc<dyn UpstreamConnector>,
}

impl Gateway {
    pub fn new(
        factory: ProviderFactory,
        channels: Arc<dyn ChannelSource>,
        connector: Arc<dyn UpstreamConnector>,
    ) -> Self {
        Self {
            factory,
            channels,
            connector,
        }
    }

    pub async fn chat_completions(
        &self,
        request: ChatCompletionRequest,
        ctx: &UpstreamCtx,
        cancel: &CancellationToken,
    ) -> Result<ChatCompletionResponse, GatewayError> {
        if request.stream == Some(true) {
            return Err(GatewayError::InvalidRequest(
                "streaming responses are not supported".to_string(),
            ));
        }
        if request.model.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("model is required".to_string()));
        }
        if request.messages.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "messages must not be empty".to_string(),
            ));
        }

        let channel = self
            .channels
            .select(&request.model)
            .ok_or_else(|| GatewayError::NoChannel {
                model: request.model.clone(),
            })?;
        let adapter = self.adapter_for(channel, ctx)?;
        let upstream = adapter.build_chat_request(&request, ctx)?;
        let response = self.execute(adapter.as_ref(), upstream, ctx, cancel).await?;
        Ok(adapter.decode_chat_response(&response)?)
    }

    /// Lists models straight from one channel's upstream.
    pub async fn channel_models(
        &self,
        channel_id: i64,
        ctx: &UpstreamCtx,
        cancel: &CancellationToken,
    ) -> Result<ModelList, GatewayError> {
        let channel = self
            .channels
            .get(channel_id)
            .ok_or(GatewayError::ChannelNotFound(channel_id))?;
        let adapter = self.adapter_for(channel, ctx)?;
        let upstream = adapter.build_models_request(ctx)?;
        let response = self.execute(adapter.as_ref(), upstream, ctx, cancel).await?;
        Ok(adapter.decode_models_response(&response)?)
    }

    /// Models advertised by the configured channels; no upstream call.
    pub fn configured_models(&self) -> ModelList {
        ModelList::new(
            self.channels
                .models()
                .into_iter()
                .map(|id| ModelEntry::new(id, 0, "llmgate"))
                .collect(),
        )
    }

    fn adapter_for(
        &self,
        channel: &Channel,
        ctx: &UpstreamCtx,
    ) -> Result<Box<dyn ProviderAdapter>, GatewayError> {
        self.factory.create(channel).map_err(|err| {
            warn!(
                event = "channel_rejected",
                trace_id = %ctx.trace_id,
                channel_id = channel.id,
                vendor = %channel.vendor,
                error = %err
            );
            GatewayError::from(err)
        })
    }

    async fn execute(
        &self,
        adapter: &dyn ProviderAdapter,
        request: UpstreamHttpRequest,
        ctx: &UpstreamCtx,
        cancel: &CancellationToken,
    ) -> Result<UpstreamHttpResponse, GatewayError> {
        let channel_id = adapter.binding().channel_id;
        let vendor = adapter.vendor().as_str();
        let transport = adapter.transport();
        let client = self.connector.connect(transport).map_err(|failure| {
            log_failure(&ctx.trace_id, channel_id, vendor, &failure);
            GatewayError::from(failure)
        })?;

        info!(
            event = "upstream_request",
            trace_id = %ctx.trace_id,
            channel_id,
            vendor,
            method = request.method.as_str(),
            url = %request.url
        );
        let started_at = Instant::now();
        let request_timeout = transport.request_timeout;

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                info!(
                    event = "upstream_cancelled",
                    trace_id = %ctx.trace_id,
                    channel_id,
                    vendor,
                    elapsed_ms = started_at.elapsed().as_millis()
                );
                return Err(GatewayError::Cancelled);
            }
            outcome = tokio::time::timeout(request_timeout, client.send(request, adapter.error_hook())) => outcome,
        };

        let result = outcome.unwrap_or_else(|_| {
            Err(UpstreamFailure::Transport {
                kind: UpstreamTransportErrorKind::Timeout,
                message: format!("no response within {}s", request_timeout.as_secs()),
            })
        });

        match result {
            Ok(response) => {
                info!(
                    event = "upstream_response",
                    trace_id = %ctx.trace_id,
                    channel_id,
                    vendor,
                    status = response.status,
                    elapsed_ms = started_at.elapsed().as_millis()
                );
                Ok(response)
            }
            Err(failure) => {
                log_failure(&ctx.trace_id, channel_id, vendor, &failure);
                Err(GatewayError::from(failure))
            }
        }
    }
}

/// Raw transport text and undecoded bodies only ever reach the log.
fn log_failure(trace_id: &str, channel_id: i64, vendor: &str, failure: &UpstreamFailure) {
    match failure {
        UpstreamFailure::Transport { kind, message } => warn!(
            event = "upstream_failed",
            trace_id = %trace_id,
            channel_id,
            vendor,
            kind = kind.as_str(),
            error = %message
        ),
        UpstreamFailure::Http {
            status,
            decoded: Some(error),
            ..
        } => warn!(
            event = "upstream_response",
            trace_id = %trace_id,
            channel_id,
            vendor,
            status = *status,
            error_type = %error.r#type,
            error = %error.message
        ),
        UpstreamFailure::Http {
            status,
            body,
            decoded: None,
            ..
        } => warn!(
            event = "upstream_response",
            trace_id = %trace_id,
            channel_id,
            vendor,
            status = *status,
            body = %String::from_utf8_lossy(body)
        ),
    }
}
