mod convert;

use time::OffsetDateTime;

use llmgate_protocol::canonical::{
    ChatCompletionChoice, ChatCompletionRequest, ChatCompletionResponse, FinishReason,
    FinishReasonKnown, ModelEntry, ModelList, NormalizedError, Role, Usage,
};
use llmgate_protocol::claude::{
    DEFAULT_ANTHROPIC_VERSION, ErrorResponse, ListModelsResponse, MessagesResponse,
};
use llmgate_provider_core::{
    ChannelBinding, ErrorDecodeHook, Headers, ProviderAdapter, ProviderResult,
    ProviderStaticConfig, UpstreamCtx, UpstreamHttpRequest, UpstreamHttpResponse, VendorKind,
};

use super::{decode_json, encode_body_with};
use crate::auth_extractor;

pub const CLAUDE_STATIC_CONFIG: ProviderStaticConfig =
    ProviderStaticConfig::new("https://api.anthropic.com", "/v1/messages", "/v1/models");

const OWNED_BY: &str = "anthropic";

/// Reference adapter for the Anthropic Messages API.
#[derive(Debug)]
pub struct ClaudeAdapter {
    binding: ChannelBinding,
}

impl ClaudeAdapter {
    pub fn new(binding: ChannelBinding) -> Self {
        Self { binding }
    }
}

impl ProviderAdapter for ClaudeAdapter {
    fn vendor(&self) -> VendorKind {
        VendorKind::Claude
    }

    fn static_config(&self) -> &'static ProviderStaticConfig {
        &CLAUDE_STATIC_CONFIG
    }

    fn binding(&self) -> &ChannelBinding {
        &self.binding
    }

    fn vendor_headers(&self, ctx: &UpstreamCtx) -> Headers {
        let mut headers = Vec::new();
        auth_extractor::set_header(&mut headers, "x-api-key", self.binding.credential.expose());
        auth_extractor::set_header(
            &mut headers,
            "anthropic-version",
            ctx.header("anthropic-version")
                .unwrap_or(DEFAULT_ANTHROPIC_VERSION),
        );
        if let Some(beta) = ctx.header("anthropic-beta") {
            auth_extractor::set_header(&mut headers, "anthropic-beta", beta);
        }
        headers
    }

    fn strips_gateway_version(&self) -> bool {
        true
    }

    fn normalize_role(&self, role: Role) -> &'static str {
        convert::claude_role(role).as_str()
    }

    fn normalize_finish_reason(&self, reason: &str) -> FinishReason {
        match reason {
            "end_turn" | "stop_sequence" => FinishReasonKnown::Stop.into(),
            "max_tokens" => FinishReasonKnown::Length.into(),
            "tool_use" => FinishReasonKnown::ToolCalls.into(),
            "refusal" => FinishReasonKnown::ContentFilter.into(),
            other => FinishReason::Custom(other.to_string()),
        }
    }

    fn error_hook(&self) -> ErrorDecodeHook {
        decode_claude_error
    }

    fn build_chat_request(
        &self,
        request: &ChatCompletionRequest,
        ctx: &UpstreamCtx,
    ) -> ProviderResult<UpstreamHttpRequest> {
        let body = convert::messages_request(request);
        let body = encode_body_with(&body, &self.binding.custom_params, |map| {
            map.entry("max_tokens")
                .or_insert_with(|| convert::DEFAULT_MAX_TOKENS.into());
        })?;
        Ok(UpstreamHttpRequest::post(
            self.build_url(CLAUDE_STATIC_CONFIG.chat_completions),
            self.build_headers(ctx),
            body,
        ))
    }

    fn decode_chat_response(
        &self,
        response: &UpstreamHttpResponse,
    ) -> ProviderResult<ChatCompletionResponse> {
        let body: MessagesResponse = decode_json(&response.body)?;
        let usage = Usage {
            prompt_tokens: body.usage.input_tokens,
            completion_tokens: body.usage.output_tokens,
            total_tokens: body
                .usage
                .input_tokens
                .saturating_add(body.usage.output_tokens),
        };
        Ok(ChatCompletionResponse {
            id: body.id,
            object: ChatCompletionResponse::object_type(),
            created: OffsetDateTime::now_utc().unix_timestamp(),
            model: body.model,
            choices: vec![ChatCompletionChoice {
                index: 0,
                message: convert::assistant_message(&body.content),
                finish_reason: body
                    .stop_reason
                    .as_deref()
                    .map(|reason| self.normalize_finish_reason(reason)),
            }],
            usage: Some(usage),
        })
    }

    fn decode_models_response(&self, response: &UpstreamHttpResponse) -> ProviderResult<ModelList> {
        let body: ListModelsResponse = decode_json(&response.body)?;
        Ok(ModelList::new(
            body.data
                .iter()
                .map(|model| ModelEntry::new(model.id.clone(), model.created_unix(), OWNED_BY))
                .collect(),
        ))
    }
}

/// `{"type":"error","error":{"type":..,"message":..}}` → NormalizedError.
///
/// An empty top-level `type` means the body is not a Claude error envelope.
pub fn decode_claude_error(body: &[u8]) -> Option<NormalizedError> {
    let envelope: ErrorResponse = serde_json::from_slice(body).ok()?;
    if envelope.r#type.is_empty() {
        return None;
    }
    Some(NormalizedError::new(
        envelope.error.message,
        envelope.error.r#type,
        envelope.r#type,
    ))
}
