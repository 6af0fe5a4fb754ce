use llmgate_protocol::canonical::{
    ChatCompletionRequest, ChatCompletionResponse, FinishReason, ModelList, NormalizedError, Role,
};
use llmgate_protocol::openai::ErrorResponse;
use llmgate_provider_core::{
    ChannelBinding, ErrorDecodeHook, Headers, ProviderAdapter, ProviderResult,
    ProviderStaticConfig, UpstreamCtx, UpstreamHttpRequest, UpstreamHttpResponse, VendorKind,
};

use super::{decode_json, encode_body};
use crate::auth_extractor;

pub const OPENAI_STATIC_CONFIG: ProviderStaticConfig = ProviderStaticConfig::new(
    "https://api.openai.com",
    "/v1/chat/completions",
    "/v1/models",
);

pub const DEEPSEEK_STATIC_CONFIG: ProviderStaticConfig = ProviderStaticConfig::new(
    "https://api.deepseek.com",
    "/v1/chat/completions",
    "/v1/models",
);

/// OpenAI chat-completions and wire-compatible vendors. The canonical protocol
/// is already OpenAI-shaped, so bodies pass through and both vocabularies are
/// identity.
#[derive(Debug)]
pub struct OpenAIAdapter {
    vendor: VendorKind,
    config: &'static ProviderStaticConfig,
    binding: ChannelBinding,
}

impl OpenAIAdapter {
    pub fn openai(binding: ChannelBinding) -> Self {
        Self {
            vendor: VendorKind::OpenAI,
            config: &OPENAI_STATIC_CONFIG,
            binding,
        }
    }

    pub fn deepseek(binding: ChannelBinding) -> Self {
        Self {
            vendor: VendorKind::DeepSeek,
            config: &DEEPSEEK_STATIC_CONFIG,
            binding,
        }
    }
}

impl ProviderAdapter for OpenAIAdapter {
    fn vendor(&self) -> VendorKind {
        self.vendor
    }

    fn static_config(&self) -> &'static ProviderStaticConfig {
        self.config
    }

    fn binding(&self) -> &ChannelBinding {
        &self.binding
    }

    fn vendor_headers(&self, _ctx: &UpstreamCtx) -> Headers {
        let mut headers = Vec::new();
        auth_extractor::set_bearer(&mut headers, self.binding.credential.expose());
        headers
    }

    fn normalize_role(&self, role: Role) -> &'static str {
        role.as_str()
    }

    fn normalize_finish_reason(&self, reason: &str) -> FinishReason {
        FinishReason::parse(reason)
    }

    fn error_hook(&self) -> ErrorDecodeHook {
        decode_openai_error
    }

    fn build_chat_request(
        &self,
        request: &ChatCompletionRequest,
        ctx: &UpstreamCtx,
    ) -> ProviderResult<UpstreamHttpRequest> {
        let body = encode_body(request, &self.binding.custom_params)?;
        Ok(UpstreamHttpRequest::post(
            self.build_url(self.config.chat_completions),
            self.build_headers(ctx),
            body,
        ))
    }

    fn decode_chat_response(
        &self,
        response: &UpstreamHttpResponse,
    ) -> ProviderResult<ChatCompletionResponse> {
        decode_json(&response.body)
    }

    fn decode_models_response(&self, response: &UpstreamHttpResponse) -> ProviderResult<ModelList> {
        decode_json(&response.body)
    }
}

/// `{"error":{"message":..,"type":..,"code":..}}`; an empty message means the
/// body is not an error envelope.
pub fn decode_openai_error(body: &[u8]) -> Option<NormalizedError> {
    let envelope: ErrorResponse = serde_json::from_slice(body).ok()?;
    if envelope.error.message.is_empty() {
        return None;
    }
    let code = envelope.error.code_string();
    Some(NormalizedError::new(
        envelope.error.message,
        envelope.error.r#type,
        code,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use llmgate_protocol::canonical::FinishReasonKnown;
    use llmgate_provider_core::{CustomParams, TransportConfig, header_get};
    use serde_json::{Value, json};

    fn binding(custom_params: Value) -> ChannelBinding {
        ChannelBinding {
            channel_id: 3,
            channel_name: "oai".to_string(),
            credential: llmgate_provider_core::Credential::new("sk-test"),
            base_url: None,
            custom_params: CustomParams::parse(&custom_params).unwrap(),
            transport: TransportConfig::default(),
        }
    }

    #[test]
    fn passthrough_body_gets_custom_params_and_no_stream() {
        let adapter = OpenAIAdapter::openai(binding(json!({ "seed": 7, "temperature": 1.5 })));
        let request: ChatCompletionRequest = serde_json::from_value(json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "hi" }],
            "temperature": 0.2,
            "stream": false,
            "frequency_penalty": 0.5
        }))
        .unwrap();
        let out = adapter
            .build_chat_request(&request, &UpstreamCtx::new("t"))
            .unwrap();
        assert_eq!(out.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(header_get(&out.headers, "authorization"), Some("Bearer sk-test"));

        let body: Value = serde_json::from_slice(out.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["temperature"], json!(0.2));
        assert_eq!(body["seed"], json!(7));
        assert_eq!(body["frequency_penalty"], json!(0.5));
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn deepseek_uses_its_own_base() {
        let adapter = OpenAIAdapter::deepseek(binding(Value::Null));
        assert_eq!(adapter.vendor(), VendorKind::DeepSeek);
        assert_eq!(
            adapter.build_url(adapter.static_config().chat_completions),
            "https://api.deepseek.com/v1/chat/completions"
        );
    }

    #[test]
    fn vocabularies_are_identity() {
        let adapter = OpenAIAdapter::openai(binding(Value::Null));
        for role in Role::ALL {
            assert_eq!(adapter.normalize_role(role), role.as_str());
        }
        assert_eq!(
            adapter.normalize_finish_reason("length"),
            FinishReason::Known(FinishReasonKnown::Length)
        );
        assert_eq!(
            adapter.normalize_finish_reason("insufficient_system_resource"),
            FinishReason::Custom("insufficient_system_resource".to_string())
        );
    }

    #[test]
    fn error_hook_renders_numeric_codes() {
        let decoded = decode_openai_error(
            br#"{"error":{"message":"Rate limit reached","type":"requests","code":429}}"#,
        );
        assert_eq!(
            decoded,
            Some(NormalizedError::new("Rate limit reached", "requests", "429"))
        );
        let decoded = decode_openai_error(
            br#"{"error":{"message":"Incorrect API key","type":"invalid_request_error","code":null}}"#,
        )
        .unwrap();
        assert_eq!(decoded.code, "");
        assert_eq!(decode_openai_error(br#"{"error":{}}"#), None);
        assert_eq!(decode_openai_error(b"upstream connect error"), None);
    }

    #[test]
    fn decodes_canonical_response() {
        let adapter = OpenAIAdapter::openai(binding(Value::Null));
        let response = UpstreamHttpResponse {
            status: 200,
            headers: Vec::new(),
            body: Bytes::from_static(
                br#"{"id":"chatcmpl-1","object":"chat.completion","created":1,"model":"gpt-4o-mini",
                "choices":[{"index":0,"message":{"role":"assistant","content":"hello"},"finish_reason":"stop"}],
                "usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#,
            ),
        };
        let decoded = adapter.decode_chat_response(&response).unwrap();
        assert_eq!(decoded.choices[0].message.content.as_ref().unwrap().text(), "hello");
        assert_eq!(decoded.usage.unwrap().total_tokens, 4);
    }
}
