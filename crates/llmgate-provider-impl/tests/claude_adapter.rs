use bytes::Bytes;
use serde_json::{Value, json};

use llmgate_protocol::canonical::{
    ChatCompletionRequest, FinishReason, FinishReasonKnown, NormalizedError,
};
use llmgate_provider_core::{
    Channel, HttpMethod, ProviderAdapter, UpstreamCtx, UpstreamHttpResponse, header_get,
};
use llmgate_provider_impl::{FactoryConfig, ProviderFactory};

fn claude(base_url: Option<&str>, custom_params: Value) -> Box<dyn ProviderAdapter> {
    let channel: Channel = serde_json::from_value(json!({
        "id": 5,
        "name": "anthropic-main",
        "vendor": "claude",
        "credential": "sk-ant-test",
        "base_url": base_url,
        "custom_params": custom_params
    }))
    .unwrap();
    ProviderFactory::new(FactoryConfig::default())
        .unwrap()
        .create(&channel)
        .unwrap()
}

fn request(value: Value) -> ChatCompletionRequest {
    serde_json::from_value(value).unwrap()
}

fn body_of(adapter: &dyn ProviderAdapter, req: &ChatCompletionRequest) -> Value {
    let out = adapter
        .build_chat_request(req, &UpstreamCtx::new("trace-1"))
        .unwrap();
    serde_json::from_slice(out.body.as_deref().unwrap()).unwrap()
}

fn ok(body: &'static [u8]) -> UpstreamHttpResponse {
    UpstreamHttpResponse {
        status: 200,
        headers: Vec::new(),
        body: Bytes::from_static(body),
    }
}

#[test]
fn request_shape() {
    let adapter = claude(None, Value::Null);
    let req = request(json!({
        "model": "claude-sonnet-4-5",
        "messages": [
            { "role": "system", "content": "You are terse." },
            { "role": "user", "content": "Hello" }
        ],
        "stream": false
    }));
    let out = adapter
        .build_chat_request(&req, &UpstreamCtx::new("trace-1"))
        .unwrap();

    assert_eq!(out.method, HttpMethod::Post);
    assert_eq!(out.url, "https://api.anthropic.com/v1/messages");
    assert_eq!(header_get(&out.headers, "x-api-key"), Some("sk-ant-test"));
    assert_eq!(header_get(&out.headers, "anthropic-version"), Some("2023-06-01"));
    assert_eq!(header_get(&out.headers, "content-type"), Some("application/json"));
    assert_eq!(header_get(&out.headers, "authorization"), None);

    let body: Value = serde_json::from_slice(out.body.as_deref().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({
            "model": "claude-sonnet-4-5",
            "max_tokens": 4096,
            "system": "You are terse.",
            "messages": [
                { "role": "user", "content": [{ "type": "text", "text": "Hello" }] }
            ]
        })
    );
}

#[test]
fn channel_max_tokens_fills_in_before_default() {
    let adapter = claude(None, json!({ "max_tokens": 1024 }));
    let bare = request(json!({
        "model": "claude-sonnet-4-5",
        "messages": [{ "role": "user", "content": "x" }]
    }));
    assert_eq!(body_of(adapter.as_ref(), &bare)["max_tokens"], json!(1024));

    let capped = request(json!({
        "model": "claude-sonnet-4-5",
        "messages": [{ "role": "user", "content": "x" }],
        "max_completion_tokens": 256
    }));
    assert_eq!(body_of(adapter.as_ref(), &capped)["max_tokens"], json!(256));
}

#[test]
fn max_completion_tokens_reaches_claude() {
    let adapter = claude(None, Value::Null);
    let req = request(json!({
        "model": "claude-sonnet-4-5",
        "messages": [{ "role": "user", "content": "x" }],
        "max_completion_tokens": 256,
        "top_k": 12,
        "presence_penalty": 0.5
    }));
    let body = body_of(adapter.as_ref(), &req);
    assert_eq!(body["max_tokens"], json!(256));
    assert_eq!(body["top_k"], json!(12));
    assert!(body.get("presence_penalty").is_none());
    assert!(body.get("max_completion_tokens").is_none());
}

#[test]
fn cloudflare_gateway_base_drops_version() {
    let adapter = claude(
        Some("https://gateway.ai.cloudflare.com/v1/acct/gw/anthropic/"),
        Value::Null,
    );
    let req = request(json!({ "model": "m", "messages": [{ "role": "user", "content": "x" }] }));
    let out = adapter
        .build_chat_request(&req, &UpstreamCtx::new("t"))
        .unwrap();
    assert_eq!(
        out.url,
        "https://gateway.ai.cloudflare.com/v1/acct/gw/anthropic/messages"
    );
    let models = adapter.build_models_request(&UpstreamCtx::new("t")).unwrap();
    assert_eq!(models.method, HttpMethod::Get);
    assert_eq!(
        models.url,
        "https://gateway.ai.cloudflare.com/v1/acct/gw/anthropic/models"
    );
}

#[test]
fn custom_params_apply_to_encoded_body_only() {
    let adapter = claude(
        None,
        json!({
            "per_model": true,
            "claude-sonnet-4-5": { "top_k": 40, "max_tokens": 1, "stream": true }
        }),
    );
    let req = request(json!({
        "model": "claude-sonnet-4-5",
        "messages": [{ "role": "user", "content": "x" }],
        "max_tokens": 100
    }));
    let before = req.clone();
    let body = body_of(adapter.as_ref(), &req);
    assert_eq!(body["top_k"], json!(40));
    assert_eq!(body["max_tokens"], json!(100));
    assert!(body.get("stream").is_none());
    assert_eq!(req, before);

    let other = request(json!({
        "model": "claude-haiku-4-5",
        "messages": [{ "role": "user", "content": "x" }]
    }));
    assert!(body_of(adapter.as_ref(), &other).get("top_k").is_none());
}

#[test]
fn overwrite_custom_params_replace_caller_values() {
    let adapter = claude(None, json!({ "overwrite": true, "temperature": 0.0 }));
    let req = request(json!({
        "model": "m",
        "messages": [{ "role": "user", "content": "x" }],
        "temperature": 0.9
    }));
    assert_eq!(body_of(adapter.as_ref(), &req)["temperature"], json!(0.0));
}

#[test]
fn response_decodes_text_and_tool_calls() {
    let adapter = claude(None, Value::Null);
    let decoded = adapter
        .decode_chat_response(&ok(br#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-5",
            "content": [
                { "type": "text", "text": "Checking. " },
                { "type": "tool_use", "id": "toolu_1", "name": "weather", "input": { "city": "Oslo" } }
            ],
            "stop_reason": "tool_use",
            "usage": { "input_tokens": 12, "output_tokens": 7 }
        }"#))
        .unwrap();

    assert_eq!(decoded.id, "msg_01");
    assert_eq!(decoded.object, "chat.completion");
    assert!(decoded.created > 0);
    let choice = &decoded.choices[0];
    assert_eq!(
        choice.finish_reason,
        Some(FinishReason::Known(FinishReasonKnown::ToolCalls))
    );
    assert_eq!(choice.message.content.as_ref().unwrap().text(), "Checking. ");
    let call = &choice.message.tool_calls.as_ref().unwrap()[0];
    assert_eq!(call.function.name, "weather");
    let args: Value = serde_json::from_str(&call.function.arguments).unwrap();
    assert_eq!(args, json!({ "city": "Oslo" }));
    let usage = decoded.usage.unwrap();
    assert_eq!((usage.prompt_tokens, usage.completion_tokens, usage.total_tokens), (12, 7, 19));
}

#[test]
fn malformed_success_body_is_a_decode_error() {
    let adapter = claude(None, Value::Null);
    let err = adapter.decode_chat_response(&ok(b"not json")).unwrap_err();
    assert!(matches!(err, llmgate_provider_core::ProviderError::Decode(_)));
    assert!(!err.is_configuration());
}

#[test]
fn unauthorized_envelope_normalizes() {
    let adapter = claude(None, Value::Null);
    let decoded = adapter.decode_error(
        br#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
    );
    assert_eq!(
        decoded,
        Some(NormalizedError {
            message: "invalid x-api-key".to_string(),
            r#type: "authentication_error".to_string(),
            code: "error".to_string(),
        })
    );
}

#[test]
fn model_listing_decodes() {
    let adapter = claude(None, Value::Null);
    let list = adapter
        .decode_models_response(&ok(br#"{
            "data": [
                { "id": "claude-3-haiku-20240307", "display_name": "Claude Haiku 3",
                  "created_at": "2024-03-07T00:00:00Z", "type": "model" }
            ],
            "has_more": false
        }"#))
        .unwrap();
    assert_eq!(list.object, "list");
    assert_eq!(list.data[0].id, "claude-3-haiku-20240307");
    assert_eq!(list.data[0].created, 1_709_769_600);
    assert_eq!(list.data[0].owned_by, "anthropic");
}
