use serde_json::{Value, json};

use llmgate_protocol::canonical::{
    ChatCompletionRequest, ChatMessage, ContentPart, FunctionCall, MessageContent, Role, Tool,
    ToolCall,
};
use llmgate_protocol::claude::{
    ClaudeRole, ContentBlock, ImageSource, Message, MessagesRequest, Metadata, ToolChoice,
    ToolDefinition,
};

pub(super) const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Caller fields outside the canonical model that the Messages API accepts.
/// Everything else in `extra` is OpenAI-specific and is dropped.
const MESSAGES_PASSTHROUGH: [&str; 3] = ["top_k", "thinking", "service_tier"];

/// Tool and function results travel back to Claude as user turns.
pub(super) fn claude_role(role: Role) -> ClaudeRole {
    match role {
        Role::User | Role::Tool | Role::Function => ClaudeRole::User,
        Role::System | Role::Assistant => ClaudeRole::Assistant,
    }
}

pub(super) fn messages_request(request: &ChatCompletionRequest) -> MessagesRequest {
    let mut system = Vec::new();
    let mut messages: Vec<Message> = Vec::new();

    for message in &request.messages {
        if message.role == Role::System {
            if let Some(content) = &message.content {
                system.push(content.text());
            }
            continue;
        }
        let blocks = content_blocks(message);
        if blocks.is_empty() {
            continue;
        }
        let role = claude_role(message.role);
        match messages.last_mut() {
            Some(last) if last.role == role => last.content.extend(blocks),
            _ => messages.push(Message {
                role,
                content: blocks,
            }),
        }
    }

    MessagesRequest {
        model: request.model.clone(),
        // Left unset when the caller sent none, so a channel's custom params can
        // supply it before the default applies.
        max_tokens: request.max_completion_tokens.or(request.max_tokens),
        messages,
        system: (!system.is_empty()).then(|| system.join("\n")),
        stop_sequences: request.stop.as_ref().map(|stop| stop.to_vec()),
        temperature: request.temperature,
        top_p: request.top_p,
        stream: None,
        tools: request
            .tools
            .as_ref()
            .map(|tools| tools.iter().map(tool_definition).collect()),
        tool_choice: request.tool_choice.as_ref().and_then(tool_choice),
        metadata: request.user.as_ref().map(|user| Metadata {
            user_id: user.clone(),
        }),
        extra: request
            .extra
            .iter()
            .filter(|(key, _)| MESSAGES_PASSTHROUGH.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}

fn content_blocks(message: &ChatMessage) -> Vec<ContentBlock> {
    match message.role {
        Role::Tool | Role::Function => {
            let tool_use_id = message
                .tool_call_id
                .clone()
                .or_else(|| message.name.clone())
                .unwrap_or_default();
            vec![ContentBlock::ToolResult {
                tool_use_id,
                content: message
                    .content
                    .as_ref()
                    .map(MessageContent::text)
                    .unwrap_or_default(),
                is_error: None,
            }]
        }
        _ => {
            let mut blocks = match &message.content {
                Some(MessageContent::Text(text)) if !text.is_empty() => {
                    vec![ContentBlock::Text { text: text.clone() }]
                }
                Some(MessageContent::Parts(parts)) => parts.iter().map(part_block).collect(),
                _ => Vec::new(),
            };
            if let Some(calls) = &message.tool_calls {
                blocks.extend(calls.iter().map(tool_use_block));
            }
            blocks
        }
    }
}

fn part_block(part: &ContentPart) -> ContentBlock {
    match part {
        ContentPart::Text { text } => ContentBlock::Text { text: text.clone() },
        ContentPart::ImageUrl { image_url } => ContentBlock::Image {
            source: image_source(&image_url.url),
        },
    }
}

/// `data:<media>;base64,<payload>` becomes an inline image; anything else is
/// passed by URL.
fn image_source(url: &str) -> ImageSource {
    if let Some(rest) = url.strip_prefix("data:")
        && let Some((media_type, data)) = rest.split_once(";base64,")
    {
        return ImageSource::Base64 {
            media_type: media_type.to_string(),
            data: data.to_string(),
        };
    }
    ImageSource::Url {
        url: url.to_string(),
    }
}

fn tool_use_block(call: &ToolCall) -> ContentBlock {
    let input = serde_json::from_str::<Value>(&call.function.arguments)
        .unwrap_or_else(|_| Value::String(call.function.arguments.clone()));
    ContentBlock::ToolUse {
        id: call.id.clone(),
        name: call.function.name.clone(),
        input,
    }
}

fn tool_definition(tool: &Tool) -> ToolDefinition {
    ToolDefinition {
        name: tool.function.name.clone(),
        description: tool.function.description.clone(),
        input_schema: tool
            .function
            .parameters
            .clone()
            .unwrap_or_else(|| json!({ "type": "object", "properties": {} })),
    }
}

/// Unrecognized choices are dropped and Claude falls back to its default.
fn tool_choice(value: &Value) -> Option<ToolChoice> {
    match value {
        Value::String(choice) => match choice.as_str() {
            "auto" => Some(ToolChoice::Auto),
            "required" => Some(ToolChoice::Any),
            "none" => Some(ToolChoice::Disabled),
            _ => None,
        },
        Value::Object(map) => map
            .get("function")
            .and_then(|function| function.get("name"))
            .and_then(Value::as_str)
            .map(|name| ToolChoice::Tool {
                name: name.to_string(),
            }),
        _ => None,
    }
}

/// Splits response blocks into the assistant text and tool calls.
pub(super) fn assistant_message(blocks: &[ContentBlock]) -> ChatMessage {
    let mut text = String::new();
    let mut calls = Vec::new();
    for block in blocks {
        match block {
            ContentBlock::Text { text: part } => text.push_str(part),
            ContentBlock::ToolUse { id, name, input } => calls.push(ToolCall {
                id: id.clone(),
                kind: "function".to_string(),
                function: FunctionCall {
                    name: name.clone(),
                    arguments: input.to_string(),
                },
            }),
            _ => {}
        }
    }
    let content = if text.is_empty() && !calls.is_empty() {
        None
    } else {
        Some(MessageContent::Text(text))
    };
    ChatMessage {
        role: Role::Assistant,
        content,
        name: None,
        tool_calls: (!calls.is_empty()).then_some(calls),
        tool_call_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmgate_protocol::canonical::{FunctionDefinition, ImageUrl, StopSequences};
    use serde_json::Map;

    fn request(messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "claude-sonnet-4-5".to_string(),
            messages,
            max_tokens: None,
            max_completion_tokens: None,
            temperature: None,
            top_p: None,
            stop: None,
            stream: None,
            tools: None,
            tool_choice: None,
            user: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn role_table_is_total() {
        for role in Role::ALL {
            let expected = match role {
                Role::User | Role::Tool | Role::Function => ClaudeRole::User,
                _ => ClaudeRole::Assistant,
            };
            assert_eq!(claude_role(role), expected, "{}", role.as_str());
        }
    }

    #[test]
    fn system_messages_are_hoisted() {
        let out = messages_request(&request(vec![
            ChatMessage::text(Role::System, "be brief"),
            ChatMessage::text(Role::User, "hi"),
            ChatMessage::text(Role::System, "no emoji"),
        ]));
        assert_eq!(out.system.as_deref(), Some("be brief\nno emoji"));
        assert_eq!(out.messages.len(), 1);
        assert_eq!(out.max_tokens, None);
        assert_eq!(out.stream, None);
    }

    #[test]
    fn tool_round_trip_merges_user_turns() {
        let mut assistant = ChatMessage::text(Role::Assistant, "");
        assistant.tool_calls = Some(vec![ToolCall {
            id: "toolu_1".to_string(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: "weather".to_string(),
                arguments: "{\"city\":\"Oslo\"}".to_string(),
            },
        }]);
        let mut result = ChatMessage::text(Role::Tool, "4C");
        result.tool_call_id = Some("toolu_1".to_string());

        let out = messages_request(&request(vec![
            ChatMessage::text(Role::User, "weather?"),
            assistant,
            result,
            ChatMessage::text(Role::User, "thanks"),
        ]));

        assert_eq!(out.messages.len(), 3);
        assert_eq!(
            out.messages[1].content,
            vec![ContentBlock::ToolUse {
                id: "toolu_1".to_string(),
                name: "weather".to_string(),
                input: json!({ "city": "Oslo" }),
            }]
        );
        assert_eq!(out.messages[2].role, ClaudeRole::User);
        assert_eq!(
            out.messages[2].content,
            vec![
                ContentBlock::ToolResult {
                    tool_use_id: "toolu_1".to_string(),
                    content: "4C".to_string(),
                    is_error: None,
                },
                ContentBlock::Text {
                    text: "thanks".to_string()
                },
            ]
        );
    }

    #[test]
    fn invalid_tool_arguments_kept_as_string() {
        let block = tool_use_block(&ToolCall {
            id: "t".to_string(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: "f".to_string(),
                arguments: "not json".to_string(),
            },
        });
        assert_eq!(
            block,
            ContentBlock::ToolUse {
                id: "t".to_string(),
                name: "f".to_string(),
                input: Value::String("not json".to_string()),
            }
        );
    }

    #[test]
    fn sampling_and_tools_are_translated() {
        let mut req = request(vec![ChatMessage::text(Role::User, "hi")]);
        req.max_tokens = Some(256);
        req.stop = Some(StopSequences::Single("END".to_string()));
        req.tools = Some(vec![Tool {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: "lookup".to_string(),
                description: None,
                parameters: None,
            },
        }]);
        req.tool_choice = Some(json!({ "type": "function", "function": { "name": "lookup" } }));
        req.user = Some("u-1".to_string());

        let out = messages_request(&req);
        assert_eq!(out.max_tokens, Some(256));
        assert_eq!(out.stop_sequences, Some(vec!["END".to_string()]));
        let tools = out.tools.unwrap();
        assert_eq!(tools[0].input_schema["type"], "object");
        assert_eq!(
            out.tool_choice,
            Some(ToolChoice::Tool {
                name: "lookup".to_string()
            })
        );
        assert_eq!(out.metadata.unwrap().user_id, "u-1");
        assert_eq!(tool_choice(&json!("required")), Some(ToolChoice::Any));
        assert_eq!(tool_choice(&json!("none")), Some(ToolChoice::Disabled));
        assert_eq!(tool_choice(&json!("sometimes")), None);
    }

    #[test]
    fn data_uri_images_are_inlined() {
        let mut message = ChatMessage::text(Role::User, "");
        message.content = Some(MessageContent::Parts(vec![
            ContentPart::Text {
                text: "what is this".to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/png;base64,AAAA".to_string(),
                    detail: None,
                },
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "https://example.com/cat.png".to_string(),
                    detail: None,
                },
            },
        ]));
        let blocks = content_blocks(&message);
        assert_eq!(
            blocks[1],
            ContentBlock::Image {
                source: ImageSource::Base64 {
                    media_type: "image/png".to_string(),
                    data: "AAAA".to_string(),
                }
            }
        );
        assert_eq!(
            blocks[2],
            ContentBlock::Image {
                source: ImageSource::Url {
                    url: "https://example.com/cat.png".to_string()
                }
            }
        );
    }

    #[test]
    fn tool_only_reply_has_null_content() {
        let message = assistant_message(&[ContentBlock::ToolUse {
            id: "toolu_9".to_string(),
            name: "f".to_string(),
            input: json!({ "a": 1 }),
        }]);
        assert!(message.content.is_none());
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls[0].function.arguments, "{\"a\":1}");
    }

    #[test]
    fn max_completion_tokens_preferred_over_max_tokens() {
        let mut req = request(vec![ChatMessage::text(Role::User, "hi")]);
        req.max_completion_tokens = Some(256);
        assert_eq!(messages_request(&req).max_tokens, Some(256));

        req.max_tokens = Some(1000);
        assert_eq!(messages_request(&req).max_tokens, Some(256));

        req.max_completion_tokens = None;
        assert_eq!(messages_request(&req).max_tokens, Some(1000));
    }

    #[test]
    fn only_messages_api_extras_are_forwarded() {
        let mut req = request(vec![ChatMessage::text(Role::User, "hi")]);
        req.extra.insert("top_k".to_string(), json!(40));
        req.extra.insert("presence_penalty".to_string(), json!(0.5));
        req.extra.insert("logprobs".to_string(), json!(true));

        let out = messages_request(&req);
        assert_eq!(out.extra.len(), 1);
        assert_eq!(out.extra.get("top_k"), Some(&json!(40)));
    }
}
