mod chat;
mod error;
mod models;

pub use chat::{
    ChatCompletionChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    ContentPart, FinishReason, FinishReasonKnown, FunctionCall, FunctionDefinition, ImageUrl,
    MessageContent, Role, StopSequences, Tool, ToolCall, Usage,
};
pub use error::{ErrorEnvelope, NormalizedError};
pub use models::{ModelEntry, ModelList};
