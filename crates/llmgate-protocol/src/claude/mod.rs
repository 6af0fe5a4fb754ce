//! Anthropic Messages API shapes.

pub mod error;
pub mod messages;
pub mod models;

pub use error::{ErrorDetail, ErrorResponse};
pub use messages::{
    ClaudeRole, ContentBlock, ImageSource, Message, Metadata, MessagesRequest, MessagesResponse,
    ToolChoice, ToolDefinition, Usage,
};
pub use models::{ListModelsResponse, ModelInfo};

pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";
