//! LLM Provider trait for abstracting completion backends
//!
//! Agents only see this trait, so tests can script the completion service.

use async_trait::async_trait;

use crate::core::{ChatMessage, Result, ToolCall, ToolDefinition};

/// One reply from the completion service
#[derive(Debug, Clone, Default)]
pub struct LLMResponse {
    /// Text content of the response
    pub content: String,
    /// Any tool calls the model wants to make
    pub tool_calls: Vec<ToolCall>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

impl LLMResponse {
    /// A plain text answer
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// A response requesting tool calls
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Options for LLM generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

/// How the model may use the offered tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to call a tool
    Auto,
    /// The model must call the named function
    Function(String),
}

/// A chat completion backend
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Plain completion over `messages`
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Completion that may (or, with a forced choice, must) call one of `tools`
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
