//! LLM module - completion service integration
//!
//! Provides the provider abstraction and an OpenAI-compatible client.

pub mod openai;
pub mod traits;

pub use openai::OpenAIClient;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage, ToolChoice};
