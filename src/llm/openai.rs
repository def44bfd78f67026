//! OpenAI-compatible chat completions client
//!
//! Async HTTP client for `/chat/completions` with function calling support.
//! Works against api.openai.com and any server exposing the same API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::core::{ChatMessage, Config, ResearchError, Result, ToolCall, ToolDefinition};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage, ToolChoice};

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Chat completions request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// Message in the OpenAI wire format
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// Tool call in the OpenAI wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunction,
}

/// Function in a tool call; arguments travel as a JSON string
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

/// Chat completions response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAIClient {
    /// Create a client for `base_url` authenticated with `api_key`
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(180))
    }

    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(
            config.openai.base_url.clone(),
            config.openai_api_key()?,
            Duration::from_secs(config.openai.timeout_secs),
        )
    }

    fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Convert internal message to the wire format
    fn to_wire_message(msg: &ChatMessage) -> WireMessage {
        let tool_calls = msg.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|tc| WireToolCall {
                    id: tc.id.clone(),
                    call_type: function_type(),
                    function: WireFunction {
                        name: tc.name.clone(),
                        arguments: tc.arguments.to_string(),
                    },
                })
                .collect::<Vec<_>>()
        });

        // Assistant turns that only call tools carry no content
        let content = if msg.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(msg.content.clone())
        };

        WireMessage {
            role: msg.role.clone(),
            content,
            name: msg.name.clone(),
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }

    /// Convert a completions response to LLMResponse
    fn to_llm_response(response: ChatResponse) -> Result<LLMResponse> {
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| ResearchError::llm("Response contained no choices"))?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let arguments = if tc.function.arguments.trim().is_empty() {
                    json!({})
                } else {
                    serde_json::from_str(&tc.function.arguments).map_err(|e| {
                        ResearchError::llm(format!(
                            "Malformed arguments for '{}': {}",
                            tc.function.name, e
                        ))
                    })?
                };
                Ok(ToolCall::new(tc.id, tc.function.name, arguments))
            })
            .collect::<Result<Vec<_>>>()?;

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LLMResponse {
            content: message.content.unwrap_or_default(),
            tool_calls,
            usage,
            model: response.model,
        })
    }

    fn tool_choice_value(choice: &ToolChoice) -> Value {
        match choice {
            ToolChoice::Auto => json!("auto"),
            ToolChoice::Function(name) => json!({
                "type": "function",
                "function": { "name": name }
            }),
        }
    }

    async fn post_chat(&self, request: &ChatRequest<'_>) -> Result<LLMResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(
            model = request.model,
            messages = request.messages.len(),
            tools = request.tools.map_or(0, |t| t.len()),
            "POST {}",
            url
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ResearchError::llm(format!("Cannot connect to {}", self.base_url))
                } else {
                    ResearchError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ResearchError::llm(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| ResearchError::llm(format!("Failed to parse response: {}", e)))?;

        let llm_response = Self::to_llm_response(chat_response)?;
        if let Some(ref usage) = llm_response.usage {
            debug!(
                model = %llm_response.model,
                total_tokens = usage.total_tokens,
                tool_calls = llm_response.tool_calls.len(),
                "Completion received"
            );
        }
        Ok(llm_response)
    }
}

#[async_trait]
impl LLMProvider for OpenAIClient {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let options = options.unwrap_or_default();
        let request = ChatRequest {
            model,
            messages: messages.iter().map(Self::to_wire_message).collect(),
            tools: None,
            tool_choice: None,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stop: options.stop,
        };

        self.post_chat(&request).await
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let options = options.unwrap_or_default();
        let request = ChatRequest {
            model,
            messages: messages.iter().map(Self::to_wire_message).collect(),
            tools: Some(tools),
            tool_choice: Some(Self::tool_choice_value(&tool_choice)),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stop: options.stop,
        };

        self.post_chat(&request).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}
