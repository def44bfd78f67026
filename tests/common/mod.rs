//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use web_researcher::core::{ChatMessage, Config, ResearchError, Result, ToolCall, ToolDefinition};
use web_researcher::agent::FINISH;
use web_researcher::graph::CompiledGraph;
use web_researcher::llm::{GenerateOptions, LLMProvider, LLMResponse, ToolChoice};
use web_researcher::research::build_graph;
use web_researcher::tools::{Tool, ToolRegistry};

/// Completion service that replays a fixed script.
///
/// Calls that force the `route` function consume the route queue; every other
/// call consumes the worker queue, falling back to a plain "done" answer.
#[derive(Default)]
pub struct ScriptedProvider {
    routes: Mutex<VecDeque<String>>,
    worker: Mutex<VecDeque<LLMResponse>>,
    pub router_requests: Mutex<Vec<Vec<ChatMessage>>>,
    pub worker_requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            routes: Mutex::new(routes.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn with_worker_reply(self, response: LLMResponse) -> Self {
        self.worker.lock().unwrap().push_back(response);
        self
    }

    pub fn with_worker_text(self, text: &str) -> Self {
        self.with_worker_reply(LLMResponse::text(text))
    }

    pub fn router_calls(&self) -> usize {
        self.router_requests.lock().unwrap().len()
    }

    pub fn worker_calls(&self) -> usize {
        self.worker_requests.lock().unwrap().len()
    }

    fn next_route(&self, messages: &[ChatMessage]) -> Result<LLMResponse> {
        self.router_requests.lock().unwrap().push(messages.to_vec());
        let next = self
            .routes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ResearchError::llm("route script exhausted"))?;
        let call = ToolCall::new(
            format!("call_route_{}", self.router_calls()),
            "route",
            json!({ "next": next }),
        );
        Ok(LLMResponse::with_tool_calls(vec![call]))
    }

    fn next_worker_reply(&self, messages: &[ChatMessage]) -> LLMResponse {
        self.worker_requests.lock().unwrap().push(messages.to_vec());
        self.worker
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| LLMResponse::text("done"))
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        Ok(self.next_worker_reply(messages))
    }

    async fn chat_with_tools(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
        tool_choice: ToolChoice,
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        match tool_choice {
            ToolChoice::Function(ref name) if name == "route" => self.next_route(messages),
            _ => Ok(self.next_worker_reply(messages)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Completion service whose replies depend only on the conversation it is
/// shown, so any number of runs can share it.
///
/// The supervisor picks the researcher until a worker has spoken, then
/// finishes; the researcher answers "report on <question>".
pub struct EchoingProvider;

impl EchoingProvider {
    fn question(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .find(|m| m.role == "user" && m.name.is_none())
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LLMProvider for EchoingProvider {
    async fn chat(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        tokio::task::yield_now().await;
        Ok(LLMResponse::text(format!("report on {}", Self::question(messages))))
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
        tool_choice: ToolChoice,
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        if tool_choice != ToolChoice::Function("route".into()) {
            return self.chat(model, messages, options).await;
        }

        tokio::task::yield_now().await;
        let worker_spoke = messages.iter().any(|m| m.name.is_some());
        let next = if worker_spoke { FINISH } else { "Researcher" };
        Ok(LLMResponse::with_tool_calls(vec![ToolCall::new(
            "call_route",
            "route",
            json!({ "next": next }),
        )]))
    }

    fn name(&self) -> &str {
        "echoing"
    }
}

/// Search tool answering every query with a canned result
pub struct FakeSearch;

#[async_trait]
impl Tool for FakeSearch {
    fn name(&self) -> &str {
        "tavily_search_results_json"
    }

    fn description(&self) -> &str {
        "Canned search results"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> Result<String> {
        let query = call.get_string("query").unwrap_or_default();
        Ok(json!([{ "url": "https://example.com", "content": format!("results for {}", query) }])
            .to_string())
    }
}

/// Tool whose every call fails
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "failing_tool"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _call: &ToolCall) -> Result<String> {
        Err(ResearchError::tool("search backend unavailable"))
    }
}

pub fn tool_call(name: &str, arguments: Value) -> LLMResponse {
    LLMResponse::with_tool_calls(vec![ToolCall::new("call_1", name, arguments)])
}

pub fn registry() -> Arc<ToolRegistry> {
    Arc::new(
        ToolRegistry::new()
            .with_tool(Arc::new(FakeSearch))
            .with_tool(Arc::new(FailingTool)),
    )
}

/// Standard supervisor/researcher graph driven by `provider`
pub fn research_graph(provider: Arc<dyn LLMProvider>, config: &Config) -> CompiledGraph {
    build_graph(provider, registry(), config).expect("graph compiles")
}
