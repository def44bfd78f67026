//! Worker agents
//!
//! A worker runs a tool-use loop against the completion service and reports
//! back with a single message carrying its final answer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::agent::loop_state::AgentLoopState;
use crate::agent::state::{ConversationState, Message, StateUpdate};
use crate::agent::Agent;
use crate::core::{ChatMessage, ResearchError, Result};
use crate::llm::{GenerateOptions, LLMProvider, ToolChoice};
use crate::tools::ToolRegistry;

/// An agent that may call tools before answering
#[derive(Clone)]
pub struct WorkerAgent {
    /// Name of this worker
    name: String,
    /// System instruction defining the worker's role
    instruction: String,
    /// Completion service
    llm: Arc<dyn LLMProvider>,
    /// Model to use
    model: String,
    /// Tools this worker may call
    tools: Arc<ToolRegistry>,
    /// Maximum model calls per invocation
    max_iterations: usize,
    /// Sampling temperature
    temperature: Option<f32>,
}

/// Builder for creating WorkerAgents
pub struct WorkerAgentBuilder {
    name: String,
    instruction: Option<String>,
    llm: Option<Arc<dyn LLMProvider>>,
    model: Option<String>,
    tools: Option<Arc<ToolRegistry>>,
    max_iterations: usize,
    temperature: Option<f32>,
}

impl WorkerAgentBuilder {
    /// Create a new builder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: None,
            llm: None,
            model: None,
            tools: None,
            max_iterations: 15,
            temperature: None,
        }
    }

    /// Set the system instruction
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    /// Set the completion service
    pub fn llm(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Set the model to use
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the tool registry
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set maximum model calls per invocation
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the WorkerAgent
    pub fn build(self) -> Result<WorkerAgent> {
        let llm = self.llm.ok_or_else(|| {
            ResearchError::config(format!("worker '{}' has no completion service", self.name))
        })?;
        let model = self
            .model
            .ok_or_else(|| ResearchError::config(format!("worker '{}' has no model", self.name)))?;

        if self.max_iterations == 0 {
            return Err(ResearchError::config(format!(
                "worker '{}' needs at least one iteration",
                self.name
            )));
        }

        Ok(WorkerAgent {
            instruction: self.instruction.unwrap_or_else(|| {
                format!(
                    "You are a helpful agent named '{}'. Complete the task you are given.",
                    self.name
                )
            }),
            name: self.name,
            llm,
            model,
            tools: self.tools.unwrap_or_default(),
            max_iterations: self.max_iterations,
            temperature: self.temperature,
        })
    }
}

impl WorkerAgent {
    /// Create a builder
    pub fn builder(name: impl Into<String>) -> WorkerAgentBuilder {
        WorkerAgentBuilder::new(name)
    }

    /// The worker's system instruction
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// The worker's tools
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the tool-use loop over `history` and return the final answer
    async fn answer(&self, history: Vec<ChatMessage>) -> Result<String> {
        let mut prefix = Vec::with_capacity(history.len() + 1);
        prefix.push(ChatMessage::system(&self.instruction));
        prefix.extend(history);

        let tool_defs = self.tools.definitions();
        let options = GenerateOptions {
            temperature: self.temperature,
            ..Default::default()
        };

        let mut state = AgentLoopState::new(self.max_iterations);

        while state.should_continue() {
            debug!(
                agent = %self.name,
                iteration = state.iteration + 1,
                max = state.max_iterations,
                "Worker iteration"
            );
            let messages = state.context(&prefix);

            let response = if tool_defs.is_empty() {
                self.llm
                    .chat(&self.model, &messages, Some(options.clone()))
                    .await?
            } else {
                self.llm
                    .chat_with_tools(
                        &self.model,
                        &messages,
                        &tool_defs,
                        ToolChoice::Auto,
                        Some(options.clone()),
                    )
                    .await?
            };

            if response.tool_calls.is_empty() {
                state.final_answer = Some(response.content);
                break;
            }

            let calls = response.tool_calls;
            state.record_tool_request(response.content, calls.clone());

            for call in &calls {
                let output = self.tools.execute(call).await?;
                debug!(agent = %self.name, tool = %call.name, bytes = output.len(), "Tool returned");
                state.record_observation(call, output);
            }

            state.next_iteration();
        }

        info!(
            agent = %self.name,
            tool_rounds = state.iteration,
            observations = state.observations.len(),
            "Worker finished"
        );

        state.final_answer.ok_or_else(|| ResearchError::IterationLimit {
            agent: self.name.clone(),
            max: self.max_iterations,
        })
    }
}

#[async_trait]
impl Agent for WorkerAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, state: &ConversationState) -> Result<StateUpdate> {
        let answer = self.answer(state.to_chat_history()).await?;
        Ok(StateUpdate::message(Message::from_agent(
            self.name.clone(),
            answer,
        )))
    }
}
