//! Worker loop state management
//!
//! Tracks one worker invocation's tool-use loop. The scratchpad holds tool
//! calls and their results; the final answer is set once the model stops
//! requesting tools.

use crate::core::{ChatMessage, ToolCall};

/// State of a worker's tool-use loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Tool rounds completed so far; the answering call is not counted
    pub iteration: usize,
    /// Model calls allowed in this invocation, the answering call included
    pub max_iterations: usize,
    /// Assistant tool-call turns and tool results, in order
    pub scratchpad: Vec<ChatMessage>,
    /// Observations collected from tool executions
    pub observations: Vec<Observation>,
    /// Final answer if the model has finished
    pub final_answer: Option<String>,
}

impl AgentLoopState {
    /// Fresh loop allowing `max_iterations` model calls
    pub fn new(max_iterations: usize) -> Self {
        Self {
            iteration: 0,
            max_iterations,
            scratchpad: Vec::new(),
            observations: Vec::new(),
            final_answer: None,
        }
    }

    /// Another model call is allowed and no answer has arrived yet
    pub fn should_continue(&self) -> bool {
        self.iteration < self.max_iterations && self.final_answer.is_none()
    }

    /// Record the assistant turn that requested `calls`
    pub fn record_tool_request(&mut self, content: impl Into<String>, calls: Vec<ToolCall>) {
        self.scratchpad.push(ChatMessage::assistant_tool_calls(content, calls));
    }

    /// Record the text a tool returned for `call`
    pub fn record_observation(&mut self, call: &ToolCall, output: impl Into<String>) {
        let output = output.into();
        self.scratchpad.push(ChatMessage::tool_result(call.id.clone(), output.clone()));
        self.observations.push(Observation {
            tool_name: call.name.clone(),
            output,
        });
    }

    /// Prompt prefix followed by the scratchpad
    pub fn context(&self, prefix: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(prefix.len() + self.scratchpad.len());
        messages.extend_from_slice(prefix);
        messages.extend(self.scratchpad.iter().cloned());
        messages
    }

    /// Count a completed tool round
    pub fn next_iteration(&mut self) {
        self.iteration += 1;
    }
}

/// Output of one tool execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Name of the tool that produced this observation
    pub tool_name: String,
    /// Text returned by the tool
    pub output: String,
}
