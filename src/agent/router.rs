//! Supervisor agent
//!
//! Asks the completion service which worker should act next. The call forces a
//! single `route` function whose only argument is an enum of the configured
//! options, and any answer outside that enum is rejected.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::agent::prompts::{SUPERVISOR_ROUTE, SUPERVISOR_SYSTEM};
use crate::agent::state::{ConversationState, Route, StateUpdate};
use crate::agent::Agent;
use crate::core::{ChatMessage, ResearchError, Result, ToolDefinition};
use crate::graph::RoutingTable;
use crate::llm::{GenerateOptions, LLMProvider, LLMResponse, ToolChoice};

const ROUTE_FUNCTION: &str = "route";

/// Routing agent that picks the next worker or finishes the run
pub struct RouterAgent {
    name: String,
    llm: Arc<dyn LLMProvider>,
    model: String,
    workers: Vec<String>,
    finish_sentinel: String,
    system_prompt: String,
    route_prompt: String,
}

impl RouterAgent {
    /// Create a router choosing among the workers of `table`
    pub fn new(
        name: impl Into<String>,
        llm: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        table: &RoutingTable,
    ) -> Self {
        let workers: Vec<String> = table.worker_names().map(str::to_string).collect();
        let finish_sentinel = table.finish_sentinel().to_string();

        let members = workers.join(", ");
        let system_prompt = SUPERVISOR_SYSTEM.fill(&[
            ("members", members.as_str()),
            ("finish", finish_sentinel.as_str()),
        ]);

        let options = format!("{:?}", Self::options_of(&finish_sentinel, &workers));
        let route_prompt = SUPERVISOR_ROUTE.fill(&[
            ("options", options.as_str()),
            ("finish", finish_sentinel.as_str()),
        ]);

        Self {
            name: name.into(),
            llm,
            model: model.into(),
            workers,
            finish_sentinel,
            system_prompt,
            route_prompt,
        }
    }

    fn options_of(finish: &str, workers: &[String]) -> Vec<String> {
        std::iter::once(finish.to_string())
            .chain(workers.iter().cloned())
            .collect()
    }

    /// Every value the model may select, sentinel first
    pub fn options(&self) -> Vec<String> {
        Self::options_of(&self.finish_sentinel, &self.workers)
    }

    /// The forced `route` function with its closed enumeration
    pub fn route_function(&self) -> ToolDefinition {
        ToolDefinition::function(
            ROUTE_FUNCTION,
            "Select the next role.",
            json!({
                "title": "routeSchema",
                "type": "object",
                "properties": {
                    "next": {
                        "title": "Next",
                        "anyOf": [{ "enum": self.options() }]
                    }
                },
                "required": ["next"]
            }),
        )
    }

    fn build_messages(&self, state: &ConversationState) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(state.len() + 2);
        messages.push(ChatMessage::system(&self.system_prompt));
        messages.extend(state.to_chat_history());
        messages.push(ChatMessage::system(&self.route_prompt));
        messages
    }

    fn violation(&self, value: impl Into<String>) -> ResearchError {
        ResearchError::RoutingContractViolation {
            value: value.into(),
            allowed: self.options(),
        }
    }

    /// Turn the model's function call into a route, rejecting anything else
    pub fn parse_selection(&self, response: &LLMResponse) -> Result<Route> {
        let call = response
            .tool_calls
            .iter()
            .find(|c| c.name == ROUTE_FUNCTION)
            .ok_or_else(|| {
                self.violation(format!("<no route call; text: {:?}>", response.content))
            })?;

        let selected = call
            .get_string("next")
            .ok_or_else(|| self.violation(call.arguments.to_string()))?;

        if selected == self.finish_sentinel {
            Ok(Route::Finish)
        } else if self.workers.contains(&selected) {
            Ok(Route::Worker(selected))
        } else {
            Err(self.violation(selected))
        }
    }
}

#[async_trait]
impl Agent for RouterAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn route_options(&self) -> Option<&[String]> {
        Some(&self.workers)
    }

    async fn invoke(&self, state: &ConversationState) -> Result<StateUpdate> {
        let messages = self.build_messages(state);
        debug!(agent = %self.name, history = state.len(), "Requesting routing decision");

        let response = self
            .llm
            .chat_with_tools(
                &self.model,
                &messages,
                &[self.route_function()],
                ToolChoice::Function(ROUTE_FUNCTION.to_string()),
                Some(GenerateOptions {
                    temperature: Some(0.0),
                    ..Default::default()
                }),
            )
            .await?;

        let route = self.parse_selection(&response)?;
        info!(agent = %self.name, next = %route, "Routing decision");
        Ok(StateUpdate::route(route))
    }
}
