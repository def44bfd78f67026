//! Agent module - graph nodes and the state they share
//!
//! An agent reads the conversation state and returns a partial update. The
//! supervisor ([`RouterAgent`]) only sets the routing field; workers
//! ([`WorkerAgent`]) append exactly one message.

pub mod loop_state;
pub mod prompts;
pub mod router;
pub mod state;
pub mod worker;

use async_trait::async_trait;

use crate::core::Result;

pub use loop_state::{AgentLoopState, Observation};
pub use router::RouterAgent;
pub use state::{ConversationState, Message, Route, StateUpdate, FINISH};
pub use worker::{WorkerAgent, WorkerAgentBuilder};

/// A node of the orchestration graph
#[async_trait]
pub trait Agent: Send + Sync {
    /// Actor name; also the node name in the graph
    fn name(&self) -> &str;

    /// Workers this agent may route to, for agents that make routing
    /// decisions. Checked against the graph when it is compiled.
    fn route_options(&self) -> Option<&[String]> {
        None
    }

    /// Run against the current state and return the update to merge
    async fn invoke(&self, state: &ConversationState) -> Result<StateUpdate>;
}
