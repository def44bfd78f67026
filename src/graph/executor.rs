//! Compiled graph and the step loop that runs it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::agent::{Agent, ConversationState};
use crate::core::{ResearchError, Result};
use crate::graph::routing::{NodeId, RoutingTable};

/// Outgoing path of a node
#[derive(Debug, Clone)]
pub(crate) enum Edge {
    Fixed(NodeId),
    Conditional(RoutingTable),
}

/// An immutable, validated graph. Safe to share across concurrent runs.
pub struct CompiledGraph {
    nodes: HashMap<String, Arc<dyn Agent>>,
    edges: HashMap<String, Edge>,
    entry: String,
    max_steps: usize,
}

impl CompiledGraph {
    pub(crate) fn new(
        nodes: HashMap<String, Arc<dyn Agent>>,
        edges: HashMap<String, Edge>,
        entry: String,
        max_steps: usize,
    ) -> Self {
        Self {
            nodes,
            edges,
            entry,
            max_steps,
        }
    }

    /// First node executed after START
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Registered node names, sorted
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Node that runs after `node`, given the state it produced
    pub fn transition(&self, node: &str, state: &ConversationState) -> Result<NodeId> {
        match self.edges.get(node) {
            Some(Edge::Fixed(to)) => Ok(to.clone()),
            Some(Edge::Conditional(table)) => table.decide(state),
            None => Err(ResearchError::graph(format!(
                "node '{}' is not part of the graph",
                node
            ))),
        }
    }

    /// Run from the entry point until END
    pub async fn invoke(&self, state: ConversationState) -> Result<ConversationState> {
        self.invoke_with_observer(state, |_, _| {}).await
    }

    /// Run from the entry point until END, reporting the merged state after
    /// every node.
    pub async fn invoke_with_observer<F>(
        &self,
        initial: ConversationState,
        mut observer: F,
    ) -> Result<ConversationState>
    where
        F: FnMut(&str, &ConversationState) + Send,
    {
        let mut state = initial;
        let mut current = NodeId::Node(self.entry.clone());
        let mut steps = 0;

        loop {
            let name = match current {
                NodeId::Node(name) => name,
                NodeId::End => break,
                NodeId::Start => {
                    return Err(ResearchError::graph("transition returned to the start node"))
                }
            };

            if steps == self.max_steps {
                return Err(ResearchError::StepLimitExceeded(self.max_steps));
            }
            steps += 1;

            let agent = self
                .nodes
                .get(&name)
                .ok_or_else(|| ResearchError::graph(format!("no agent for node '{}'", name)))?;

            info!(step = steps, node = %name, "Running node");
            let update = agent
                .invoke(&state)
                .await
                .map_err(|e| e.in_agent(name.as_str()))?;

            state = state.apply(update);
            observer(&name, &state);

            current = self.transition(&name, &state)?;
            debug!(from = %name, to = %current, messages = state.len(), "Transition");
        }

        info!(steps, messages = state.len(), "Graph finished");
        Ok(state)
    }
}
