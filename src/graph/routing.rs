//! Routing table for a supervisor's conditional edge.

use std::collections::BTreeMap;
use std::fmt;

use crate::agent::state::{ConversationState, Route, FINISH};
use crate::core::{ResearchError, Result};

/// A node of the orchestration graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    /// Entry marker; never executed
    Start,
    /// Terminal marker
    End,
    /// A registered agent
    Node(String),
}

/// Entry marker
pub const START: NodeId = NodeId::Start;
/// Terminal marker
pub const END: NodeId = NodeId::End;

impl NodeId {
    /// Name of the agent node, if this is one
    pub fn as_node(&self) -> Option<&str> {
        match self {
            NodeId::Node(name) => Some(name),
            _ => None,
        }
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        NodeId::Node(name.to_string())
    }
}

impl From<String> for NodeId {
    fn from(name: String) -> Self {
        NodeId::Node(name)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Start => write!(f, "__start__"),
            NodeId::End => write!(f, "__end__"),
            NodeId::Node(name) => write!(f, "{}", name),
        }
    }
}

/// Maps a supervisor's decision to the next node.
///
/// Every worker routes to its own node unless overridden, and the finish
/// sentinel always routes to [`END`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    worker_names: Vec<String>,
    finish_sentinel: String,
    successor_of: BTreeMap<String, NodeId>,
}

impl RoutingTable {
    /// Table where each worker maps to the node of the same name
    pub fn new<I, S>(workers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self {
            worker_names: Vec::new(),
            finish_sentinel: FINISH.to_string(),
            successor_of: BTreeMap::new(),
        };

        for worker in workers {
            let worker = worker.into();
            if !table.successor_of.contains_key(&worker) {
                table
                    .successor_of
                    .insert(worker.clone(), NodeId::Node(worker.clone()));
                table.worker_names.push(worker);
            }
        }

        table
    }

    /// Use a different value for "finish"
    pub fn with_finish_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.finish_sentinel = sentinel.into();
        self
    }

    /// Send `worker`'s selection to a node with a different name
    pub fn with_successor(mut self, worker: impl Into<String>, node: impl Into<NodeId>) -> Self {
        let worker = worker.into();
        if !self.worker_names.contains(&worker) {
            self.worker_names.push(worker.clone());
        }
        self.successor_of.insert(worker, node.into());
        self
    }

    /// Worker names in registration order
    pub fn worker_names(&self) -> impl Iterator<Item = &str> {
        self.worker_names.iter().map(String::as_str)
    }

    pub fn finish_sentinel(&self) -> &str {
        &self.finish_sentinel
    }

    /// Every (worker, successor) pair
    pub fn successors(&self) -> impl Iterator<Item = (&str, &NodeId)> {
        self.successor_of.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.worker_names.is_empty()
    }

    fn allowed(&self) -> Vec<String> {
        std::iter::once(self.finish_sentinel.clone())
            .chain(self.worker_names.iter().cloned())
            .collect()
    }

    /// Read `state.next` and pick the next node
    pub fn decide(&self, state: &ConversationState) -> Result<NodeId> {
        match state.next() {
            Some(Route::Finish) => Ok(NodeId::End),
            Some(Route::Worker(name)) => {
                self.successor_of
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ResearchError::RoutingContractViolation {
                        value: name.clone(),
                        allowed: self.allowed(),
                    })
            }
            None => Err(ResearchError::RoutingContractViolation {
                value: "<unset>".to_string(),
                allowed: self.allowed(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routed(route: Route) -> ConversationState {
        ConversationState::seed("q").set_next(route)
    }

    #[test]
    fn test_finish_maps_to_end() {
        let table = RoutingTable::new(["Researcher"]);
        assert_eq!(table.decide(&routed(Route::Finish)).unwrap(), END);
    }

    #[test]
    fn test_worker_maps_to_itself() {
        let table = RoutingTable::new(["Researcher", "Writer"]);
        assert_eq!(
            table
                .decide(&routed(Route::Worker("Writer".into())))
                .unwrap(),
            NodeId::from("Writer")
        );
    }

    #[test]
    fn test_unknown_worker_is_violation() {
        let table = RoutingTable::new(["Researcher"]);
        let err = table
            .decide(&routed(Route::Worker("Unknown".into())))
            .unwrap_err();
        assert!(err.is_routing_violation());
    }

    #[test]
    fn test_unset_next_is_violation() {
        let table = RoutingTable::new(["Researcher"]);
        assert!(table
            .decide(&ConversationState::seed("q"))
            .unwrap_err()
            .is_routing_violation());
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let table = RoutingTable::new(["A", "B", "A"]);
        assert_eq!(table.worker_names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_successor_override() {
        let table = RoutingTable::new(["Researcher"]).with_successor("Researcher", "web");
        assert_eq!(
            table
                .decide(&routed(Route::Worker("Researcher".into())))
                .unwrap(),
            NodeId::from("web")
        );
    }

    #[test]
    fn test_custom_finish_sentinel() {
        let table = RoutingTable::new(["Researcher"]).with_finish_sentinel("DONE");
        assert_eq!(table.finish_sentinel(), "DONE");
        assert_eq!(table.decide(&routed(Route::Finish)).unwrap(), END);

        match table.decide(&routed(Route::Worker("FINISH".into()))) {
            Err(ResearchError::RoutingContractViolation { value, allowed }) => {
                assert_eq!(value, "FINISH");
                assert_eq!(allowed, vec!["DONE".to_string(), "Researcher".to_string()]);
            }
            other => panic!("expected a routing violation, got {other:?}"),
        }
    }

    #[test]
    fn test_node_display() {
        assert_eq!(START.to_string(), "__start__");
        assert_eq!(END.to_string(), "__end__");
        assert_eq!(NodeId::from("supervisor").to_string(), "supervisor");
    }
}
