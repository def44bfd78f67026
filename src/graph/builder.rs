//! Graph construction and compile-time validation.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::agent::Agent;
use crate::core::{ResearchError, Result};
use crate::graph::executor::{CompiledGraph, Edge};
use crate::graph::routing::{NodeId, RoutingTable};

/// Default cap on graph steps per run
pub const DEFAULT_MAX_STEPS: usize = 25;

#[derive(Clone)]
enum PendingEdge {
    Fixed(NodeId),
    Conditional(RoutingTable),
}

/// Collects nodes and edges, then validates them in [`GraphBuilder::compile`].
#[derive(Clone)]
pub struct GraphBuilder {
    nodes: BTreeMap<String, Arc<dyn Agent>>,
    edges: Vec<(NodeId, PendingEdge)>,
    problems: Vec<String>,
    max_steps: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            problems: Vec::new(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Register an agent under its own name
    pub fn add_node(mut self, agent: Arc<dyn Agent>) -> Self {
        let name = agent.name().to_string();
        if name.is_empty() {
            self.problems.push("node names must not be empty".into());
        } else if self.nodes.insert(name.clone(), agent).is_some() {
            self.problems.push(format!("node '{}' is registered twice", name));
        }
        self
    }

    /// Unconditional transition
    pub fn add_edge(mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        self.edges.push((from.into(), PendingEdge::Fixed(to.into())));
        self
    }

    /// Transition decided by `table` after `from` runs
    pub fn add_conditional_edges(mut self, from: impl Into<NodeId>, table: RoutingTable) -> Self {
        self.edges.push((from.into(), PendingEdge::Conditional(table)));
        self
    }

    /// Shorthand for `add_edge(START, node)`
    pub fn set_entry_point(self, node: impl Into<NodeId>) -> Self {
        self.add_edge(NodeId::Start, node)
    }

    /// Cap the number of node executions per run
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    fn exists(&self, node: &NodeId) -> bool {
        match node {
            NodeId::End => true,
            NodeId::Start => false,
            NodeId::Node(name) => self.nodes.contains_key(name),
        }
    }

    /// Validate and freeze the graph
    pub fn compile(self) -> Result<CompiledGraph> {
        if let Some(problem) = self.problems.first() {
            return Err(ResearchError::graph(problem.clone()));
        }
        if self.nodes.is_empty() {
            return Err(ResearchError::graph("graph has no nodes"));
        }
        if self.max_steps == 0 {
            return Err(ResearchError::graph("max_steps must be at least 1"));
        }

        let mut entry: Option<String> = None;
        let mut outgoing: HashMap<String, Edge> = HashMap::new();

        for (from, edge) in &self.edges {
            if let PendingEdge::Fixed(to) = edge {
                if !self.exists(to) {
                    return Err(ResearchError::graph(format!(
                        "edge {} -> {} targets an unknown node",
                        from, to
                    )));
                }
            }

            match from {
                NodeId::End => {
                    return Err(ResearchError::graph("edges cannot leave the end node"));
                }
                NodeId::Start => {
                    let target = match edge {
                        PendingEdge::Fixed(NodeId::Node(name)) => name.clone(),
                        _ => {
                            return Err(ResearchError::graph(
                                "the start node needs one fixed edge to an agent",
                            ))
                        }
                    };
                    if entry.replace(target).is_some() {
                        return Err(ResearchError::graph("the start node has more than one edge"));
                    }
                }
                NodeId::Node(name) => {
                    if !self.nodes.contains_key(name) {
                        return Err(ResearchError::graph(format!(
                            "edge leaves unknown node '{}'",
                            name
                        )));
                    }
                    let compiled = match edge {
                        PendingEdge::Fixed(to) => Edge::Fixed(to.clone()),
                        PendingEdge::Conditional(table) => Edge::Conditional(table.clone()),
                    };
                    if outgoing.insert(name.clone(), compiled).is_some() {
                        return Err(ResearchError::graph(format!(
                            "node '{}' has more than one outgoing path",
                            name
                        )));
                    }
                }
            }
        }

        let entry = entry.ok_or_else(|| ResearchError::graph("graph has no entry point"))?;

        for name in self.nodes.keys() {
            if !outgoing.contains_key(name) {
                return Err(ResearchError::graph(format!(
                    "node '{}' has no outgoing edge",
                    name
                )));
            }
        }

        for (name, edge) in &outgoing {
            let route_options = self.nodes.get(name).and_then(|a| a.route_options());

            match edge {
                Edge::Fixed(to) => {
                    if route_options.is_some() {
                        return Err(ResearchError::graph(format!(
                            "routing node '{}' -> {} needs conditional edges",
                            name, to
                        )));
                    }
                }
                Edge::Conditional(table) => {
                    self.check_routing(name, table, route_options, &outgoing)?;
                }
            }
        }

        let reachable = Self::reachable_from(&entry, &outgoing);
        if let Some(orphan) = self.nodes.keys().find(|n| !reachable.contains(n.as_str())) {
            return Err(ResearchError::graph(format!(
                "node '{}' is unreachable from the entry point",
                orphan
            )));
        }

        Ok(CompiledGraph::new(
            self.nodes.into_iter().collect(),
            outgoing,
            entry,
            self.max_steps,
        ))
    }

    fn check_routing(
        &self,
        router: &str,
        table: &RoutingTable,
        route_options: Option<&[String]>,
        outgoing: &HashMap<String, Edge>,
    ) -> Result<()> {
        if table.is_empty() {
            return Err(ResearchError::graph(format!(
                "routing table for '{}' has no workers",
                router
            )));
        }

        if let Some(clash) = table.worker_names().find(|w| *w == table.finish_sentinel()) {
            return Err(ResearchError::graph(format!(
                "'{}' routes a worker named '{}', which is its finish sentinel",
                router, clash
            )));
        }

        for (worker, successor) in table.successors() {
            if !self.exists(successor) || *successor == NodeId::End {
                return Err(ResearchError::graph(format!(
                    "'{}' routes '{}' to missing node {}",
                    router, worker, successor
                )));
            }
        }

        let back_to_router = NodeId::from(router);
        for (_, successor) in table.successors() {
            let Some(worker) = successor.as_node() else {
                continue;
            };
            match outgoing.get(worker) {
                Some(Edge::Fixed(to)) if *to == back_to_router => {}
                _ => {
                    return Err(ResearchError::graph(format!(
                        "worker '{}' must have a single edge back to '{}'",
                        worker, router
                    )))
                }
            }
        }

        if let Some(options) = route_options {
            let known: HashSet<&str> = table.worker_names().collect();
            if let Some(missing) = options.iter().find(|o| !known.contains(o.as_str())) {
                return Err(ResearchError::graph(format!(
                    "'{}' may select '{}' but its routing table has no successor for it",
                    router, missing
                )));
            }
        }

        Ok(())
    }

    fn reachable_from<'a>(entry: &'a str, outgoing: &'a HashMap<String, Edge>) -> HashSet<&'a str> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([entry]);

        while let Some(node) = queue.pop_front() {
            if !seen.insert(node) {
                continue;
            }
            let successors: Vec<&NodeId> = match outgoing.get(node) {
                Some(Edge::Fixed(to)) => vec![to],
                Some(Edge::Conditional(table)) => table.successors().map(|(_, n)| n).collect(),
                None => Vec::new(),
            };
            queue.extend(successors.into_iter().filter_map(NodeId::as_node));
        }

        seen
    }
}
