//! Error types for the research pipeline
//!
//! One error enum covers graph construction, routing, agent invocation and the
//! external collaborators behind them.

use thiserror::Error;

/// Main error type for research operations
#[derive(Error, Debug)]
pub enum ResearchError {
    /// The supervisor selected a value outside its closed set of options
    #[error("Routing contract violation: '{value}' is not one of [{}]", .allowed.join(", "))]
    RoutingContractViolation { value: String, allowed: Vec<String> },

    /// A node's agent failed while running
    #[error("Agent '{agent}' failed: {source}")]
    AgentInvocation {
        agent: String,
        #[source]
        source: Box<ResearchError>,
    },

    /// The graph definition is inconsistent
    #[error("Graph configuration error: {0}")]
    GraphConfiguration(String),

    /// The run exceeded the configured number of graph steps
    #[error("Graph step limit of {0} reached without the supervisor finishing")]
    StepLimitExceeded(usize),

    /// A worker's tool loop ran out of iterations
    #[error("Agent '{agent}' stopped after {max} iterations without a final answer")]
    IterationLimit { agent: String, max: usize },

    /// The finished transcript does not contain a worker report
    #[error("No report in transcript ({messages} message(s)); the supervisor finished before any worker ran")]
    MissingReport { messages: usize },

    /// Completion service errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    Tool(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for research operations
pub type Result<T> = std::result::Result<T, ResearchError>;

impl ResearchError {
    /// Create a completion service error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::Tool(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a graph configuration error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::GraphConfiguration(msg.into())
    }

    /// Attribute a failure to the node that raised it.
    ///
    /// Routing violations and failures that already carry a node name pass
    /// through unchanged.
    pub fn in_agent(self, agent: impl Into<String>) -> Self {
        match self {
            err @ (Self::RoutingContractViolation { .. } | Self::AgentInvocation { .. }) => err,
            other => Self::AgentInvocation {
                agent: agent.into(),
                source: Box::new(other),
            },
        }
    }

    /// Whether this is (or wraps) a routing contract violation
    pub fn is_routing_violation(&self) -> bool {
        matches!(self, Self::RoutingContractViolation { .. })
    }

    /// Whether a collaborator failed inside a node
    pub fn is_invocation_failure(&self) -> bool {
        matches!(self, Self::AgentInvocation { .. })
    }
}
