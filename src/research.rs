//! Research driver
//!
//! Wires the supervisor, the researcher and their tools into a graph, runs it
//! for one question and pulls the report out of the transcript.

use std::sync::Arc;

use tracing::info;

use crate::agent::prompts::RESEARCHER_SYSTEM;
use crate::agent::{ConversationState, RouterAgent, WorkerAgent};
use crate::core::{Config, ResearchError, Result};
use crate::graph::{CompiledGraph, GraphBuilder, RoutingTable, START};
use crate::llm::{LLMProvider, OpenAIClient};
use crate::tools::{PythonReplTool, TavilySearchTool, ToolRegistry};

/// Node name of the supervisor
pub const SUPERVISOR: &str = "supervisor";
/// Node name of the research worker
pub const RESEARCHER: &str = "Researcher";

/// Position of the report in a finished single-worker transcript
const REPORT_INDEX: usize = 1;

/// Runs the supervisor/researcher graph for research questions
#[derive(Clone)]
pub struct WebResearcher {
    graph: Arc<CompiledGraph>,
}

impl WebResearcher {
    /// Build the standard graph against the configured services
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let llm: Arc<dyn LLMProvider> = Arc::new(OpenAIClient::from_config(config)?);

        let search = TavilySearchTool::from_config(config)?;
        let mut tools = ToolRegistry::new().with_tool(Arc::new(search));
        if config.agent.code_execution {
            tools.register(Arc::new(PythonReplTool::from_config(config)));
        }

        let graph = build_graph(llm, Arc::new(tools), config)?;
        Ok(Self::with_graph(Arc::new(graph)))
    }

    /// Use an already compiled graph
    pub fn with_graph(graph: Arc<CompiledGraph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &CompiledGraph {
        &self.graph
    }

    /// Run the graph for `question` and return the whole transcript
    pub async fn run(&self, question: &str) -> Result<ConversationState> {
        info!(entry = self.graph.entry(), "Starting research run");
        self.graph.invoke(ConversationState::seed(question)).await
    }

    /// Run the graph for `question` and return the report text
    pub async fn perform_research(&self, question: &str) -> Result<String> {
        let transcript = self.run(question).await?;
        report_from_transcript(&transcript).map(str::to_string)
    }
}

/// Assemble the supervisor/researcher graph
pub fn build_graph(
    llm: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
    config: &Config,
) -> Result<CompiledGraph> {
    let table = RoutingTable::new([RESEARCHER]);

    let supervisor = RouterAgent::new(
        SUPERVISOR,
        llm.clone(),
        config.models.supervisor.clone(),
        &table,
    );

    let researcher = WorkerAgent::builder(RESEARCHER)
        .instruction(RESEARCHER_SYSTEM.text())
        .llm(llm)
        .model(config.models.researcher.clone())
        .tools(tools)
        .max_iterations(config.agent.max_iterations)
        .build()?;

    GraphBuilder::new()
        .add_node(Arc::new(supervisor))
        .add_node(Arc::new(researcher))
        .add_edge(RESEARCHER, SUPERVISOR)
        .add_conditional_edges(SUPERVISOR, table)
        .add_edge(START, SUPERVISOR)
        .max_steps(config.agent.max_steps)
        .compile()
}

/// The report is the first worker output, the message right after the
/// question. Runs where the supervisor finished first have none.
pub fn report_from_transcript(transcript: &ConversationState) -> Result<&str> {
    transcript
        .messages()
        .get(REPORT_INDEX)
        .map(|m| m.content())
        .ok_or(ResearchError::MissingReport {
            messages: transcript.len(),
        })
}
