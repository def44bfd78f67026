//! Web Researcher - supervisor/worker agents for market research
//!
//! A supervisor agent decides which worker acts next; a researcher worker
//! searches the web and drafts a Markdown report. Control moves through a
//! small state machine until the supervisor finishes.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Completion service abstraction with an OpenAI-compatible client
//! - **Tools**: Tool trait, registry, web search and code execution
//! - **Agent**: Conversation state, supervisor and worker agents, prompts
//! - **Graph**: Node/edge definition, validation, and the step loop
//! - **Research**: The driver that builds the graph and extracts the report
//!
//! # Usage
//!
//! ```rust,no_run
//! use web_researcher::{Config, WebResearcher};
//!
//! #[tokio::main]
//! async fn main() -> web_researcher::Result<()> {
//!     let researcher = WebResearcher::from_config(&Config::load())?;
//!     let report = researcher
//!         .perform_research("Perform market research on e-bikes in the Netherlands")
//!         .await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod core;
pub mod graph;
pub mod llm;
pub mod research;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, ConversationState, Message, Route};
pub use crate::core::{Config, ResearchError, Result};
pub use graph::{CompiledGraph, GraphBuilder, RoutingTable};
pub use research::WebResearcher;
