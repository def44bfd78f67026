//! Tools module - capabilities a worker may invoke
//!
//! Contains the tool trait, the registry that dispatches calls, and the
//! web-search and code-execution tools.

pub mod python_repl;
pub mod registry;
pub mod web_search;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{Result, ToolCall, ToolDefinition};

pub use python_repl::PythonReplTool;
pub use registry::ToolRegistry;
pub use web_search::TavilySearchTool;

/// A text-in/text-out capability exposed to the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool
    fn name(&self) -> &str;

    /// Description shown to the model
    fn description(&self) -> &str;

    /// JSON Schema of the arguments
    fn parameters_schema(&self) -> Value;

    /// Run the tool. Failures are errors, never empty results.
    async fn execute(&self, call: &ToolCall) -> Result<String>;

    /// Function definition sent to the completion service
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters_schema())
    }
}
