//! Code execution tool
//!
//! Runs a Python snippet in a fresh interpreter and returns what it printed.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::process::Command;

use super::Tool;
use crate::core::{Config, ResearchError, Result, ToolCall};

/// Executes python code with `<python> -c <code>`
pub struct PythonReplTool {
    python_bin: String,
    timeout: Duration,
}

impl PythonReplTool {
    /// Create a tool using the given interpreter
    pub fn new(python_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python_bin: python_bin.into(),
            timeout,
        }
    }

    /// Create a tool from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.agent.python_bin.clone(),
            Duration::from_secs(config.agent.code_timeout_secs),
        )
    }
}

impl Default for PythonReplTool {
    fn default() -> Self {
        Self::new("python3", Duration::from_secs(60))
    }
}

#[async_trait]
impl Tool for PythonReplTool {
    fn name(&self) -> &str {
        "python_repl"
    }

    fn description(&self) -> &str {
        "A Python shell. Use this to execute python commands. Input should be valid python. \
         If you want to see the output of a value, print it with `print(...)`."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Python source to execute"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> Result<String> {
        let code = call
            .get_string("code")
            .ok_or_else(|| ResearchError::tool("Missing 'code' argument"))?;

        let child = Command::new(&self.python_bin)
            .arg("-c")
            .arg(&code)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| {
                ResearchError::tool(format!(
                    "Code execution timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ResearchError::tool(format!("Failed to start {}: {}", self.python_bin, e)))?;

        if !output.status.success() {
            return Err(ResearchError::tool(format!(
                "Code exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
