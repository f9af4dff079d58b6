//! Tool system for agent frameworks
//!
//! Every Cloud API endpoint is exposed as a `Tool`: a static definition the
//! agent reads, plus an `execute` that performs one HTTP call. Failures are
//! returned as data, never raised.

mod endpoint;
mod registry;

pub use endpoint::{Endpoint, EndpointTool, parse_args, schema_for};
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::client::{ApiResponse, GraphClient};
use crate::error::CloudError;

/// A tool that can be called by an agent
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the function name the agent calls)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.input_schema(),
        }
    }

    /// Execute the tool against the Cloud API
    async fn execute(&self, input: Value, client: &GraphClient) -> ToolOutcome;
}

/// Tool definition handed to the agent framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Convert to the function-calling schema format
    pub fn to_function_schema(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }

    /// Names listed in the schema's `required` array
    pub fn required(&self) -> Vec<&str> {
        self.parameters["required"]
            .as_array()
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.parameters["properties"].get(name).is_some()
    }
}

/// A call requested by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Failure details kept for Rust callers
#[derive(Debug)]
pub struct ToolFailure {
    /// Static message shown to the agent
    pub message: &'static str,
    pub error: CloudError,
}

/// Result of one tool invocation
#[derive(Debug)]
pub enum ToolOutcome {
    Success(ApiResponse),
    Failure(ToolFailure),
}

impl ToolOutcome {
    pub fn failure(message: &'static str, error: CloudError) -> Self {
        Self::Failure(ToolFailure { message, error })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Underlying error, if the call failed
    pub fn error(&self) -> Option<&CloudError> {
        match self {
            Self::Failure(f) => Some(&f.error),
            Self::Success(_) => None,
        }
    }

    /// Render the agent-facing JSON: upstream body, or `{"error": message}`
    pub fn into_json(self) -> Value {
        match self {
            Self::Success(response) => response.into_json(),
            Self::Failure(failure) => json!({ "error": failure.message }),
        }
    }
}
