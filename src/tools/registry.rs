//! Tool registry - owns every tool and dispatches calls by name

use std::collections::BTreeMap;

use super::{Endpoint, EndpointTool, Tool, ToolCall, ToolDefinition, ToolOutcome};
use crate::client::GraphClient;
use crate::error::CloudError;

const UNKNOWN_TOOL: &str = "The requested tool is not available.";

/// Name-indexed set of tools
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with every Cloud API endpoint
    pub fn standard() -> Self {
        let mut registry = Self::new();
        crate::api::register_all(&mut registry);
        registry
    }

    /// Create an empty registry (for custom tool sets)
    pub fn new() -> Self {
        Self { tools: BTreeMap::new() }
    }

    /// Add a tool, replacing any tool with the same name
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name();
        if self.tools.insert(name, tool).is_some() {
            log::warn!("Tool {} registered twice; keeping the later one", name);
        }
    }

    /// Register an endpoint through the generic adapter
    pub fn register<E: Endpoint>(&mut self) {
        self.add_tool(Box::new(EndpointTool::<E>::new()));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Sorted tool names
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions for every tool, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Definitions for specific tool names; unknown names are skipped
    pub fn definitions_for(&self, tool_names: &[&str]) -> Vec<ToolDefinition> {
        tool_names
            .iter()
            .filter_map(|name| self.tools.get(*name))
            .map(|t| t.definition())
            .collect()
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall, client: &GraphClient) -> ToolOutcome {
        match self.tools.get(call.name.as_str()) {
            Some(tool) => tool.execute(call.arguments.clone(), client).await,
            None => {
                log::error!("Unknown tool: {}", call.name);
                ToolOutcome::failure(UNKNOWN_TOOL, CloudError::UnknownTool(call.name.clone()))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::client::ClientConfig;
    use serde_json::json;

    #[test]
    fn test_standard_registry_has_core_tools() {
        let registry = ToolRegistry::standard();

        assert!(registry.has_tool("send_text_message"));
        assert!(registry.has_tool("create_qr_code"));
        assert!(registry.has_tool("register_phone_number"));
        assert!(registry.has_tool("upload_image"));
        assert!(registry.has_tool("download_media"));
        assert!(registry.has_tool("get_flow"));
        assert!(registry.has_tool("get_conversation_analytics"));
        assert!(!registry.has_tool("register_phone"));
    }

    #[test]
    fn test_standard_registry_size() {
        let registry = ToolRegistry::standard();
        assert!(registry.len() >= 110, "only {} tools registered", registry.len());
    }

    #[test]
    fn test_tool_names_sorted_and_unique() {
        let registry = ToolRegistry::standard();
        let names = registry.tool_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_every_required_field_is_declared() {
        for def in ToolRegistry::standard().definitions() {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
            assert!(def.parameters["properties"].is_object(), "{}", def.name);
            for required in def.required() {
                assert!(def.has_property(required), "{} requires undeclared {}", def.name, required);
            }
            assert!(!def.description.is_empty(), "{}", def.name);
        }
    }

    #[test]
    fn test_definitions_for_subset() {
        let registry = ToolRegistry::standard();
        let defs = registry.definitions_for(&["get_flow", "nope", "list_flows"]);
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["get_flow", "list_flows"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("get_flow").is_none());
        assert!(registry.definitions().is_empty());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let client = GraphClient::with_token("t", &ClientConfig::default()).unwrap();
        let outcome = ToolRegistry::new()
            .execute(&ToolCall::new("nonexistent", json!({})), &client)
            .await;

        assert!(matches!(outcome.error(), Some(CloudError::UnknownTool(n)) if n == "nonexistent"));
        assert_eq!(outcome.into_json(), json!({"error": UNKNOWN_TOOL}));
    }
}
