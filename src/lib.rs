//! wacloud - WhatsApp Cloud API endpoints as agent-callable tools
//!
//! Every endpoint is a tool: a JSON-schema definition an agent can be shown,
//! plus an async function that turns validated arguments into one Graph API
//! request. Successful calls return the API's JSON untouched; failures return
//! a fixed `{"error": ...}` object per tool.

pub mod api;
pub mod client;
pub mod error;
pub mod tools;

pub use client::{ClientConfig, GraphClient};
pub use error::{CloudError, Result};
pub use tools::{Tool, ToolCall, ToolDefinition, ToolOutcome, ToolRegistry};
