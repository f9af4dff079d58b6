//! Generic endpoint adapter
//!
//! Each Cloud API endpoint implements `Endpoint`: a typed argument struct and
//! a pure function turning those arguments into an `ApiRequest`.
//! `EndpointTool<E>` wraps any endpoint as a dynamically dispatched `Tool`.

use std::marker::PhantomData;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{Tool, ToolOutcome};
use crate::client::{ApiRequest, GraphClient};
use crate::error::{CloudError, Result};

/// One Cloud API endpoint
pub trait Endpoint: Send + Sync + 'static {
    /// Arguments accepted by the tool; the schema is derived from this type
    type Args: DeserializeOwned + JsonSchema + Send;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    /// Message returned to the agent when the call fails
    const FAILURE: &'static str;

    /// Build the HTTP request. Must not perform IO.
    fn request(args: Self::Args) -> Result<ApiRequest>;
}

/// Adapter exposing an `Endpoint` through the `Tool` trait
pub struct EndpointTool<E>(PhantomData<fn() -> E>);

impl<E: Endpoint> EndpointTool<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    /// Validate arguments and build the request without sending it
    pub fn prepare(input: Value) -> Result<ApiRequest> {
        E::request(parse_args::<E::Args>(input)?)
    }
}

impl<E: Endpoint> Default for EndpointTool<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Endpoint> Tool for EndpointTool<E> {
    fn name(&self) -> &'static str {
        E::NAME
    }

    fn description(&self) -> &'static str {
        E::DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema_for::<E::Args>()
    }

    async fn execute(&self, input: Value, client: &GraphClient) -> ToolOutcome {
        let result = match Self::prepare(input) {
            Ok(request) => client.send(request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => ToolOutcome::Success(response),
            Err(e) => {
                log::error!("{} failed: {}", E::NAME, e);
                ToolOutcome::failure(E::FAILURE, e)
            }
        }
    }
}

/// Deserialize tool arguments; `null` is treated as an empty object
pub fn parse_args<T: DeserializeOwned>(input: Value) -> Result<T> {
    let input = if input.is_null() { Value::Object(Map::new()) } else { input };
    serde_json::from_value(input).map_err(|e| CloudError::InvalidArguments(e.to_string()))
}

/// Self-contained draft-07 object schema for a parameter type
pub fn schema_for<T: JsonSchema>() -> Value {
    let settings = schemars::generate::SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
    });
    let schema = settings.into_generator().into_root_schema_for::<T>();
    let mut value = serde_json::to_value(&schema).unwrap_or_default();

    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        obj.entry("type").or_insert_with(|| Value::String("object".to_string()));
        obj.entry("properties").or_insert_with(|| Value::Object(Map::new()));
        obj.entry("required").or_insert_with(|| Value::Array(Vec::new()));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use serde::Deserialize;
    use serde_json::json;

    /// Arguments for the probe endpoint
    #[derive(Debug, Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct ProbeArgs {
        /// Object to fetch
        object_id: String,
        /// Optional field list
        fields: Option<String>,
    }

    struct Probe;

    impl Endpoint for Probe {
        type Args = ProbeArgs;
        const NAME: &'static str = "probe";
        const DESCRIPTION: &'static str = "Fetch an object";
        const FAILURE: &'static str = "An error occurred while probing.";

        fn request(args: ProbeArgs) -> Result<ApiRequest> {
            Ok(ApiRequest::get().segment(args.object_id).query_opt("fields", args.fields))
        }
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    struct NoArgs {}

    #[test]
    fn test_schema_for_properties_and_required() {
        let schema = schema_for::<ProbeArgs>();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("title").is_none());
        assert_eq!(schema["properties"]["objectId"]["type"], "string");
        assert_eq!(schema["properties"]["objectId"]["description"], "Object to fetch");
        assert_eq!(schema["required"], json!(["objectId"]));
    }

    #[test]
    fn test_schema_for_empty_args() {
        let schema = schema_for::<NoArgs>();
        assert!(schema["properties"].is_object());
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn test_parse_args_null_is_empty_object() {
        let args: NoArgs = parse_args(Value::Null).unwrap();
        let _ = args;
    }

    #[test]
    fn test_parse_args_missing_required() {
        let err = parse_args::<ProbeArgs>(json!({"fields": "id"})).unwrap_err();
        assert!(matches!(err, CloudError::InvalidArguments(_)));
        assert!(err.to_string().contains("objectId"));
    }

    #[test]
    fn test_parse_args_wrong_type() {
        let err = parse_args::<ProbeArgs>(json!({"objectId": 5})).unwrap_err();
        assert!(matches!(err, CloudError::InvalidArguments(_)));
    }

    #[test]
    fn test_prepare_builds_request() {
        let req = EndpointTool::<Probe>::prepare(json!({"objectId": "7", "fields": "id"})).unwrap();
        assert_eq!(req.path(), "7");
        assert_eq!(req.query_value("fields"), Some("id"));
    }

    #[test]
    fn test_tool_metadata() {
        let tool = EndpointTool::<Probe>::new();
        let def = tool.definition();
        assert_eq!(def.name, "probe");
        assert_eq!(def.description, "Fetch an object");
        assert_eq!(def.required(), vec!["objectId"]);
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_network() {
        // Unroutable base URL: a request attempt would surface as Network, not InvalidArguments
        let config = ClientConfig::with_base_url("http://127.0.0.1:9");
        let client = GraphClient::with_token("t", &config).unwrap();
        let outcome = EndpointTool::<Probe>::new().execute(json!({}), &client).await;

        assert!(matches!(outcome.error(), Some(CloudError::InvalidArguments(_))));
        assert_eq!(outcome.into_json(), json!({"error": "An error occurred while probing."}));
    }
}
