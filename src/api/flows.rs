//! Flow lifecycle: create, inspect, update, publish, retire, and endpoint health metrics

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use super::messages::put_opt;
use super::scope::{FlowScope, WabaScope};
use crate::client::{ApiRequest, FormPart};
use crate::error::{CloudError, Result};
use crate::tools::{Endpoint, ToolRegistry};

const FLOW_FIELDS: &str = "id,name,categories,preview,status,validation_errors,json_version,\
data_api_version,data_channel_uri,health_status,whatsapp_business_account,application";

const METRIC_SINCE: &str = "2024-01-28";
const METRIC_UNTIL: &str = "2024-01-30";

fn non_empty_categories(categories: &[String]) -> Result<()> {
    if categories.is_empty() {
        return Err(CloudError::InvalidArguments(
            "at least one flow category is required".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlowArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// Name of the flow
    pub name: String,
    /// Flow categories such as SIGN_UP, APPOINTMENT_BOOKING or OTHER; at least one
    pub categories: Vec<String>,
    /// ID of an existing flow to clone
    pub clone_flow_id: Option<String>,
    /// Data exchange endpoint URI
    pub endpoint_uri: Option<String>,
}

pub struct CreateFlow;

impl Endpoint for CreateFlow {
    type Args = CreateFlowArgs;
    const NAME: &'static str = "create_flow";
    const DESCRIPTION: &'static str = "Create a new flow in the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while creating the flow.";

    fn request(args: CreateFlowArgs) -> Result<ApiRequest> {
        non_empty_categories(&args.categories)?;
        let mut body = json!({ "name": args.name, "categories": args.categories });
        put_opt(&mut body, "clone_flow_id", args.clone_flow_id);
        put_opt(&mut body, "endpoint_uri", args.endpoint_uri);
        Ok(args.scope.post().segment("flows").json(body))
    }
}

pub struct ListFlows;

impl Endpoint for ListFlows {
    type Args = WabaScope;
    const NAME: &'static str = "list_flows";
    const DESCRIPTION: &'static str = "List flows for a specific WhatsApp Business Account (WABA).";
    const FAILURE: &'static str = "An error occurred while listing flows.";

    fn request(scope: WabaScope) -> Result<ApiRequest> {
        Ok(scope.get().segment("flows"))
    }
}

pub struct GetFlow;

impl Endpoint for GetFlow {
    type Args = FlowScope;
    const NAME: &'static str = "get_flow";
    const DESCRIPTION: &'static str = "Retrieve a specific flow, with status, validation errors and health, from the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while retrieving the flow.";

    fn request(scope: FlowScope) -> Result<ApiRequest> {
        Ok(scope.get().query("fields", FLOW_FIELDS))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewUrlArgs {
    #[serde(flatten)]
    pub scope: FlowScope,
    /// Generate a new preview link and expire the old one
    #[serde(default)]
    pub invalidate: bool,
}

pub struct GetPreviewUrl;

impl Endpoint for GetPreviewUrl {
    type Args = PreviewUrlArgs;
    const NAME: &'static str = "get_preview_url";
    const DESCRIPTION: &'static str = "Get the preview URL for a WhatsApp flow.";
    const FAILURE: &'static str = "An error occurred while getting the preview URL.";

    fn request(args: PreviewUrlArgs) -> Result<ApiRequest> {
        Ok(args
            .scope
            .get()
            .query("fields", format!("preview.invalidate({})", args.invalidate)))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlowMetadataArgs {
    #[serde(flatten)]
    pub scope: FlowScope,
    /// New name for the flow
    pub name: Option<String>,
    /// New flow categories
    pub categories: Option<Vec<String>>,
    /// New data exchange endpoint URI
    pub endpoint_uri: Option<String>,
}

pub struct UpdateFlowMetadata;

impl Endpoint for UpdateFlowMetadata {
    type Args = UpdateFlowMetadataArgs;
    const NAME: &'static str = "update_flow_metadata";
    const DESCRIPTION: &'static str = "Update flow metadata (name, categories, endpoint URI) in the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while updating flow metadata.";

    fn request(args: UpdateFlowMetadataArgs) -> Result<ApiRequest> {
        if args.name.is_none() && args.categories.is_none() && args.endpoint_uri.is_none() {
            return Err(CloudError::InvalidArguments(
                "nothing to update: set name, categories or endpointUri".to_string(),
            ));
        }
        if let Some(categories) = &args.categories {
            non_empty_categories(categories)?;
        }
        let mut body = json!({});
        put_opt(&mut body, "name", args.name);
        put_opt(&mut body, "categories", args.categories);
        put_opt(&mut body, "endpoint_uri", args.endpoint_uri);
        Ok(args.scope.post().json(body))
    }
}

fn default_asset_name() -> String {
    "flow.json".to_string()
}

fn default_asset_type() -> String {
    "FLOW_JSON".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlowJsonArgs {
    #[serde(flatten)]
    pub scope: FlowScope,
    /// Local path of the flow JSON file to upload
    pub file_path: PathBuf,
    /// Asset name
    #[serde(default = "default_asset_name")]
    pub name: String,
    /// Asset type
    #[serde(default = "default_asset_type")]
    pub asset_type: String,
}

pub struct UpdateFlowJson;

impl Endpoint for UpdateFlowJson {
    type Args = UpdateFlowJsonArgs;
    const NAME: &'static str = "update_flow_json";
    const DESCRIPTION: &'static str = "Upload a flow JSON file to the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while uploading the flow JSON.";

    fn request(args: UpdateFlowJsonArgs) -> Result<ApiRequest> {
        let parts = vec![
            FormPart::file("file", args.file_path, Some("application/json".to_string())),
            FormPart::text("name", args.name),
            FormPart::text("asset_type", args.asset_type),
        ];
        Ok(args.scope.post().segment("assets").multipart(parts))
    }
}

/// Flow operations that take nothing but the flow ID
macro_rules! flow_action {
    ($ty:ident, $name:literal, $method:ident, $segment:expr, $desc:literal, $failure:literal) => {
        pub struct $ty;

        impl Endpoint for $ty {
            type Args = FlowScope;
            const NAME: &'static str = $name;
            const DESCRIPTION: &'static str = $desc;
            const FAILURE: &'static str = $failure;

            fn request(scope: FlowScope) -> Result<ApiRequest> {
                let req = scope.$method();
                Ok(match $segment {
                    Some(segment) => req.segment(segment),
                    None => req,
                })
            }
        }
    };
}

flow_action!(
    ListAssets,
    "list_assets",
    get,
    Some("assets"),
    "List assets attached to a flow, including the flow JSON download URL.",
    "An error occurred while listing assets."
);
flow_action!(
    PublishFlow,
    "publish_flow",
    post,
    Some("publish"),
    "Publish a flow in the WhatsApp Cloud API.",
    "An error occurred while publishing the flow."
);
flow_action!(
    DeprecateFlow,
    "deprecate_flow",
    post,
    Some("deprecate"),
    "Deprecate a published flow in the WhatsApp Cloud API.",
    "An error occurred while deprecating the flow."
);
flow_action!(
    DeleteFlow,
    "delete_flow",
    delete,
    None::<&str>,
    "Delete a draft flow in the WhatsApp Cloud API.",
    "An error occurred while deleting the flow."
);

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrateFlowsArgs {
    /// Destination WABA
    #[serde(flatten)]
    pub scope: WabaScope,
    /// ID of the WABA the flows are copied from
    pub source_waba_id: String,
    /// Names of the flows to copy; all flows when omitted
    pub source_flow_names: Option<Vec<String>>,
}

pub struct MigrateFlows;

impl Endpoint for MigrateFlows {
    type Args = MigrateFlowsArgs;
    const NAME: &'static str = "migrate_flows";
    const DESCRIPTION: &'static str = "Migrate flows from a source WABA to a destination WABA.";
    const FAILURE: &'static str = "An error occurred while migrating flows.";

    fn request(args: MigrateFlowsArgs) -> Result<ApiRequest> {
        let mut body = json!({ "source_waba_id": args.source_waba_id });
        put_opt(&mut body, "source_flow_names", args.source_flow_names);
        Ok(args.scope.post().segment("migrate_flows").json(body))
    }
}

fn metric_field(metric: &str, granularity: &str, since: &str, until: &str) -> String {
    format!("metric.name({metric}).granularity({granularity}).since({since}).until({until})")
}

fn default_since() -> String {
    METRIC_SINCE.to_string()
}

fn default_until() -> String {
    METRIC_UNTIL.to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricWindowArgs {
    #[serde(flatten)]
    pub scope: FlowScope,
    /// Start date (YYYY-MM-DD)
    #[serde(default = "default_since")]
    pub since: String,
    /// End date (YYYY-MM-DD)
    #[serde(default = "default_until")]
    pub until: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequiredMetricWindowArgs {
    #[serde(flatten)]
    pub scope: FlowScope,
    /// Start date (YYYY-MM-DD)
    pub since: String,
    /// End date (YYYY-MM-DD)
    pub until: String,
}

pub struct GetEndpointRequestErrorMetric;

impl Endpoint for GetEndpointRequestErrorMetric {
    type Args = RequiredMetricWindowArgs;
    const NAME: &'static str = "get_endpoint_request_error_metric";
    const DESCRIPTION: &'static str = "Get the daily endpoint request error metric for a flow.";
    const FAILURE: &'static str = "An error occurred while getting the endpoint request error metric.";

    fn request(args: RequiredMetricWindowArgs) -> Result<ApiRequest> {
        let field = metric_field("ENDPOINT_REQUEST_ERROR", "DAY", &args.since, &args.until);
        Ok(args.scope.get().query("fields", field))
    }
}

macro_rules! metric_endpoint {
    ($ty:ident, $name:literal, $metric:literal, $granularity:literal, $desc:literal, $failure:literal) => {
        pub struct $ty;

        impl Endpoint for $ty {
            type Args = MetricWindowArgs;
            const NAME: &'static str = $name;
            const DESCRIPTION: &'static str = $desc;
            const FAILURE: &'static str = $failure;

            fn request(args: MetricWindowArgs) -> Result<ApiRequest> {
                let field = metric_field($metric, $granularity, &args.since, &args.until);
                Ok(args.scope.get().query("fields", field))
            }
        }
    };
}

metric_endpoint!(
    GetEndpointRequestErrorRateMetric,
    "get_endpoint_request_error_rate_metric",
    "ENDPOINT_REQUEST_ERROR_RATE",
    "LIFETIME",
    "Get the lifetime endpoint request error rate metric for a flow.",
    "An error occurred while fetching the metric."
);
metric_endpoint!(
    GetEndpointRequestLatenciesMetric,
    "get_endpoint_request_latencies_metric",
    "ENDPOINT_REQUEST_LATENCY_SECONDS_CEIL",
    "DAY",
    "Get the daily endpoint request latencies metric for a flow.",
    "An error occurred while getting endpoint request latencies metric."
);
metric_endpoint!(
    GetEndpointAvailabilityMetric,
    "get_endpoint_availability_metric",
    "ENDPOINT_AVAILABILITY",
    "DAY",
    "Get the daily endpoint availability metric for a flow.",
    "An error occurred while getting the endpoint availability metric."
);

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register::<CreateFlow>();
    registry.register::<ListFlows>();
    registry.register::<GetFlow>();
    registry.register::<GetPreviewUrl>();
    registry.register::<UpdateFlowMetadata>();
    registry.register::<UpdateFlowJson>();
    registry.register::<ListAssets>();
    registry.register::<PublishFlow>();
    registry.register::<DeprecateFlow>();
    registry.register::<DeleteFlow>();
    registry.register::<MigrateFlows>();
    registry.register::<GetEndpointRequestErrorMetric>();
    registry.register::<GetEndpointRequestErrorRateMetric>();
    registry.register::<GetEndpointRequestLatenciesMetric>();
    registry.register::<GetEndpointAvailabilityMetric>();
}
