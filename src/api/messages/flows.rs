//! Interactive flow messages
//!
//! Flows are referenced by ID or by name and sent either in draft mode (for
//! testing unpublished flows) or as published flows.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{OutgoingMessage, put_opt, text_block};
use crate::api::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::Result;
use crate::tools::{Endpoint, ToolRegistry};

/// Placeholder text; the client ignores header, body, footer and CTA in draft mode
const DRAFT_PLACEHOLDER: &str = "Not shown in draft mode";

const DEFAULT_FLOW_CTA: &str = "Open Flow!";

/// How a flow is identified in the message
enum FlowRef {
    Id(String),
    Name(String),
}

struct FlowParts {
    header: Option<String>,
    body: Option<String>,
    footer: Option<String>,
    cta: String,
    token: String,
    screen: Option<String>,
    data: Value,
    draft: bool,
}

fn flow_message(to: String, flow: FlowRef, parts: FlowParts) -> OutgoingMessage {
    let mut parameters = json!({
        "flow_message_version": "3",
        "flow_action": "navigate",
        "flow_token": parts.token,
        "flow_cta": parts.cta,
    });
    match flow {
        FlowRef::Id(id) => parameters["flow_id"] = json!(id),
        FlowRef::Name(name) => parameters["flow_name"] = json!(name),
    }
    if parts.draft {
        parameters["mode"] = json!("draft");
    }
    let mut payload = json!({ "data": parts.data });
    put_opt(&mut payload, "screen", parts.screen);
    parameters["flow_action_payload"] = payload;

    let mut interactive = json!({
        "type": "flow",
        "action": { "name": "flow", "parameters": parameters }
    });
    if let Some(header) = parts.header {
        interactive["header"] = json!({ "type": "text", "text": header });
    }
    put_opt(&mut interactive, "body", parts.body.map(text_block));
    put_opt(&mut interactive, "footer", parts.footer.map(text_block));

    OutgoingMessage::individual(to, "interactive", interactive)
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftFlowArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Token identifying this flow session
    #[serde(default)]
    pub flow_token: String,
    /// ID of the first screen to show
    #[serde(default)]
    pub screen_id: String,
    /// Data passed to the first screen
    #[serde(default = "empty_object")]
    pub custom_data: Value,
}

impl DraftFlowArgs {
    fn into_request(self, flow: FlowRef) -> ApiRequest {
        let parts = FlowParts {
            header: Some(DRAFT_PLACEHOLDER.to_string()),
            body: Some(DRAFT_PLACEHOLDER.to_string()),
            footer: Some(DRAFT_PLACEHOLDER.to_string()),
            cta: DRAFT_PLACEHOLDER.to_string(),
            token: self.flow_token,
            screen: Some(self.screen_id),
            data: self.custom_data,
            draft: true,
        };
        flow_message(self.recipient_phone_number, flow, parts).send_from(self.scope)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftFlowByIdArgs {
    #[serde(flatten)]
    pub draft: DraftFlowArgs,
    /// ID of the draft flow
    pub flow_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftFlowByNameArgs {
    #[serde(flatten)]
    pub draft: DraftFlowArgs,
    /// Name of the draft flow
    pub flow_name: String,
}

pub struct SendDraftFlowById;

impl Endpoint for SendDraftFlowById {
    type Args = DraftFlowByIdArgs;
    const NAME: &'static str = "send_draft_flow_by_id";
    const DESCRIPTION: &'static str = "Send a draft flow message, referenced by flow ID, via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the draft flow.";

    fn request(args: DraftFlowByIdArgs) -> Result<ApiRequest> {
        Ok(args.draft.into_request(FlowRef::Id(args.flow_id)))
    }
}

pub struct SendDraftFlowByName;

impl Endpoint for SendDraftFlowByName {
    type Args = DraftFlowByNameArgs;
    const NAME: &'static str = "send_draft_flow_by_name";
    const DESCRIPTION: &'static str = "Send a draft flow message, referenced by flow name, via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the draft flow.";

    fn request(args: DraftFlowByNameArgs) -> Result<ApiRequest> {
        Ok(args.draft.into_request(FlowRef::Name(args.flow_name)))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishedFlowByIdArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// ID of the published flow
    pub flow_id: String,
    /// Header text
    pub header_text: String,
    /// Body text
    pub body_text: String,
    /// Footer text
    pub footer_text: String,
    /// Token identifying this flow session
    pub flow_token: String,
    /// ID of the first screen to show
    pub screen_id: String,
    /// Data passed to the first screen
    #[serde(default = "empty_object")]
    pub custom_data: Value,
    /// Label of the button that opens the flow
    pub flow_cta: Option<String>,
}

pub struct SendPublishedFlowById;

impl Endpoint for SendPublishedFlowById {
    type Args = PublishedFlowByIdArgs;
    const NAME: &'static str = "send_published_flow_by_id";
    const DESCRIPTION: &'static str = "Send a published flow message, referenced by flow ID, via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the flow message.";

    fn request(args: PublishedFlowByIdArgs) -> Result<ApiRequest> {
        let parts = FlowParts {
            header: Some(args.header_text),
            body: Some(args.body_text),
            footer: Some(args.footer_text),
            cta: args.flow_cta.unwrap_or_else(|| DEFAULT_FLOW_CTA.to_string()),
            token: args.flow_token,
            screen: Some(args.screen_id),
            data: args.custom_data,
            draft: false,
        };
        Ok(flow_message(args.recipient_phone_number, FlowRef::Id(args.flow_id), parts).send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishedFlowByNameArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Name of the published flow
    pub flow_name: String,
    /// Token identifying this flow session
    pub flow_token: String,
    /// Header text
    pub header_text: Option<String>,
    /// Body text
    pub body_text: Option<String>,
    /// Footer text
    pub footer_text: Option<String>,
    /// ID of the first screen to show
    pub screen_id: Option<String>,
    /// Data passed to the first screen
    #[serde(default = "empty_object")]
    pub custom_data: Value,
    /// Label of the button that opens the flow
    pub flow_cta: Option<String>,
}

pub struct SendPublishedFlowByName;

impl Endpoint for SendPublishedFlowByName {
    type Args = PublishedFlowByNameArgs;
    const NAME: &'static str = "send_published_flow_by_name";
    const DESCRIPTION: &'static str =
        "Send a published flow message, referenced by flow name, via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the flow message.";

    fn request(args: PublishedFlowByNameArgs) -> Result<ApiRequest> {
        let parts = FlowParts {
            header: args.header_text,
            body: args.body_text,
            footer: args.footer_text,
            cta: args.flow_cta.unwrap_or_else(|| DEFAULT_FLOW_CTA.to_string()),
            token: args.flow_token,
            screen: args.screen_id,
            data: args.custom_data,
            draft: false,
        };
        Ok(flow_message(args.recipient_phone_number, FlowRef::Name(args.flow_name), parts).send_from(args.scope))
    }
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register::<SendDraftFlowById>();
    registry.register::<SendDraftFlowByName>();
    registry.register::<SendPublishedFlowById>();
    registry.register::<SendPublishedFlowByName>();
}
