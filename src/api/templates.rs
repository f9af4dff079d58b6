//! Message template management (`{waba-id}/message_templates`)

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::scope::WabaScope;
use crate::client::ApiRequest;
use crate::error::{CloudError, Result};
use crate::tools::{Endpoint, ToolRegistry};

const DEFAULT_BODY: &str = "Check out this new offer";
const DEFAULT_BUTTON: &str = "Check out this offer!";
const WELCOME_SCREEN: &str = "WELCOME_SCREEN";

fn default_language() -> String {
    "en_US".to_string()
}

fn default_category() -> String {
    "MARKETING".to_string()
}

fn default_body() -> String {
    DEFAULT_BODY.to_string()
}

fn default_button() -> String {
    DEFAULT_BUTTON.to_string()
}

fn default_screen() -> String {
    WELCOME_SCREEN.to_string()
}

/// Single-screen flow used when no flow JSON is supplied
fn sample_flow_json() -> Value {
    json!({
        "version": "5.0",
        "screens": [{
            "id": WELCOME_SCREEN,
            "layout": {
                "type": "SingleColumnLayout",
                "children": [
                    { "type": "TextHeading", "text": "Hello World" },
                    { "type": "Footer", "label": "Complete", "on-click-action": { "name": "complete", "payload": {} } }
                ]
            },
            "title": "Welcome",
            "terminal": true,
            "success": true,
            "data": {}
        }]
    })
}

fn template_body(name: String, language: String, category: String, components: Vec<Value>) -> Value {
    json!({ "name": name, "language": language, "category": category, "components": components })
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// Template name (lowercase letters, digits and underscores)
    pub name: String,
    /// Template language code, e.g. en_US
    pub language: String,
    /// AUTHENTICATION, MARKETING or UTILITY
    pub category: String,
    /// HEADER, BODY, FOOTER and BUTTONS components in Cloud API format
    pub components: Vec<Value>,
}

impl CreateTemplateArgs {
    fn into_request(self) -> Result<ApiRequest> {
        if self.components.is_empty() {
            return Err(CloudError::InvalidArguments("components must not be empty".to_string()));
        }
        let body = template_body(self.name, self.language, self.category, self.components);
        Ok(self.scope.post().segment("message_templates").json(body))
    }
}

pub struct CreateMessageTemplate;

impl Endpoint for CreateMessageTemplate {
    type Args = CreateTemplateArgs;
    const NAME: &'static str = "create_message_template";
    const DESCRIPTION: &'static str = "Create a message template (header, body, footer and buttons) in WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while creating the message template.";

    fn request(args: CreateTemplateArgs) -> Result<ApiRequest> {
        args.into_request()
    }
}

pub struct CreateAuthTemplate;

impl Endpoint for CreateAuthTemplate {
    type Args = CreateTemplateArgs;
    const NAME: &'static str = "create_auth_template";
    const DESCRIPTION: &'static str =
        "Create an authentication template with an OTP one-tap autofill button on WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while creating the authentication template.";

    fn request(args: CreateTemplateArgs) -> Result<ApiRequest> {
        args.into_request()
    }
}

/// Template settings shared by the flow template tools
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowTemplateOptions {
    /// Template language code
    #[serde(default = "default_language")]
    pub language: String,
    /// Template category
    #[serde(default = "default_category")]
    pub category: String,
    /// Label of the flow button
    #[serde(default = "default_button")]
    pub button_text: String,
}

impl FlowTemplateOptions {
    fn request(self, scope: WabaScope, name: String, body_text: String, button: Value) -> ApiRequest {
        let mut button = button;
        button["type"] = json!("FLOW");
        button["text"] = json!(self.button_text);
        button["flow_action"] = json!("navigate");

        let components = vec![
            json!({ "type": "body", "text": body_text }),
            json!({ "type": "BUTTONS", "buttons": [button] }),
        ];
        let body = template_body(name, self.language, self.category, components);
        scope.post().segment("message_templates").json(body)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowTemplateByIdArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// Name of the new template
    pub template_name: String,
    /// ID of the flow the button opens
    pub flow_id: String,
    /// Screen the flow opens on
    pub screen_id: String,
    /// Body text of the template
    #[serde(default = "default_body")]
    pub body_text: String,
    #[serde(flatten)]
    pub options: FlowTemplateOptions,
}

pub struct CreateFlowTemplateMessageById;

impl Endpoint for CreateFlowTemplateMessageById {
    type Args = FlowTemplateByIdArgs;
    const NAME: &'static str = "create_flow_template_message_by_id";
    const DESCRIPTION: &'static str = "Create a flow template message, referencing the flow by ID, using the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while creating the flow template message.";

    fn request(args: FlowTemplateByIdArgs) -> Result<ApiRequest> {
        let button = json!({ "flow_id": args.flow_id, "navigate_screen": args.screen_id });
        Ok(args.options.request(args.scope, args.template_name, args.body_text, button))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowTemplateByNameArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// Name of the new template
    pub template_name: String,
    /// Name of the flow the button opens
    pub flow_name: String,
    /// Screen the flow opens on
    pub screen_id: String,
    /// Body text of the template
    #[serde(default = "default_body")]
    pub body_text: String,
    #[serde(flatten)]
    pub options: FlowTemplateOptions,
}

pub struct CreateFlowTemplateMessageByName;

impl Endpoint for CreateFlowTemplateMessageByName {
    type Args = FlowTemplateByNameArgs;
    const NAME: &'static str = "create_flow_template_message_by_name";
    const DESCRIPTION: &'static str =
        "Create a flow template message, referencing the flow by name, using the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while creating the flow template message.";

    fn request(args: FlowTemplateByNameArgs) -> Result<ApiRequest> {
        let button = json!({ "flow_name": args.flow_name, "navigate_screen": args.screen_id });
        Ok(args.options.request(args.scope, args.template_name, args.body_text, button))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowTemplateByJsonArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// Name of the new template
    pub template_name: String,
    /// Body text of the template
    pub body_text: String,
    /// Flow JSON (object or string); a one-screen sample flow is used when omitted
    pub flow_json: Option<Value>,
    /// Screen the flow opens on
    #[serde(default = "default_screen")]
    pub screen_id: String,
    #[serde(flatten)]
    pub options: FlowTemplateOptions,
}

pub struct CreateFlowTemplateMessageByJson;

impl Endpoint for CreateFlowTemplateMessageByJson {
    type Args = FlowTemplateByJsonArgs;
    const NAME: &'static str = "create_flow_template_message_by_json";
    const DESCRIPTION: &'static str = "Create a flow template message with inline flow JSON using the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while creating the flow template message.";

    fn request(args: FlowTemplateByJsonArgs) -> Result<ApiRequest> {
        // The API expects the flow JSON as a string
        let flow_json = match args.flow_json {
            Some(Value::String(s)) => s,
            Some(other) => serde_json::to_string(&other)?,
            None => serde_json::to_string(&sample_flow_json())?,
        };
        let button = json!({ "flow_json": flow_json, "navigate_screen": args.screen_id });
        Ok(args.options.request(args.scope, args.template_name, args.body_text, button))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTemplateArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// ID of the template to delete
    #[serde(alias = "hsm_id")]
    pub hsm_id: String,
    /// Name of the template to delete
    pub name: String,
}

pub struct DeleteTemplateById;

impl Endpoint for DeleteTemplateById {
    type Args = DeleteTemplateArgs;
    const NAME: &'static str = "delete_template_by_id";
    const DESCRIPTION: &'static str = "Delete a message template by its ID in the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while deleting the message template.";

    fn request(args: DeleteTemplateArgs) -> Result<ApiRequest> {
        Ok(args
            .scope
            .delete()
            .segment("message_templates")
            .query("hsm_id", args.hsm_id)
            .query("name", args.name))
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register::<CreateMessageTemplate>();
    registry.register::<CreateAuthTemplate>();
    registry.register::<CreateFlowTemplateMessageById>();
    registry.register::<CreateFlowTemplateMessageByName>();
    registry.register::<CreateFlowTemplateMessageByJson>();
    registry.register::<DeleteTemplateById>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::EndpointTool;
    use reqwest::Method;

    #[test]
    fn test_create_message_template() {
        let req = EndpointTool::<CreateMessageTemplate>::prepare(json!({
            "wabaId": "waba-1",
            "name": "seasonal_promo",
            "language": "en_US",
            "category": "MARKETING",
            "components": [{"type": "BODY", "text": "Hi"}]
        }))
        .unwrap();

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path(), "waba-1/message_templates");
        assert_eq!(req.json_body().unwrap()["components"][0]["text"], "Hi");
    }

    #[test]
    fn test_create_template_requires_components() {
        let result = EndpointTool::<CreateAuthTemplate>::prepare(json!({
            "wabaId": "waba-1",
            "name": "otp",
            "language": "en_US",
            "category": "AUTHENTICATION",
            "components": []
        }));
        assert!(matches!(result, Err(CloudError::InvalidArguments(_))));
    }

    #[test]
    fn test_flow_template_by_id_defaults() {
        let req = EndpointTool::<CreateFlowTemplateMessageById>::prepare(json!({
            "wabaId": "waba-1",
            "templateName": "offer",
            "flowId": "flow-1",
            "screenId": "START"
        }))
        .unwrap();

        let body = req.json_body().unwrap();
        assert_eq!(body["language"], "en_US");
        assert_eq!(body["category"], "MARKETING");
        assert_eq!(body["components"][0], json!({"type": "body", "text": DEFAULT_BODY}));
        assert_eq!(
            body["components"][1]["buttons"][0],
            json!({
                "type": "FLOW",
                "text": DEFAULT_BUTTON,
                "flow_id": "flow-1",
                "navigate_screen": "START",
                "flow_action": "navigate"
            })
        );
    }

    #[test]
    fn test_flow_template_by_name() {
        let req = EndpointTool::<CreateFlowTemplateMessageByName>::prepare(json!({
            "wabaId": "waba-1",
            "templateName": "offer",
            "flowName": "signup",
            "screenId": "START",
            "category": "UTILITY"
        }))
        .unwrap();

        let body = req.json_body().unwrap();
        assert_eq!(body["category"], "UTILITY");
        assert_eq!(body["components"][1]["buttons"][0]["flow_name"], "signup");
    }

    #[test]
    fn test_flow_template_by_json_sample() {
        let req = EndpointTool::<CreateFlowTemplateMessageByJson>::prepare(json!({
            "wabaId": "waba-1",
            "templateName": "offer",
            "bodyText": "Try it"
        }))
        .unwrap();

        let button = &req.json_body().unwrap()["components"][1]["buttons"][0];
        assert_eq!(button["navigate_screen"], WELCOME_SCREEN);
        let flow: Value = serde_json::from_str(button["flow_json"].as_str().unwrap()).unwrap();
        assert_eq!(flow["screens"][0]["id"], WELCOME_SCREEN);
    }

    #[test]
    fn test_flow_template_by_json_object_is_stringified() {
        let req = EndpointTool::<CreateFlowTemplateMessageByJson>::prepare(json!({
            "wabaId": "waba-1",
            "templateName": "offer",
            "bodyText": "Try it",
            "flowJson": {"version": "6.0", "screens": []},
            "screenId": "FIRST"
        }))
        .unwrap();

        let button = &req.json_body().unwrap()["components"][1]["buttons"][0];
        assert!(button["flow_json"].is_string());
        assert_eq!(button["navigate_screen"], "FIRST");
    }

    #[test]
    fn test_delete_template_query() {
        let req = EndpointTool::<DeleteTemplateById>::prepare(json!({
            "wabaId": "waba-1",
            "hsmId": "123",
            "name": "old_template"
        }))
        .unwrap();

        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.path(), "waba-1/message_templates");
        assert_eq!(req.query_value("hsm_id"), Some("123"));
        assert_eq!(req.query_value("name"), Some("old_template"));
    }

    #[test]
    fn test_delete_template_accepts_snake_case_id() {
        let req = EndpointTool::<DeleteTemplateById>::prepare(json!({
            "wabaId": "waba-1",
            "hsm_id": "456",
            "name": "old_template"
        }))
        .unwrap();

        assert_eq!(req.query_value("hsm_id"), Some("456"));
    }
}
