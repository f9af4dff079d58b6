//! Template messages
//!
//! Sends of approved message templates, including the platform's sample
//! templates (`hello_world`, `sample_issue_resolution`, ...), which carry
//! fixed demo payloads.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::OutgoingMessage;
use crate::api::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::Result;
use crate::tools::{Endpoint, ToolRegistry};

const DEFAULT_LANGUAGE: &str = "en_US";

/// Quick-reply payloads used by the interactive template demo
const DEMO_QUICK_REPLY_PAYLOADS: [&str; 2] = ["aGlzIHRoaXMgaXMgY29v", "9rwnB8RbYmPF5t2Mn09x4h"];

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn demo_date_time() -> Value {
    json!({
        "fallback_value": "February 25, 1977",
        "day_of_week": 5,
        "year": 1977,
        "month": 2,
        "day_of_month": 25,
        "hour": 15,
        "minute": 33,
        "calendar": "GREGORIAN"
    })
}

/// `template` object with name and language
pub(crate) fn template(name: impl Into<String>, language: impl Into<String>) -> Value {
    json!({ "name": name.into(), "language": { "code": language.into() } })
}

fn deterministic_template(name: &str) -> Value {
    json!({ "name": name, "language": { "code": DEFAULT_LANGUAGE, "policy": "deterministic" } })
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendTemplateArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Name of an approved template
    pub template_name: String,
    /// Template language and locale code, e.g. en_US
    pub language_code: String,
    /// Template components with their parameters, in Cloud API format
    pub components: Vec<Value>,
}

pub struct SendMessageTemplate;

impl Endpoint for SendMessageTemplate {
    type Args = SendTemplateArgs;
    const NAME: &'static str = "send_message_template";
    const DESCRIPTION: &'static str = "Send a message template via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the message template.";

    fn request(args: SendTemplateArgs) -> Result<ApiRequest> {
        let mut content = template(args.template_name, args.language_code);
        content["components"] = Value::Array(args.components);
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "template", content).send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveTemplateArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Name of an approved template
    pub template_name: String,
    /// Template language and locale code, e.g. en_US
    pub language_code: String,
    /// Link to the header image
    pub image_url: String,
    /// Text for the first body parameter
    pub text_string: String,
    /// Amount in major currency units, e.g. 100.99
    pub amount: f64,
    /// ISO 4217 currency code, e.g. USD
    pub currency_code: String,
    /// `date_time` body parameter; a fixed sample date is sent when omitted
    pub date_time: Option<Value>,
    /// Payloads of the quick-reply buttons, in button order
    pub quick_reply_payloads: Option<Vec<String>>,
}

pub struct SendMessageTemplateInteractive;

impl Endpoint for SendMessageTemplateInteractive {
    type Args = InteractiveTemplateArgs;
    const NAME: &'static str = "send_message_template_interactive";
    const DESCRIPTION: &'static str =
        "Send an interactive message template with image header, currency, date and quick-reply buttons.";
    const FAILURE: &'static str = "An error occurred while sending the message template.";

    fn request(args: InteractiveTemplateArgs) -> Result<ApiRequest> {
        let payloads = args
            .quick_reply_payloads
            .unwrap_or_else(|| DEMO_QUICK_REPLY_PAYLOADS.iter().map(|p| p.to_string()).collect());

        let mut components = vec![
            json!({
                "type": "header",
                "parameters": [{ "type": "image", "image": { "link": args.image_url } }]
            }),
            json!({
                "type": "body",
                "parameters": [
                    { "type": "text", "text": args.text_string },
                    {
                        "type": "currency",
                        "currency": {
                            "fallback_value": format!("${}", args.amount),
                            "code": args.currency_code,
                            "amount_1000": (args.amount * 1000.0).round() as i64
                        }
                    },
                    { "type": "date_time", "date_time": args.date_time.unwrap_or_else(demo_date_time) }
                ]
            }),
        ];
        for (index, payload) in payloads.into_iter().enumerate() {
            components.push(json!({
                "type": "button",
                "sub_type": "quick_reply",
                "index": index.to_string(),
                "parameters": [{ "type": "payload", "payload": payload }]
            }));
        }

        let mut content = template(args.template_name, args.language_code);
        content["components"] = Value::Array(components);
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "template", content).send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaTemplateArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Name of an approved template
    pub template_name: String,
    /// Template language and locale code, e.g. en_US
    pub language_code: String,
    /// Link to the header image
    pub image_url: Option<String>,
    /// Text for the body text parameter
    pub text_string: Option<String>,
    /// Fallback text for the currency parameter, e.g. $100.99
    pub currency_fallback_value: Option<String>,
    /// ISO 4217 currency code, e.g. USD
    pub currency_code: Option<String>,
    /// Amount multiplied by 1000, e.g. 100990 for 100.99
    pub amount1000: Option<i64>,
    /// `date_time` body parameter in Cloud API format
    pub date_time: Option<Value>,
}

pub struct SendMessageTemplateMedia;

impl Endpoint for SendMessageTemplateMedia {
    type Args = MediaTemplateArgs;
    const NAME: &'static str = "send_message_template_media";
    const DESCRIPTION: &'static str = "Send a media message template via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the message template media.";

    fn request(args: MediaTemplateArgs) -> Result<ApiRequest> {
        let mut components = Vec::new();
        if let Some(link) = args.image_url {
            components.push(json!({
                "type": "header",
                "parameters": [{ "type": "image", "image": { "link": link } }]
            }));
        }

        let mut body_params = Vec::new();
        if let Some(text) = args.text_string {
            body_params.push(json!({ "type": "text", "text": text }));
        }
        if args.currency_fallback_value.is_some() || args.currency_code.is_some() || args.amount1000.is_some() {
            let mut currency = json!({});
            super::put_opt(&mut currency, "fallback_value", args.currency_fallback_value);
            super::put_opt(&mut currency, "code", args.currency_code);
            super::put_opt(&mut currency, "amount_1000", args.amount1000);
            body_params.push(json!({ "type": "currency", "currency": currency }));
        }
        if let Some(date_time) = args.date_time {
            body_params.push(json!({ "type": "date_time", "date_time": date_time }));
        }
        if !body_params.is_empty() {
            components.push(json!({ "type": "body", "parameters": body_params }));
        }

        let mut content = template(args.template_name, args.language_code);
        if !components.is_empty() {
            content["components"] = Value::Array(components);
        }
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "template", content).send_from(args.scope))
    }
}

/// Arguments for the fixed sample templates
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SampleTemplateArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
}

fn hello_world(args: SampleTemplateArgs) -> ApiRequest {
    let content = template("hello_world", DEFAULT_LANGUAGE);
    OutgoingMessage::new(args.recipient_phone_number, "template", content).send_from(args.scope)
}

pub struct SendTestMessage;

impl Endpoint for SendTestMessage {
    type Args = SampleTemplateArgs;
    const NAME: &'static str = "send_test_message";
    const DESCRIPTION: &'static str = "Send the hello_world test template via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the test message.";

    fn request(args: SampleTemplateArgs) -> Result<ApiRequest> {
        Ok(hello_world(args))
    }
}

pub struct SendSampleTextMessage;

impl Endpoint for SendSampleTextMessage {
    type Args = SampleTemplateArgs;
    const NAME: &'static str = "send_sample_text_message";
    const DESCRIPTION: &'static str = "Send a sample text message using the hello_world template.";
    const FAILURE: &'static str = "An error occurred while sending the message.";

    fn request(args: SampleTemplateArgs) -> Result<ApiRequest> {
        Ok(hello_world(args))
    }
}

pub struct SendSampleIssueResolutionTemplate;

impl Endpoint for SendSampleIssueResolutionTemplate {
    type Args = SampleTemplateArgs;
    const NAME: &'static str = "send_sample_issue_resolution_template";
    const DESCRIPTION: &'static str = "Send a sample issue resolution template via WhatsApp.";
    const FAILURE: &'static str = "An error occurred while sending the message.";

    fn request(args: SampleTemplateArgs) -> Result<ApiRequest> {
        let mut content = deterministic_template("sample_issue_resolution");
        content["components"] = json!([
            { "type": "body", "parameters": [{ "type": "text", "text": "*Mr. Jones*" }] },
            {
                "type": "button",
                "sub_type": "quick_reply",
                "index": 0,
                "parameters": [{ "type": "text", "text": "Yes" }]
            },
            {
                "type": "button",
                "sub_type": "quick_reply",
                "index": 1,
                "parameters": [{ "type": "text", "text": "No" }]
            }
        ]);
        Ok(OutgoingMessage::new(args.recipient_phone_number, "template", content).send_from(args.scope))
    }
}

pub struct SendSampleShippingConfirmation;

impl Endpoint for SendSampleShippingConfirmation {
    type Args = SampleTemplateArgs;
    const NAME: &'static str = "send_sample_shipping_confirmation";
    const DESCRIPTION: &'static str = "Send a sample shipping confirmation template via WhatsApp.";
    const FAILURE: &'static str = "An error occurred while sending the message.";

    fn request(args: SampleTemplateArgs) -> Result<ApiRequest> {
        let mut content = deterministic_template("sample_shipping_confirmation");
        content["components"] = json!([
            { "type": "body", "parameters": [{ "type": "text", "text": "2" }] }
        ]);
        Ok(OutgoingMessage::new(args.recipient_phone_number, "template", content).send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowTemplateArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Name of an approved template with a flow button
    pub template_name: String,
    /// Token identifying this flow session
    pub flow_token: String,
    /// Key-value data passed to the first flow screen
    pub custom_data: Option<Value>,
    /// Template language code
    #[serde(default = "default_language")]
    pub language_code: String,
}

pub struct SendFlowTemplateMessage;

impl Endpoint for SendFlowTemplateMessage {
    type Args = FlowTemplateArgs;
    const NAME: &'static str = "send_flow_template_message";
    const DESCRIPTION: &'static str = "Send a flow template message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the message.";

    fn request(args: FlowTemplateArgs) -> Result<ApiRequest> {
        let mut action = json!({ "flow_token": args.flow_token });
        super::put_opt(&mut action, "flow_action_data", args.custom_data);

        let mut content = template(args.template_name, args.language_code);
        content["components"] = json!([{
            "type": "button",
            "sub_type": "flow",
            "index": "0",
            "parameters": [{ "type": "action", "action": action }]
        }]);
        Ok(OutgoingMessage::new(args.recipient_phone_number, "template", content).send_from(args.scope))
    }
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register::<SendMessageTemplate>();
    registry.register::<SendMessageTemplateInteractive>();
    registry.register::<SendMessageTemplateMedia>();
    registry.register::<SendTestMessage>();
    registry.register::<SendSampleTextMessage>();
    registry.register::<SendSampleIssueResolutionTemplate>();
    registry.register::<SendSampleShippingConfirmation>();
    registry.register::<SendFlowTemplateMessage>();
}
