//! Interactive list and reply-button messages

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{OutgoingMessage, ReplyArgs, text_block};
use crate::api::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::{CloudError, Result};
use crate::tools::{Endpoint, ToolRegistry};

/// Maximum number of reply buttons the platform accepts
const MAX_REPLY_BUTTONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListRow {
    /// Row ID returned in the user's selection
    pub id: String,
    /// Row title
    pub title: String,
    /// Secondary text under the title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListSection {
    /// Section title
    pub title: String,
    pub rows: Vec<ListRow>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMessageArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Header text for the list message
    pub header_text: String,
    /// Body text for the list message
    pub body_text: String,
    /// Footer text for the list message
    pub footer_text: String,
    /// Label of the button that opens the list
    pub button_text: String,
    /// Sections of selectable rows
    pub list_sections: Vec<ListSection>,
}

impl ListMessageArgs {
    fn into_message(self) -> Result<(PhoneNumberScope, OutgoingMessage)> {
        if self.list_sections.is_empty() {
            return Err(CloudError::InvalidArguments("listSections must not be empty".to_string()));
        }
        let interactive = json!({
            "type": "list",
            "header": { "type": "text", "text": self.header_text },
            "body": text_block(self.body_text),
            "footer": text_block(self.footer_text),
            "action": {
                "button": self.button_text,
                "sections": serde_json::to_value(self.list_sections)?,
            }
        });
        Ok((
            self.scope,
            OutgoingMessage::individual(self.recipient_phone_number, "interactive", interactive),
        ))
    }
}

pub struct SendListMessage;

impl Endpoint for SendListMessage {
    type Args = ListMessageArgs;
    const NAME: &'static str = "send_list_message";
    const DESCRIPTION: &'static str = "Send a list message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the list message.";

    fn request(args: ListMessageArgs) -> Result<ApiRequest> {
        let (scope, message) = args.into_message()?;
        Ok(message.send_from(scope))
    }
}

pub struct SendReplyToListMessage;

impl Endpoint for SendReplyToListMessage {
    type Args = ReplyArgs<ListMessageArgs>;
    const NAME: &'static str = "send_reply_to_list_message";
    const DESCRIPTION: &'static str = "Send a reply to a list message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the reply to the list message.";

    fn request(args: ReplyArgs<ListMessageArgs>) -> Result<ApiRequest> {
        let (scope, message) = args.message.into_message()?;
        Ok(message.reply_to(args.message_id).send_from(scope))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct ReplyButton {
    /// Unique ID returned when the button is tapped
    pub id: String,
    /// Button label
    pub title: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyButtonArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Text shown above the buttons
    pub body_text: String,
    /// One to three quick-reply buttons
    pub buttons: Vec<ReplyButton>,
}

pub struct SendReplyButton;

impl Endpoint for SendReplyButton {
    type Args = ReplyButtonArgs;
    const NAME: &'static str = "send_reply_button";
    const DESCRIPTION: &'static str = "Send a reply button message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the reply button message.";

    fn request(args: ReplyButtonArgs) -> Result<ApiRequest> {
        if args.buttons.is_empty() || args.buttons.len() > MAX_REPLY_BUTTONS {
            return Err(CloudError::InvalidArguments(format!(
                "buttons must contain 1 to {} entries, got {}",
                MAX_REPLY_BUTTONS,
                args.buttons.len()
            )));
        }

        let buttons: Vec<Value> = args
            .buttons
            .into_iter()
            .map(|b| json!({ "type": "reply", "reply": { "id": b.id, "title": b.title } }))
            .collect();

        let interactive = json!({
            "type": "button",
            "body": text_block(args.body_text),
            "action": { "buttons": buttons }
        });
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "interactive", interactive).send_from(args.scope))
    }
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register::<SendListMessage>();
    registry.register::<SendReplyToListMessage>();
    registry.register::<SendReplyButton>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::EndpointTool;

    fn list_input() -> Value {
        json!({
            "phoneNumberId": "100",
            "recipientPhoneNumber": "1555",
            "headerText": "Menu",
            "bodyText": "Pick one",
            "footerText": "Thanks",
            "buttonText": "Open",
            "listSections": [{
                "title": "Drinks",
                "rows": [
                    {"id": "tea", "title": "Tea"},
                    {"id": "coffee", "title": "Coffee", "description": "Fresh"}
                ]
            }]
        })
    }

    #[test]
    fn test_list_message_structure() {
        let req = EndpointTool::<SendListMessage>::prepare(list_input()).unwrap();
        let interactive = &req.json_body().unwrap()["interactive"];

        assert_eq!(interactive["type"], "list");
        assert_eq!(interactive["header"], json!({"type": "text", "text": "Menu"}));
        assert_eq!(interactive["body"]["text"], "Pick one");
        assert_eq!(interactive["action"]["button"], "Open");
        assert_eq!(interactive["action"]["sections"][0]["rows"][0], json!({"id": "tea", "title": "Tea"}));
        assert_eq!(interactive["action"]["sections"][0]["rows"][1]["description"], "Fresh");
    }

    #[test]
    fn test_list_reply_context() {
        let mut input = list_input();
        input["messageId"] = json!("wamid.Q");
        let req = EndpointTool::<SendReplyToListMessage>::prepare(input).unwrap();
        assert_eq!(req.json_body().unwrap()["context"]["message_id"], "wamid.Q");
    }

    #[test]
    fn test_empty_sections_rejected() {
        let mut input = list_input();
        input["listSections"] = json!([]);
        assert!(EndpointTool::<SendListMessage>::prepare(input).is_err());
    }

    #[test]
    fn test_reply_buttons() {
        let req = EndpointTool::<SendReplyButton>::prepare(json!({
            "phoneNumberId": "100",
            "recipientPhoneNumber": "1555",
            "bodyText": "Continue?",
            "buttons": [{"id": "yes", "title": "Yes"}, {"id": "no", "title": "No"}]
        }))
        .unwrap();

        let interactive = &req.json_body().unwrap()["interactive"];
        assert_eq!(interactive["type"], "button");
        assert_eq!(
            interactive["action"]["buttons"][1],
            json!({"type": "reply", "reply": {"id": "no", "title": "No"}})
        );
    }

    #[test]
    fn test_too_many_buttons() {
        let buttons: Vec<Value> = (0..4).map(|i| json!({"id": i.to_string(), "title": "x"})).collect();
        let err = EndpointTool::<SendReplyButton>::prepare(json!({
            "phoneNumberId": "100",
            "recipientPhoneNumber": "1555",
            "bodyText": "?",
            "buttons": buttons
        }))
        .unwrap_err();
        assert!(matches!(err, CloudError::InvalidArguments(_)));
    }
}
