//! Text and reaction messages

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use super::OutgoingMessage;
use crate::api::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::Result;
use crate::tools::{Endpoint, ToolRegistry};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendTextArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Content of the message
    pub message_content: String,
}

/// Plain text message without link preview
pub struct SendTextMessage;

impl Endpoint for SendTextMessage {
    type Args = SendTextArgs;
    const NAME: &'static str = "send_text_message";
    const DESCRIPTION: &'static str = "Send a text message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the text message.";

    fn request(args: SendTextArgs) -> Result<ApiRequest> {
        let text = json!({ "preview_url": false, "body": args.message_content });
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "text", text).send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendPreviewTextArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Message body; the first URL in it is rendered as a preview
    pub body: String,
}

pub struct SendTextMessageWithPreviewUrl;

impl Endpoint for SendTextMessageWithPreviewUrl {
    type Args = SendPreviewTextArgs;
    const NAME: &'static str = "send_text_message_with_preview_url";
    const DESCRIPTION: &'static str = "Send a text message with a preview URL using WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the message.";

    fn request(args: SendPreviewTextArgs) -> Result<ApiRequest> {
        let text = json!({ "preview_url": true, "body": args.body });
        Ok(OutgoingMessage::new(args.recipient_phone_number, "text", text).send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTextArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// ID of the message being replied to
    pub message_id: String,
    /// Content of the reply
    pub text_message: String,
}

pub struct SendReplyToTextMessage;

impl Endpoint for SendReplyToTextMessage {
    type Args = ReplyTextArgs;
    const NAME: &'static str = "send_reply_to_text_message";
    const DESCRIPTION: &'static str = "Send a reply to a text message on WhatsApp.";
    const FAILURE: &'static str = "An error occurred while sending the reply.";

    fn request(args: ReplyTextArgs) -> Result<ApiRequest> {
        let text = json!({ "preview_url": false, "body": args.text_message });
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "text", text)
            .reply_to(args.message_id)
            .send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReactionArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// ID of the message to react to
    pub message_id: String,
    /// Emoji to react with; an empty string removes the reaction
    pub emoji: String,
}

pub struct SendReplyWithReaction;

impl Endpoint for SendReplyWithReaction {
    type Args = ReactionArgs;
    const NAME: &'static str = "send_reply_with_reaction";
    const DESCRIPTION: &'static str = "Send a reaction message in reply to a specific WhatsApp message.";
    const FAILURE: &'static str = "An error occurred while sending the reaction message.";

    fn request(args: ReactionArgs) -> Result<ApiRequest> {
        let reaction = json!({ "message_id": args.message_id, "emoji": args.emoji });
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "reaction", reaction).send_from(args.scope))
    }
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register::<SendTextMessage>();
    registry.register::<SendTextMessageWithPreviewUrl>();
    registry.register::<SendReplyToTextMessage>();
    registry.register::<SendReplyWithReaction>();
}
