//! Read receipts and typing indicators

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::api::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::Result;
use crate::tools::{Endpoint, ToolRegistry};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageStatusArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// ID of the incoming message
    pub message_id: String,
}

pub struct MarkMessageAsRead;

impl Endpoint for MarkMessageAsRead {
    type Args = MessageStatusArgs;
    const NAME: &'static str = "mark_message_as_read";
    const DESCRIPTION: &'static str = "Mark a message as read in WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while marking the message as read.";

    fn request(args: MessageStatusArgs) -> Result<ApiRequest> {
        Ok(args.scope.put().segment("messages").json(json!({
            "messaging_product": "whatsapp",
            "status": "read",
            "message_id": args.message_id,
        })))
    }
}

pub struct SendTypingIndicatorAndReadReceipt;

impl Endpoint for SendTypingIndicatorAndReadReceipt {
    type Args = MessageStatusArgs;
    const NAME: &'static str = "send_typing_indicator_and_read_receipt";
    const DESCRIPTION: &'static str = "Send a typing indicator and read receipt via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the typing indicator and read receipt.";

    fn request(args: MessageStatusArgs) -> Result<ApiRequest> {
        Ok(args.scope.post().segment("messages").json(json!({
            "messaging_product": "whatsapp",
            "status": "read",
            "message_id": args.message_id,
            "typing_indicator": { "type": "text" },
        })))
    }
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register::<MarkMessageAsRead>();
    registry.register::<SendTypingIndicatorAndReadReceipt>();
}
