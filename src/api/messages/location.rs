//! Location messages

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{OutgoingMessage, ReplyArgs};
use crate::api::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::Result;
use crate::tools::{Endpoint, ToolRegistry};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Name of the location
    pub location_name: String,
    /// Street address of the location
    pub location_address: String,
}

impl LocationArgs {
    fn content(&self) -> Value {
        // The API documents coordinates as strings
        json!({
            "latitude": self.latitude.to_string(),
            "longitude": self.longitude.to_string(),
            "name": self.location_name,
            "address": self.location_address,
        })
    }
}

pub struct SendLocationMessage;

impl Endpoint for SendLocationMessage {
    type Args = LocationArgs;
    const NAME: &'static str = "send_location_message";
    const DESCRIPTION: &'static str = "Send a location message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the location message.";

    fn request(args: LocationArgs) -> Result<ApiRequest> {
        let content = args.content();
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "location", content).send_from(args.scope))
    }
}

pub struct SendReplyToLocationMessage;

impl Endpoint for SendReplyToLocationMessage {
    type Args = ReplyArgs<LocationArgs>;
    const NAME: &'static str = "send_reply_to_location_message";
    const DESCRIPTION: &'static str = "Reply to a message with a location via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the location message.";

    fn request(args: ReplyArgs<LocationArgs>) -> Result<ApiRequest> {
        let location = args.message;
        let content = location.content();
        Ok(
            OutgoingMessage::individual(location.recipient_phone_number, "location", content)
                .reply_to(args.message_id)
                .send_from(location.scope),
        )
    }
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register::<SendLocationMessage>();
    registry.register::<SendReplyToLocationMessage>();
}
