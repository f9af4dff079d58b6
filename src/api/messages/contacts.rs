//! Contact card messages

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OutgoingMessage, ReplyArgs};
use crate::api::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::Result;
use crate::tools::{Endpoint, ToolRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContactKind {
    Home,
    Work,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Two-letter country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContactKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactEmail {
    pub email: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContactKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactName {
    /// Full name as it should be displayed
    pub formatted_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactOrg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactPhone {
    pub phone: String,
    /// WhatsApp ID, when the number is on WhatsApp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContactKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactUrl {
    pub url: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContactKind>,
}

/// One contact card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Contact {
    pub addresses: Vec<ContactAddress>,
    /// Birthday as YYYY-MM-DD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<ContactEmail>,
    pub name: ContactName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<ContactOrg>,
    pub phones: Vec<ContactPhone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<ContactUrl>,
}

fn contacts_value(contacts: Vec<Contact>) -> Result<Value> {
    Ok(serde_json::to_value(contacts)?)
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Contact card to share
    pub contact: Contact,
}

pub struct SendContactMessage;

impl Endpoint for SendContactMessage {
    type Args = ContactArgs;
    const NAME: &'static str = "send_contact_message";
    const DESCRIPTION: &'static str = "Send a contact message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the contact message.";

    fn request(args: ContactArgs) -> Result<ApiRequest> {
        let contacts = contacts_value(vec![args.contact])?;
        Ok(OutgoingMessage::new(args.recipient_phone_number, "contacts", contacts).send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactListArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Contact cards to share
    pub contacts: Vec<Contact>,
}

pub struct SendReplyToContactMessage;

impl Endpoint for SendReplyToContactMessage {
    type Args = ReplyArgs<ContactListArgs>;
    const NAME: &'static str = "send_reply_to_contact_message";
    const DESCRIPTION: &'static str = "Send a reply to a contact message using the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the reply.";

    fn request(args: ReplyArgs<ContactListArgs>) -> Result<ApiRequest> {
        let inner = args.message;
        let contacts = contacts_value(inner.contacts)?;
        Ok(OutgoingMessage::new(inner.recipient_phone_number, "contacts", contacts)
            .reply_to(args.message_id)
            .send_from(inner.scope))
    }
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register::<SendContactMessage>();
    registry.register::<SendReplyToContactMessage>();
}
