//! Outgoing messages (`POST {phone-number-id}/messages`)
//!
//! All message tools share one envelope: `messaging_product`, an optional
//! `recipient_type`, the recipient, an optional reply `context`, the
//! message `type` and the typed content under a key of the same name.

mod commerce;
mod contacts;
mod flows;
mod interactive;
mod location;
mod media;
mod status;
mod templates;
mod text;

pub use commerce::*;
pub use contacts::*;
pub use flows::*;
pub use interactive::*;
pub use location::*;
pub use media::*;
pub use status::*;
pub use templates::*;
pub use text::*;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::tools::ToolRegistry;

/// Builder for the message envelope
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    body: Map<String, Value>,
}

impl OutgoingMessage {
    /// Envelope with `recipient_type: individual`
    pub fn individual(to: impl Into<String>, kind: &str, content: Value) -> Self {
        let mut message = Self::new(to, kind, content);
        message.body.insert("recipient_type".into(), json!("individual"));
        message
    }

    /// Envelope without a recipient type
    pub fn new(to: impl Into<String>, kind: &str, content: Value) -> Self {
        let mut body = Map::new();
        body.insert("messaging_product".into(), json!("whatsapp"));
        body.insert("to".into(), Value::String(to.into()));
        body.insert("type".into(), json!(kind));
        body.insert(kind.to_string(), content);
        Self { body }
    }

    /// Mark this message as a reply to an earlier one
    pub fn reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.body
            .insert("context".into(), json!({ "message_id": message_id.into() }));
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }

    /// POST the message from the given phone number
    pub fn send_from(self, scope: PhoneNumberScope) -> ApiRequest {
        scope.post().segment("messages").json(self.into_value())
    }
}

/// Arguments of any message shape, sent as a reply
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyArgs<A> {
    #[serde(flatten)]
    pub message: A,
    /// ID of the message being replied to
    pub message_id: String,
}

/// `{"text": ...}` block used by headers, bodies and footers
pub(crate) fn text_block(text: impl Into<String>) -> Value {
    json!({ "text": text.into() })
}

/// Set `key` only when a value is present
pub(crate) fn put_opt(target: &mut Value, key: &str, value: Option<impl Into<Value>>) {
    if let Some(v) = value {
        target[key] = v.into();
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    text::register(registry);
    media::register(registry);
    location::register(registry);
    contacts::register(registry);
    interactive::register(registry);
    templates::register(registry);
    commerce::register(registry);
    flows::register(registry);
    status::register(registry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_individual_envelope() {
        let value = OutgoingMessage::individual("1555", "text", json!({"body": "hi"})).into_value();
        assert_eq!(
            value,
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "1555",
                "type": "text",
                "text": {"body": "hi"}
            })
        );
    }

    #[test]
    fn test_bare_envelope_has_no_recipient_type() {
        let value = OutgoingMessage::new("1555", "contacts", json!([])).into_value();
        assert!(value.get("recipient_type").is_none());
        assert_eq!(value["contacts"], json!([]));
    }

    #[test]
    fn test_reply_context() {
        let value = OutgoingMessage::individual("1555", "text", json!({}))
            .reply_to("wamid.ABC")
            .into_value();
        assert_eq!(value["context"]["message_id"], "wamid.ABC");
    }

    #[test]
    fn test_send_from_path() {
        let req = OutgoingMessage::new("1", "text", json!({})).send_from(PhoneNumberScope::new("100"));
        assert_eq!(req.path(), "100/messages");
        assert!(req.json_body().is_some());
    }

    #[test]
    fn test_put_opt() {
        let mut value = json!({});
        put_opt(&mut value, "caption", Some("hello"));
        put_opt(&mut value, "filename", None::<String>);
        assert_eq!(value, json!({"caption": "hello"}));
    }
}
