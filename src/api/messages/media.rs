//! Media messages (image, audio, video, document, sticker)
//!
//! Media is referenced either by the ID of an uploaded object or by a public
//! link. Every variant also exists as a reply carrying `context.message_id`.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{OutgoingMessage, ReplyArgs, put_opt};
use crate::api::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::Result;
use crate::tools::{Endpoint, ToolRegistry};

/// Argument shapes that produce a media message
pub trait MediaMessage {
    fn into_message(self, kind: &str) -> (PhoneNumberScope, OutgoingMessage);
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaIdArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// ID of a media object uploaded with an upload tool
    pub media_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaUrlArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Public HTTPS link to the media
    pub media_url: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptionedIdArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// ID of a media object uploaded with an upload tool
    pub media_id: String,
    /// Caption shown under the media
    pub caption: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptionedUrlArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Public HTTPS link to the media
    pub media_url: String,
    /// Caption shown under the media
    pub caption: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentIdArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// ID of a document uploaded with an upload tool
    pub media_id: String,
    /// Caption shown under the document
    pub caption: Option<String>,
    /// File name shown to the recipient, including the extension
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUrlArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Public HTTPS link to the document
    pub media_url: String,
    /// Caption shown under the document
    pub caption: Option<String>,
    /// File name shown to the recipient, including the extension
    pub filename: Option<String>,
}

fn by_id(id: String) -> Value {
    json!({ "id": id })
}

fn by_link(link: String) -> Value {
    json!({ "link": link })
}

impl MediaMessage for MediaIdArgs {
    fn into_message(self, kind: &str) -> (PhoneNumberScope, OutgoingMessage) {
        let message = OutgoingMessage::individual(self.recipient_phone_number, kind, by_id(self.media_id));
        (self.scope, message)
    }
}

impl MediaMessage for MediaUrlArgs {
    fn into_message(self, kind: &str) -> (PhoneNumberScope, OutgoingMessage) {
        let message = OutgoingMessage::individual(self.recipient_phone_number, kind, by_link(self.media_url));
        (self.scope, message)
    }
}

impl MediaMessage for CaptionedIdArgs {
    fn into_message(self, kind: &str) -> (PhoneNumberScope, OutgoingMessage) {
        let mut content = by_id(self.media_id);
        put_opt(&mut content, "caption", self.caption);
        (self.scope, OutgoingMessage::individual(self.recipient_phone_number, kind, content))
    }
}

impl MediaMessage for CaptionedUrlArgs {
    fn into_message(self, kind: &str) -> (PhoneNumberScope, OutgoingMessage) {
        let mut content = by_link(self.media_url);
        put_opt(&mut content, "caption", self.caption);
        (self.scope, OutgoingMessage::individual(self.recipient_phone_number, kind, content))
    }
}

impl MediaMessage for DocumentIdArgs {
    fn into_message(self, kind: &str) -> (PhoneNumberScope, OutgoingMessage) {
        let mut content = by_id(self.media_id);
        put_opt(&mut content, "caption", self.caption);
        put_opt(&mut content, "filename", self.filename);
        (self.scope, OutgoingMessage::individual(self.recipient_phone_number, kind, content))
    }
}

impl MediaMessage for DocumentUrlArgs {
    fn into_message(self, kind: &str) -> (PhoneNumberScope, OutgoingMessage) {
        let mut content = by_link(self.media_url);
        put_opt(&mut content, "caption", self.caption);
        put_opt(&mut content, "filename", self.filename);
        (self.scope, OutgoingMessage::individual(self.recipient_phone_number, kind, content))
    }
}

impl<A: MediaMessage> MediaMessage for ReplyArgs<A> {
    fn into_message(self, kind: &str) -> (PhoneNumberScope, OutgoingMessage) {
        let (scope, message) = self.message.into_message(kind);
        (scope, message.reply_to(self.message_id))
    }
}

macro_rules! media_endpoint {
    ($ty:ident, $args:ty, $kind:literal, $name:literal, $desc:literal, $failure:literal) => {
        pub struct $ty;

        impl Endpoint for $ty {
            type Args = $args;
            const NAME: &'static str = $name;
            const DESCRIPTION: &'static str = $desc;
            const FAILURE: &'static str = $failure;

            fn request(args: $args) -> Result<ApiRequest> {
                let (scope, message) = args.into_message($kind);
                Ok(message.send_from(scope))
            }
        }
    };
}

media_endpoint!(
    SendImageMessageById,
    CaptionedIdArgs,
    "image",
    "send_image_message_by_id",
    "Send an image message by uploaded media ID via WhatsApp Cloud API.",
    "An error occurred while sending the image message."
);
media_endpoint!(
    SendImageMessageByUrl,
    CaptionedUrlArgs,
    "image",
    "send_image_message_by_url",
    "Send an image message by URL via WhatsApp Cloud API.",
    "An error occurred while sending the image message."
);
media_endpoint!(
    SendAudioMessageById,
    MediaIdArgs,
    "audio",
    "send_audio_message_by_id",
    "Send an audio message by uploaded media ID via WhatsApp Cloud API.",
    "An error occurred while sending the audio message."
);
media_endpoint!(
    SendAudioMessageByUrl,
    MediaUrlArgs,
    "audio",
    "send_audio_message_by_url",
    "Send an audio message by URL via WhatsApp Cloud API.",
    "An error occurred while sending the audio message."
);
media_endpoint!(
    SendVideoMessageById,
    CaptionedIdArgs,
    "video",
    "send_video_message_by_id",
    "Send a video message by uploaded media ID via WhatsApp Cloud API.",
    "An error occurred while sending the video message."
);
media_endpoint!(
    SendVideoMessageByUrl,
    CaptionedUrlArgs,
    "video",
    "send_video_message_by_url",
    "Send a video message by URL via WhatsApp Cloud API.",
    "An error occurred while sending the video message."
);
media_endpoint!(
    SendDocumentMessageById,
    DocumentIdArgs,
    "document",
    "send_document_message_by_id",
    "Send a document message by uploaded media ID via WhatsApp Cloud API.",
    "An error occurred while sending the document message."
);
media_endpoint!(
    SendDocumentMessageByUrl,
    DocumentUrlArgs,
    "document",
    "send_document_message_by_url",
    "Send a document message by URL via WhatsApp Cloud API.",
    "An error occurred while sending the document message."
);
media_endpoint!(
    SendStickerMessageById,
    MediaIdArgs,
    "sticker",
    "send_sticker_message_by_id",
    "Send a sticker message by uploaded media ID via WhatsApp Cloud API.",
    "An error occurred while sending the sticker message."
);
media_endpoint!(
    SendStickerMessageByUrl,
    MediaUrlArgs,
    "sticker",
    "send_sticker_message_by_url",
    "Send a sticker message by URL via WhatsApp Cloud API.",
    "An error occurred while sending the sticker message."
);

media_endpoint!(
    SendReplyToImageMessageById,
    ReplyArgs<CaptionedIdArgs>,
    "image",
    "send_reply_to_image_message_by_id",
    "Reply to a message with an image referenced by media ID.",
    "An error occurred while sending the reply."
);
media_endpoint!(
    SendReplyToImageMessageByUrl,
    ReplyArgs<CaptionedUrlArgs>,
    "image",
    "send_reply_to_image_message_by_url",
    "Reply to a message with an image referenced by URL.",
    "An error occurred while sending the reply."
);
media_endpoint!(
    SendReplyAudioMessageById,
    ReplyArgs<MediaIdArgs>,
    "audio",
    "send_reply_audio_message_by_id",
    "Reply to a message with an audio file referenced by media ID.",
    "An error occurred while sending the audio message."
);
media_endpoint!(
    SendReplyAudioMessageByUrl,
    ReplyArgs<MediaUrlArgs>,
    "audio",
    "send_reply_audio_message_by_url",
    "Reply to a message with an audio file referenced by URL.",
    "An error occurred while sending the audio message."
);
media_endpoint!(
    SendReplyVideoMessageById,
    ReplyArgs<CaptionedIdArgs>,
    "video",
    "send_reply_video_message_by_id",
    "Reply to a message with a video referenced by media ID.",
    "An error occurred while sending the reply."
);
media_endpoint!(
    SendReplyVideoMessageByUrl,
    ReplyArgs<CaptionedUrlArgs>,
    "video",
    "send_reply_video_message_by_url",
    "Reply to a message with a video referenced by URL.",
    "An error occurred while sending the reply."
);
media_endpoint!(
    SendReplyToDocumentMessageById,
    ReplyArgs<DocumentIdArgs>,
    "document",
    "send_reply_to_document_message_by_id",
    "Reply to a message with a document referenced by media ID.",
    "An error occurred while sending the document reply."
);
media_endpoint!(
    SendReplyToDocumentMessageByUrl,
    ReplyArgs<DocumentUrlArgs>,
    "document",
    "send_reply_to_document_message_by_url",
    "Reply to a message with a document referenced by URL.",
    "An error occurred while sending the document reply."
);
media_endpoint!(
    SendReplyToStickerMessageById,
    ReplyArgs<MediaIdArgs>,
    "sticker",
    "send_reply_to_sticker_message_by_id",
    "Reply to a message with a sticker referenced by media ID.",
    "An error occurred while sending the sticker reply."
);
media_endpoint!(
    SendReplyToStickerMessageByUrl,
    ReplyArgs<MediaUrlArgs>,
    "sticker",
    "send_reply_to_sticker_message_by_url",
    "Reply to a message with a sticker referenced by URL.",
    "An error occurred while sending the sticker reply."
);

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register::<SendImageMessageById>();
    registry.register::<SendImageMessageByUrl>();
    registry.register::<SendAudioMessageById>();
    registry.register::<SendAudioMessageByUrl>();
    registry.register::<SendVideoMessageById>();
    registry.register::<SendVideoMessageByUrl>();
    registry.register::<SendDocumentMessageById>();
    registry.register::<SendDocumentMessageByUrl>();
    registry.register::<SendStickerMessageById>();
    registry.register::<SendStickerMessageByUrl>();

    registry.register::<SendReplyToImageMessageById>();
    registry.register::<SendReplyToImageMessageByUrl>();
    registry.register::<SendReplyAudioMessageById>();
    registry.register::<SendReplyAudioMessageByUrl>();
    registry.register::<SendReplyVideoMessageById>();
    registry.register::<SendReplyVideoMessageByUrl>();
    registry.register::<SendReplyToDocumentMessageById>();
    registry.register::<SendReplyToDocumentMessageByUrl>();
    registry.register::<SendReplyToStickerMessageById>();
    registry.register::<SendReplyToStickerMessageByUrl>();
}
