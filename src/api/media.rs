//! Media upload, lookup, download and deletion, plus resumable uploads

use std::path::{Path, PathBuf};

use reqwest::Method;
use schemars::JsonSchema;
use serde::Deserialize;

use super::scope::{PhoneNumberScope, VersionScope};
use crate::client::{ApiRequest, FormPart};
use crate::error::{CloudError, Result};
use crate::tools::{Endpoint, ToolRegistry};

/// MIME type inferred from a file extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "aac" => "audio/aac",
        "amr" => "audio/amr",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "ogg" | "opus" => "audio/ogg",
        "mp4" => "video/mp4",
        "3gp" => "video/3gpp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => return None,
    };
    Some(mime)
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadMediaArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Local path of the file to upload
    pub file_path: PathBuf,
    /// MIME type of the file; inferred from the extension when omitted
    pub mime_type: Option<String>,
}

impl UploadMediaArgs {
    fn into_request(self) -> Result<ApiRequest> {
        let mime = match self.mime_type {
            Some(mime) => mime,
            None => mime_for_path(&self.file_path)
                .map(str::to_string)
                .ok_or_else(|| {
                    CloudError::InvalidArguments(format!(
                        "cannot infer the MIME type of {}; set mimeType",
                        self.file_path.display()
                    ))
                })?,
        };
        let parts = vec![
            FormPart::text("messaging_product", "whatsapp"),
            FormPart::file("file", self.file_path, Some(mime.clone())),
            FormPart::text("type", mime),
        ];
        Ok(self.scope.post().segment("media").multipart(parts))
    }
}

macro_rules! upload_endpoint {
    ($ty:ident, $name:literal, $desc:literal, $failure:literal) => {
        pub struct $ty;

        impl Endpoint for $ty {
            type Args = UploadMediaArgs;
            const NAME: &'static str = $name;
            const DESCRIPTION: &'static str = $desc;
            const FAILURE: &'static str = $failure;

            fn request(args: UploadMediaArgs) -> Result<ApiRequest> {
                args.into_request()
            }
        }
    };
}

upload_endpoint!(
    UploadImage,
    "upload_image",
    "Upload an image to WhatsApp Cloud API and get back its media ID.",
    "An error occurred while uploading the image."
);
upload_endpoint!(
    UploadAudio,
    "upload_audio",
    "Upload audio to WhatsApp Cloud API and get back its media ID.",
    "An error occurred while uploading audio."
);
upload_endpoint!(
    UploadSticker,
    "upload_sticker",
    "Upload a sticker (webp) to WhatsApp Cloud API and get back its media ID.",
    "An error occurred while uploading the sticker."
);

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveMediaArgs {
    #[serde(flatten)]
    pub scope: VersionScope,
    /// ID of the uploaded media
    pub media_id: String,
    /// Only succeed if the media belongs to this phone number
    pub phone_number_id: Option<String>,
}

pub struct RetrieveMediaUrl;

impl Endpoint for RetrieveMediaUrl {
    type Args = RetrieveMediaArgs;
    const NAME: &'static str = "retrieve_media_url";
    const DESCRIPTION: &'static str = "Retrieve the download URL of an uploaded media object from WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while retrieving the media URL.";

    fn request(args: RetrieveMediaArgs) -> Result<ApiRequest> {
        Ok(args
            .scope
            .object(Method::GET, args.media_id)
            .query_opt("phone_number_id", args.phone_number_id))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMediaArgs {
    #[serde(flatten)]
    pub scope: VersionScope,
    /// ID of the media to delete
    pub media_id: String,
    /// Phone number the media belongs to
    pub phone_number_id: String,
}

pub struct DeleteMedia;

impl Endpoint for DeleteMedia {
    type Args = DeleteMediaArgs;
    const NAME: &'static str = "delete_media";
    const DESCRIPTION: &'static str = "Delete media from WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while deleting media.";

    fn request(args: DeleteMediaArgs) -> Result<ApiRequest> {
        Ok(args
            .scope
            .object(Method::DELETE, args.media_id)
            .query("phone_number_id", args.phone_number_id))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadMediaArgs {
    #[serde(flatten)]
    pub scope: VersionScope,
    /// Media URL returned by retrieve_media_url (API host or lookaside.fbsbx.com over https), or a path relative to the API version
    pub media_url: String,
}

pub struct DownloadMedia;

impl Endpoint for DownloadMedia {
    type Args = DownloadMediaArgs;
    const NAME: &'static str = "download_media";
    const DESCRIPTION: &'static str =
        "Download media from WhatsApp Cloud API. The content is returned base64-encoded with its content type.";
    const FAILURE: &'static str = "An error occurred while downloading media.";

    fn request(args: DownloadMediaArgs) -> Result<ApiRequest> {
        let url = args.media_url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(ApiRequest::get().absolute(url).expect_media());
        }
        let segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(CloudError::InvalidArguments("mediaUrl must not be empty".to_string()));
        }
        let req = segments
            .into_iter()
            .fold(ApiRequest::get().version(args.scope.version), |req, s| req.segment(s));
        Ok(req.expect_media())
    }
}

fn default_upload_type() -> String {
    "image/jpeg".to_string()
}

fn default_upload_name() -> String {
    "myprofile.jpg".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSessionArgs {
    #[serde(flatten)]
    pub scope: VersionScope,
    /// Size of the file in bytes
    pub file_length: u64,
    /// MIME type of the file
    #[serde(default = "default_upload_type")]
    pub file_type: String,
    /// Name of the file
    #[serde(default = "default_upload_name")]
    pub file_name: String,
}

pub struct CreateUploadSession;

impl Endpoint for CreateUploadSession {
    type Args = UploadSessionArgs;
    const NAME: &'static str = "create_upload_session";
    const DESCRIPTION: &'static str =
        "Create a resumable upload session (e.g. for profile pictures) on WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while creating the upload session.";

    fn request(args: UploadSessionArgs) -> Result<ApiRequest> {
        if args.file_length == 0 {
            return Err(CloudError::InvalidArguments("fileLength must be positive".to_string()));
        }
        Ok(args
            .scope
            .object(Method::POST, "app")
            .segment("uploads")
            .query("file_length", args.file_length)
            .query("file_type", args.file_type)
            .query("file_name", args.file_name)
            .oauth())
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatusArgs {
    #[serde(flatten)]
    pub scope: VersionScope,
    /// Upload session ID (`upload:...`)
    pub upload_id: String,
}

pub struct QueryUploadStatus;

impl Endpoint for QueryUploadStatus {
    type Args = UploadStatusArgs;
    const NAME: &'static str = "query_upload_status";
    const DESCRIPTION: &'static str = "Query the status (current file offset) of a resumable upload session.";
    const FAILURE: &'static str = "An error occurred while querying the upload status.";

    fn request(args: UploadStatusArgs) -> Result<ApiRequest> {
        Ok(args
            .scope
            .object(Method::GET, args.upload_id)
            .header("Cache-Control", "no-cache")
            .oauth())
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileArgs {
    #[serde(flatten)]
    pub scope: VersionScope,
    /// Upload session ID (`upload:...`)
    pub upload_id: String,
    /// Local path of the file to send
    pub file_path: PathBuf,
    /// Byte offset to resume from; 0 for a fresh upload
    #[serde(default)]
    pub file_offset: u64,
    /// MIME type of the file
    #[serde(default = "default_upload_type")]
    pub file_type: String,
}

pub struct UploadFile;

impl Endpoint for UploadFile {
    type Args = UploadFileArgs;
    const NAME: &'static str = "upload_file";
    const DESCRIPTION: &'static str =
        "Upload file data to a resumable upload session; the response carries the file handle.";
    const FAILURE: &'static str = "An error occurred while uploading the file.";

    fn request(args: UploadFileArgs) -> Result<ApiRequest> {
        Ok(args
            .scope
            .object(Method::POST, args.upload_id)
            .header("file_offset", args.file_offset.to_string())
            .file_body(args.file_path, args.file_type)
            .oauth())
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register::<UploadImage>();
    registry.register::<UploadAudio>();
    registry.register::<UploadSticker>();
    registry.register::<RetrieveMediaUrl>();
    registry.register::<DeleteMedia>();
    registry.register::<DownloadMedia>();
    registry.register::<CreateUploadSession>();
    registry.register::<QueryUploadStatus>();
    registry.register::<UploadFile>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AuthScheme, Body, ResponseKind};
    use crate::tools::EndpointTool;
    use serde_json::json;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/photo.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("sticker.webp")), Some("image/webp"));
        assert_eq!(mime_for_path(Path::new("voice.ogg")), Some("audio/ogg"));
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }

    #[test]
    fn test_upload_image_form() {
        let req = EndpointTool::<UploadImage>::prepare(json!({
            "phoneNumberId": "100",
            "filePath": "/tmp/cat.png"
        }))
        .unwrap();

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path(), "100/media");
        assert_eq!(
            req.body,
            Body::Multipart(vec![
                FormPart::text("messaging_product", "whatsapp"),
                FormPart::file("file", "/tmp/cat.png", Some("image/png".to_string())),
                FormPart::text("type", "image/png"),
            ])
        );
    }

    #[test]
    fn test_upload_unknown_extension_needs_mime() {
        let result = EndpointTool::<UploadAudio>::prepare(json!({
            "phoneNumberId": "100",
            "filePath": "/tmp/clip.xyz"
        }));
        assert!(matches!(result, Err(CloudError::InvalidArguments(_))));

        let req = EndpointTool::<UploadAudio>::prepare(json!({
            "phoneNumberId": "100",
            "filePath": "/tmp/clip.xyz",
            "mimeType": "audio/aac"
        }))
        .unwrap();
        assert!(matches!(&req.body, Body::Multipart(parts) if parts[2] == FormPart::text("type", "audio/aac")));
    }

    #[test]
    fn test_retrieve_media_url_optional_query() {
        let req = EndpointTool::<RetrieveMediaUrl>::prepare(json!({"mediaId": "m1"})).unwrap();
        assert_eq!(req.path(), "m1");
        assert!(req.query.is_empty());

        let req = EndpointTool::<RetrieveMediaUrl>::prepare(json!({"mediaId": "m1", "phoneNumberId": "100"})).unwrap();
        assert_eq!(req.query_value("phone_number_id"), Some("100"));
    }

    #[test]
    fn test_delete_media() {
        let req = EndpointTool::<DeleteMedia>::prepare(json!({"mediaId": "m1", "phoneNumberId": "100"})).unwrap();
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.query_value("phone_number_id"), Some("100"));
    }

    #[test]
    fn test_download_media_absolute_and_relative() {
        let req = EndpointTool::<DownloadMedia>::prepare(json!({
            "mediaUrl": "https://lookaside.fbsbx.com/whatsapp_business/attachments/?mid=1"
        }))
        .unwrap();
        assert_eq!(req.response, ResponseKind::Media);
        assert_eq!(
            req.absolute_url.as_deref(),
            Some("https://lookaside.fbsbx.com/whatsapp_business/attachments/?mid=1")
        );

        let req = EndpointTool::<DownloadMedia>::prepare(json!({"mediaUrl": "m1/content", "version": "v19.0"})).unwrap();
        assert!(req.absolute_url.is_none());
        assert_eq!(req.path(), "m1/content");
        assert_eq!(req.version.as_deref(), Some("v19.0"));
    }

    #[test]
    fn test_upload_session_uses_oauth() {
        let req = EndpointTool::<CreateUploadSession>::prepare(json!({"fileLength": 2048})).unwrap();
        assert_eq!(req.path(), "app/uploads");
        assert_eq!(req.auth, AuthScheme::OAuth);
        assert_eq!(req.query_value("file_length"), Some("2048"));
        assert_eq!(req.query_value("file_type"), Some("image/jpeg"));
        assert_eq!(req.query_value("file_name"), Some("myprofile.jpg"));
    }

    #[test]
    fn test_upload_file_raw_body() {
        let req = EndpointTool::<UploadFile>::prepare(json!({
            "uploadId": "upload:abc",
            "filePath": "/tmp/me.png",
            "fileType": "image/png"
        }))
        .unwrap();

        assert_eq!(req.auth, AuthScheme::OAuth);
        assert_eq!(req.path(), "upload:abc");
        assert!(req.headers.contains(&("file_offset".to_string(), "0".to_string())));
        assert_eq!(
            req.body,
            Body::File {
                path: PathBuf::from("/tmp/me.png"),
                content_type: "image/png".to_string()
            }
        );
    }

    #[test]
    fn test_query_upload_status() {
        let req = EndpointTool::<QueryUploadStatus>::prepare(json!({"uploadId": "upload:abc"})).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.auth, AuthScheme::OAuth);
    }
}
