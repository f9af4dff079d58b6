//! Message QR codes (`{phone-number-id}/message_qrdls`)

use std::fmt;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use super::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::{CloudError, Result};
use crate::tools::{Endpoint, ToolRegistry};

const QR_SEGMENT: &str = "message_qrdls";

/// Image format of a generated QR code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum QrImageFormat {
    #[default]
    Svg,
    Png,
}

impl fmt::Display for QrImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Svg => write!(f, "SVG"),
            Self::Png => write!(f, "PNG"),
        }
    }
}

fn check_prefilled(message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(CloudError::InvalidArguments("prefilledMessage must not be empty".to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQrCodeArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Message prefilled in the chat when the code is scanned
    pub prefilled_message: String,
    /// Image format to generate
    #[serde(default)]
    pub generate_qr_image: QrImageFormat,
}

pub struct CreateQrCode;

impl Endpoint for CreateQrCode {
    type Args = CreateQrCodeArgs;
    const NAME: &'static str = "create_qr_code";
    const DESCRIPTION: &'static str = "Create a message QR code with a prefilled message using the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while creating the QR code.";

    fn request(args: CreateQrCodeArgs) -> Result<ApiRequest> {
        check_prefilled(&args.prefilled_message)?;
        Ok(args.scope.post().segment(QR_SEGMENT).json(json!({
            "prefilled_message": args.prefilled_message,
            "generate_qr_image": args.generate_qr_image.to_string(),
        })))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQrCodeArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// New prefilled message
    pub prefilled_message: String,
    /// Code of the QR code to update
    pub code: String,
}

pub struct UpdateMessageQrCode;

impl Endpoint for UpdateMessageQrCode {
    type Args = UpdateQrCodeArgs;
    const NAME: &'static str = "update_message_qr_code";
    const DESCRIPTION: &'static str = "Update the prefilled message of a message QR code in WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while updating the message QR code.";

    fn request(args: UpdateQrCodeArgs) -> Result<ApiRequest> {
        check_prefilled(&args.prefilled_message)?;
        Ok(args.scope.post().segment(QR_SEGMENT).json(json!({
            "prefilled_message": args.prefilled_message,
            "code": args.code,
        })))
    }
}

pub struct GetAllQrCodes;

impl Endpoint for GetAllQrCodes {
    type Args = PhoneNumberScope;
    const NAME: &'static str = "get_all_qr_codes";
    const DESCRIPTION: &'static str = "Get all QR codes, with default fields, for a WhatsApp Business phone number.";
    const FAILURE: &'static str = "An error occurred while retrieving QR codes.";

    fn request(scope: PhoneNumberScope) -> Result<ApiRequest> {
        Ok(scope.get().segment(QR_SEGMENT))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeListArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Format of the returned image URLs
    #[serde(default)]
    pub image_format: QrImageFormat,
}

pub struct GetAllQrCodesWithFields;

impl Endpoint for GetAllQrCodesWithFields {
    type Args = QrCodeListArgs;
    const NAME: &'static str = "get_all_qr_codes_with_fields";
    const DESCRIPTION: &'static str =
        "Get all QR codes for a WhatsApp Business phone number with code, prefilled message and image URL.";
    const FAILURE: &'static str = "An error occurred while retrieving QR codes.";

    fn request(args: QrCodeListArgs) -> Result<ApiRequest> {
        Ok(args.scope.get().segment(QR_SEGMENT).query(
            "fields",
            format!("code,prefilled_message,qr_image_url.format({})", args.image_format),
        ))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// ID (code) of the QR code
    pub qr_code_id: String,
}

pub struct GetQrCode;

impl Endpoint for GetQrCode {
    type Args = QrCodeArgs;
    const NAME: &'static str = "get_qr_code";
    const DESCRIPTION: &'static str = "Retrieve a single QR code from the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while retrieving the QR code.";

    fn request(args: QrCodeArgs) -> Result<ApiRequest> {
        Ok(args.scope.get().segment(QR_SEGMENT).segment(args.qr_code_id))
    }
}

fn qr_image_request(args: QrCodeArgs, format: QrImageFormat) -> ApiRequest {
    args.scope
        .get()
        .segment(QR_SEGMENT)
        .query(
            "fields",
            format!("prefilled_message,deep_link_url,qr_image_url.format({format})"),
        )
        .query("code", args.qr_code_id)
}

pub struct GetQrCodePngUrl;

impl Endpoint for GetQrCodePngUrl {
    type Args = QrCodeArgs;
    const NAME: &'static str = "get_qr_code_png_url";
    const DESCRIPTION: &'static str = "Get the PNG image URL and deep link of a QR code from WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while retrieving the QR code PNG image URL.";

    fn request(args: QrCodeArgs) -> Result<ApiRequest> {
        Ok(qr_image_request(args, QrImageFormat::Png))
    }
}

pub struct GetQrCodeSvg;

impl Endpoint for GetQrCodeSvg {
    type Args = QrCodeArgs;
    const NAME: &'static str = "get_qr_code_svg";
    const DESCRIPTION: &'static str = "Get the SVG image URL and deep link of a QR code from WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while fetching the QR code SVG image URL.";

    fn request(args: QrCodeArgs) -> Result<ApiRequest> {
        Ok(qr_image_request(args, QrImageFormat::Svg))
    }
}

pub struct DeleteQrCode;

impl Endpoint for DeleteQrCode {
    type Args = QrCodeArgs;
    const NAME: &'static str = "delete_qr_code";
    const DESCRIPTION: &'static str = "Delete a QR code from the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while deleting the QR code.";

    fn request(args: QrCodeArgs) -> Result<ApiRequest> {
        Ok(args.scope.delete().segment(QR_SEGMENT).segment(args.qr_code_id))
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register::<CreateQrCode>();
    registry.register::<UpdateMessageQrCode>();
    registry.register::<GetAllQrCodes>();
    registry.register::<GetAllQrCodesWithFields>();
    registry.register::<GetQrCode>();
    registry.register::<GetQrCodePngUrl>();
    registry.register::<GetQrCodeSvg>();
    registry.register::<DeleteQrCode>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::EndpointTool;
    use reqwest::Method;

    #[test]
    fn test_create_qr_code_defaults_to_svg() {
        let req = EndpointTool::<CreateQrCode>::prepare(json!({
            "phoneNumberId": "100",
            "prefilledMessage": "Cyber Monday"
        }))
        .unwrap();

        assert_eq!(req.path(), "100/message_qrdls");
        assert_eq!(
            req.json_body().unwrap(),
            &json!({"prefilled_message": "Cyber Monday", "generate_qr_image": "SVG"})
        );
    }

    #[test]
    fn test_create_qr_code_rejects_bad_format() {
        let result = EndpointTool::<CreateQrCode>::prepare(json!({
            "phoneNumberId": "100",
            "prefilledMessage": "hi",
            "generateQrImage": "GIF"
        }));
        assert!(matches!(result, Err(CloudError::InvalidArguments(_))));
    }

    #[test]
    fn test_update_qr_code() {
        let req = EndpointTool::<UpdateMessageQrCode>::prepare(json!({
            "phoneNumberId": "100",
            "prefilledMessage": "New text",
            "code": "ABC"
        }))
        .unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.json_body().unwrap()["code"], "ABC");
    }

    #[test]
    fn test_list_with_fields() {
        let req = EndpointTool::<GetAllQrCodesWithFields>::prepare(json!({"phoneNumberId": "100", "imageFormat": "PNG"}))
            .unwrap();
        assert_eq!(req.query_value("fields"), Some("code,prefilled_message,qr_image_url.format(PNG)"));

        let req = EndpointTool::<GetAllQrCodes>::prepare(json!({"phoneNumberId": "100"})).unwrap();
        assert!(req.query.is_empty());
    }

    #[test]
    fn test_image_url_queries() {
        let req = EndpointTool::<GetQrCodePngUrl>::prepare(json!({"phoneNumberId": "100", "qrCodeId": "ABC"})).unwrap();
        assert_eq!(
            req.query_value("fields"),
            Some("prefilled_message,deep_link_url,qr_image_url.format(PNG)")
        );
        assert_eq!(req.query_value("code"), Some("ABC"));

        let req = EndpointTool::<GetQrCodeSvg>::prepare(json!({"phoneNumberId": "100", "qrCodeId": "ABC"})).unwrap();
        assert!(req.query_value("fields").unwrap().ends_with("format(SVG)"));
    }

    #[test]
    fn test_single_code_paths() {
        let req = EndpointTool::<GetQrCode>::prepare(json!({"phoneNumberId": "100", "qrCodeId": "ABC"})).unwrap();
        assert_eq!((req.method.clone(), req.path()), (Method::GET, "100/message_qrdls/ABC".to_string()));

        let req = EndpointTool::<DeleteQrCode>::prepare(json!({"phoneNumberId": "100", "qrCodeId": "ABC"})).unwrap();
        assert_eq!((req.method.clone(), req.path()), (Method::DELETE, "100/message_qrdls/ABC".to_string()));
    }
}
