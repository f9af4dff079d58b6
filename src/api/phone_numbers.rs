//! Phone number registration, verification and lookup

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use super::scope::{PhoneNumberScope, WabaScope};
use crate::client::ApiRequest;
use crate::error::{CloudError, Result};
use crate::tools::{Endpoint, ToolRegistry};

const PHONE_NUMBER_FIELDS: &str = "id,is_official_business_account,display_phone_number,verified_name";

fn check_pin(pin: &str) -> Result<()> {
    if pin.len() != 6 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(CloudError::InvalidArguments("pin must be exactly 6 digits".to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// 6-digit two-step verification PIN
    pub pin: String,
}

pub struct RegisterPhoneNumber;

impl Endpoint for RegisterPhoneNumber {
    type Args = RegisterArgs;
    const NAME: &'static str = "register_phone_number";
    const DESCRIPTION: &'static str = "Register a phone number with the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while registering the phone number.";

    fn request(args: RegisterArgs) -> Result<ApiRequest> {
        check_pin(&args.pin)?;
        Ok(args
            .scope
            .post()
            .segment("register")
            .json(json!({ "messaging_product": "whatsapp", "pin": args.pin })))
    }
}

pub struct DeregisterPhone;

impl Endpoint for DeregisterPhone {
    type Args = PhoneNumberScope;
    const NAME: &'static str = "deregister_phone";
    const DESCRIPTION: &'static str = "Deregister a phone number from the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while deregistering the phone.";

    fn request(scope: PhoneNumberScope) -> Result<ApiRequest> {
        Ok(scope.post().segment("deregister"))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrateAccountArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// 6-digit two-step verification PIN
    pub pin: String,
    /// Backup data exported from the on-premises deployment
    pub backup_data: String,
    /// Password used with the on-premises backup API
    pub backup_password: String,
}

pub struct MigrateAccount;

impl Endpoint for MigrateAccount {
    type Args = MigrateAccountArgs;
    const NAME: &'static str = "migrate_account";
    const DESCRIPTION: &'static str = "Migrate an on-premises WhatsApp account to the Cloud API.";
    const FAILURE: &'static str = "An error occurred while migrating the account.";

    fn request(args: MigrateAccountArgs) -> Result<ApiRequest> {
        check_pin(&args.pin)?;
        Ok(args.scope.post().segment("register").json(json!({
            "messaging_product": "whatsapp",
            "pin": args.pin,
            "backup": { "data": args.backup_data, "password": args.backup_password },
        })))
    }
}

fn default_code_method() -> String {
    "SMS".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestCodeArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// SMS or VOICE
    #[serde(default = "default_code_method")]
    pub code_method: String,
    /// Language of the verification message
    #[serde(default = "default_locale")]
    pub locale: String,
}

pub struct RequestVerificationCode;

impl Endpoint for RequestVerificationCode {
    type Args = RequestCodeArgs;
    const NAME: &'static str = "request_verification_code";
    const DESCRIPTION: &'static str = "Request a verification code for a phone number using the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while requesting the verification code.";

    fn request(args: RequestCodeArgs) -> Result<ApiRequest> {
        let method = args.code_method.to_ascii_uppercase();
        if method != "SMS" && method != "VOICE" {
            return Err(CloudError::InvalidArguments(format!(
                "codeMethod must be SMS or VOICE, got {}",
                args.code_method
            )));
        }
        Ok(args
            .scope
            .post()
            .segment("request_code")
            .json(json!({ "code_method": method, "locale": args.locale })))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Code received by SMS or voice call
    pub code: String,
}

pub struct VerifyCode;

impl Endpoint for VerifyCode {
    type Args = VerifyCodeArgs;
    const NAME: &'static str = "verify_code";
    const DESCRIPTION: &'static str = "Verify the code received for a WhatsApp Cloud API phone number.";
    const FAILURE: &'static str = "An error occurred while verifying the code.";

    fn request(args: VerifyCodeArgs) -> Result<ApiRequest> {
        Ok(args.scope.post().segment("verify_code").json(json!({ "code": args.code })))
    }
}

pub struct GetPhoneNumberById;

impl Endpoint for GetPhoneNumberById {
    type Args = PhoneNumberScope;
    const NAME: &'static str = "get_phone_number_by_id";
    const DESCRIPTION: &'static str = "Get details of a phone number by its ID from the WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while retrieving the phone number.";

    fn request(scope: PhoneNumberScope) -> Result<ApiRequest> {
        Ok(scope.get())
    }
}

pub struct GetPhoneNumberId;

impl Endpoint for GetPhoneNumberId {
    type Args = WabaScope;
    const NAME: &'static str = "get_phone_number_id";
    const DESCRIPTION: &'static str =
        "Get the phone number IDs associated with a WhatsApp Business Account (WABA).";
    const FAILURE: &'static str = "An error occurred while getting the phone number ID.";

    fn request(scope: WabaScope) -> Result<ApiRequest> {
        Ok(scope.get().segment("phone_numbers"))
    }
}

fn default_account_mode() -> String {
    "SANDBOX".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberFilterArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// Account mode to match: SANDBOX or LIVE
    #[serde(default = "default_account_mode")]
    pub account_mode: String,
}

pub struct GetPhoneNumbers;

impl Endpoint for GetPhoneNumbers {
    type Args = PhoneNumberFilterArgs;
    const NAME: &'static str = "get_phone_numbers";
    const DESCRIPTION: &'static str =
        "Retrieve phone numbers of a WhatsApp Business Account, filtered by account mode.";
    const FAILURE: &'static str = "An error occurred while retrieving phone numbers.";

    fn request(args: PhoneNumberFilterArgs) -> Result<ApiRequest> {
        let filtering = json!([{ "field": "account_mode", "operator": "EQUAL", "value": args.account_mode }]);
        Ok(args
            .scope
            .get()
            .segment("phone_numbers")
            .query("fields", PHONE_NUMBER_FIELDS)
            .query("filtering", filtering))
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register::<RegisterPhoneNumber>();
    registry.register::<DeregisterPhone>();
    registry.register::<MigrateAccount>();
    registry.register::<RequestVerificationCode>();
    registry.register::<VerifyCode>();
    registry.register::<GetPhoneNumberById>();
    registry.register::<GetPhoneNumberId>();
    registry.register::<GetPhoneNumbers>();
}
