//! Business profile, compliance, commerce settings, encryption, user blocking and portfolio

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::messages::put_opt;
use super::scope::{BusinessScope, PhoneNumberScope};
use crate::client::ApiRequest;
use crate::error::{CloudError, Result};
use crate::tools::{Endpoint, ToolRegistry};

const PORTFOLIO_FIELDS: &str = "id,name,timezone_id";

/// Endpoints that are a bare GET on a sub-resource of their scope
macro_rules! scoped_get {
    ($ty:ident, $scope:ty, $name:literal, $segment:literal, $desc:literal, $failure:literal) => {
        pub struct $ty;

        impl Endpoint for $ty {
            type Args = $scope;
            const NAME: &'static str = $name;
            const DESCRIPTION: &'static str = $desc;
            const FAILURE: &'static str = $failure;

            fn request(scope: $scope) -> Result<ApiRequest> {
                Ok(scope.get().segment($segment))
            }
        }
    };
}

scoped_get!(
    GetBusinessProfile,
    PhoneNumberScope,
    "get_business_profile",
    "whatsapp_business_profile",
    "Get the business profile (about, address, description, email, websites, vertical) of a phone number.",
    "An error occurred while retrieving the business profile."
);
scoped_get!(
    GetBusinessComplianceInfo,
    PhoneNumberScope,
    "get_business_compliance_info",
    "business_compliance_info",
    "Get India-based business compliance information from WhatsApp Cloud API.",
    "An error occurred while fetching business compliance info."
);
scoped_get!(
    GetCommerceSettings,
    PhoneNumberScope,
    "get_commerce_settings",
    "whatsapp_commerce_settings",
    "Get commerce settings (cart and catalog visibility) for a WhatsApp Business phone number.",
    "An error occurred while getting commerce settings."
);
scoped_get!(
    GetEncryptionPublicKey,
    PhoneNumberScope,
    "get_encryption_public_key",
    "whatsapp_business_encryption",
    "Get the business encryption public key used for flow data channel requests.",
    "An error occurred while getting the encryption public key."
);
scoped_get!(
    GetBlockedUsers,
    PhoneNumberScope,
    "get_blocked_users",
    "block_users",
    "Get blocked users from the WhatsApp Cloud API.",
    "An error occurred while getting blocked users."
);
scoped_get!(
    GetOwnedWabas,
    BusinessScope,
    "get_owned_wabas",
    "owned_whatsapp_business_accounts",
    "Get the WhatsApp Business Accounts (WABAs) owned by a business portfolio.",
    "An error occurred while getting owned WABAs."
);
scoped_get!(
    GetSharedWabas,
    BusinessScope,
    "get_shared_wabas",
    "client_whatsapp_business_accounts",
    "Get the WhatsApp Business Accounts (WABAs) shared with a business portfolio.",
    "An error occurred while retrieving shared WABAs."
);

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Text of the profile's About section
    pub about: Option<String>,
    /// Business address
    pub address: Option<String>,
    /// Business description
    pub description: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Industry, e.g. RETAIL, EDU or PROF_SERVICES
    pub vertical: Option<String>,
    /// Up to two website URLs
    pub websites: Option<Vec<String>>,
    /// Handle of an uploaded profile picture (from upload_file)
    pub profile_picture_handle: Option<String>,
}

pub struct UpdateBusinessProfile;

impl Endpoint for UpdateBusinessProfile {
    type Args = UpdateProfileArgs;
    const NAME: &'static str = "update_business_profile";
    const DESCRIPTION: &'static str = "Update the business profile on WhatsApp Cloud API. Only the given fields change.";
    const FAILURE: &'static str = "An error occurred while updating the business profile.";

    fn request(args: UpdateProfileArgs) -> Result<ApiRequest> {
        if args.websites.as_ref().is_some_and(|w| w.len() > 2) {
            return Err(CloudError::InvalidArguments("at most two websites are allowed".to_string()));
        }
        let mut body = json!({ "messaging_product": "whatsapp" });
        put_opt(&mut body, "about", args.about);
        put_opt(&mut body, "address", args.address);
        put_opt(&mut body, "description", args.description);
        put_opt(&mut body, "email", args.email);
        put_opt(&mut body, "vertical", args.vertical);
        put_opt(&mut body, "websites", args.websites);
        put_opt(&mut body, "profile_picture_handle", args.profile_picture_handle);
        if body.as_object().is_some_and(|o| o.len() == 1) {
            return Err(CloudError::InvalidArguments("no profile fields to update".to_string()));
        }
        Ok(args.scope.post().segment("whatsapp_business_profile").json(body))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrievanceOfficer {
    /// Full name of the grievance officer
    pub name: String,
    /// Officer's contact email
    pub email: String,
    /// Officer's landline number with country code
    pub landline_number: String,
    /// Officer's mobile number with country code
    pub mobile_number: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCare {
    /// Customer care email
    pub email: String,
    /// Customer care landline number with country code
    pub landline_number: String,
    /// Customer care mobile number with country code
    pub mobile_number: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceInfoArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Legal name of the entity
    pub entity_name: String,
    /// Entity type, e.g. LLP, PRIVATE_COMPANY, SOLE_PROPRIETORSHIP
    pub entity_type: String,
    /// Whether the entity is registered
    pub is_registered: bool,
    /// Contact details of the grievance officer
    pub grievance_officer_details: GrievanceOfficer,
    /// Contact details of customer care
    pub customer_care_details: CustomerCare,
}

pub struct AddBusinessComplianceInfo;

impl Endpoint for AddBusinessComplianceInfo {
    type Args = ComplianceInfoArgs;
    const NAME: &'static str = "add_business_compliance_info";
    const DESCRIPTION: &'static str = "Add India-based business compliance information to WhatsApp.";
    const FAILURE: &'static str = "An error occurred while adding business compliance info.";

    fn request(args: ComplianceInfoArgs) -> Result<ApiRequest> {
        let officer = args.grievance_officer_details;
        let care = args.customer_care_details;
        let body = json!({
            "messaging_product": "whatsapp",
            "entity_name": args.entity_name,
            "entity_type": args.entity_type,
            "is_registered": args.is_registered,
            "grievance_officer_details": {
                "name": officer.name,
                "email": officer.email,
                "landline_number": officer.landline_number,
                "mobile_number": officer.mobile_number,
            },
            "customer_care_details": {
                "email": care.email,
                "landline_number": care.landline_number,
                "mobile_number": care.mobile_number,
            },
        });
        Ok(args.scope.post().segment("business_compliance_info").json(body))
    }
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommerceSettingsArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Enable the shopping cart
    #[serde(default = "enabled")]
    pub is_cart_enabled: bool,
    /// Show the catalog storefront icon
    #[serde(default = "enabled")]
    pub is_catalog_visible: bool,
}

pub struct SetUpdateCommerceSettings;

impl Endpoint for SetUpdateCommerceSettings {
    type Args = CommerceSettingsArgs;
    const NAME: &'static str = "set_update_commerce_settings";
    const DESCRIPTION: &'static str = "Set or update commerce settings (cart and catalog visibility) for a WhatsApp Business phone number.";
    const FAILURE: &'static str = "An error occurred while updating commerce settings.";

    fn request(args: CommerceSettingsArgs) -> Result<ApiRequest> {
        Ok(args
            .scope
            .post()
            .segment("whatsapp_commerce_settings")
            .query("is_cart_enabled", args.is_cart_enabled)
            .query("is_catalog_visible", args.is_catalog_visible))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionKeyArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// 2048-bit RSA public key in PEM format
    pub business_public_key: String,
}

pub struct SetEncryptionPublicKey;

impl Endpoint for SetEncryptionPublicKey {
    type Args = EncryptionKeyArgs;
    const NAME: &'static str = "set_encryption_public_key";
    const DESCRIPTION: &'static str = "Set the business encryption public key used for flow data channel requests.";
    const FAILURE: &'static str = "An error occurred while setting the encryption public key.";

    fn request(args: EncryptionKeyArgs) -> Result<ApiRequest> {
        Ok(args
            .scope
            .post()
            .segment("whatsapp_business_encryption")
            .json(json!({ "business_public_key": args.business_public_key })))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockUsersArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Phone numbers or WhatsApp IDs of the users
    pub users: Vec<String>,
}

impl BlockUsersArgs {
    fn body(&self) -> Result<Value> {
        if self.users.is_empty() {
            return Err(CloudError::InvalidArguments("users must not be empty".to_string()));
        }
        let users: Vec<Value> = self.users.iter().map(|u| json!({ "user": u })).collect();
        Ok(json!({ "messaging_product": "whatsapp", "block_users": users }))
    }
}

pub struct BlockUsers;

impl Endpoint for BlockUsers {
    type Args = BlockUsersArgs;
    const NAME: &'static str = "block_users";
    const DESCRIPTION: &'static str = "Block one or more users on WhatsApp.";
    const FAILURE: &'static str = "An error occurred while blocking users.";

    fn request(args: BlockUsersArgs) -> Result<ApiRequest> {
        let body = args.body()?;
        Ok(args.scope.post().segment("block_users").json(body))
    }
}

pub struct UnblockUsers;

impl Endpoint for UnblockUsers {
    type Args = BlockUsersArgs;
    const NAME: &'static str = "unblock_users";
    const DESCRIPTION: &'static str = "Unblock one or more users on WhatsApp.";
    const FAILURE: &'static str = "An error occurred while unblocking users.";

    fn request(args: BlockUsersArgs) -> Result<ApiRequest> {
        let body = args.body()?;
        Ok(args.scope.delete().segment("block_users").json(body))
    }
}

pub struct GetBusinessPortfolio;

impl Endpoint for GetBusinessPortfolio {
    type Args = BusinessScope;
    const NAME: &'static str = "get_business_portfolio";
    const DESCRIPTION: &'static str = "Get the ID, name and timezone of a business portfolio.";
    const FAILURE: &'static str = "An error occurred while fetching the business portfolio.";

    fn request(scope: BusinessScope) -> Result<ApiRequest> {
        Ok(scope.get().query("fields", PORTFOLIO_FIELDS))
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register::<GetBusinessProfile>();
    registry.register::<UpdateBusinessProfile>();
    registry.register::<AddBusinessComplianceInfo>();
    registry.register::<GetBusinessComplianceInfo>();
    registry.register::<GetCommerceSettings>();
    registry.register::<SetUpdateCommerceSettings>();
    registry.register::<GetEncryptionPublicKey>();
    registry.register::<SetEncryptionPublicKey>();
    registry.register::<BlockUsers>();
    registry.register::<UnblockUsers>();
    registry.register::<GetBlockedUsers>();
    registry.register::<GetBusinessPortfolio>();
    registry.register::<GetOwnedWabas>();
    registry.register::<GetSharedWabas>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{EndpointTool, Tool};
    use reqwest::Method;

    #[test]
    fn test_update_profile_sends_only_given_fields() {
        let req = EndpointTool::<UpdateBusinessProfile>::prepare(json!({
            "phoneNumberId": "100",
            "about": "Open 9-5",
            "websites": ["https://example.com"]
        }))
        .unwrap();

        assert_eq!(req.path(), "100/whatsapp_business_profile");
        assert_eq!(
            req.json_body().unwrap(),
            &json!({"messaging_product": "whatsapp", "about": "Open 9-5", "websites": ["https://example.com"]})
        );
    }

    #[test]
    fn test_update_profile_validation() {
        let result = EndpointTool::<UpdateBusinessProfile>::prepare(json!({"phoneNumberId": "100"}));
        assert!(matches!(result, Err(CloudError::InvalidArguments(_))));

        let result = EndpointTool::<UpdateBusinessProfile>::prepare(json!({
            "phoneNumberId": "100",
            "websites": ["a", "b", "c"]
        }));
        assert!(matches!(result, Err(CloudError::InvalidArguments(_))));
    }

    #[test]
    fn test_compliance_info_wire_names() {
        let req = EndpointTool::<AddBusinessComplianceInfo>::prepare(json!({
            "phoneNumberId": "100",
            "entityName": "Acme",
            "entityType": "LLP",
            "isRegistered": true,
            "grievanceOfficerDetails": {
                "name": "Asha",
                "email": "asha@example.com",
                "landlineNumber": "+911",
                "mobileNumber": "+912"
            },
            "customerCareDetails": {
                "email": "care@example.com",
                "landlineNumber": "+913",
                "mobileNumber": "+914"
            }
        }))
        .unwrap();

        let body = req.json_body().unwrap();
        assert_eq!(body["grievance_officer_details"]["landline_number"], "+911");
        assert_eq!(body["customer_care_details"]["mobile_number"], "+914");
        assert_eq!(body["is_registered"], true);
    }

    #[test]
    fn test_compliance_contact_fields_are_described() {
        let schema = EndpointTool::<AddBusinessComplianceInfo>::new().input_schema();
        for (group, fields) in [
            ("grievanceOfficerDetails", &["name", "email", "landlineNumber", "mobileNumber"][..]),
            ("customerCareDetails", &["email", "landlineNumber", "mobileNumber"][..]),
        ] {
            let group_schema = &schema["properties"][group];
            assert!(group_schema["description"].is_string(), "{group}");
            for field in fields {
                assert!(group_schema["properties"][field]["description"].is_string(), "{group}.{field}");
            }
        }
    }

    #[test]
    fn test_commerce_settings_flags() {
        let req = EndpointTool::<SetUpdateCommerceSettings>::prepare(json!({
            "phoneNumberId": "100",
            "isCatalogVisible": false
        }))
        .unwrap();

        assert!(req.json_body().is_none());
        assert_eq!(req.query_value("is_cart_enabled"), Some("true"));
        assert_eq!(req.query_value("is_catalog_visible"), Some("false"));
    }

    #[test]
    fn test_block_and_unblock() {
        let input = json!({"phoneNumberId": "100", "users": ["1555", "1666"]});
        let block = EndpointTool::<BlockUsers>::prepare(input.clone()).unwrap();
        let unblock = EndpointTool::<UnblockUsers>::prepare(input).unwrap();

        assert_eq!(block.method, Method::POST);
        assert_eq!(unblock.method, Method::DELETE);
        assert_eq!(block.json_body(), unblock.json_body());
        assert_eq!(block.json_body().unwrap()["block_users"][1], json!({"user": "1666"}));

        let result = EndpointTool::<BlockUsers>::prepare(json!({"phoneNumberId": "100", "users": []}));
        assert!(matches!(result, Err(CloudError::InvalidArguments(_))));
    }

    #[test]
    fn test_business_scope_endpoints() {
        let req = EndpointTool::<GetBusinessPortfolio>::prepare(json!({"businessId": "b1"})).unwrap();
        assert_eq!(req.path(), "b1");
        assert_eq!(req.query_value("fields"), Some(PORTFOLIO_FIELDS));

        let req = EndpointTool::<GetOwnedWabas>::prepare(json!({"businessId": "b1"})).unwrap();
        assert_eq!(req.path(), "b1/owned_whatsapp_business_accounts");

        let req = EndpointTool::<GetSharedWabas>::prepare(json!({"businessId": "b1"})).unwrap();
        assert_eq!(req.path(), "b1/client_whatsapp_business_accounts");
    }

    #[test]
    fn test_encryption_key() {
        let req = EndpointTool::<SetEncryptionPublicKey>::prepare(json!({
            "phoneNumberId": "100",
            "businessPublicKey": "-----BEGIN PUBLIC KEY-----"
        }))
        .unwrap();
        assert_eq!(req.path(), "100/whatsapp_business_encryption");
        assert_eq!(req.json_body().unwrap()["business_public_key"], "-----BEGIN PUBLIC KEY-----");
    }
}
