//! Path scopes shared by endpoint arguments
//!
//! Most endpoints hang off one Graph object (phone number, WABA, flow,
//! business). Each scope carries that object's ID plus the optional API
//! version and is flattened into the endpoint's argument struct.

use reqwest::Method;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::client::ApiRequest;

macro_rules! path_scope {
    ($(#[$meta:meta])* $name:ident, $field:ident, $doc:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[doc = $doc]
            pub $field: String,
            /// Graph API version such as v19.0; the configured default is used when omitted
            #[serde(default)]
            pub version: Option<String>,
        }

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self {
                    $field: id.into(),
                    version: None,
                }
            }

            /// Request rooted at this object: `{version}/{id}`
            pub fn request(self, method: Method) -> ApiRequest {
                ApiRequest::new(method).version(self.version).segment(self.$field)
            }

            pub fn get(self) -> ApiRequest {
                self.request(Method::GET)
            }

            pub fn post(self) -> ApiRequest {
                self.request(Method::POST)
            }

            pub fn put(self) -> ApiRequest {
                self.request(Method::PUT)
            }

            pub fn delete(self) -> ApiRequest {
                self.request(Method::DELETE)
            }
        }
    };
}

path_scope!(
    /// Scope for endpoints under a business phone number
    PhoneNumberScope,
    phone_number_id,
    "ID of the WhatsApp business phone number"
);

path_scope!(
    /// Scope for endpoints under a WhatsApp Business Account
    WabaScope,
    waba_id,
    "ID of the WhatsApp Business Account (WABA)"
);

path_scope!(
    /// Scope for endpoints under a flow
    FlowScope,
    flow_id,
    "ID of the flow"
);

path_scope!(
    /// Scope for endpoints under a business portfolio
    BusinessScope,
    business_id,
    "ID of the business portfolio"
);

/// Version-only scope for endpoints addressed by a free-standing object ID
#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct VersionScope {
    /// Graph API version such as v19.0; the configured default is used when omitted
    #[serde(default)]
    pub version: Option<String>,
}

impl VersionScope {
    /// Request rooted at an arbitrary object: `{version}/{object_id}`
    pub fn object(self, method: Method, object_id: impl Into<String>) -> ApiRequest {
        ApiRequest::new(method).version(self.version).segment(object_id)
    }
}
