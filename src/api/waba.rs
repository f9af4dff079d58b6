//! WABA webhook subscriptions and analytics

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use super::scope::WabaScope;
use crate::client::ApiRequest;
use crate::error::{CloudError, Result};
use crate::tools::{Endpoint, ToolRegistry};

const SUBSCRIBED_APPS: &str = "subscribed_apps";

pub struct SubscribeToWaba;

impl Endpoint for SubscribeToWaba {
    type Args = WabaScope;
    const NAME: &'static str = "subscribe_to_waba";
    const DESCRIPTION: &'static str = "Subscribe your app to webhooks of a WhatsApp Business Account (WABA).";
    const FAILURE: &'static str = "An error occurred while subscribing to the WhatsApp Business Account.";

    fn request(scope: WabaScope) -> Result<ApiRequest> {
        Ok(scope.post().segment(SUBSCRIBED_APPS))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverrideCallbackArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// Alternate webhook endpoint URL
    pub override_callback_uri: String,
    /// Verification token for the alternate endpoint
    pub verify_token: String,
}

pub struct OverrideCallbackUrl;

impl Endpoint for OverrideCallbackUrl {
    type Args = OverrideCallbackArgs;
    const NAME: &'static str = "override_callback_url";
    const DESCRIPTION: &'static str = "Override the webhook callback URL of a WhatsApp Business Account.";
    const FAILURE: &'static str = "An error occurred while overriding the callback URL.";

    fn request(args: OverrideCallbackArgs) -> Result<ApiRequest> {
        if !args.override_callback_uri.starts_with("https://") {
            return Err(CloudError::InvalidArguments(
                "overrideCallbackUri must be an https URL".to_string(),
            ));
        }
        Ok(args.scope.post().segment(SUBSCRIBED_APPS).json(json!({
            "override_callback_uri": args.override_callback_uri,
            "verify_token": args.verify_token,
        })))
    }
}

pub struct GetAllSubscriptionsForWaba;

impl Endpoint for GetAllSubscriptionsForWaba {
    type Args = WabaScope;
    const NAME: &'static str = "get_all_subscriptions_for_waba";
    const DESCRIPTION: &'static str = "Get all app subscriptions for a WhatsApp Business Account (WABA).";
    const FAILURE: &'static str = "An error occurred while getting subscriptions for WABA.";

    fn request(scope: WabaScope) -> Result<ApiRequest> {
        Ok(scope.get().segment(SUBSCRIBED_APPS))
    }
}

pub struct UnsubscribeFromWaba;

impl Endpoint for UnsubscribeFromWaba {
    type Args = WabaScope;
    const NAME: &'static str = "unsubscribe_from_waba";
    const DESCRIPTION: &'static str = "Unsubscribe your app from a WhatsApp Business Account (WABA).";
    const FAILURE: &'static str = "An error occurred while unsubscribing from the WABA.";

    fn request(scope: WabaScope) -> Result<ApiRequest> {
        Ok(scope.delete().segment(SUBSCRIBED_APPS))
    }
}

fn check_window(start: u64, end: u64) -> Result<()> {
    if start >= end {
        return Err(CloudError::InvalidArguments(format!(
            "start ({start}) must be before end ({end})"
        )));
    }
    Ok(())
}

fn day() -> String {
    "DAY".to_string()
}

fn monthly() -> String {
    "MONTHLY".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// Start of the window, UNIX timestamp in seconds
    pub start: u64,
    /// End of the window, UNIX timestamp in seconds
    pub end: u64,
    /// Two-letter country codes to include
    pub country_codes: Vec<String>,
    /// Business phone numbers to include; all when empty
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    /// HALF_HOUR, DAY or MONTH
    #[serde(default = "day")]
    pub granularity: String,
}

pub struct GetAnalytics;

impl Endpoint for GetAnalytics {
    type Args = AnalyticsArgs;
    const NAME: &'static str = "get_analytics";
    const DESCRIPTION: &'static str = "Get sent and delivered message analytics for a WhatsApp Business Account.";
    const FAILURE: &'static str = "An error occurred while fetching analytics.";

    fn request(args: AnalyticsArgs) -> Result<ApiRequest> {
        check_window(args.start, args.end)?;
        let field = format!(
            "analytics.start({}).end({}).granularity({}).phone_numbers({}).country_codes({})",
            args.start,
            args.end,
            args.granularity,
            serde_json::to_string(&args.phone_numbers)?,
            serde_json::to_string(&args.country_codes)?,
        );
        Ok(args.scope.get().query("fields", field))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAnalyticsArgs {
    #[serde(flatten)]
    pub scope: WabaScope,
    /// Start of the window, UNIX timestamp in seconds
    pub start: u64,
    /// End of the window, UNIX timestamp in seconds
    pub end: u64,
    /// HALF_HOUR, DAILY or MONTHLY
    #[serde(default = "monthly")]
    pub granularity: String,
}

pub struct GetConversationAnalytics;

impl Endpoint for GetConversationAnalytics {
    type Args = ConversationAnalyticsArgs;
    const NAME: &'static str = "get_conversation_analytics";
    const DESCRIPTION: &'static str =
        "Get business-initiated conversation analytics, by conversation type and direction, for a WhatsApp Business Account.";
    const FAILURE: &'static str = "An error occurred while getting conversation analytics.";

    fn request(args: ConversationAnalyticsArgs) -> Result<ApiRequest> {
        check_window(args.start, args.end)?;
        let field = format!(
            "conversation_analytics.start({}).end({}).granularity({})\
.conversation_directions([\"business_initiated\"])\
.dimensions([\"conversation_type\", \"conversation_direction\"])",
            args.start, args.end, args.granularity,
        );
        Ok(args.scope.get().query("fields", field))
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register::<SubscribeToWaba>();
    registry.register::<OverrideCallbackUrl>();
    registry.register::<GetAllSubscriptionsForWaba>();
    registry.register::<UnsubscribeFromWaba>();
    registry.register::<GetAnalytics>();
    registry.register::<GetConversationAnalytics>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::EndpointTool;
    use reqwest::Method;

    #[test]
    fn test_subscription_methods() {
        let input = json!({"wabaId": "w1"});
        let sub = EndpointTool::<SubscribeToWaba>::prepare(input.clone()).unwrap();
        let list = EndpointTool::<GetAllSubscriptionsForWaba>::prepare(input.clone()).unwrap();
        let unsub = EndpointTool::<UnsubscribeFromWaba>::prepare(input).unwrap();

        assert_eq!(sub.method, Method::POST);
        assert_eq!(list.method, Method::GET);
        assert_eq!(unsub.method, Method::DELETE);
        for req in [&sub, &list, &unsub] {
            assert_eq!(req.path(), "w1/subscribed_apps");
            assert!(req.json_body().is_none());
        }
    }

    #[test]
    fn test_override_callback_url() {
        let req = EndpointTool::<OverrideCallbackUrl>::prepare(json!({
            "wabaId": "w1",
            "overrideCallbackUri": "https://hooks.example.com/wa",
            "verifyToken": "s3cret"
        }))
        .unwrap();
        assert_eq!(
            req.json_body().unwrap(),
            &json!({"override_callback_uri": "https://hooks.example.com/wa", "verify_token": "s3cret"})
        );

        let result = EndpointTool::<OverrideCallbackUrl>::prepare(json!({
            "wabaId": "w1",
            "overrideCallbackUri": "http://insecure",
            "verifyToken": "s3cret"
        }));
        assert!(matches!(result, Err(CloudError::InvalidArguments(_))));
    }

    #[test]
    fn test_analytics_field() {
        let req = EndpointTool::<GetAnalytics>::prepare(json!({
            "wabaId": "w1",
            "start": 1693506000,
            "end": 1706119320,
            "countryCodes": ["US", "BR"]
        }))
        .unwrap();

        assert_eq!(req.path(), "w1");
        assert_eq!(
            req.query_value("fields"),
            Some("analytics.start(1693506000).end(1706119320).granularity(DAY).phone_numbers([]).country_codes([\"US\",\"BR\"])")
        );
    }

    #[test]
    fn test_conversation_analytics_field() {
        let req = EndpointTool::<GetConversationAnalytics>::prepare(json!({
            "wabaId": "w1",
            "start": 1685602800,
            "end": 1688194800
        }))
        .unwrap();

        let fields = req.query_value("fields").unwrap();
        assert!(fields.starts_with("conversation_analytics.start(1685602800).end(1688194800).granularity(MONTHLY)"));
        assert!(fields.contains(".conversation_directions([\"business_initiated\"])"));
        assert!(fields.ends_with(".dimensions([\"conversation_type\", \"conversation_direction\"])"));
    }

    #[test]
    fn test_analytics_window_order() {
        let result = EndpointTool::<GetConversationAnalytics>::prepare(json!({
            "wabaId": "w1",
            "start": 20,
            "end": 10
        }));
        assert!(matches!(result, Err(CloudError::InvalidArguments(_))));
    }
}
