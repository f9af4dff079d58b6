//! Catalog, product and order messages

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::templates::template;
use super::{OutgoingMessage, put_opt, text_block};
use crate::api::scope::PhoneNumberScope;
use crate::client::ApiRequest;
use crate::error::{CloudError, Result};
use crate::tools::{Endpoint, ToolRegistry};

/// Amounts are sent as integers with an implied offset of 100 (cents)
const AMOUNT_OFFSET: i64 = 100;

const DEFAULT_CATALOG_BODY: &str =
    "Hello! Thanks for your interest. Ordering is easy. Just visit our catalog and add items to purchase.";
const DEFAULT_CATALOG_FOOTER: &str = "Best grocery deals on WhatsApp!";
const DEFAULT_CATALOG_TEMPLATE: &str = "intro_catalog_offer";

fn default_catalog_body() -> String {
    DEFAULT_CATALOG_BODY.to_string()
}

fn default_catalog_footer() -> String {
    DEFAULT_CATALOG_FOOTER.to_string()
}

fn default_catalog_template() -> String {
    DEFAULT_CATALOG_TEMPLATE.to_string()
}

fn default_catalog_template_params() -> Vec<String> {
    vec!["100".to_string(), "400".to_string(), "3".to_string()]
}

fn default_language() -> String {
    "en_US".to_string()
}

fn amount(value: i64) -> Value {
    json!({ "value": value, "offset": AMOUNT_OFFSET })
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMessageArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Body text shown above the catalog button
    #[serde(default = "default_catalog_body")]
    pub body_text: String,
    /// Footer text
    #[serde(default = "default_catalog_footer")]
    pub footer_text: String,
    /// Retailer ID of the product used as the catalog thumbnail
    pub thumbnail_product_retailer_id: Option<String>,
}

pub struct SendCatalogMessage;

impl Endpoint for SendCatalogMessage {
    type Args = CatalogMessageArgs;
    const NAME: &'static str = "send_catalog_message";
    const DESCRIPTION: &'static str = "Send a catalog message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the catalog message.";

    fn request(args: CatalogMessageArgs) -> Result<ApiRequest> {
        let mut action = json!({ "name": "catalog_message" });
        if let Some(retailer_id) = args.thumbnail_product_retailer_id {
            action["parameters"] = json!({ "thumbnail_product_retailer_id": retailer_id });
        }
        let interactive = json!({
            "type": "catalog_message",
            "body": text_block(args.body_text),
            "action": action,
            "footer": text_block(args.footer_text),
        });
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "interactive", interactive).send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTemplateArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Name of an approved catalog template
    #[serde(default = "default_catalog_template")]
    pub template_name: String,
    /// Template language code
    #[serde(default = "default_language")]
    pub language_code: String,
    /// Text values for the template body placeholders, in order
    #[serde(default = "default_catalog_template_params")]
    pub body_parameters: Vec<String>,
    /// Retailer ID of the product used as the catalog thumbnail
    pub thumbnail_product_retailer_id: Option<String>,
}

pub struct SendCatalogTemplateMessage;

impl Endpoint for SendCatalogTemplateMessage {
    type Args = CatalogTemplateArgs;
    const NAME: &'static str = "send_catalog_template_message";
    const DESCRIPTION: &'static str = "Send a catalog template message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the message.";

    fn request(args: CatalogTemplateArgs) -> Result<ApiRequest> {
        let body_params: Vec<Value> = args
            .body_parameters
            .into_iter()
            .map(|text| json!({ "type": "text", "text": text }))
            .collect();

        let mut action = json!({});
        put_opt(&mut action, "thumbnail_product_retailer_id", args.thumbnail_product_retailer_id);

        let mut content = template(args.template_name, args.language_code);
        content["components"] = json!([
            { "type": "body", "parameters": body_params },
            {
                "type": "button",
                "sub_type": "CATALOG",
                "index": 0,
                "parameters": [{ "type": "action", "action": action }]
            }
        ]);
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "template", content).send_from(args.scope))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SingleProductArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// Optional body text
    pub body_text: Option<String>,
    /// Optional footer text
    pub footer_text: Option<String>,
    /// ID of the catalog holding the product
    pub catalog_id: String,
    /// Retailer ID (SKU) of the product
    pub product_retailer_id: String,
}

pub struct SendSingleProductMessage;

impl Endpoint for SendSingleProductMessage {
    type Args = SingleProductArgs;
    const NAME: &'static str = "send_single_product_message";
    const DESCRIPTION: &'static str = "Send a single product message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the product message.";

    fn request(args: SingleProductArgs) -> Result<ApiRequest> {
        let mut interactive = json!({
            "type": "product",
            "action": {
                "catalog_id": args.catalog_id,
                "product_retailer_id": args.product_retailer_id,
            }
        });
        put_opt(&mut interactive, "body", args.body_text.map(text_block));
        put_opt(&mut interactive, "footer", args.footer_text.map(text_block));
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "interactive", interactive).send_from(args.scope))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductItem {
    /// Retailer ID (SKU) of the product in the catalog
    pub product_retailer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductSection {
    /// Section title
    pub title: String,
    pub product_items: Vec<ProductItem>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MultiProductArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// Recipient phone number in international format
    pub recipient_phone_number: String,
    /// ID of the catalog holding the products
    pub catalog_id: String,
    /// Header type; only "text" is supported for product lists
    #[serde(default = "default_header_type")]
    pub header_type: String,
    /// Header text
    pub header_text: String,
    /// Body text
    pub body_text: String,
    /// Optional footer text
    pub footer_text: Option<String>,
    /// Product sections
    pub product_sections: Vec<ProductSection>,
}

fn default_header_type() -> String {
    "text".to_string()
}

pub struct SendMultiProductMessage;

impl Endpoint for SendMultiProductMessage {
    type Args = MultiProductArgs;
    const NAME: &'static str = "send_multi_product_message";
    const DESCRIPTION: &'static str = "Send a multi-product message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the multi-product message.";

    fn request(args: MultiProductArgs) -> Result<ApiRequest> {
        if args.product_sections.is_empty() {
            return Err(CloudError::InvalidArguments("productSections must not be empty".to_string()));
        }
        let mut interactive = json!({
            "type": "product_list",
            "header": { "type": args.header_type, "text": args.header_text },
            "body": text_block(args.body_text),
            "action": {
                "catalog_id": args.catalog_id,
                "sections": serde_json::to_value(args.product_sections)?,
            }
        });
        put_opt(&mut interactive, "footer", args.footer_text.map(text_block));
        Ok(OutgoingMessage::individual(args.recipient_phone_number, "interactive", interactive).send_from(args.scope))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct OrderItem {
    /// Retailer ID of the item
    pub retailer_id: String,
    /// Item name
    pub name: String,
    /// Unit price in cents
    pub amount: i64,
    /// Discounted unit price in cents
    pub sale_amount: Option<i64>,
    /// Quantity ordered
    pub quantity: u32,
}

impl OrderItem {
    fn to_value(&self) -> Value {
        let mut item = json!({
            "retailer_id": self.retailer_id,
            "name": self.name,
            "amount": amount(self.amount),
            "quantity": self.quantity,
        });
        put_opt(&mut item, "sale_amount", self.sale_amount.map(amount));
        item
    }
}

fn default_payment_type() -> String {
    "p2m-lite:stripe".to_string()
}

fn default_currency() -> String {
    "SGD".to_string()
}

fn default_goods_type() -> String {
    "digital-goods".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailsArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// WhatsApp ID or phone number of the recipient
    pub recipient_id: String,
    /// Link to the header image
    pub image_link: String,
    /// Name of the image provider
    pub provider_name: Option<String>,
    /// Body text
    pub body_text: String,
    /// Optional footer text
    pub footer_text: Option<String>,
    /// Unique reference ID for the order
    pub reference_id: String,
    /// Order total in cents
    pub total_amount_value: i64,
    /// Order subtotal in cents
    pub subtotal_value: i64,
    /// Tax in cents
    pub tax_value: Option<i64>,
    /// Shipping cost in cents
    pub shipping_value: Option<i64>,
    /// Discount in cents
    pub discount_value: Option<i64>,
    /// Items in the order
    pub items: Vec<OrderItem>,
    /// Payment type
    #[serde(default = "default_payment_type")]
    pub payment_type: String,
    /// Name of the payment configuration set up in WhatsApp Manager
    pub payment_configuration: Option<String>,
    /// ISO 4217 currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// "digital-goods" or "physical-goods"
    #[serde(default = "default_goods_type")]
    pub goods_type: String,
    /// Catalog ID when the items come from a catalog
    pub catalog_id: Option<String>,
}

pub struct SendOrderDetailsMessage;

impl Endpoint for SendOrderDetailsMessage {
    type Args = OrderDetailsArgs;
    const NAME: &'static str = "send_order_details_message";
    const DESCRIPTION: &'static str = "Send order details message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the message.";

    fn request(args: OrderDetailsArgs) -> Result<ApiRequest> {
        if args.items.is_empty() {
            return Err(CloudError::InvalidArguments("items must not be empty".to_string()));
        }

        let mut image = json!({ "link": args.image_link });
        if let Some(provider) = args.provider_name {
            image["provider"] = json!({ "name": provider });
        }

        let mut order = json!({
            "status": "pending",
            "items": args.items.iter().map(OrderItem::to_value).collect::<Vec<_>>(),
            "subtotal": amount(args.subtotal_value),
        });
        put_opt(&mut order, "tax", args.tax_value.map(amount));
        put_opt(&mut order, "shipping", args.shipping_value.map(amount));
        put_opt(&mut order, "discount", args.discount_value.map(amount));
        put_opt(&mut order, "catalog_id", args.catalog_id);

        let mut action = json!({
            "reference_id": args.reference_id,
            "type": args.goods_type,
            "payment_type": args.payment_type,
            "currency": args.currency,
            "total_amount": amount(args.total_amount_value),
            "order": order,
        });
        put_opt(&mut action, "payment_configuration", args.payment_configuration);

        let mut details = json!({
            "header": { "type": "image", "image": image },
            "body": text_block(args.body_text),
            "action": action,
        });
        put_opt(&mut details, "footer", args.footer_text.map(text_block));

        let interactive = json!({ "type": "order_details", "order_details": details });
        Ok(OutgoingMessage::individual(args.recipient_id, "interactive", interactive).send_from(args.scope))
    }
}

fn default_order_status() -> String {
    "processing".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusArgs {
    #[serde(flatten)]
    pub scope: PhoneNumberScope,
    /// WhatsApp ID or phone number of the recipient
    pub recipient_id: String,
    /// Reference ID from the order details message
    pub reference_id: String,
    /// Body text of the status update
    pub body_text: String,
    /// New order status: pending, processing, partially-shipped, shipped, completed or canceled
    #[serde(default = "default_order_status")]
    pub status: String,
    /// Optional explanation of the status
    pub description: Option<String>,
}

pub struct SendOrderStatusMessage;

impl Endpoint for SendOrderStatusMessage {
    type Args = OrderStatusArgs;
    const NAME: &'static str = "send_order_status_message";
    const DESCRIPTION: &'static str = "Send an order status message via WhatsApp Cloud API.";
    const FAILURE: &'static str = "An error occurred while sending the order status message.";

    fn request(args: OrderStatusArgs) -> Result<ApiRequest> {
        let mut order = json!({ "status": args.status });
        put_opt(&mut order, "description", args.description);

        let interactive = json!({
            "type": "order_status",
            "body": text_block(args.body_text),
            "action": {
                "name": "review_order",
                "parameters": { "reference_id": args.reference_id, "order": order }
            }
        });
        Ok(OutgoingMessage::individual(args.recipient_id, "interactive", interactive).send_from(args.scope))
    }
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register::<SendCatalogMessage>();
    registry.register::<SendCatalogTemplateMessage>();
    registry.register::<SendSingleProductMessage>();
    registry.register::<SendMultiProductMessage>();
    registry.register::<SendOrderDetailsMessage>();
    registry.register::<SendOrderStatusMessage>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::EndpointTool;

    #[test]
    fn test_catalog_message_defaults() {
        let req = EndpointTool::<SendCatalogMessage>::prepare(json!({
            "phoneNumberId": "100",
            "recipientPhoneNumber": "1555"
        }))
        .unwrap();

        let interactive = &req.json_body().unwrap()["interactive"];
        assert_eq!(interactive["type"], "catalog_message");
        assert_eq!(interactive["body"]["text"], DEFAULT_CATALOG_BODY);
        assert_eq!(interactive["footer"]["text"], DEFAULT_CATALOG_FOOTER);
        assert_eq!(interactive["action"], json!({"name": "catalog_message"}));
    }

    #[test]
    fn test_catalog_message_thumbnail() {
        let req = EndpointTool::<SendCatalogMessage>::prepare(json!({
            "phoneNumberId": "100",
            "recipientPhoneNumber": "1555",
            "thumbnailProductRetailerId": "2lc20305pt"
        }))
        .unwrap();
        let action = &req.json_body().unwrap()["interactive"]["action"];
        assert_eq!(action["parameters"]["thumbnail_product_retailer_id"], "2lc20305pt");
    }

    #[test]
    fn test_catalog_template_defaults() {
        let req = EndpointTool::<SendCatalogTemplateMessage>::prepare(json!({
            "phoneNumberId": "100",
            "recipientPhoneNumber": "1555"
        }))
        .unwrap();

        let tpl = &req.json_body().unwrap()["template"];
        assert_eq!(tpl["name"], "intro_catalog_offer");
        assert_eq!(tpl["components"][0]["parameters"][1]["text"], "400");
        assert_eq!(tpl["components"][1]["sub_type"], "CATALOG");
        assert_eq!(tpl["components"][1]["parameters"][0]["action"], json!({}));
    }

    #[test]
    fn test_single_product_omits_empty_texts() {
        let req = EndpointTool::<SendSingleProductMessage>::prepare(json!({
            "phoneNumberId": "100",
            "recipientPhoneNumber": "1555",
            "catalogId": "cat-1",
            "productRetailerId": "sku-1"
        }))
        .unwrap();

        let interactive = &req.json_body().unwrap()["interactive"];
        assert_eq!(interactive["type"], "product");
        assert!(interactive.get("body").is_none());
        assert_eq!(interactive["action"]["product_retailer_id"], "sku-1");
    }

    #[test]
    fn test_multi_product_requires_catalog() {
        let input = json!({
            "phoneNumberId": "100",
            "recipientPhoneNumber": "1555",
            "headerText": "Deals",
            "bodyText": "Pick",
            "productSections": [{"title": "Fruit", "product_items": [{"product_retailer_id": "apple"}]}]
        });
        assert!(EndpointTool::<SendMultiProductMessage>::prepare(input.clone()).is_err());

        let mut input = input;
        input["catalogId"] = json!("cat-9");
        let req = EndpointTool::<SendMultiProductMessage>::prepare(input).unwrap();
        let interactive = &req.json_body().unwrap()["interactive"];
        assert_eq!(interactive["header"], json!({"type": "text", "text": "Deals"}));
        assert_eq!(interactive["action"]["catalog_id"], "cat-9");
        assert_eq!(interactive["action"]["sections"][0]["product_items"][0]["product_retailer_id"], "apple");
    }

    #[test]
    fn test_order_details_amounts() {
        let req = EndpointTool::<SendOrderDetailsMessage>::prepare(json!({
            "phoneNumberId": "100",
            "recipientId": "1555",
            "imageLink": "https://cdn.example.com/o.png",
            "bodyText": "Your order",
            "referenceId": "ref-1",
            "totalAmountValue": 21000,
            "subtotalValue": 20000,
            "taxValue": 1000,
            "items": [{"retailer_id": "sku", "name": "bread", "amount": 10000, "quantity": 2}]
        }))
        .unwrap();

        let details = &req.json_body().unwrap()["interactive"]["order_details"];
        let action = &details["action"];
        assert_eq!(action["payment_type"], "p2m-lite:stripe");
        assert_eq!(action["currency"], "SGD");
        assert_eq!(action["type"], "digital-goods");
        assert_eq!(action["total_amount"], json!({"value": 21000, "offset": 100}));
        assert_eq!(action["order"]["tax"], json!({"value": 1000, "offset": 100}));
        assert!(action["order"].get("shipping").is_none());
        assert!(action.get("payment_configuration").is_none());
        assert_eq!(action["order"]["items"][0]["quantity"], 2);
        assert!(action["order"]["items"][0].get("sale_amount").is_none());
        assert!(details["header"]["image"].get("provider").is_none());
    }

    #[test]
    fn test_order_details_requires_items() {
        let result = EndpointTool::<SendOrderDetailsMessage>::prepare(json!({
            "phoneNumberId": "100",
            "recipientId": "1555",
            "imageLink": "https://cdn.example.com/o.png",
            "bodyText": "Your order",
            "referenceId": "ref-1",
            "totalAmountValue": 1,
            "subtotalValue": 1,
            "items": []
        }));
        assert!(matches!(result, Err(CloudError::InvalidArguments(_))));
    }

    #[test]
    fn test_order_status_defaults() {
        let req = EndpointTool::<SendOrderStatusMessage>::prepare(json!({
            "phoneNumberId": "100",
            "recipientId": "1555",
            "referenceId": "ref-1",
            "bodyText": "Update"
        }))
        .unwrap();

        let interactive = &req.json_body().unwrap()["interactive"];
        assert_eq!(interactive["action"]["name"], "review_order");
        assert_eq!(
            interactive["action"]["parameters"],
            json!({"reference_id": "ref-1", "order": {"status": "processing"}})
        );
    }
}
