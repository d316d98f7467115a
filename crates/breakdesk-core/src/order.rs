// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storefront order payload, as delivered by the "order paid" webhook.
//!
//! Only the fields the dashboard renders are modelled. Everything else in the
//! storefront payload (billing, shipping, totals, ...) is ignored on decode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Title of the order custom field that carries the buyer's stream handle.
pub const HANDLE_FIELD_TITLE: &str = "twitch username";

/// Storefront order number. Unique and incrementing per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(u32);

impl OrderNumber {
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

impl From<u32> for OrderNumber {
    fn from(number: u32) -> Self {
        Self(number)
    }
}

/// A paid order. Immutable once paid, apart from per-item operator notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// The number of the order, unique and incrementing.
    #[serde(rename = "number")]
    pub order_number: OrderNumber,

    /// The items in this order, in checkout order.
    pub line_items: Vec<OrderLineItem>,

    /// Free-text note left by the buyer at checkout.
    #[serde(default)]
    pub buyer_note: Option<String>,

    /// Custom checkout field. The store uses it for the buyer's stream handle.
    #[serde(default)]
    pub custom_field: Option<CustomField>,
}

impl Order {
    /// The stream handle the buyer entered at checkout.
    pub fn twitch_username(&self) -> Result<String, HandleError> {
        let field = self
            .custom_field
            .as_ref()
            .ok_or(HandleError::CustomFieldNotPresent)?;

        if field.title.trim().eq_ignore_ascii_case(HANDLE_FIELD_TITLE) {
            Ok(field.value.trim().to_string())
        } else {
            Err(HandleError::IncorrectTitleForCustomField(field.title.clone()))
        }
    }
}

/// Why no handle could be read from an order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    /// The custom field exists but is used for something else.
    #[error("custom field is titled `{0}`, not `{title}`", title = HANDLE_FIELD_TITLE)]
    IncorrectTitleForCustomField(String),
    #[error("order has no custom field")]
    CustomFieldNotPresent,
}

/// One purchased product within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    /// The name of the item.
    pub name: String,

    pub quantity: u32,

    /// The different options for the item, such as which cards to keep from
    /// the break.
    #[serde(default)]
    pub options: Vec<OrderLineItemOption>,

    #[serde(default)]
    pub custom_text_fields: Option<Vec<CustomTextField>>,

    #[serde(default)]
    pub media_item: Option<OrderMediaItem>,

    /// Storefront line index, used for partial fulfillment.
    #[serde(default)]
    pub index: Option<u32>,

    /// Operator note. The only field the dashboard edits after ingestion.
    #[serde(default)]
    pub notes: Option<String>,
}

/// ```json
/// { "option": "Promo Card", "selection": "Yes" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItemOption {
    pub option: String,
    pub selection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTextField {
    pub title: String,
    pub value: String,
}

/// Product image. `src` is a storefront media URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMediaItem {
    pub id: String,
    pub src: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub title: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAID_ORDER: &str = r#"
{
  "_id": "d5d43d01-d9a4-4cc2-b257-61184b881447",
  "buyerLanguage": "en",
  "currency": "ILS",
  "fulfillmentStatus": "NOT_FULFILLED",
  "number": 10019,
  "paymentStatus": "PAID",
  "buyerNote": "please film the pull",
  "lineItems": [
    {
      "index": 1,
      "quantity": 1,
      "price": 5,
      "name": "my product's name",
      "options": [{ "option": "Size", "selection": "Medium" }],
      "customTextFields": [
        { "title": "Notes for delivery", "value": "Please leave at front door" }
      ],
      "weight": 1.42,
      "mediaItem": {
        "altText": "This is a description of the image",
        "id": "fac9dc352bf7d54ed0458d64ce41a3ec.jpg",
        "src": "wix:image://v1/fac9dc352bf7d54ed0458d64ce41a3ec.jpg/file.jpg",
        "type": "IMAGE"
      }
    }
  ],
  "totals": { "quantity": 1, "total": 5 },
  "customField": {
    "value": "argablarga",
    "title": "Twitch Username",
    "translatedTitle": "Twitch Username"
  }
}
"#;

    #[test]
    fn storefront_payload_deserializes_ignoring_extra_fields() {
        let order: Order = serde_json::from_str(PAID_ORDER).unwrap();
        assert_eq!(order.order_number, OrderNumber::new(10019));
        assert_eq!(order.buyer_note.as_deref(), Some("please film the pull"));
        assert_eq!(order.line_items.len(), 1);

        let item = &order.line_items[0];
        assert_eq!(item.quantity, 1);
        assert_eq!(item.index, Some(1));
        assert_eq!(item.options[0].selection, "Medium");
        assert!(item.notes.is_none());
        assert_eq!(
            item.media_item.as_ref().map(|m| m.id.as_str()),
            Some("fac9dc352bf7d54ed0458d64ce41a3ec.jpg")
        );
    }

    #[test]
    fn fractional_quantity_is_rejected() {
        let json = r#"{"number": 1, "lineItems": [{"name": "x", "quantity": 1.5}]}"#;
        assert!(serde_json::from_str::<Order>(json).is_err());
    }

    #[test]
    fn handle_is_read_from_matching_custom_field() {
        let order: Order = serde_json::from_str(PAID_ORDER).unwrap();
        assert_eq!(order.twitch_username().as_deref(), Ok("argablarga"));
    }

    #[test]
    fn handle_errors_describe_the_custom_field() {
        let mut order: Order = serde_json::from_str(PAID_ORDER).unwrap();
        order.custom_field = Some(CustomField {
            title: "Notes for delivery".into(),
            value: "call me".into(),
        });
        assert_eq!(
            order.twitch_username(),
            Err(HandleError::IncorrectTitleForCustomField(
                "Notes for delivery".into()
            ))
        );

        order.custom_field = None;
        assert_eq!(
            order.twitch_username(),
            Err(HandleError::CustomFieldNotPresent)
        );
    }

    #[test]
    fn handle_error_messages() {
        let err = HandleError::IncorrectTitleForCustomField("Gift note".into());
        assert_eq!(
            err.to_string(),
            "custom field is titled `Gift note`, not `twitch username`"
        );
        assert_eq!(
            HandleError::CustomFieldNotPresent.to_string(),
            "order has no custom field"
        );
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn order_number_parses_with_or_without_hash() {
        assert_eq!("10019".parse::<OrderNumber>().unwrap(), OrderNumber::new(10019));
        assert_eq!("#42".parse::<OrderNumber>().unwrap(), OrderNumber::new(42));
        assert!("abc".parse::<OrderNumber>().is_err());
    }

    #[test]
    fn order_number_serializes_as_bare_number() {
        let json = serde_json::to_string(&OrderNumber::new(10019)).unwrap();
        assert_eq!(json, "10019");
    }
}
