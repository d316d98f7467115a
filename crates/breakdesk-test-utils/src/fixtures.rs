// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storefront order fixtures.

use breakdesk_core::order::{CustomField, OrderLineItemOption};
use breakdesk_core::{Order, OrderLineItem, OrderNumber};
use serde_json::{Value, json};

/// A line item with no options or notes.
pub fn line_item(name: &str, quantity: u32) -> OrderLineItem {
    OrderLineItem {
        name: name.to_string(),
        quantity,
        options: vec![],
        custom_text_fields: None,
        media_item: None,
        index: None,
        notes: None,
    }
}

/// A single-item order with the given handle in its custom field.
pub fn order_for(number: u32, handle: &str) -> Order {
    Order {
        order_number: OrderNumber::new(number),
        line_items: vec![line_item("Hobby Box Break", 1)],
        buyer_note: None,
        custom_field: Some(CustomField {
            title: "twitch username".to_string(),
            value: handle.to_string(),
        }),
    }
}

/// A single-item order without a handle.
pub fn order(number: u32) -> Order {
    Order {
        custom_field: None,
        ..order_for(number, "")
    }
}

/// Order #10019: three line items with quantities 4, 10 and 2.
pub fn order_10019() -> Order {
    let mut pack = line_item("Pokemon 151 Booster Pack", 4);
    pack.options = vec![OrderLineItemOption {
        option: "Keep".to_string(),
        selection: "Holos only".to_string(),
    }];
    Order {
        order_number: OrderNumber::new(10019),
        line_items: vec![
            pack,
            line_item("Bulk Commons", 10),
            line_item("Surging Sparks Booster Bundle", 2),
        ],
        buyer_note: Some("ship in a toploader please".to_string()),
        custom_field: Some(CustomField {
            title: "twitch username".to_string(),
            value: "argablarga".to_string(),
        }),
    }
}

/// Order #10019 as the storefront webhook delivers it, including fields the
/// dashboard ignores.
pub fn wix_order_10019_json() -> Value {
    json!({
        "id": "4f4b5c2e-8d1a-4b8e-9f62-3b1c7a0d9e11",
        "number": 10019,
        "paymentStatus": "PAID",
        "buyerNote": "ship in a toploader please",
        "customField": { "title": "twitch username", "value": "argablarga" },
        "totals": { "total": "54.00" },
        "lineItems": [
            {
                "name": "Pokemon 151 Booster Pack",
                "quantity": 4,
                "index": 1,
                "options": [{ "option": "Keep", "selection": "Holos only" }],
                "mediaItem": {
                    "altText": null,
                    "id": "d5f2a1_pack.png",
                    "src": "wix:image://v1/d5f2a1_pack.png"
                }
            },
            { "name": "Bulk Commons", "quantity": 10, "index": 2 },
            {
                "name": "Surging Sparks Booster Bundle",
                "quantity": 2,
                "index": 3,
                "customTextFields": [{ "title": "Dedication", "value": "for Sam" }]
            }
        ]
    })
}
