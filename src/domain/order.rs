use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::actor_framework::Record;
use crate::domain::Product;

/// Represents a customer order.
///
/// Line items are snapshots taken at placement time and do not follow later
/// changes to the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub code: String,
    pub customer_code: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub total: Decimal,
    #[serde(default = "unknown_payment_method")]
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_code: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

fn unknown_payment_method() -> String {
    "unknown".to_string()
}

impl LineItem {
    pub fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product_code: product.code.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_price: product.price,
            line_total: product.price * Decimal::from(quantity),
        }
    }
}

impl Order {
    /// Builds a single-line order against the product as it was read.
    pub fn place(
        code: impl Into<String>,
        customer_code: impl Into<String>,
        product: &Product,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> Self {
        let mut order = Self {
            code: code.into(),
            customer_code: customer_code.into(),
            created_at: at,
            items: vec![LineItem::snapshot(product, quantity)],
            total: Decimal::ZERO,
            payment_method: unknown_payment_method(),
        };
        order.total = order.computed_total();
        order
    }

    pub fn computed_total(&self) -> Decimal {
        self.items.iter().map(|item| item.line_total).sum()
    }
}

impl Record for Order {
    const COLLECTION: &'static str = "orders";
    const KEY: &'static str = "code";

    fn key(&self) -> &str {
        &self.code
    }
}
