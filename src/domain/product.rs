use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::actor_framework::Record;

/// Represents a product in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub price: Decimal,
    /// Units on hand. Never negative.
    pub stock: u32,
    #[serde(default)]
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Active => write!(f, "active"),
            ProductStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Payload for creating a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub code: String,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    pub status: ProductStatus,
}

impl Product {
    #[cfg(test)]
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Decimal, stock: u32) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price,
            stock,
            status: ProductStatus::Active,
        }
    }
}

impl From<ProductCreate> for Product {
    fn from(params: ProductCreate) -> Self {
        Self {
            code: params.code,
            name: params.name,
            price: params.price,
            stock: params.stock,
            status: params.status,
        }
    }
}

impl Record for Product {
    const COLLECTION: &'static str = "products";
    const KEY: &'static str = "code";

    fn key(&self) -> &str {
        &self.code
    }
}
