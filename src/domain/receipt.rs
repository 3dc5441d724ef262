//! Confirmation records returned by the order workflow. Each call yields
//! exactly one receipt or one error.

use std::fmt;

use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlaced {
    pub order_code: String,
    pub product_code: String,
    pub quantity: u32,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockRestore {
    pub product_code: String,
    pub quantity: u32,
    /// False when the product no longer exists.
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderCancelled {
    pub order_code: String,
    pub restored: Vec<StockRestore>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRemoved {
    pub code: String,
    pub full_name: String,
    pub orders_deleted: usize,
}

impl fmt::Display for OrderPlaced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order {} placed: {} x {} (total {:.2})",
            self.order_code, self.quantity, self.product_code, self.total
        )
    }
}

impl fmt::Display for OrderCancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order {} deleted and stock restored", self.order_code)?;
        for skipped in self.restored.iter().filter(|r| !r.applied) {
            write!(f, " (product {} no longer exists)", skipped.product_code)?;
        }
        Ok(())
    }
}

impl fmt::Display for CustomerRemoved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Customer deleted: {} - {}\nOrders deleted: {}",
            self.code, self.full_name, self.orders_deleted
        )
    }
}
