//! Plain-text rendering of records for the interactive shell.

use std::io::{self, Write};

use crate::domain::{Customer, Order, Product};

pub fn customer<W: Write>(out: &mut W, customer: &Customer, orders: &[Order]) -> io::Result<()> {
    let address = &customer.address;
    writeln!(out, "- Code: {}", customer.code)?;
    writeln!(out, "  Name: {}", customer.full_name())?;
    writeln!(out, "  Email: {}", customer.personal.email)?;
    writeln!(out, "  Phone: {}", customer.personal.phone)?;
    writeln!(out, "  Address: {} {}, {}", address.street, address.number, address.city)?;
    if orders.is_empty() {
        writeln!(out, "  Orders: [none]")?;
    } else {
        let codes: Vec<&str> = orders.iter().map(|o| o.code.as_str()).collect();
        writeln!(out, "  Orders: {}", codes.join(", "))?;
    }
    writeln!(out)
}

pub fn customer_line<W: Write>(out: &mut W, customer: &Customer) -> io::Result<()> {
    writeln!(out, "- {} ({})", customer.full_name(), customer.code)
}

pub fn product<W: Write>(out: &mut W, product: &Product) -> io::Result<()> {
    writeln!(out, "Code: {}", product.code)?;
    writeln!(out, "Name: {}", product.name)?;
    writeln!(out, "Price: ${:.2}", product.price)?;
    writeln!(out, "Stock: {} units", product.stock)?;
    writeln!(out, "Status: {}", product.status)
}

pub fn order<W: Write>(out: &mut W, order: &Order) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Order: {}", order.code)?;
    writeln!(out, "Date: {}", order.created_at.format("%Y-%m-%d %H:%M"))?;
    writeln!(out, "Total: ${:.2}", order.total)?;
    writeln!(out, "Items:")?;
    for item in &order.items {
        writeln!(
            out,
            " - {} ({} x ${:.2})",
            item.product_name, item.quantity, item.unit_price
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn test_order_lists_line_items() {
        let product = Product::new("P1", "Teclado", Decimal::new(2550, 2), 10);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let placed = Order::place("O1", "C1", &product, 2, at);

        let mut out = Vec::new();
        order(&mut out, &placed).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Order: O1"));
        assert!(text.contains("Date: 2024-05-01 09:30"));
        assert!(text.contains("Total: $51.00"));
        assert!(text.contains(" - Teclado (2 x $25.50)"));
    }
}
