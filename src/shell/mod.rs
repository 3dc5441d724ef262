//! Interactive numbered menu over the commerce system.
//!
//! Every prompt accepts `back` to return to the menu. Expected failures (a
//! missing record, short stock, bad input) are printed and the loop goes on;
//! only fatal errors end the session.

mod input;
mod report;

pub use input::*;

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, instrument};

use crate::app_system::CommerceSystem;
use crate::clients::PlaceOrder;
use crate::domain::{Address, CustomerCreate, PersonalData, ProductCreate, ProductStatus};
use crate::error::{CustomerError, OrderError, ProductError};

const BACK: &str = "back";
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

const MENU: &[&str] = &[
    "1. Find customers by name",
    "2. Find customers by city",
    "3. Find customers by registration date",
    "4. Find product by code",
    "5. Orders of a customer",
    "6. Add customer",
    "7. Add product",
    "8. Place order",
    "9. Update product price",
    "10. Delete product",
    "11. Cancel order",
    "12. Delete customer",
    "13. Exit",
];

/// Errors that either end the session or are merely reported to the operator.
trait Severity: std::error::Error + Send + Sync + 'static {
    fn is_fatal(&self) -> bool;
}

macro_rules! impl_severity {
    ($($error:ty),*) => {
        $(impl Severity for $error {
            fn is_fatal(&self) -> bool {
                <$error>::is_fatal(self)
            }
        })*
    };
}

impl_severity!(CustomerError, ProductError, OrderError);

pub struct Shell<'a, R, W> {
    system: &'a CommerceSystem,
    input: R,
    output: W,
    clear_screen: bool,
    closed: bool,
}

impl<'a, R, W> Shell<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(system: &'a CommerceSystem, input: R, output: W) -> Self {
        Self {
            clear_screen: system.config().clear_screen,
            system,
            input,
            output,
            closed: false,
        }
    }

    /// Runs until the operator exits or input ends.
    #[instrument(name = "shell", skip(self))]
    pub async fn run(&mut self) -> Result<()> {
        info!("Shell started");
        while !self.closed {
            self.clear()?;
            writeln!(self.output, "\n{}", "=".repeat(50))?;
            writeln!(self.output, "ORDER DESK - {}", self.system.config().database)?;
            writeln!(self.output, "{}", "=".repeat(50))?;
            for line in MENU {
                writeln!(self.output, "{}", line)?;
            }
            writeln!(self.output, "{}", "=".repeat(50))?;

            let Some(choice) = self.read_line("Select an option: ").await? else {
                break;
            };
            match choice.trim() {
                "1" => self.customers_by_name().await?,
                "2" => self.customers_by_city().await?,
                "3" => self.customers_by_date().await?,
                "4" => self.find_product().await?,
                "5" => self.customer_orders().await?,
                "6" => self.add_customer().await?,
                "7" => self.add_product().await?,
                "8" => self.place_order().await?,
                "9" => self.update_price().await?,
                "10" => self.delete_product().await?,
                "11" => self.cancel_order().await?,
                "12" => self.delete_customer().await?,
                "13" => {
                    writeln!(self.output, "\nGoodbye!")?;
                    break;
                }
                _ => writeln!(self.output, "Invalid option. Try again.")?,
            }
            self.pause().await?;
        }
        info!("Shell stopped");
        Ok(())
    }

    async fn customers_by_name(&mut self) -> Result<()> {
        let Some(name) = self.ask("\nCustomer name (or 'back'): ").await? else {
            return Ok(());
        };
        let customers = match self.system.customer_client.customers_by_name(&name).await {
            Ok(customers) => customers,
            Err(e) => return self.failed(e),
        };
        if customers.is_empty() {
            writeln!(self.output, "No customers named {}", name)?;
            return Ok(());
        }
        writeln!(self.output, "\nCustomers named {}:", name)?;
        for customer in &customers {
            let orders = match self.system.order_client.orders_for_customer(&customer.aliases()).await {
                Ok(orders) => orders,
                Err(e) => return self.failed(e),
            };
            report::customer(&mut self.output, customer, &orders)?;
        }
        Ok(())
    }

    async fn customers_by_city(&mut self) -> Result<()> {
        let Some(city) = self.ask("\nCity (or 'back'): ").await? else {
            return Ok(());
        };
        match self.system.customer_client.customers_by_city(&city).await {
            Ok(customers) if customers.is_empty() => writeln!(self.output, "No customers in {}", city)?,
            Ok(customers) => {
                writeln!(self.output, "\nCustomers in {}:", city)?;
                for customer in &customers {
                    report::customer_line(&mut self.output, customer)?;
                }
            }
            Err(e) => return self.failed(e),
        }
        Ok(())
    }

    async fn customers_by_date(&mut self) -> Result<()> {
        let Some(raw) = self.ask("\nRegistration date YYYY-MM-DD (or 'back'): ").await? else {
            return Ok(());
        };
        let day = match parse_date(&raw) {
            Ok(day) => day,
            Err(e) => return self.invalid(e),
        };
        match self.system.customer_client.customers_registered_on(day).await {
            Ok(customers) if customers.is_empty() => {
                writeln!(self.output, "No customers registered on {}", day)?
            }
            Ok(customers) => {
                writeln!(self.output, "\nCustomers registered on {}:", day)?;
                for customer in &customers {
                    report::customer_line(&mut self.output, customer)?;
                }
            }
            Err(e) => return self.failed(e),
        }
        Ok(())
    }

    async fn find_product(&mut self) -> Result<()> {
        let Some(code) = self.ask("\nProduct code (or 'back'): ").await? else {
            return Ok(());
        };
        match self.system.product_client.find_product(&code).await {
            Ok(Some(product)) => {
                writeln!(self.output, "\nProduct found:")?;
                report::product(&mut self.output, &product)?;
            }
            Ok(None) => writeln!(self.output, "Product {} not found", code)?,
            Err(e) => return self.failed(e),
        }
        Ok(())
    }

    async fn customer_orders(&mut self) -> Result<()> {
        let Some(code) = self.ask("\nCustomer code (or 'back'): ").await? else {
            return Ok(());
        };
        let (customer, orders) = match self.system.customer_client.customer_orders(&code).await {
            Ok(found) => found,
            Err(e) => return self.failed(e),
        };
        if orders.is_empty() {
            writeln!(
                self.output,
                "No orders for customer {} ({})",
                customer.code,
                customer.full_name()
            )?;
            return Ok(());
        }
        writeln!(self.output, "\nOrders of {} - {}:", customer.code, customer.full_name())?;
        for order in &orders {
            report::order(&mut self.output, order)?;
        }
        Ok(())
    }

    async fn add_customer(&mut self) -> Result<()> {
        writeln!(self.output, "Enter the customer details (or 'back' in any field):")?;
        let mut fields = Vec::with_capacity(9);
        for label in [
            "Code: ", "Name: ", "Surname: ", "Email: ", "Phone: ", "Street: ", "Number: ", "City: ", "Country: ",
        ] {
            let Some(value) = self.ask(label).await? else {
                return Ok(());
            };
            fields.push(value);
        }
        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        let code = match required("Code", &next()) {
            Ok(code) => code,
            Err(e) => return self.invalid(e),
        };
        let params = CustomerCreate {
            code,
            personal: PersonalData {
                name: next(),
                surname: next(),
                email: next(),
                phone: next(),
            },
            address: Address {
                street: next(),
                number: next(),
                city: next(),
                country: next(),
            },
        };

        match self.system.customer_client.create_customer(params).await {
            Ok(customer) => writeln!(self.output, "Customer {} inserted", customer.code)?,
            Err(e) => return self.failed(e),
        }
        self.flush().await
    }

    async fn add_product(&mut self) -> Result<()> {
        writeln!(self.output, "Enter the product details (or 'back' in any field):")?;
        let Some(code) = self.ask("Product code: ").await? else {
            return Ok(());
        };
        let Some(name) = self.ask("Product name: ").await? else {
            return Ok(());
        };
        let Some(price) = self.ask("Price: ").await? else {
            return Ok(());
        };
        let Some(stock) = self.ask("Initial stock: ").await? else {
            return Ok(());
        };
        let params = match (required("Product code", &code), parse_price(&price), parse_stock(&stock)) {
            (Ok(code), Ok(price), Ok(stock)) => ProductCreate {
                code,
                name,
                price,
                stock,
                status: ProductStatus::Active,
            },
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return self.invalid(e),
        };

        match self.system.product_client.create_product(params).await {
            Ok(product) => writeln!(
                self.output,
                "Product {} inserted with stock {}",
                product.name, product.stock
            )?,
            Err(e) => return self.failed(e),
        }
        self.flush().await
    }

    async fn place_order(&mut self) -> Result<()> {
        writeln!(self.output, "Enter the order details (or 'back' in any field):")?;
        let Some(order_code) = self.ask("Order code: ").await? else {
            return Ok(());
        };
        let Some(customer_code) = self.ask("Customer code: ").await? else {
            return Ok(());
        };
        let Some(product_code) = self.ask("Product code: ").await? else {
            return Ok(());
        };
        let Some(quantity) = self.ask("Quantity: ").await? else {
            return Ok(());
        };
        let (order_code, quantity) = match (required("Order code", &order_code), parse_quantity(&quantity)) {
            (Ok(code), Ok(quantity)) => (code, quantity),
            (Err(e), _) | (_, Err(e)) => return self.invalid(e),
        };

        let request = PlaceOrder {
            order_code,
            customer_code,
            product_code,
            quantity,
        };
        match self.system.order_client.place_order(request).await {
            Ok(placed) => writeln!(self.output, "{}", placed)?,
            Err(e) => return self.failed(e),
        }
        self.flush().await
    }

    async fn update_price(&mut self) -> Result<()> {
        let Some(code) = self.ask("Product code (or 'back'): ").await? else {
            return Ok(());
        };
        let Some(raw) = self.ask("New price: ").await? else {
            return Ok(());
        };
        let price = match parse_price(&raw) {
            Ok(price) => price,
            Err(e) => return self.invalid(e),
        };
        match self.system.product_client.update_price(&code, price).await {
            Ok(()) => writeln!(self.output, "Price updated for product {}", code)?,
            Err(e) => return self.failed(e),
        }
        self.flush().await
    }

    async fn delete_product(&mut self) -> Result<()> {
        let Some(code) = self.ask("Product code to delete (or 'back'): ").await? else {
            return Ok(());
        };
        match self.system.product_client.delete_product(&code).await {
            Ok(product) => writeln!(self.output, "Product {} deleted", product.code)?,
            Err(e) => return self.failed(e),
        }
        self.flush().await
    }

    async fn cancel_order(&mut self) -> Result<()> {
        let Some(code) = self.ask("Order code to delete (or 'back'): ").await? else {
            return Ok(());
        };
        match self.system.order_client.cancel_order(&code).await {
            Ok(cancelled) => writeln!(self.output, "{}", cancelled)?,
            Err(e) => return self.failed(e),
        }
        self.flush().await
    }

    async fn delete_customer(&mut self) -> Result<()> {
        let Some(code) = self.ask("Customer code to delete (or 'back'): ").await? else {
            return Ok(());
        };
        match self.system.customer_client.delete_customer(&code).await {
            Ok(removed) => writeln!(self.output, "{}", removed)?,
            Err(e) => return self.failed(e),
        }
        self.flush().await
    }

    /// Prompts for a field. `None` when the operator typed `back` or input ended.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.read_line(prompt).await? {
            Some(line) if line.trim().eq_ignore_ascii_case(BACK) => Ok(None),
            other => Ok(other),
        }
    }

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            self.closed = true;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn pause(&mut self) -> Result<()> {
        if !self.closed {
            self.read_line("\nPress Enter to continue...").await?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            write!(self.output, "{}", CLEAR_SCREEN)?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.system.flush().await?;
        Ok(())
    }

    fn invalid(&mut self, error: ValidationError) -> Result<()> {
        writeln!(self.output, "Invalid input: {}", error)?;
        Ok(())
    }

    fn failed<E: Severity>(&mut self, error: E) -> Result<()> {
        if error.is_fatal() {
            return Err(error.into());
        }
        writeln!(self.output, "Error: {}", error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_system::{AppConfig, Snapshot};
    use rust_decimal::Decimal;

    async fn run_session(system: &CommerceSystem, script: &str) -> String {
        let mut output = Vec::new();
        let mut shell = Shell::new(system, tokio::io::BufReader::new(script.as_bytes()), &mut output);
        shell.run().await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_product_then_order_session() {
        let system = CommerceSystem::start(AppConfig::in_memory(), Snapshot::default());
        let script = "7\nP1\nMouse\n12,50\n10\n\n8\nO1\nC1\nP1\n4\n\n4\nP1\n\n13\n";

        let text = run_session(&system, script).await;

        assert!(text.contains("Product Mouse inserted with stock 10"));
        assert!(text.contains("Order O1 placed"));
        assert!(text.contains("Stock: 6 units"));
        assert!(text.contains("Goodbye!"));
        let product = system.product_client.find_product("P1").await.unwrap().unwrap();
        assert_eq!(product.price, Decimal::new(1250, 2));
    }

    #[tokio::test]
    async fn test_each_change_is_saved_before_exit() {
        let dir = std::env::temp_dir().join(format!("order-desk-shell-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let config = AppConfig {
            data_dir: Some(dir.clone()),
            ..AppConfig::in_memory()
        };
        let path = config.snapshot_path().unwrap();
        let system = CommerceSystem::start(config, Snapshot::default());

        run_session(&system, "7\nP1\nMouse\n5\n3\n").await;
        let saved = Snapshot::load(&path).await.unwrap();
        assert_eq!(saved.products.len(), 1);
        assert!(saved.orders.is_empty());

        run_session(&system, "8\nO1\nC1\nP1\n2\n").await;
        let saved = Snapshot::load(&path).await.unwrap();
        assert_eq!(saved.orders.len(), 1);
        assert_eq!(saved.products[0]["stock"], serde_json::json!(1));

        system.shutdown().await.unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_back_and_bad_input_leave_store_untouched() {
        let system = CommerceSystem::start(AppConfig::in_memory(), Snapshot::default());
        let script = "7\nP1\nback\n\n8\nO1\nC1\nP1\nzero\n\n99\n\n";

        let text = run_session(&system, script).await;

        assert!(text.contains("Invalid input: Quantity must be a whole number"));
        assert!(text.contains("Invalid option"));
        assert!(system.product_client.list_products().await.unwrap().is_empty());
        assert!(system.order_client.find_order("O1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expected_errors_are_printed() {
        let system = CommerceSystem::start(AppConfig::in_memory(), Snapshot::default());
        let script = "11\nnope\n\n12\nnobody\n\n9\nP9\n3\n\n13\n";

        let text = run_session(&system, script).await;

        assert!(text.contains("Error: Order not found: nope"));
        assert!(text.contains("Error: Customer not found: nobody"));
        assert!(text.contains("Error: Product not found: P9"));
    }
}
