use std::collections::HashSet;

use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::actor_framework::{CollectionClient, Record};
use crate::clients::ProductClient;
use crate::domain::{Order, OrderCancelled, OrderPlaced, StockRestore};
use crate::error::OrderError;
use crate::query::Filter;

use super::decode_all;

/// Request to place a single-line order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub order_code: String,
    pub customer_code: String,
    pub product_code: String,
    pub quantity: u32,
}

/// Client for interacting with the orders collection.
///
/// This client orchestrates the order lifecycle: it reserves stock through the
/// product client before an order exists and restores it once the order is
/// gone.
#[derive(Clone, Debug)]
pub struct OrderClient {
    inner: CollectionClient,
    product_client: ProductClient,
}

impl OrderClient {
    pub fn new(inner: CollectionClient, product_client: ProductClient) -> Self {
        Self { inner, product_client }
    }

    /// Places an order for `quantity` units of one product.
    ///
    /// Stock is taken with a single conditional decrement, so two concurrent
    /// placements can never oversell. The line item snapshots the product's
    /// name and price as read.
    #[instrument(
        fields(
            order_code = %request.order_code,
            customer_code = %request.customer_code,
            product_code = %request.product_code,
            quantity = request.quantity
        ),
        skip(self, request)
    )]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<OrderPlaced, OrderError> {
        info!("Processing place_order request");

        if request.quantity == 0 {
            return Err(OrderError::InvalidQuantity(request.quantity));
        }

        // Step 1: Refuse a duplicate code before any stock moves
        if self.find_order(&request.order_code).await?.is_some() {
            warn!("Order code already in use");
            return Err(OrderError::AlreadyExists(request.order_code));
        }

        // Step 2: Validate product
        let product = match self.product_client.find_product(&request.product_code).await? {
            Some(product) => product,
            None => {
                error!("Product not found");
                return Err(OrderError::ProductNotFound(request.product_code));
            }
        };
        info!(product_name = %product.name, price = %product.price, stock = product.stock, "Product validation successful");

        if request.quantity > product.stock {
            error!(available = product.stock, "Insufficient stock");
            return Err(OrderError::InsufficientStock {
                product_code: request.product_code,
                requested: request.quantity,
                available: product.stock,
            });
        }

        // Step 3: Reserve stock; the guard re-checks availability atomically
        if !self
            .product_client
            .reserve_stock(&request.product_code, request.quantity)
            .await?
        {
            return Err(self.explain_rejected_reservation(request).await?);
        }

        // Step 4: Create order
        let order = Order::place(
            request.order_code,
            request.customer_code,
            &product,
            request.quantity,
            Utc::now(),
        );
        if let Err(e) = self.insert_order(&order).await {
            error!(error = %e, "Order insert failed, releasing reserved stock");
            self.product_client
                .release_stock(&request.product_code, request.quantity)
                .await?;
            return Err(e);
        }

        info!(total = %order.total, "Order created successfully");
        Ok(OrderPlaced {
            order_code: order.code,
            product_code: request.product_code,
            quantity: request.quantity,
            total: order.total,
        })
    }

    /// Cancels an order and puts its stock back.
    ///
    /// The order is decoded before it is removed, so a malformed document is
    /// reported and left in place. Stock is restored only by the caller whose
    /// delete actually removed the order, so a repeated or concurrent
    /// cancellation restores nothing.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, code: &str) -> Result<OrderCancelled, OrderError> {
        info!("Processing cancel_order request");

        // Step 1: Read and decode
        let Some(order) = self.find_order(code).await? else {
            warn!("Order not found");
            return Err(OrderError::NotFound(code.to_string()));
        };

        // Step 2: Claim
        if self.inner.delete_one(Order::key_filter(code)).await?.is_none() {
            warn!("Order cancelled concurrently");
            return Err(OrderError::NotFound(code.to_string()));
        }

        // Step 3: Restore stock
        let restored = self.restore_stock(&order).await?;

        info!(items = restored.len(), "Order deleted and stock restored");
        Ok(OrderCancelled {
            order_code: order.code,
            restored,
        })
    }

    /// Orders placed under any of the given customer codes.
    #[instrument(skip(self))]
    pub async fn orders_for_customer(&self, customer_codes: &[String]) -> Result<Vec<Order>, OrderError> {
        let docs = self
            .inner
            .find(Filter::any_of("customer_code", customer_codes.iter().cloned()))
            .await?;
        Ok(decode_all(docs)?)
    }

    /// Removes every order placed under the given customer codes and restores
    /// the stock each one consumed. Returns the removed orders.
    ///
    /// All orders are decoded before any is removed; one malformed document
    /// fails the call with nothing deleted.
    #[instrument(skip(self))]
    pub async fn remove_for_customer(&self, customer_codes: &[String]) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders_for_customer(customer_codes).await?;
        if orders.is_empty() {
            return Ok(orders);
        }

        let claimed_docs = self
            .inner
            .delete_many(Filter::any_of("code", orders.iter().map(|o| o.code.clone())))
            .await?;
        let claimed: HashSet<&str> = claimed_docs
            .iter()
            .filter_map(|doc| doc.get(Order::KEY).and_then(Value::as_str))
            .collect();

        let mut removed = Vec::with_capacity(claimed.len());
        for order in orders {
            // Cancelled by someone else in between; they restored its stock.
            if !claimed.contains(order.code.as_str()) {
                continue;
            }
            self.restore_stock(&order).await?;
            removed.push(order);
        }
        info!(orders = removed.len(), "Customer orders removed");
        Ok(removed)
    }

    /// Returns each line item's quantity to its product. A product that no
    /// longer exists is skipped without failing the rest.
    #[instrument(skip(self, order), fields(order_code = %order.code))]
    async fn restore_stock(&self, order: &Order) -> Result<Vec<StockRestore>, OrderError> {
        let mut restored = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let applied = self
                .product_client
                .release_stock(&item.product_code, item.quantity)
                .await?;
            restored.push(StockRestore {
                product_code: item.product_code.clone(),
                quantity: item.quantity,
                applied,
            });
        }
        Ok(restored)
    }

    /// The guarded decrement matched nothing: the product vanished or stock
    /// fell below the request since it was read.
    async fn explain_rejected_reservation(&self, request: PlaceOrder) -> Result<OrderError, OrderError> {
        Ok(match self.product_client.find_product(&request.product_code).await? {
            None => OrderError::ProductNotFound(request.product_code),
            Some(product) => OrderError::InsufficientStock {
                product_code: request.product_code,
                requested: request.quantity,
                available: product.stock,
            },
        })
    }
}

impl_client_methods!(OrderClient, Order, OrderError, order);
