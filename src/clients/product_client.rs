use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::{CollectionClient, Record};
use crate::domain::{Product, ProductCreate};
use crate::error::ProductError;
use crate::query::{Filter, Update};

use super::decode_all;

/// Client for interacting with the products collection.
#[derive(Clone, Debug)]
pub struct ProductClient {
    inner: CollectionClient,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self, params), fields(product_code = %params.code))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        ensure_valid_price(params.price)?;
        let product = Product::from(params);
        self.insert_product(&product).await?;
        info!(stock = product.stock, "Product created");
        Ok(product)
    }

    #[cfg(test)]
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        Ok(decode_all(self.inner.find(Filter::And(Vec::new())).await?)?)
    }

    /// Sets a new price. Orders already placed keep the price they captured.
    #[instrument(skip(self))]
    pub async fn update_price(&self, code: &str, price: Decimal) -> Result<(), ProductError> {
        debug!("Sending request");
        ensure_valid_price(price)?;
        let price = serde_json::to_value(price).map_err(|e| ProductError::InvalidPrice(e.to_string()))?;
        let result = self
            .inner
            .update_one(Product::key_filter(code), Update::set("price", price))
            .await?;
        if result.matched == 0 {
            warn!("Product not found");
            return Err(ProductError::NotFound(code.to_string()));
        }
        info!(modified = result.modified, "Price updated");
        Ok(())
    }

    /// Deletes the product. Orders referencing it keep their line-item snapshots.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, code: &str) -> Result<Product, ProductError> {
        debug!("Sending request");
        match self.inner.delete_one(Product::key_filter(code)).await? {
            Some(doc) => {
                info!("Product deleted");
                Ok(Product::from_document(doc)?)
            }
            None => {
                warn!("Product not found");
                Err(ProductError::NotFound(code.to_string()))
            }
        }
    }

    /// Atomically takes `quantity` units out of stock, but only if that many
    /// are on hand. Returns false when the product is missing or short.
    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, code: &str, quantity: u32) -> Result<bool, ProductError> {
        debug!("Sending request");
        let guarded = Filter::And(vec![
            Product::key_filter(code),
            Filter::gte("stock", Value::from(quantity)),
        ]);
        let result = self
            .inner
            .update_one(guarded, Update::inc("stock", -i64::from(quantity)))
            .await?;
        if result.matched == 0 {
            error!("Stock reservation rejected");
            return Ok(false);
        }
        info!("Stock reserved successfully");
        Ok(true)
    }

    /// Puts `quantity` units back into stock. Returns false when the product
    /// no longer exists; that is not an error.
    ///
    /// Stock saturates at `u32::MAX` instead of overflowing the stored field.
    #[instrument(skip(self))]
    pub async fn release_stock(&self, code: &str, quantity: u32) -> Result<bool, ProductError> {
        debug!("Sending request");
        let headroom = u32::MAX - quantity;
        loop {
            let guarded = Filter::And(vec![Product::key_filter(code), Filter::lte("stock", Value::from(headroom))]);
            let result = self
                .inner
                .update_one(guarded, Update::inc("stock", i64::from(quantity)))
                .await?;
            if result.matched == 1 {
                info!("Stock restored");
                return Ok(true);
            }

            let saturated = Filter::And(vec![
                Product::key_filter(code),
                Filter::gte("stock", Value::from(headroom.saturating_add(1))),
            ]);
            let result = self
                .inner
                .update_one(saturated, Update::set("stock", Value::from(u32::MAX)))
                .await?;
            if result.matched == 1 {
                warn!(stock = u32::MAX, "Stock restore clamped at the maximum");
                return Ok(true);
            }

            // Stock moved between the two guards; retry unless the product is gone.
            if self.find_product(code).await?.is_none() {
                warn!("Product missing, stock not restored");
                return Ok(false);
            }
        }
    }
}

fn ensure_valid_price(price: Decimal) -> Result<(), ProductError> {
    if price < Decimal::ZERO {
        return Err(ProductError::InvalidPrice(price.to_string()));
    }
    Ok(())
}
