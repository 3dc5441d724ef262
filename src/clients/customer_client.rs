use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{CollectionClient, Record};
use crate::clients::OrderClient;
use crate::domain::{Customer, CustomerCreate, CustomerRemoved, Order};
use crate::error::{CustomerError, StoreError};
use crate::query::Filter;

use super::decode_all;

/// Client for interacting with the customers collection.
///
/// Customers are always resolved through [`Customer::lookup_filter`] so that
/// records keyed by the deprecated `identifier` field behave like current ones.
#[derive(Clone, Debug)]
pub struct CustomerClient {
    inner: CollectionClient,
    order_client: OrderClient,
}

impl CustomerClient {
    pub fn new(inner: CollectionClient, order_client: OrderClient) -> Self {
        Self { inner, order_client }
    }

    pub fn raw(&self) -> &CollectionClient {
        &self.inner
    }

    #[instrument(skip(self, params), fields(customer_code = %params.code))]
    pub async fn create_customer(&self, params: CustomerCreate) -> Result<Customer, CustomerError> {
        debug!("Sending request");
        // The unique index only covers `code`; legacy identifiers are checked here.
        if self.find_customer(&params.code).await?.is_some() {
            warn!("Customer code already in use");
            return Err(CustomerError::AlreadyExists(params.code));
        }
        let customer = Customer::register(params, Utc::now());
        match self.inner.insert_one(customer.to_document()?).await {
            Ok(()) => {}
            Err(StoreError::DuplicateKey { key, .. }) => return Err(CustomerError::AlreadyExists(key)),
            Err(e) => return Err(e.into()),
        }
        info!("Customer created");
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn find_customer(&self, code: &str) -> Result<Option<Customer>, CustomerError> {
        debug!("Sending request");
        let found = self.inner.find_one(Customer::lookup_filter(code)).await?;
        Ok(found.map(Customer::from_document).transpose()?)
    }

    #[instrument(skip(self))]
    pub async fn customers_by_name(&self, name: &str) -> Result<Vec<Customer>, CustomerError> {
        debug!("Sending request");
        Ok(decode_all(self.inner.find(Customer::name_filter(name)).await?)?)
    }

    #[instrument(skip(self))]
    pub async fn customers_by_city(&self, city: &str) -> Result<Vec<Customer>, CustomerError> {
        debug!("Sending request");
        Ok(decode_all(self.inner.find(Filter::eq("address.city", city)).await?)?)
    }

    /// Customers registered during `day` (UTC), both ends of the day included.
    #[instrument(skip(self))]
    pub async fn customers_registered_on(&self, day: NaiveDate) -> Result<Vec<Customer>, CustomerError> {
        debug!("Sending request");
        let start = day.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        let end = start + 24 * 60 * 60 * 1000 - 1;
        Ok(decode_all(self.inner.find(Filter::range("registered_at", start, end)).await?)?)
    }

    /// The customer together with every order placed under any of its codes.
    #[instrument(skip(self))]
    pub async fn customer_orders(&self, code: &str) -> Result<(Customer, Vec<Order>), CustomerError> {
        let customer = self
            .find_customer(code)
            .await?
            .ok_or_else(|| CustomerError::NotFound(code.to_string()))?;
        let orders = self.order_client.orders_for_customer(&customer.aliases()).await?;
        Ok((customer, orders))
    }

    /// Deletes a customer and everything that depends on it.
    ///
    /// Phases: read and claim all of the customer's orders, restore the stock
    /// of every claimed line item, then delete the customer record.
    /// The phases are not transactional; a crash between them leaves the
    /// later ones undone.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, code: &str) -> Result<CustomerRemoved, CustomerError> {
        info!("Processing delete_customer request");

        let Some(customer) = self.find_customer(code).await? else {
            warn!("Customer not found");
            return Err(CustomerError::NotFound(code.to_string()));
        };

        let removed = self.order_client.remove_for_customer(&customer.aliases()).await?;

        if self.inner.delete_one(Customer::lookup_filter(code)).await?.is_none() {
            warn!("Customer disappeared during cascade");
            return Err(CustomerError::NotFound(code.to_string()));
        }

        info!(orders_deleted = removed.len(), "Customer deleted");
        Ok(CustomerRemoved {
            full_name: customer.full_name(),
            code: customer.code,
            orders_deleted: removed.len(),
        })
    }
}
