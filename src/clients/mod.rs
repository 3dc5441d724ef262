//! Typed clients in front of the collection actors. The order and customer
//! clients also orchestrate the multi-collection workflows.

#[macro_use]
mod macros;

mod customer_client;
mod order_client;
mod product_client;

pub use customer_client::*;
pub use order_client::*;
pub use product_client::*;

use crate::actor_framework::Record;
use crate::error::StoreError;
use crate::query::Document;

fn decode_all<T: Record>(documents: Vec<Document>) -> Result<Vec<T>, StoreError> {
    documents.into_iter().map(T::from_document).collect()
}
