use thiserror::Error;

/// Errors raised by the collection actors and their clients.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Duplicate key in {collection}: {key}")]
    DuplicateKey { collection: String, key: String },
    #[error("Invalid update on '{path}': {reason}")]
    InvalidUpdate { path: String, reason: String },
    #[error("Malformed document in {collection}: {reason}")]
    Malformed { collection: String, reason: String },
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl StoreError {
    /// The store itself is unavailable; nothing the operator types can fix it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::ActorCommunicationError(_))
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CustomerError {
    #[error("Customer not found: {0}")]
    NotFound(String),
    #[error("Customer already exists: {0}")]
    AlreadyExists(String),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CustomerError {
    pub fn is_fatal(&self) -> bool {
        match self {
            CustomerError::Order(e) => e.is_fatal(),
            CustomerError::Store(e) => e.is_fatal(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProductError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProductError::Store(e) if e.is_fatal())
    }
}

/// Errors that can occur during order placement and cancellation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order already exists: {0}")]
    AlreadyExists(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Insufficient stock for {product_code}: requested {requested}, available {available}")]
    InsufficientStock {
        product_code: String,
        requested: u32,
        available: u32,
    },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderError {
    pub fn is_fatal(&self) -> bool {
        match self {
            OrderError::Product(e) => e.is_fatal(),
            OrderError::Store(e) => e.is_fatal(),
            _ => false,
        }
    }
}
