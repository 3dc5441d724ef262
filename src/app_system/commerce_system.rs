use tracing::{error, info, instrument};

use crate::actor_framework::CollectionActor;
use crate::clients::{CustomerClient, OrderClient, ProductClient};
use crate::domain::{Customer, Order, Product};

use super::{AppConfig, PersistenceError, Snapshot};

/// The main application system that owns the three collection actors.
///
/// Responsible for starting the actors, wiring the clients together, saving
/// snapshots and handling shutdown. Built once at process start and passed by
/// reference to whatever issues store operations.
pub struct CommerceSystem {
    pub customer_client: CustomerClient,
    pub order_client: OrderClient,
    pub product_client: ProductClient,
    config: AppConfig,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CommerceSystem {
    /// Loads the configured snapshot (if any) and starts the system on it.
    pub async fn open(config: AppConfig) -> Result<Self, PersistenceError> {
        let snapshot = match config.snapshot_path() {
            Some(path) => Snapshot::load(&path).await?,
            None => Snapshot::default(),
        };
        Ok(Self::start(config, snapshot))
    }

    /// Starts every actor seeded from `snapshot`.
    ///
    /// Sub-actors first, then the clients that depend on them: products, then
    /// orders (which move stock), then customers (which cascade into orders).
    #[instrument(name = "commerce_system", skip(config, snapshot))]
    pub fn start(config: AppConfig, snapshot: Snapshot) -> Self {
        info!(database = %config.database, "Starting commerce system");
        let buffer = config.channel_buffer;

        let (product_actor, products) = CollectionActor::for_record::<Product>(buffer, snapshot.products);
        let product_client = ProductClient::new(products);
        let product_handle = tokio::spawn(product_actor.run());

        let (order_actor, orders) = CollectionActor::for_record::<Order>(buffer, snapshot.orders);
        let order_client = OrderClient::new(orders, product_client.clone());
        let order_handle = tokio::spawn(order_actor.run());

        let (customer_actor, customers) = CollectionActor::for_record::<Customer>(buffer, snapshot.customers);
        let customer_client = CustomerClient::new(customers, order_client.clone());
        let customer_handle = tokio::spawn(customer_actor.run());

        info!("Commerce system started successfully");
        Self {
            customer_client,
            order_client,
            product_client,
            config,
            handles: vec![product_handle, order_handle, customer_handle],
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Copies every collection out of its actor.
    pub async fn snapshot(&self) -> Result<Snapshot, PersistenceError> {
        Ok(Snapshot {
            customers: self.customer_client.raw().snapshot().await?,
            products: self.product_client.raw().snapshot().await?,
            orders: self.order_client.raw().snapshot().await?,
        })
    }

    /// Writes the current state to disk when persistence is enabled.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let Some(path) = self.config.snapshot_path() else {
            return Ok(());
        };
        self.snapshot().await?.save(&path).await
    }

    /// Flushes, then closes every channel and waits for the actors to stop.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), PersistenceError> {
        info!("Shutting down commerce system");
        let flushed = self.flush().await;

        // Actors stop once every client holding their channel is gone.
        drop(self.customer_client);
        drop(self.order_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
            }
        }

        info!("Commerce system shutdown complete");
        flushed
    }
}
