//! System orchestration, configuration, persistence and tracing setup.

pub mod commerce_system;
pub mod config;
pub mod error;
pub mod persistence;
pub mod telemetry;

pub use commerce_system::*;
pub use config::*;
pub use error::*;
pub use persistence::*;
pub use telemetry::*;
