//! goalpost-gateway: sync gateway implementations.
//!
//! Implements the `SyncGateway` trait with an in-memory mock and a REST
//! client, and builds either one from configuration.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{create_gateway, load_config, load_config_from, GatewayConfig, GoalpostConfig};
pub use http::HttpGateway;
pub use mock::{LatencyProfile, MockGateway, Operation};
