//! TerraSync API client
//!
//! Typed access to the circular-economy backend: upload an item image for
//! analysis, orchestrate a trade for the analyzed item, and read aggregate
//! impact counters.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod upload;

pub use client::TerraSyncClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use models::*;
pub use upload::ImageUpload;
