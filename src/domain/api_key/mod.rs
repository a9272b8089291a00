//! API key domain
//!
//! Domain types and the durable store contract for project API key-sets.

mod entity;
mod repository;

pub use entity::{AccessKeyType, KeyPartitions, ProjectApiKeys};
pub use repository::ApiKeyStore;

#[cfg(test)]
pub use repository::mock;
