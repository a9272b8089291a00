//! Storage infrastructure

mod postgres;

pub use postgres::connect_pool;
