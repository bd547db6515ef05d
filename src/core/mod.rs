//! Core components of the `consul-dial` crate.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The Consul catalog client ([`ConsulCatalog`]) and the retry strategies.
//! - The error types ([`ConsulError`], [`SelectionError`], [`LookupError`]).
//! - Configuration ([`ConsulConfig`], [`ClientConfig`], [`QueryOptions`]).
//! - The [`ServiceInstance`] model and the [`Catalog`] abstraction.

/// The catalog client, its defaults, and the retry strategies.
pub mod client;
/// Plugin, agent and query configuration.
pub mod config;
/// The error types for the crate.
pub mod error;
/// Shared data models.
pub mod models;
/// Service traits abstracting the discovery backend.
pub mod services;
pub(crate) mod wire;

// convenient re-exports so most code can just `use crate::core::ConsulError`
pub use client::{
    Attempt, ConstantBackoff, ConsulCatalog, ExponentialBackoff, NoRetry, Operation, Retrier,
};
pub use config::{ClientConfig, ConsulConfig, QueryOptions, default_retrier};
pub use error::{ConsulError, LookupError, SelectionError};
pub use models::ServiceInstance;
pub use services::Catalog;
