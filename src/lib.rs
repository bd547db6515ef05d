//! consul-dial: Consul-backed service discovery for HTTP clients.
//!
//! Requests are addressed to a logical service (`http://web/orders`). Before the
//! request is dialed, the [`Consul`] plugin resolves the service through the catalog,
//! picks an instance, and rewrites the URL's scheme, host and port. When retry is
//! enabled, every failed attempt is re-routed to the next instance of the (cached)
//! list under the configured [`Retrier`] strategy.
//!
//! ```no_run
//! use consul_dial::{Client, Consul, ConsulConfig};
//!
//! # async fn run() -> Result<(), consul_dial::ConsulError> {
//! let consul = Consul::new(ConsulConfig::new("127.0.0.1:8500", "web"))?;
//! let client = Client::builder().plugin(consul).build()?;
//!
//! let resp = client.execute(client.get("http://web/health")).await?;
//! println!("{}", resp.status());
//! # Ok(())
//! # }
//! ```

pub mod consul;
pub mod core;
pub mod pipeline;

pub use crate::consul::{Consul, ConsulRetrier};
pub use crate::core::{
    Catalog, ClientConfig, ConstantBackoff, ConsulCatalog, ConsulConfig, ConsulError,
    ExponentialBackoff, LookupError, NoRetry, Operation, QueryOptions, Retrier,
    SelectionError, ServiceInstance,
};
pub use crate::pipeline::{Client, ClientBuilder, Context, Dialer, Plugin, RequestState, Transport};
pub use tokio_util::sync::CancellationToken;
