use futures::future::BoxFuture;

use crate::core::{LookupError, QueryOptions, ServiceInstance};

/// A service-discovery catalog that can list the registered instances of a service.
///
/// This decouples the plugin from the concrete discovery backend. It is implemented by
/// [`ConsulCatalog`](crate::core::client::ConsulCatalog) for the Consul HTTP API, and
/// can be implemented by anything else that returns an ordered list of instances.
pub trait Catalog: Send + Sync {
    /// Asynchronously lists the instances registered for `service`.
    ///
    /// # Arguments
    /// * `service` - The logical service name.
    /// * `tag` - Only return instances carrying this tag, if set.
    /// * `query` - Backend-specific query options (datacenter, consistency, …).
    ///
    /// # Returns
    /// A `Future` resolving to the instances in catalog order, or a [`LookupError`].
    fn lookup_service<'a>(
        &'a self,
        service: &'a str,
        tag: Option<&'a str>,
        query: &'a QueryOptions,
    ) -> BoxFuture<'a, Result<Vec<ServiceInstance>, LookupError>>;
}
