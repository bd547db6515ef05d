use std::net::IpAddr;

use url::Url;

use super::Consul;
use crate::core::{ConsulError, SelectionError, ServiceInstance};
use crate::pipeline::Context;

/// Index of the instance targeted by `attempt` in a list of `len` instances.
///
/// Without cycling every attempt targets the primary. With cycling, attempt `n` targets
/// the `n`-th instance and falls back to the primary once the list is exhausted.
pub fn candidate_index(attempt: usize, len: usize, cycle: bool) -> usize {
    if cycle && attempt < len { attempt } else { 0 }
}

/// Points `url` at `instance`: scheme, host, and port (cleared when the instance has none).
///
/// # Errors
///
/// Returns [`ConsulError::InvalidTarget`] if `url` cannot carry that scheme or host.
pub fn set_server_url(
    url: &mut Url,
    scheme: &str,
    instance: &ServiceInstance,
) -> Result<(), ConsulError> {
    let invalid = || ConsulError::InvalidTarget(format!("{scheme}://{}", instance.authority()));

    if url.scheme() != scheme {
        url.set_scheme(scheme).map_err(|()| invalid())?;
    }

    let literal = instance.address.trim_start_matches('[').trim_end_matches(']');
    match literal.parse::<IpAddr>() {
        Ok(ip) => url.set_ip_host(ip).map_err(|()| invalid())?,
        Err(_) => url
            .set_host(Some(&instance.address))
            .map_err(|_| invalid())?,
    }

    url.set_port(instance.port).map_err(|()| invalid())
}

impl Consul {
    /// Picks the instance targeted by `attempt`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NoInstances`] if `instances` is empty.
    pub fn select_instance(
        &self,
        attempt: usize,
        instances: &[ServiceInstance],
    ) -> Result<ServiceInstance, SelectionError> {
        if instances.is_empty() {
            return Err(SelectionError::NoInstances {
                service: self.inner.config.service.clone(),
            });
        }
        // Only a cached list has a stable order to cycle through.
        let index = candidate_index(attempt, instances.len(), self.inner.config.cache);
        Ok(instances[index].clone())
    }

    /// Looks up the instance list (from cache when fresh) and picks the candidate for
    /// `attempt`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Lookup`] if the catalog fails, or
    /// [`SelectionError::NoInstances`] if it reports no instances.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(service = %self.inner.config.service)))]
    pub async fn best_candidate(&self, attempt: usize) -> Result<ServiceInstance, SelectionError> {
        let instances = self
            .get_instances()
            .await
            .map_err(|source| SelectionError::Lookup {
                service: self.inner.config.service.clone(),
                source,
            })?;
        self.select_instance(attempt, &instances)
    }

    /// Selects the candidate for the request's current attempt and rewrites its URL.
    pub(crate) async fn set_best_candidate(
        &self,
        ctx: &mut Context,
    ) -> Result<ServiceInstance, ConsulError> {
        let instance = self.best_candidate(ctx.state().attempt()).await?;
        set_server_url(ctx.url_mut(), &self.inner.config.scheme, &instance)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt = ctx.state().attempt(),
            target = %instance.authority(),
            "routing request"
        );

        Ok(instance)
    }
}
