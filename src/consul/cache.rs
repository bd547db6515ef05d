use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::Consul;
use crate::core::{LookupError, ServiceInstance};

/// The last successful lookup and when it happened.
///
/// `updated == None` means no lookup ever succeeded; a populated state may still hold an
/// empty list when the service had no registered instances at that time.
#[derive(Debug, Default)]
pub(crate) struct CacheState {
    updated: Option<Instant>,
    instances: Arc<[ServiceInstance]>,
}

impl CacheState {
    fn fresh(&self, ttl: Duration) -> bool {
        match self.updated {
            Some(at) => !self.instances.is_empty() && at.elapsed() < ttl,
            None => false,
        }
    }
}

impl Consul {
    /// Returns the current instance list of the configured service.
    ///
    /// With caching enabled, a non-empty list refreshed less than `refresh_ttl` ago is
    /// served from memory; anything else triggers a catalog lookup. A failed lookup
    /// leaves the cache untouched; a successful one replaces list and timestamp together.
    ///
    /// # Errors
    ///
    /// Returns the catalog's error when a lookup is needed and fails.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(service = %self.inner.config.service)))]
    pub async fn get_instances(&self) -> Result<Arc<[ServiceInstance]>, LookupError> {
        let config = &self.inner.config;

        if config.cache
            && let Some(instances) = self.cached().await
        {
            #[cfg(feature = "tracing")]
            tracing::trace!(instances = instances.len(), "instance cache hit");
            return Ok(instances);
        }

        // No lock is held during the lookup; concurrent refreshes may overlap.
        let instances: Arc<[ServiceInstance]> = self
            .inner
            .catalog
            .lookup_service(&config.service, config.tag.as_deref(), &config.query)
            .await?
            .into();

        if config.cache {
            self.store(instances.clone()).await;
        }
        Ok(instances)
    }

    /// Whether a non-empty instance list younger than the refresh TTL is cached.
    pub async fn is_updated(&self) -> bool {
        self.inner
            .cache
            .read()
            .await
            .fresh(self.inner.config.refresh_ttl)
    }

    /// When the cached list was last replaced by a successful lookup.
    pub async fn last_refreshed(&self) -> Option<Instant> {
        self.inner.cache.read().await.updated
    }

    /// The cached instance list, regardless of its age.
    pub async fn cached_instances(&self) -> Arc<[ServiceInstance]> {
        self.inner.cache.read().await.instances.clone()
    }

    /// Drops the cached list; the next request performs a lookup.
    pub async fn clear_cache(&self) {
        *self.inner.cache.write().await = CacheState::default();
    }

    async fn cached(&self) -> Option<Arc<[ServiceInstance]>> {
        let state = self.inner.cache.read().await;
        state
            .fresh(self.inner.config.refresh_ttl)
            .then(|| state.instances.clone())
    }

    async fn store(&self, instances: Arc<[ServiceInstance]>) {
        let mut state = self.inner.cache.write().await;
        state.updated = Some(Instant::now());
        state.instances = instances;
    }
}
