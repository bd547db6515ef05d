//! Service discovery plugin.
//!
//! [`Consul`] resolves the configured logical service through the catalog, keeps the
//! instance list cached for `refresh_ttl`, and rewrites each outgoing request to one
//! of the instances. With retry enabled, failed attempts are re-routed to the next
//! instance in the list.

mod cache;
mod retrier;
mod select;

pub use retrier::ConsulRetrier;
pub use select::{candidate_index, set_server_url};

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::core::{Catalog, ConsulCatalog, ConsulConfig, ConsulError};
use crate::pipeline::{Context, Plugin};
use cache::CacheState;

/// Discovery-backed routing plugin for one logical service.
///
/// Cheap to clone; clones share the instance cache.
#[derive(Clone)]
pub struct Consul {
    inner: Arc<Inner>,
}

struct Inner {
    config: ConsulConfig,
    catalog: Arc<dyn Catalog>,
    cache: RwLock<CacheState>,
}

impl Consul {
    /// Creates the plugin, talking to the agent described by `config.client`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsulError::Config`] if the config is incomplete or the agent address
    /// is unusable, or an error if the HTTP client cannot be built.
    pub fn new(config: ConsulConfig) -> Result<Self, ConsulError> {
        config.validate()?;
        let catalog = ConsulCatalog::new(&config.client)?;
        Ok(Self::from_parts(config, Arc::new(catalog)))
    }

    /// Creates the plugin on top of an arbitrary catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConsulError::Config`] if the config is incomplete.
    pub fn with_catalog(
        config: ConsulConfig,
        catalog: Arc<dyn Catalog>,
    ) -> Result<Self, ConsulError> {
        config.validate()?;
        Ok(Self::from_parts(config, catalog))
    }

    fn from_parts(config: ConsulConfig, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                catalog,
                cache: RwLock::new(CacheState::default()),
            }),
        }
    }

    /// The configuration this plugin was created with.
    pub fn config(&self) -> &ConsulConfig {
        &self.inner.config
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, ctx), fields(service = %self.inner.config.service, url = %ctx.url())))]
    async fn route(&self, ctx: &mut Context) -> Result<(), ConsulError> {
        ctx.state_mut().reset();
        let routed = self.set_best_candidate(ctx).await;
        #[cfg(feature = "tracing")]
        let routed =
            routed.inspect_err(|e| tracing::warn!(error = %e, "aborting request before dial"));
        routed?;

        let config = &self.inner.config;
        if config.retry
            && let Some(strategy) = &config.retrier
        {
            ctx.set_dialer(Arc::new(ConsulRetrier::new(self.clone(), strategy.clone())));
        }
        Ok(())
    }
}

impl Plugin for Consul {
    fn before_dial<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), ConsulError>> {
        Box::pin(self.route(ctx))
    }
}

impl std::fmt::Debug for Consul {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consul")
            .field("service", &self.inner.config.service)
            .field("tag", &self.inner.config.tag)
            .field("retry", &self.inner.config.retry)
            .field("cache", &self.inner.config.cache)
            .finish_non_exhaustive()
    }
}
