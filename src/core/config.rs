use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::ConsulError;
use crate::core::client::constants::{DEFAULT_ADDRESS, DEFAULT_REFRESH_TTL, DEFAULT_SCHEME};
use crate::core::client::{ConstantBackoff, Retrier};

/// Connection settings for the Consul agent HTTP API.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Agent address, `host:port`. A full `scheme://host:port` URL is also accepted.
    pub address: String,
    /// Scheme used to reach the agent when `address` has none.
    pub scheme: String,
    /// Datacenter to query when the query options do not name one.
    pub datacenter: Option<String>,
    /// ACL token sent with every catalog request.
    pub token: Option<String>,
    /// Overall timeout for one catalog request. Default: none.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            datacenter: None,
            token: None,
            timeout: None,
        }
    }
}

/// Per-query options forwarded to the catalog lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Datacenter override for this query.
    pub datacenter: Option<String>,
    /// Allow any server (not only the leader) to answer.
    pub allow_stale: bool,
    /// Force a fully consistent read through the leader.
    pub require_consistent: bool,
    /// Serve from the agent's local cache.
    pub use_cache: bool,
    /// Sort results by round-trip time from this node (`_agent` for the local agent).
    pub near: Option<String>,
    /// Only return nodes carrying all of these metadata pairs.
    pub node_meta: BTreeMap<String, String>,
    /// Filter expression evaluated by the catalog.
    pub filter: Option<String>,
    /// ACL token overriding the client-level token.
    pub token: Option<String>,
}

/// Settings of the discovery plugin for one logical service.
#[derive(Clone, Debug)]
pub struct ConsulConfig {
    /// Retry failed attempts against other instances.
    pub retry: bool,
    /// Cache the instance list for `refresh_ttl`.
    pub cache: bool,
    /// Logical service name to resolve. Required.
    pub service: String,
    /// Only route to instances carrying this tag.
    pub tag: Option<String>,
    /// Scheme written into routed requests.
    pub scheme: String,
    /// Maximum age of a cached instance list.
    pub refresh_ttl: Duration,
    /// Strategy deciding how often and when attempts are retried.
    pub retrier: Option<Arc<dyn Retrier>>,
    /// Agent connection settings.
    pub client: ClientConfig,
    /// Catalog query options.
    pub query: QueryOptions,
}

impl ConsulConfig {
    /// Creates a config with default settings for the agent at `address` and the given
    /// service name. Retry and cache are enabled.
    pub fn new(address: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            retry: true,
            cache: true,
            service: service.into(),
            tag: None,
            scheme: DEFAULT_SCHEME.to_string(),
            refresh_ttl: DEFAULT_REFRESH_TTL,
            retrier: Some(default_retrier()),
            client: ClientConfig {
                address: address.into(),
                ..ClientConfig::default()
            },
            query: QueryOptions::default(),
        }
    }

    /// Replaces the retry strategy.
    #[must_use]
    pub fn with_retrier(mut self, retrier: impl Retrier + 'static) -> Self {
        self.retrier = Some(Arc::new(retrier));
        self
    }

    /// Restricts routing to instances carrying `tag`.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConsulError> {
        if self.service.trim().is_empty() {
            return Err(ConsulError::Config("service name is required".into()));
        }
        if self.scheme.is_empty() {
            return Err(ConsulError::Config("scheme must not be empty".into()));
        }
        if self.client.address.is_empty() {
            return Err(ConsulError::Config("agent address must not be empty".into()));
        }
        Ok(())
    }
}

/// The strategy used when none is configured: three attempts, 100ms apart.
pub fn default_retrier() -> Arc<dyn Retrier> {
    Arc::new(ConstantBackoff::default())
}
