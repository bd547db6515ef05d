//! Centralized constants for default endpoints and settings.

use std::time::Duration;

/// Default Consul agent address (host:port, no scheme).
pub(crate) const DEFAULT_ADDRESS: &str = "127.0.0.1:8500";

/// Scheme used both for the agent and for routed requests unless overridden.
pub(crate) const DEFAULT_SCHEME: &str = "http";

/// Catalog endpoint path (service name is appended).
pub(crate) const CATALOG_SERVICE_PATH: &str = "v1/catalog/service/";

/// Header carrying the ACL token.
pub(crate) const TOKEN_HEADER: &str = "X-Consul-Token";

/// How long a cached instance list is served before it is refreshed.
pub(crate) const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(2 * 60);

/// Total attempts made by the default retry strategy.
pub(crate) const DEFAULT_RETRY_ATTEMPTS: usize = 3;

/// Pause between attempts of the default retry strategy.
pub(crate) const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);
