//! Consul catalog client + retry strategies.
//! Internals are split into `retry` (strategies) and `constants` (defaults).

pub(crate) mod constants;
mod retry;

pub use retry::{Attempt, ConstantBackoff, ExponentialBackoff, NoRetry, Operation, Retrier};

use constants::{CATALOG_SERVICE_PATH, TOKEN_HEADER};
use futures::future::BoxFuture;
use reqwest::Client;
use url::Url;

use crate::core::wire::decode_catalog;
use crate::core::{Catalog, ClientConfig, ConsulError, LookupError, QueryOptions, ServiceInstance};

/// [`Catalog`] backed by the Consul agent HTTP API (`/v1/catalog/service/:service`).
#[derive(Debug, Clone)]
pub struct ConsulCatalog {
    http: Client,
    base: Url,
    datacenter: Option<String>,
    token: Option<String>,
}

impl ConsulCatalog {
    /// Builds a catalog client for the agent described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent address is not a valid URL authority or the HTTP
    /// client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ConsulError> {
        let mut httpb = Client::builder();
        if let Some(t) = config.timeout {
            httpb = httpb.timeout(t);
        }
        Self::with_http(config, httpb.build()?)
    }

    /// Same as [`ConsulCatalog::new`], reusing an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent address is not a valid URL authority.
    pub fn with_http(config: &ClientConfig, http: Client) -> Result<Self, ConsulError> {
        Ok(Self {
            http,
            base: agent_base(config)?,
            datacenter: config.datacenter.clone(),
            token: config.token.clone(),
        })
    }

    /// Base URL of the agent, e.g. `http://127.0.0.1:8500/`.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn service_url(
        &self,
        service: &str,
        tag: Option<&str>,
        query: &QueryOptions,
    ) -> Result<Url, LookupError> {
        let mut url = self.base.join(CATALOG_SERVICE_PATH)?.join(service)?;
        {
            let mut qp = url.query_pairs_mut();
            if let Some(tag) = tag {
                qp.append_pair("tag", tag);
            }
            if let Some(dc) = query.datacenter.as_deref().or(self.datacenter.as_deref()) {
                qp.append_pair("dc", dc);
            }
            if let Some(near) = &query.near {
                qp.append_pair("near", near);
            }
            for (key, value) in &query.node_meta {
                qp.append_pair("node-meta", &format!("{key}:{value}"));
            }
            if let Some(filter) = &query.filter {
                qp.append_pair("filter", filter);
            }
            if query.allow_stale {
                qp.append_key_only("stale");
            }
            if query.require_consistent {
                qp.append_key_only("consistent");
            }
            if query.use_cache {
                qp.append_key_only("cached");
            }
        }
        // An empty query string would leave a dangling `?`.
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, query), err, fields(base = %self.base)))]
    async fn fetch(
        &self,
        service: &str,
        tag: Option<&str>,
        query: &QueryOptions,
    ) -> Result<Vec<ServiceInstance>, LookupError> {
        let url = self.service_url(service, tag, query)?;

        let mut req = self
            .http
            .get(url.clone())
            .header("accept", "application/json");
        if let Some(token) = query.token.as_deref().or(self.token.as_deref()) {
            req = req.header(TOKEN_HEADER, token);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(LookupError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        let instances = decode_catalog(&body)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(service, instances = instances.len(), "catalog lookup");

        Ok(instances)
    }
}

impl Catalog for ConsulCatalog {
    fn lookup_service<'a>(
        &'a self,
        service: &'a str,
        tag: Option<&'a str>,
        query: &'a QueryOptions,
    ) -> BoxFuture<'a, Result<Vec<ServiceInstance>, LookupError>> {
        Box::pin(self.fetch(service, tag, query))
    }
}

fn agent_base(config: &ClientConfig) -> Result<Url, ConsulError> {
    let raw = if config.address.contains("://") {
        config.address.clone()
    } else {
        format!("{}://{}", config.scheme, config.address)
    };
    let mut base = Url::parse(&raw)?;
    if base.cannot_be_a_base() || base.host_str().is_none_or(str::is_empty) {
        return Err(ConsulError::Config(format!(
            "invalid agent address: {}",
            config.address
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}
