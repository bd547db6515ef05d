//! The host HTTP pipeline.
//!
//! A [`Client`] runs every registered [`Plugin`]'s before-dial hook on a request
//! [`Context`], then performs the network attempt either through the plain
//! [`Transport`] or through the [`Dialer`] a plugin installed for that request.

mod context;
mod hooks;

pub use context::{Context, RequestState};
pub use hooks::{Dialer, Plugin, Transport};

use std::sync::Arc;
use std::time::Duration;

use reqwest::{IntoUrl, Method, Request, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;

use crate::core::ConsulError;

/// HTTP client that routes every request through its plugins.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Client {
    /// Create a new builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The underlying `reqwest` client, used as the transport.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Starts a request. The host part of `url` is typically a placeholder that a
    /// plugin rewrites before dialing.
    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.http.request(method, url)
    }

    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.http.get(url)
    }

    /// Builds and sends `builder` through the plugin chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built, a plugin aborts it, or the
    /// attempt (and any retries) fail.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ConsulError> {
        self.send(builder.build()?).await
    }

    /// Sends `request` through the plugin chain.
    ///
    /// # Errors
    ///
    /// Returns an error if a plugin aborts the request or the attempt (and any retries)
    /// fail.
    pub async fn send(&self, request: Request) -> Result<Response, ConsulError> {
        self.send_with_cancel(request, CancellationToken::new()).await
    }

    /// Sends `request`, giving up with [`ConsulError::Cancelled`] as soon as `cancel`
    /// fires. No further attempts or instance selections happen after cancellation.
    ///
    /// # Errors
    ///
    /// Same as [`Client::send`], plus [`ConsulError::Cancelled`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, request, cancel), err, fields(url = %request.url())))]
    pub async fn send_with_cancel(
        &self,
        request: Request,
        cancel: CancellationToken,
    ) -> Result<Response, ConsulError> {
        let ctx = Context::new(request, cancel.clone());
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ConsulError::Cancelled),
            res = self.dispatch(ctx) => res,
        }
    }

    async fn dispatch(&self, mut ctx: Context) -> Result<Response, ConsulError> {
        for plugin in &self.plugins {
            plugin.before_dial(&mut ctx).await?;
        }
        match ctx.take_dialer() {
            Some(dialer) => dialer.dial(&mut ctx, &self.http).await,
            None => self.http.round_trip(ctx.into_request()).await,
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("plugins", &self.plugins.len())
            .finish_non_exhaustive()
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct ClientBuilder {
    http: Option<reqwest::Client>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl ClientBuilder {
    /// Registers a plugin. Plugins run in registration order.
    #[must_use]
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Use a preconfigured `reqwest` client. Timeouts and user agent set on this
    /// builder are ignored when one is provided.
    #[must_use]
    pub fn http(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set a per-attempt request timeout. Default: none.
    #[must_use]
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the underlying `reqwest` client cannot be built.
    pub fn build(self) -> Result<Client, ConsulError> {
        let http = match self.http {
            Some(http) => http,
            None => {
                let mut httpb = reqwest::Client::builder();
                if let Some(ua) = self.user_agent {
                    httpb = httpb.user_agent(ua);
                }
                if let Some(t) = self.timeout {
                    httpb = httpb.timeout(t);
                }
                if let Some(ct) = self.connect_timeout {
                    httpb = httpb.connect_timeout(ct);
                }
                httpb.build()?
            }
        };

        Ok(Client {
            http,
            plugins: self.plugins,
        })
    }
}
