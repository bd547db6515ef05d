use futures::future::BoxFuture;
use reqwest::{Request, Response};

use super::Context;
use crate::core::ConsulError;

/// Performs one network attempt.
pub trait Transport: Send + Sync {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, ConsulError>>;
}

impl Transport for reqwest::Client {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, ConsulError>> {
        Box::pin(async move { Ok(self.execute(request).await?) })
    }
}

/// Replaces the plain transport for a single request, typically to wrap each network
/// attempt with routing or retry logic.
pub trait Dialer: Send + Sync {
    fn dial<'a>(
        &'a self,
        ctx: &'a mut Context,
        transport: &'a dyn Transport,
    ) -> BoxFuture<'a, Result<Response, ConsulError>>;
}

/// A middleware layer registered on a [`Client`](super::Client).
pub trait Plugin: Send + Sync {
    /// Called once per request right before it is dialed.
    ///
    /// Returning `Ok` continues with the next plugin and then the transport; returning
    /// `Err` aborts the request with that error and no network attempt is made.
    fn before_dial<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), ConsulError>>;
}
