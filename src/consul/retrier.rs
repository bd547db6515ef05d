use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Response, StatusCode};

use super::Consul;
use crate::core::{Attempt, ConsulError, Operation, Retrier};
use crate::pipeline::{Context, Dialer, Transport};

/// Per-request dialer that runs network attempts under the configured retry strategy,
/// re-routing every retry to the next candidate instance.
#[derive(Debug)]
pub struct ConsulRetrier {
    consul: Consul,
    strategy: Arc<dyn Retrier>,
}

impl ConsulRetrier {
    pub fn new(consul: Consul, strategy: Arc<dyn Retrier>) -> Self {
        Self { consul, strategy }
    }
}

impl Dialer for ConsulRetrier {
    fn dial<'a>(
        &'a self,
        ctx: &'a mut Context,
        transport: &'a dyn Transport,
    ) -> BoxFuture<'a, Result<Response, ConsulError>> {
        Box::pin(async move {
            let mut attempt = DialAttempt {
                consul: &self.consul,
                ctx,
                transport,
                started: false,
                drained: false,
                response: None,
            };
            self.strategy.run(&mut attempt).await?;
            attempt.response.take().ok_or(ConsulError::NoAttempt)
        })
    }
}

struct DialAttempt<'a> {
    consul: &'a Consul,
    ctx: &'a mut Context,
    transport: &'a dyn Transport,
    started: bool,
    /// The body was streamed out by an earlier attempt and cannot be sent again.
    drained: bool,
    response: Option<Response>,
}

impl DialAttempt<'_> {
    async fn run(&mut self) -> Result<(), ConsulError> {
        if self.ctx.is_cancelled() {
            return Err(ConsulError::Cancelled);
        }

        // The before-dial hook already routed the first attempt.
        if self.started {
            if self.drained {
                return Err(ConsulError::BodyNotReplayable);
            }
            let _attempt = self.ctx.state_mut().advance();
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt = _attempt, "retrying against next candidate");
            self.consul.set_best_candidate(self.ctx).await?;
        }
        self.started = true;

        let request = match self.ctx.request().try_clone() {
            Some(request) => request,
            None => {
                self.drained = true;
                self.ctx.take_request()
            }
        };
        let response = self.transport.round_trip(request).await?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ConsulError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        self.response = Some(response);
        Ok(())
    }
}

impl Operation for DialAttempt<'_> {
    fn call(&mut self) -> Attempt<'_> {
        Box::pin(self.run())
    }
}
