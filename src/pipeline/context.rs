use std::sync::Arc;

use reqwest::Request;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::Dialer;

/// Per-request routing state.
///
/// Exactly one exists per in-flight request. The before-dial hook resets it and the
/// retry adapter advances it; a request's attempts run one at a time, so it is never
/// shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestState {
    attempt: usize,
}

impl RequestState {
    /// Which attempt is in progress; `0` is the first one.
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    pub(crate) fn reset(&mut self) {
        self.attempt = 0;
    }

    pub(crate) fn advance(&mut self) -> usize {
        self.attempt += 1;
        self.attempt
    }
}

/// The mutable view of one outgoing request handed to plugins.
pub struct Context {
    request: Request,
    state: RequestState,
    dialer: Option<Arc<dyn Dialer>>,
    cancel: CancellationToken,
}

impl Context {
    pub fn new(request: Request, cancel: CancellationToken) -> Self {
        Self {
            request,
            state: RequestState::default(),
            dialer: None,
            cancel,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Target URL of the request.
    pub fn url(&self) -> &Url {
        self.request.url()
    }

    pub fn url_mut(&mut self) -> &mut Url {
        self.request.url_mut()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RequestState {
        &mut self.state
    }

    /// Installs the dialer performing this request's network attempts, replacing the
    /// plain transport for the rest of the request.
    pub fn set_dialer(&mut self, dialer: Arc<dyn Dialer>) {
        self.dialer = Some(dialer);
    }

    pub fn has_dialer(&self) -> bool {
        self.dialer.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn take_dialer(&mut self) -> Option<Arc<dyn Dialer>> {
        self.dialer.take()
    }

    /// Moves the request out, leaving one with the same method, URL and headers but no
    /// body, so a streaming body can still be sent once.
    pub(crate) fn take_request(&mut self) -> Request {
        let mut rest = Request::new(self.request.method().clone(), self.request.url().clone());
        *rest.headers_mut() = self.request.headers().clone();
        *rest.timeout_mut() = self.request.timeout().copied();
        *rest.version_mut() = self.request.version();
        std::mem::replace(&mut self.request, rest)
    }

    pub(crate) fn into_request(self) -> Request {
        self.request
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("url", &self.request.url().as_str())
            .field("state", &self.state)
            .field("dialer", &self.dialer.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
