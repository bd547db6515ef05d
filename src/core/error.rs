use thiserror::Error;

/// Failure reported by a catalog while looking up the instances of a service.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The HTTP request to the catalog could not be completed.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status code.
    #[error("catalog returned status {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The catalog URL that was queried.
        url: String,
    },

    /// The catalog body was not the expected JSON shape.
    #[error("catalog response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// The catalog URL could not be built from the client settings.
    #[error("invalid catalog url: {0}")]
    Url(#[from] url::ParseError),

    /// A catalog-specific failure, used by non-HTTP catalog implementations.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Failure to pick an instance for the outgoing request.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The catalog lookup itself failed.
    #[error("consul: lookup failed for service {service}: {source}")]
    Lookup {
        /// The logical service being resolved.
        service: String,
        /// The underlying catalog failure.
        #[source]
        source: LookupError,
    },

    /// The catalog returned zero instances for the service.
    #[error("consul: missing servers for service: {service}")]
    NoInstances {
        /// The logical service being resolved.
        service: String,
    },
}

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum ConsulError {
    /// No instance could be selected for the request.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// The transport failed to complete an attempt (connect, timeout, I/O).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The selected instance answered with a status treated as a failed attempt.
    #[error("unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The request was cancelled by its caller.
    #[error("request cancelled")]
    Cancelled,

    /// The request body is a stream and cannot be sent more than once.
    #[error("request body cannot be replayed for another attempt")]
    BodyNotReplayable,

    /// A retry strategy reported success without running a single attempt.
    #[error("retry strategy finished without running an attempt")]
    NoAttempt,

    /// The outgoing URL cannot carry the selected instance address.
    #[error("cannot route request to {0}")]
    InvalidTarget(String),

    /// The plugin or pipeline configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A provided URL could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ConsulError {
    /// Whether a retry strategy may run another attempt after this error.
    ///
    /// Transport failures, 5xx/429 statuses and catalog lookup failures are transient.
    /// An empty catalog, cancellation and configuration problems are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsulError::Transport(e) => !e.is_builder(),
            ConsulError::Status { status, .. } => *status >= 500 || *status == 429,
            ConsulError::Selection(SelectionError::Lookup { .. }) => true,
            ConsulError::Selection(SelectionError::NoInstances { .. })
            | ConsulError::Cancelled
            | ConsulError::BodyNotReplayable
            | ConsulError::NoAttempt
            | ConsulError::InvalidTarget(_)
            | ConsulError::Config(_)
            | ConsulError::Url(_) => false,
        }
    }

    /// Returns the selection error if this request failed to resolve an instance.
    pub fn as_selection(&self) -> Option<&SelectionError> {
        match self {
            ConsulError::Selection(e) => Some(e),
            _ => None,
        }
    }
}
