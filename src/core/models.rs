/// One discovered endpoint of a logical service.
///
/// Instances are immutable snapshots of what the catalog reported at lookup time. The
/// plugin cache shares them between requests and never mutates them in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceInstance {
    /// Name of the catalog node hosting the instance.
    pub node: String,
    /// Network address requests should be sent to (hostname or IP literal).
    pub address: String,
    /// Service port, if the catalog registered one.
    pub port: Option<u16>,
    /// Catalog identifier of this service registration.
    pub service_id: String,
    /// Logical service name.
    pub service_name: String,
    /// Tags attached to the registration.
    pub tags: Vec<String>,
}

impl ServiceInstance {
    /// Creates an instance from an address and an optional port.
    ///
    /// A port of `0` is treated as "no port", matching how catalogs report unset ports.
    pub fn new(address: impl Into<String>, port: impl Into<Option<u16>>) -> Self {
        Self {
            address: address.into(),
            port: port.into().filter(|p| *p != 0),
            ..Self::default()
        }
    }

    /// Sets the node and service identifiers.
    #[must_use]
    pub fn with_ids(mut self, node: impl Into<String>, service_id: impl Into<String>) -> Self {
        self.node = node.into();
        self.service_id = service_id.into();
        self
    }

    /// `address[:port]` as it would appear in a URL authority.
    pub fn authority(&self) -> String {
        let host = if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]", self.address)
        } else {
            self.address.clone()
        };
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host,
        }
    }
}
