//! Network endpoints exposed by resources.

use super::TopologyDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol scheme of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointScheme {
    /// Plain TCP.
    Tcp,
    /// HTTP.
    Http,
    /// HTTPS.
    Https,
}

impl EndpointScheme {
    /// Returns the scheme as used in URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for EndpointScheme {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Address and port assigned to an endpoint during allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointAllocation {
    address: String,
    port: u16,
}

impl EndpointAllocation {
    /// Creates an allocation for `address:port`.
    #[must_use]
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// Returns the host-visible address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the host-visible port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

/// Named endpoint owned by exactly one resource.
///
/// `target_port` is the port the service listens on inside its own network
/// namespace. `port` is the optional fixed host port requested at
/// registration time; the port actually published is only known once the
/// endpoint is allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    name: String,
    scheme: EndpointScheme,
    target_port: Option<u16>,
    port: Option<u16>,
    is_proxied: bool,
    allocation: Option<EndpointAllocation>,
}

impl Endpoint {
    /// Creates an unallocated, proxied endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::EmptyEndpointName`] when the name is
    /// blank.
    pub fn new(name: &str, scheme: EndpointScheme) -> Result<Self, TopologyDomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TopologyDomainError::EmptyEndpointName);
        }

        Ok(Self {
            name: trimmed.to_owned(),
            scheme,
            target_port: None,
            port: None,
            is_proxied: true,
            allocation: None,
        })
    }

    /// Sets the port the service listens on.
    #[must_use]
    pub const fn with_target_port(mut self, target_port: u16) -> Self {
        self.target_port = Some(target_port);
        self
    }

    /// Requests a fixed host port.
    #[must_use]
    pub const fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Sets whether traffic is routed through the host proxy.
    #[must_use]
    pub const fn with_proxy(mut self, is_proxied: bool) -> Self {
        self.is_proxied = is_proxied;
        self
    }

    /// Returns the endpoint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the protocol scheme.
    #[must_use]
    pub const fn scheme(&self) -> EndpointScheme {
        self.scheme
    }

    /// Returns the port the service listens on inside its namespace.
    #[must_use]
    pub const fn target_port(&self) -> Option<u16> {
        self.target_port
    }

    /// Returns the requested fixed host port.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns whether traffic is routed through the host proxy.
    #[must_use]
    pub const fn is_proxied(&self) -> bool {
        self.is_proxied
    }

    /// Returns whether the allocation phase has assigned an address.
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.allocation.is_some()
    }

    /// Returns the allocation, if any.
    #[must_use]
    pub const fn allocation(&self) -> Option<&EndpointAllocation> {
        self.allocation.as_ref()
    }

    /// Records the allocated address, replacing any earlier allocation.
    pub fn allocate(&mut self, allocation: EndpointAllocation) {
        self.allocation = Some(allocation);
    }

    /// Returns `scheme://address:port` once allocated.
    #[must_use]
    pub fn url(&self) -> Option<String> {
        self.allocation.as_ref().map(|allocation| {
            format!(
                "{}://{}:{}",
                self.scheme,
                allocation.address(),
                allocation.port()
            )
        })
    }
}
