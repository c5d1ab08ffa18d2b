use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    str::FromStr,
    time::Duration,
};

use crate::{
    constants::{DEFAULT_PORT, DEFAULT_TARGET_ADDRS, DEFAULT_TIMEOUT},
    error::InvalidConfiguration,
};

/// A single endpoint to probe: an IP address, a TCP port and the time a
/// connection attempt is allowed to take.
///
/// Targets are immutable once built. Use [`ProbeTarget::new`] for the default
/// port (53) and timeout (10 s), or [`ProbeTargetBuilder`] to override them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ProbeTarget {
    address: IpAddr,
    port: u16,
    timeout: Duration,
}

impl ProbeTarget {
    pub fn new(address: IpAddr) -> Self {
        Self {
            address,
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// The built-in target table: three public DNS resolvers on port 53.
    pub fn defaults() -> Vec<ProbeTarget> {
        DEFAULT_TARGET_ADDRS
            .iter()
            .copied()
            .map(ProbeTarget::new)
            .collect()
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

/// Parses `ip`, `ip:port` or `[ipv6]:port`. Hostnames are rejected since
/// targets are never resolved.
impl FromStr for ProbeTarget {
    type Err = InvalidConfiguration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let builder = if let Ok(socket_addr) = s.parse::<SocketAddr>() {
            ProbeTargetBuilder::new()
                .with_address(socket_addr.ip())
                .with_port(socket_addr.port())
        } else if let Ok(address) = s.parse::<IpAddr>() {
            ProbeTargetBuilder::new().with_address(address)
        } else {
            return Err(InvalidConfiguration::InvalidAddress(s.to_string()));
        };
        builder.build()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ProbeTargetBuilder {
    address: Option<IpAddr>,
    port: Option<u16>,
    timeout: Option<Duration>,
}

impl ProbeTargetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the target, applying defaults for the port and timeout.
    ///
    /// # Errors
    /// Fails if no address was given, the port is 0 or the timeout is zero.
    pub fn build(&self) -> Result<ProbeTarget, InvalidConfiguration> {
        let address = self.address.ok_or(InvalidConfiguration::MissingAddress)?;
        let port = self.port.unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(InvalidConfiguration::ZeroPort);
        }
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(InvalidConfiguration::ZeroTimeout);
        }
        Ok(ProbeTarget {
            address,
            port,
            timeout,
        })
    }
}
