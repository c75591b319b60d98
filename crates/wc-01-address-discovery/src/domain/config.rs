//! Discovery configuration.

use super::errors::ConfigError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default public rendezvous server.
pub const DEFAULT_RENDEZVOUS: &str = "stun:stun.l.google.com:19302";

/// IANA-assigned STUN port, used when a server string omits one.
pub const DEFAULT_STUN_PORT: u16 = 3478;

/// A STUN server, written `stun:host:port`, `host:port` or `host`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RendezvousServer {
    pub host: String,
    pub port: u16,
}

impl RendezvousServer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for RendezvousServer {
    fn default() -> Self {
        Self::new("stun.l.google.com", 19302)
    }
}

impl FromStr for RendezvousServer {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidServer(s.to_string());
        let rest = s.trim();
        let rest = rest.strip_prefix("stun:").unwrap_or(rest);
        if rest.is_empty() {
            return Err(invalid());
        }

        // Bracketed IPv6 literal: [::1]:3478
        if let Some(bracketed) = rest.strip_prefix('[') {
            let (host, tail) = bracketed.split_once(']').ok_or_else(invalid)?;
            let port = match tail.strip_prefix(':') {
                Some(port) => port.parse().map_err(|_| invalid())?,
                None if tail.is_empty() => DEFAULT_STUN_PORT,
                None => return Err(invalid()),
            };
            return Ok(Self::new(host, port));
        }

        match rest.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && !host.contains(':') => {
                Ok(Self::new(host, port.parse().map_err(|_| invalid())?))
            }
            Some(_) => Err(invalid()),
            None => Ok(Self::new(rest, DEFAULT_STUN_PORT)),
        }
    }
}

impl fmt::Display for RendezvousServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "stun:[{}]:{}", self.host, self.port)
        } else {
            write!(f, "stun:{}:{}", self.host, self.port)
        }
    }
}

/// Discovery parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// The single rendezvous server the session is configured with.
    pub server: RendezvousServer,
    /// Overall budget for one discovery call.
    pub timeout: Duration,
    /// First retransmission timeout of the binding request; doubles each try.
    pub initial_rto: Duration,
    /// Binding requests sent before giving up.
    pub max_transmissions: u32,
    /// Label of the data channel that forces candidate gathering.
    pub data_channel_label: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            server: RendezvousServer::default(),
            timeout: Duration::from_secs(7),
            initial_rto: Duration::from_millis(500),
            max_transmissions: 4,
            data_channel_label: "probe".to_string(),
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.initial_rto.is_zero() {
            return Err(ConfigError::ZeroRetransmissionTimeout);
        }
        if self.max_transmissions == 0 {
            return Err(ConfigError::NoTransmissions);
        }
        if self.server.host.is_empty() {
            return Err(ConfigError::InvalidServer(self.server.to_string()));
        }
        Ok(())
    }

    /// Builder-style method to set the rendezvous server.
    #[must_use]
    pub fn with_server(mut self, server: RendezvousServer) -> Self {
        self.server = server;
        self
    }

    /// Builder-style method to set the overall timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the first retransmission timeout.
    #[must_use]
    pub fn with_initial_rto(mut self, rto: Duration) -> Self {
        self.initial_rto = rto;
        self
    }

    /// Builder-style method to set how many binding requests are sent.
    #[must_use]
    pub fn with_max_transmissions(mut self, max_transmissions: u32) -> Self {
        self.max_transmissions = max_transmissions;
        self
    }
}
