//! Dev-server port negotiation.

use std::net::{IpAddr, Ipv4Addr, TcpListener};

use tracing::{debug, info};

use crate::confirm::ConfirmationProvider;
use crate::error::{ConfigError, Result};

/// Checks whether a port can be bound.
pub trait PortProbe {
    fn is_available(&self, port: u16) -> bool;
}

impl<P: PortProbe + ?Sized> PortProbe for &P {
    fn is_available(&self, port: u16) -> bool {
        (**self).is_available(port)
    }
}

/// Probes by binding a TCP listener and dropping it straight away.
#[derive(Debug, Clone, Copy)]
pub struct TcpPortProbe {
    host: IpAddr,
}

impl TcpPortProbe {
    pub fn new(host: IpAddr) -> Self {
        Self { host }
    }
}

impl Default for TcpPortProbe {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

impl PortProbe for TcpPortProbe {
    fn is_available(&self, port: u16) -> bool {
        TcpListener::bind((self.host, port)).is_ok()
    }
}

/// Outcome of a negotiation that went ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortNegotiation {
    /// The requested port was free.
    Unchanged(u16),
    /// The operator accepted a different free port.
    Switched { requested: u16, port: u16 },
}

impl PortNegotiation {
    pub fn port(&self) -> u16 {
        match *self {
            PortNegotiation::Unchanged(port) | PortNegotiation::Switched { port, .. } => port,
        }
    }
}

/// First available port at or above `start`.
pub fn find_available_port(probe: &dyn PortProbe, start: u16) -> Result<u16> {
    (start..=u16::MAX)
        .find(|&port| probe.is_available(port))
        .ok_or(ConfigError::PortExhausted(start))
}

pub fn confirmation_prompt(requested: u16, suggested: u16) -> String {
    format!("Port {requested} is in use. Do you want to use port {suggested} instead? (y/n): ")
}

/// Settle on a dev-server port.
///
/// Without a requested port nothing is probed. When the requested port is
/// taken the operator must accept the next free one, otherwise the build is
/// declined.
pub fn negotiate_port(
    requested: Option<u16>,
    probe: &dyn PortProbe,
    confirm: &mut dyn ConfirmationProvider,
) -> Result<Option<PortNegotiation>> {
    let Some(requested) = requested else {
        return Ok(None);
    };

    let port = find_available_port(probe, requested)?;
    if port == requested {
        debug!(port, "requested port is available");
        return Ok(Some(PortNegotiation::Unchanged(port)));
    }

    if !confirm.confirm(&confirmation_prompt(requested, port)) {
        return Err(ConfigError::PortNegotiationDeclined {
            requested,
            suggested: port,
        });
    }

    info!(requested, port, "switching dev server port");
    Ok(Some(PortNegotiation::Switched { requested, port }))
}
