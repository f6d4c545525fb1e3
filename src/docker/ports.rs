// Free address discovery for the fixture's published port
// The reservation is best-effort: nothing holds the port once it is reported

use crate::errors::{FixtureError, Result};
use std::net::TcpListener;

/// Host used when the caller has no preference
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Source of free local `host:port` addresses
pub trait PortAllocator: Send + Sync {
    /// Return an address that was free at the time of the call
    fn allocate(&self, host: Option<&str>) -> Result<String>;
}

/// Asks the OS for an ephemeral port by binding port 0
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPortAllocator;

impl PortAllocator for LocalPortAllocator {
    fn allocate(&self, host: Option<&str>) -> Result<String> {
        let host = match host {
            Some(h) if !h.is_empty() => h,
            _ => DEFAULT_HOST,
        };

        let listener = TcpListener::bind((host, 0)).map_err(|e| {
            FixtureError::PortAllocation(format!("Failed to bind {}:0: {}", host, e))
        })?;
        let addr = listener.local_addr().map_err(|e| {
            FixtureError::PortAllocation(format!("Failed to read bound address: {}", e))
        })?;

        tracing::debug!(%addr, "reserved free address");

        Ok(addr.to_string())
    }
}
