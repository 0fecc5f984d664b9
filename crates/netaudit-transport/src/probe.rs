// netaudit-transport/src/probe.rs
// ============================================================================
// Module: TCP Reachability Probe
// Description: Transport-level connectivity pre-check for target devices.
// Purpose: Gate per-host execution on one cheap connect attempt.
// Dependencies: netaudit-core, std::net
// ============================================================================

//! ## Overview
//! The probe answers one question: does anything accept a TCP connection on
//! the management port within the timeout. Refusal, timeout, and name
//! resolution failure all answer no; the probe never errors and never opens
//! a device session.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::time::Duration;

use netaudit_core::HostName;
use netaudit_core::ReachabilityProbe;

// ============================================================================
// SECTION: TCP Probe
// ============================================================================

/// Plain TCP connect probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

impl ReachabilityProbe for TcpProbe {
    fn is_reachable(&self, host: &HostName, port: u16, timeout: Duration) -> bool {
        let Ok(addresses) = (host.as_str(), port).to_socket_addrs() else {
            tracing::debug!(%host, port, "probe: name resolution failed");
            return false;
        };
        for address in addresses {
            if TcpStream::connect_timeout(&address, timeout).is_ok() {
                return true;
            }
        }
        tracing::debug!(%host, port, "probe: no address accepted a connection");
        false
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
