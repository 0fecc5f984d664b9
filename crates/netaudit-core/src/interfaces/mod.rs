// netaudit-core/src/interfaces/mod.rs
// ============================================================================
// Module: Netaudit Interfaces
// Description: Backend-agnostic interfaces for check execution, probing, and extraction.
// Purpose: Define the contract surfaces between the runtime and its collaborators.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the runtime reaches external systems without
//! embedding transport-specific details. The check executor is the opaque
//! RPC-executing dependency; the probe is a cheap pre-flight gate; the detail
//! extractor is a best-effort enrichment whose failures are structurally
//! incapable of changing a pass/fail outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::Credentials;
use crate::core::HostName;
use crate::core::TestDefinition;
use crate::core::TestName;

// ============================================================================
// SECTION: Check Executor
// ============================================================================

/// Raw outcome of one check invocation as reported by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    /// True when every assertion in the check held.
    pub passed: bool,
    /// Transport-supplied outcome message.
    #[serde(default)]
    pub message: String,
    /// Optional raw diagnostic payload from the device.
    #[serde(default)]
    pub diagnostics: Option<Value>,
}

/// Check execution errors at the transport boundary.
#[derive(Debug, Error)]
pub enum CheckError {
    /// A session to the device could not be established.
    #[error("session could not be established: {0}")]
    Connection(String),
    /// The check started but could not be evaluated.
    ///
    /// `partial` carries whatever report object the transport had already
    /// produced before the failure, if any. The runtime consults it only for
    /// the recognized benign parser defect.
    #[error("{message}")]
    Execution {
        /// Failure message from the transport or its parsing library.
        message: String,
        /// Partial report left behind before the failure, if any.
        partial: Option<CheckReport>,
    },
}

/// Opaque RPC-executing dependency that runs a named check on a device.
pub trait CheckExecutor: Send + Sync {
    /// Opens a session to the host and executes the named check.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Connection`] when no session could be
    /// established and [`CheckError::Execution`] when the check could not be
    /// evaluated.
    fn execute(
        &self,
        host: &HostName,
        definition: &TestDefinition,
        credentials: &Credentials,
    ) -> Result<CheckReport, CheckError>;
}

// ============================================================================
// SECTION: Reachability Probe
// ============================================================================

/// Cheap transport-level connectivity pre-check.
pub trait ReachabilityProbe: Send + Sync {
    /// Returns true when a transport-level connection to `host:port` succeeds
    /// within `timeout`. Refusal, timeout, and resolution failure all return
    /// false; the probe never errors.
    fn is_reachable(&self, host: &HostName, port: u16, timeout: Duration) -> bool;
}

// ============================================================================
// SECTION: Detail Extractor
// ============================================================================

/// Best-effort supplementary extraction from cached raw responses.
pub trait DetailExtractor: Send + Sync {
    /// Attempts to extract structured fields for the given host and test.
    ///
    /// Returns `None` when nothing usable exists; implementations must
    /// swallow their own failures rather than surface them.
    fn extract(&self, host: &HostName, test: &TestName) -> Option<Value>;
}
