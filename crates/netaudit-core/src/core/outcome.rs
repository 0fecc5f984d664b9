// netaudit-core/src/core/outcome.rs
// ============================================================================
// Module: Run Outcome Model
// Description: Per-test results, run summaries, and the final report shape.
// Purpose: Define the stable report schema rendered on stdout.
// Dependencies: crate::core::{environment, identifiers}, serde, time
// ============================================================================

//! ## Overview
//! A `TestResult` is produced exactly once per (host, test) execution and is
//! immutable afterwards. The aggregator folds results into a `RunSummary`,
//! and the orchestrator renders either a completed or an error `RunReport`.
//! The report is the only contract with calling automation; the process exit
//! code is always zero.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::environment::EnvironmentTier;
use crate::core::identifiers::HostName;
use crate::core::identifiers::TestName;

// ============================================================================
// SECTION: Message Classes
// ============================================================================

/// Stable prefix marking session-establishment failures.
///
/// The engine prefixes every connection-class failure message with this token
/// and the aggregator matches on it, so escalation never depends on free-form
/// message content.
pub const CONNECTION_FAILURE_PREFIX: &str = "connection error:";

// ============================================================================
// SECTION: Test Result
// ============================================================================

/// Outcome of one (host, test) execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Name of the executed test.
    pub test_name: TestName,
    /// Device the test ran against.
    pub device: HostName,
    /// True when the check passed.
    pub result: bool,
    /// Human-readable outcome message.
    pub message: String,
    /// Wall-clock duration of the full attempt in seconds.
    pub execution_time: f64,
    /// Structured detail, including any supplementary extracted fields.
    pub details: Value,
    /// RFC 3339 timestamp taken when the result was produced.
    pub timestamp: String,
}

impl TestResult {
    /// Returns true when the message records a connection-class failure.
    #[must_use]
    pub fn is_connection_failure(&self) -> bool {
        self.message.starts_with(CONNECTION_FAILURE_PREFIX)
    }
}

/// Returns the current wall-clock time as an RFC 3339 string.
///
/// Falls back to the raw unix timestamp when formatting fails, which keeps
/// result production infallible.
#[must_use]
pub fn rfc3339_now() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339).unwrap_or_else(|_| now.unix_timestamp().to_string())
}

// ============================================================================
// SECTION: Run Summary
// ============================================================================

/// Aggregate outcome of one run.
///
/// # Invariants
/// - `passed + failed == results.len()`.
/// - `results` is ordered by host order, then catalog definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Target environment tier.
    pub environment: EnvironmentTier,
    /// Target hosts in caller-supplied order.
    pub hosts: Vec<HostName>,
    /// Number of passing results.
    pub passed: usize,
    /// Number of failing results.
    pub failed: usize,
    /// All results in deterministic order.
    pub results: Vec<TestResult>,
}

// ============================================================================
// SECTION: Run Report
// ============================================================================

/// Overall run status communicated through the JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run executed and produced a summary.
    Completed,
    /// The run aborted before or during execution.
    Error,
}

/// Host and count section of a completed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
    /// Target hosts in caller-supplied order.
    pub hosts: Vec<HostName>,
    /// Number of passing results.
    pub passed: usize,
    /// Number of failing results.
    pub failed: usize,
}

/// The single JSON document rendered on stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Overall status.
    pub status: RunStatus,
    /// Target environment tier.
    pub environment: EnvironmentTier,
    /// Error or escalation message, present on error reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Pass/fail counts, present on completed reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummarySection>,
    /// Ordered per-test results, empty on error reports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<TestResult>,
}

impl RunReport {
    /// Builds a completed report from an aggregated summary.
    #[must_use]
    pub fn completed(summary: RunSummary) -> Self {
        Self {
            status: RunStatus::Completed,
            environment: summary.environment,
            message: None,
            summary: Some(SummarySection {
                hosts: summary.hosts,
                passed: summary.passed,
                failed: summary.failed,
            }),
            results: summary.results,
        }
    }

    /// Builds an error report carrying a single explanatory message.
    #[must_use]
    pub fn error(environment: EnvironmentTier, message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Error,
            environment,
            message: Some(message.into()),
            summary: None,
            results: Vec::new(),
        }
    }
}
