// netaudit-core/src/runtime/aggregate.rs
// ============================================================================
// Module: Result Aggregator
// Description: Folds per-test results into the final run summary.
// Purpose: Keep the counting invariant and escalate connection-class failures.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Aggregation is pure folding plus one cross-cutting policy check: a batch
//! of failures that are all "could not connect" is one connectivity problem,
//! not N test failures, and must be surfaced as such. Detection relies on
//! the stable connection-failure prefix written by the engine, never on
//! free-form message content.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::EnvironmentTier;
use crate::core::HostName;
use crate::core::RunSummary;
use crate::core::TestResult;

// ============================================================================
// SECTION: Summarization
// ============================================================================

/// Folds ordered results into a run summary.
///
/// The counting invariant `passed + failed == results.len()` holds by
/// construction: every result is counted exactly once.
#[must_use]
pub fn summarize(
    results: Vec<TestResult>,
    hosts: &[HostName],
    environment: EnvironmentTier,
) -> RunSummary {
    let passed = results.iter().filter(|result| result.result).count();
    let failed = results.len() - passed;
    RunSummary {
        environment,
        hosts: hosts.to_vec(),
        passed,
        failed,
        results,
    }
}

// ============================================================================
// SECTION: Connection-Class Escalation
// ============================================================================

/// Detects connection-class failures across a result set.
///
/// Returns one escalation message naming the affected devices when any
/// result records a session-establishment failure, so the caller can report
/// a single connectivity problem instead of a misleading pass/fail
/// breakdown.
#[must_use]
pub fn connection_failure(results: &[TestResult]) -> Option<String> {
    let affected: BTreeSet<&str> = results
        .iter()
        .filter(|result| result.is_connection_failure())
        .map(|result| result.device.as_str())
        .collect();
    if affected.is_empty() {
        return None;
    }

    let detail = results
        .iter()
        .find(|result| result.is_connection_failure())
        .map_or_else(String::new, |result| result.message.clone());
    let devices: Vec<&str> = affected.into_iter().collect();
    Some(format!(
        "authentication or connectivity failure on {}: {detail}",
        devices.join(", ")
    ))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
