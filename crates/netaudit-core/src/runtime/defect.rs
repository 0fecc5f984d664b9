// netaudit-core/src/runtime/defect.rs
// ============================================================================
// Module: Known Library Defect Carve-Out
// Description: Recognition and resolution of the benign parser-defect signature.
// Purpose: Keep the defect carve-out in one place so its scope cannot widen.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! The check-execution backend has one known benign defect: its reply parser
//! can raise an invalid-tag assertion that is unrelated to the check logic,
//! after the check verdict has already been computed. This module is the
//! only place allowed to recognize that signature. The match is an exact
//! substring; nothing else is ever treated as this defect.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::interfaces::CheckReport;

// ============================================================================
// SECTION: Signature
// ============================================================================

/// Exact substring identifying the benign parser defect.
pub const KNOWN_DEFECT_SIGNATURE: &str = "invalid tag found while parsing check response";

/// Returns true when the message carries the known defect signature.
#[must_use]
pub fn is_known_defect(message: &str) -> bool {
    message.contains(KNOWN_DEFECT_SIGNATURE)
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Outcome of re-evaluating a partial report after the known defect.
#[derive(Debug, Clone, PartialEq)]
pub enum DefectResolution {
    /// The partial report shows the checks genuinely passed.
    SuppressedPass {
        /// Annotated message noting the suppression.
        message: String,
    },
    /// No usable passing partial result exists.
    Failed {
        /// Failure message for the result record.
        message: String,
    },
}

/// Resolves an execution failure against the known-defect carve-out.
///
/// Returns `None` when the message does not carry the signature, in which
/// case the caller must treat the failure as an ordinary execution error.
/// The partial result reuse here is best-effort by design: it trusts
/// whatever verdict the backend had produced before its parser failed.
#[must_use]
pub fn resolve_known_defect(
    message: &str,
    partial: Option<&CheckReport>,
) -> Option<DefectResolution> {
    if !is_known_defect(message) {
        return None;
    }

    match partial {
        Some(report) if report.passed => Some(DefectResolution::SuppressedPass {
            message: format!(
                "{} [known parser defect suppressed]",
                if report.message.is_empty() { "all checks passed" } else { report.message.as_str() }
            ),
        }),
        Some(report) => Some(DefectResolution::Failed {
            message: if report.message.is_empty() {
                format!("checks failed before parser defect: {message}")
            } else {
                report.message.clone()
            },
        }),
        None => Some(DefectResolution::Failed {
            message: format!("no usable result after parser defect: {message}"),
        }),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
