// netaudit-core/src/core/definition.rs
// ============================================================================
// Module: Test Definition Model
// Description: Declarative check definitions discovered from the catalog.
// Purpose: Define the canonical test-definition record consumed by the runtime.
// Dependencies: crate::core::{environment, identifiers}, serde
// ============================================================================

//! ## Overview
//! A test definition identifies one named declarative check: where its body
//! lives on disk, how it should be presented, and the environment metadata
//! deciding where it may run. Definitions are loaded once per run by the
//! catalog and never mutated afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::environment::EnvironmentMetadata;
use crate::core::identifiers::TestName;

// ============================================================================
// SECTION: Test Definition
// ============================================================================

/// Canonical definition of one declarative check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Unique name derived from the definition file stem.
    pub name: TestName,
    /// Path to the definition file carrying the check body.
    pub file: PathBuf,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Test category, e.g. `interface` or `bgp`.
    #[serde(default)]
    pub category: String,
    /// Free-form rendering hints for report consumers.
    #[serde(default)]
    pub display: BTreeMap<String, Value>,
    /// Environment-classification metadata.
    #[serde(default)]
    pub metadata: EnvironmentMetadata,
}
