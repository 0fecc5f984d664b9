// netaudit-core/src/core/context.rs
// ============================================================================
// Module: Execution Context
// Description: Immutable per-run inputs shared by every component.
// Purpose: Replace ambient credential and environment state with one value object.
// Dependencies: crate::core::{environment, identifiers}, serde
// ============================================================================

//! ## Overview
//! The execution context is constructed once from CLI or API input and passed
//! by reference to every component. No component reads environment variables
//! or other ambient state; everything a run needs travels through this value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::environment::EnvironmentTier;
use crate::core::identifiers::HostName;
use crate::core::identifiers::TestName;

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Device login credentials for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login user name.
    pub username: String,
    /// Login password. Never serialized and never placed on a command line.
    pub password: String,
}

// ============================================================================
// SECTION: Test Selection
// ============================================================================

/// Which tests the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestSelection {
    /// All tests permitted for the target environment.
    All,
    /// An explicit list of requested test names.
    Named(Vec<TestName>),
}

impl TestSelection {
    /// Returns the explicitly requested names, if any.
    #[must_use]
    pub fn requested(&self) -> Option<&[TestName]> {
        match self {
            Self::All => None,
            Self::Named(names) => Some(names),
        }
    }
}

// ============================================================================
// SECTION: Execution Context
// ============================================================================

/// Immutable inputs for one orchestration run.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Target environment tier.
    pub environment: EnvironmentTier,
    /// Target hosts in caller-supplied order.
    pub hosts: Vec<HostName>,
    /// Device credentials.
    pub credentials: Credentials,
    /// Requested test selection.
    pub selection: TestSelection,
}
