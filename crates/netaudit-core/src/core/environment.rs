// netaudit-core/src/core/environment.rs
// ============================================================================
// Module: Environment Safety Model
// Description: Target tiers, safety levels, impact levels, and test metadata.
// Purpose: Define the environment-classification vocabulary with fail-closed defaults.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every test definition carries environment metadata deciding where it may
//! run. The defaults here are deliberately the most conservative combination:
//! a definition with missing or malformed metadata is classified for
//! development only and is never production approved. Absence of metadata
//! must never widen access.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Target Tiers
// ============================================================================

/// Target environment tier governing which tests may run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentTier {
    /// Development or lab devices.
    #[default]
    Development,
    /// Pre-production staging devices.
    Staging,
    /// Production devices.
    Production,
}

impl EnvironmentTier {
    /// Returns true for the production tier.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Returns true for the development tier.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Returns the canonical lowercase token for the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for EnvironmentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Safety and Impact Levels
// ============================================================================

/// Declared safety level of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    /// Read-only and side-effect free.
    #[default]
    Safe,
    /// Observes device state without asserting on it destructively.
    MonitoringOnly,
    /// May disturb forwarding or control-plane state while running.
    PotentiallyDisruptive,
}

/// Worst-case impact a test may have on a device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    /// Negligible impact.
    #[default]
    Low,
    /// Noticeable but recoverable impact.
    Medium,
    /// Service-affecting impact.
    High,
    /// Outage-grade impact.
    Critical,
}

impl ImpactLevel {
    /// Returns true when the impact level is disqualifying for production.
    #[must_use]
    pub const fn is_disruptive(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

// ============================================================================
// SECTION: Environment Metadata
// ============================================================================

/// Environment-classification metadata attached to a test definition.
///
/// # Invariants
/// - `Default` is the conservative classification: development-only, safe,
///   not production approved, low impact, no explicit approvals or
///   restrictions. Catalog loading substitutes this default whenever the
///   metadata section is absent or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EnvironmentMetadata {
    /// Declared home tier of the test.
    #[serde(default)]
    pub environment_classification: EnvironmentTier,
    /// Declared safety level.
    #[serde(default)]
    pub safety_level: SafetyLevel,
    /// Affirmative approval for production execution.
    #[serde(default)]
    pub production_approved: bool,
    /// Worst-case impact level.
    #[serde(default)]
    pub max_impact_level: ImpactLevel,
    /// Tiers the test is explicitly approved for.
    #[serde(default)]
    pub approved_for_environments: BTreeSet<EnvironmentTier>,
    /// Tiers the test is explicitly restricted in.
    #[serde(default)]
    pub restricted_environments: BTreeSet<EnvironmentTier>,
}
