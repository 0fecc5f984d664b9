// netaudit-core/src/core/classifier.rs
// ============================================================================
// Module: Environment Classifier
// Description: Permission decisions for tests against target environment tiers.
// Purpose: Enforce the explicit-restriction-first precedence that guards production.
// Dependencies: crate::core::{context, definition, environment}
// ============================================================================

//! ## Overview
//! The classifier decides whether a test may run against a target tier. The
//! precedence order is the safety core of the whole system: an explicit
//! restriction beats an explicit approval, which beats production's strict
//! default, which beats the permissive default reserved for development.
//! Running a disruptive check against production always requires affirmative
//! approval; nothing here may be reordered without weakening that property.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::context::ExecutionContext;
use crate::core::definition::TestDefinition;
use crate::core::environment::EnvironmentTier;

// ============================================================================
// SECTION: Permission Decision
// ============================================================================

/// Returns true when the definition may run against the target tier.
///
/// Decision order, first match wins:
/// 1. Target tier explicitly restricted: permitted only for production with
///    affirmative production approval.
/// 2. Target tier explicitly approved: permitted.
/// 3. Production: permitted only when production approved and the impact
///    level is below the disruptive threshold.
/// 4. Conservative default: permitted only for the development tier.
#[must_use]
pub fn is_permitted(definition: &TestDefinition, target: EnvironmentTier) -> bool {
    let metadata = &definition.metadata;

    if metadata.restricted_environments.contains(&target) {
        return target.is_production() && metadata.production_approved;
    }

    if metadata.approved_for_environments.contains(&target) {
        return true;
    }

    if target.is_production() {
        return metadata.production_approved && !metadata.max_impact_level.is_disruptive();
    }

    target.is_development()
}

// ============================================================================
// SECTION: Selection Errors
// ============================================================================

/// Errors raised while narrowing the catalog to the requested tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// Requested names not present in the catalog.
    #[error("unknown tests requested: {}", names.join(", "))]
    UnknownTests {
        /// The unmatched names.
        names: Vec<String>,
    },
    /// Requested tests not permitted for the target tier.
    #[error(
        "tests not permitted for environment '{environment}': {}; permitted: {}",
        denied.join(", "),
        if permitted.is_empty() { "none".to_string() } else { permitted.join(", ") }
    )]
    EnvironmentRestriction {
        /// Target environment tier.
        environment: EnvironmentTier,
        /// Names denied for the tier.
        denied: Vec<String>,
        /// Names that are permitted for the tier.
        permitted: Vec<String>,
    },
}

// ============================================================================
// SECTION: Catalog Selection
// ============================================================================

/// Narrows catalog definitions to the runnable set for this context.
///
/// With `TestSelection::All` the result is every permitted definition in
/// catalog order. With explicit names, every requested name must exist and
/// be permitted; otherwise the run aborts before any execution.
///
/// # Errors
///
/// Returns [`SelectionError::UnknownTests`] for names missing from the
/// catalog and [`SelectionError::EnvironmentRestriction`] for names present
/// but denied for the target tier.
pub fn select(
    definitions: &[TestDefinition],
    context: &ExecutionContext,
) -> Result<Vec<TestDefinition>, SelectionError> {
    let target = context.environment;

    let Some(requested) = context.selection.requested() else {
        return Ok(definitions
            .iter()
            .filter(|definition| is_permitted(definition, target))
            .cloned()
            .collect());
    };

    let unknown: Vec<String> = requested
        .iter()
        .filter(|name| !definitions.iter().any(|definition| definition.name == **name))
        .map(ToString::to_string)
        .collect();
    if !unknown.is_empty() {
        return Err(SelectionError::UnknownTests {
            names: unknown,
        });
    }

    let denied: Vec<String> = requested
        .iter()
        .filter_map(|name| {
            definitions
                .iter()
                .find(|definition| definition.name == *name)
                .filter(|definition| !is_permitted(definition, target))
                .map(|definition| definition.name.to_string())
        })
        .collect();
    if !denied.is_empty() {
        let permitted: Vec<String> = definitions
            .iter()
            .filter(|definition| is_permitted(definition, target))
            .map(|definition| definition.name.to_string())
            .collect();
        return Err(SelectionError::EnvironmentRestriction {
            environment: target,
            denied,
            permitted,
        });
    }

    Ok(definitions
        .iter()
        .filter(|definition| requested.contains(&definition.name))
        .cloned()
        .collect())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::core::definition::TestDefinition;
    use crate::core::environment::EnvironmentMetadata;
    use crate::core::environment::EnvironmentTier;
    use crate::core::environment::ImpactLevel;

    use super::is_permitted;

    /// Builds a definition with the given metadata for classifier tests.
    fn definition_with(metadata: EnvironmentMetadata) -> TestDefinition {
        TestDefinition {
            name: "test_sample".into(),
            file: "test_sample.yml".into(),
            description: String::new(),
            category: String::new(),
            display: std::collections::BTreeMap::new(),
            metadata,
        }
    }

    #[test]
    fn restricted_production_denied_without_approval() {
        let definition = definition_with(EnvironmentMetadata {
            restricted_environments: BTreeSet::from([EnvironmentTier::Production]),
            production_approved: false,
            ..EnvironmentMetadata::default()
        });
        assert!(!is_permitted(&definition, EnvironmentTier::Production));
    }

    #[test]
    fn restricted_production_permitted_with_approval() {
        let definition = definition_with(EnvironmentMetadata {
            restricted_environments: BTreeSet::from([EnvironmentTier::Production]),
            production_approved: true,
            max_impact_level: ImpactLevel::Low,
            ..EnvironmentMetadata::default()
        });
        assert!(is_permitted(&definition, EnvironmentTier::Production));
    }

    #[test]
    fn restriction_beats_approval_outside_production() {
        let definition = definition_with(EnvironmentMetadata {
            restricted_environments: BTreeSet::from([EnvironmentTier::Staging]),
            approved_for_environments: BTreeSet::from([EnvironmentTier::Staging]),
            production_approved: true,
            ..EnvironmentMetadata::default()
        });
        assert!(!is_permitted(&definition, EnvironmentTier::Staging));
    }

    #[test]
    fn explicit_approval_permits_staging() {
        let definition = definition_with(EnvironmentMetadata {
            approved_for_environments: BTreeSet::from([EnvironmentTier::Staging]),
            ..EnvironmentMetadata::default()
        });
        assert!(is_permitted(&definition, EnvironmentTier::Staging));
    }

    #[test]
    fn production_default_requires_approval_and_low_impact() {
        let approved_high = definition_with(EnvironmentMetadata {
            production_approved: true,
            max_impact_level: ImpactLevel::High,
            ..EnvironmentMetadata::default()
        });
        assert!(!is_permitted(&approved_high, EnvironmentTier::Production));

        let approved_medium = definition_with(EnvironmentMetadata {
            production_approved: true,
            max_impact_level: ImpactLevel::Medium,
            ..EnvironmentMetadata::default()
        });
        assert!(is_permitted(&approved_medium, EnvironmentTier::Production));
    }

    #[test]
    fn metadata_default_is_development_only() {
        let definition = definition_with(EnvironmentMetadata::default());
        assert!(is_permitted(&definition, EnvironmentTier::Development));
        assert!(!is_permitted(&definition, EnvironmentTier::Staging));
        assert!(!is_permitted(&definition, EnvironmentTier::Production));
    }
}
