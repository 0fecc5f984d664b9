// netaudit-catalog/src/metadata.rs
// ============================================================================
// Module: Definition Metadata Normalization
// Description: Extraction of description, category, display, and environment metadata.
// Purpose: Normalize loosely typed YAML documents into fail-closed definitions.
// Dependencies: netaudit-core, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! Test-definition files are loosely typed YAML documents. This module pulls
//! the well-known keys out of a parsed document and substitutes the
//! conservative default wherever the `test_metadata` section is absent or
//! malformed. A malformed section never grants broader access than an absent
//! one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use netaudit_core::EnvironmentMetadata;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

// ============================================================================
// SECTION: Key Constants
// ============================================================================

/// Well-known nested key carrying environment metadata.
pub const METADATA_KEY: &str = "test_metadata";
/// Optional description key.
const DESCRIPTION_KEY: &str = "description";
/// Optional category key.
const CATEGORY_KEY: &str = "category";
/// Optional rendering-hint key.
const DISPLAY_KEY: &str = "display";

// ============================================================================
// SECTION: Extracted Fields
// ============================================================================

/// Normalized fields pulled from one definition document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFields {
    /// Human-readable description, empty when absent.
    pub description: String,
    /// Category, empty when absent (the catalog derives one from the name).
    pub category: String,
    /// Free-form rendering hints, empty when absent or malformed.
    pub display: BTreeMap<String, JsonValue>,
    /// Environment metadata, conservative default when absent or malformed.
    pub metadata: EnvironmentMetadata,
    /// True when a `test_metadata` section was present but unusable.
    pub metadata_malformed: bool,
}

/// Extracts the well-known fields from a parsed definition document.
#[must_use]
pub fn extract_fields(document: &YamlValue) -> DocumentFields {
    let description = string_field(document, DESCRIPTION_KEY);
    let category = string_field(document, CATEGORY_KEY);
    let display = display_field(document);
    let (metadata, metadata_malformed) = metadata_field(document);
    DocumentFields {
        description,
        category,
        display,
        metadata,
        metadata_malformed,
    }
}

/// Reads an optional string field, defaulting to empty.
fn string_field(document: &YamlValue, key: &str) -> String {
    document.get(key).and_then(YamlValue::as_str).unwrap_or_default().to_string()
}

/// Reads the free-form display mapping, tolerating any malformed shape.
fn display_field(document: &YamlValue) -> BTreeMap<String, JsonValue> {
    let Some(YamlValue::Mapping(mapping)) = document.get(DISPLAY_KEY) else {
        return BTreeMap::new();
    };
    mapping
        .iter()
        .filter_map(|(key, value)| {
            let key = key.as_str()?.to_string();
            let value = serde_json::to_value(value).ok()?;
            Some((key, value))
        })
        .collect()
}

/// Reads the `test_metadata` section with the conservative fallback.
///
/// Returns the parsed metadata plus a flag telling the caller whether a
/// present section had to be discarded as malformed.
fn metadata_field(document: &YamlValue) -> (EnvironmentMetadata, bool) {
    match document.get(METADATA_KEY) {
        None => (EnvironmentMetadata::default(), false),
        Some(section) => match serde_yaml::from_value::<EnvironmentMetadata>(section.clone()) {
            Ok(metadata) => (metadata, false),
            Err(_) => (EnvironmentMetadata::default(), true),
        },
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
