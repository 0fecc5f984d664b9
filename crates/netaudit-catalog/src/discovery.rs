// netaudit-catalog/src/discovery.rs
// ============================================================================
// Module: Test Catalog Discovery
// Description: Directory scan building the per-run test-definition registry.
// Purpose: Build the catalog eagerly with malformed entries quarantined, never fatal.
// Dependencies: netaudit-core, crate::metadata, serde_yaml, tracing
// ============================================================================

//! ## Overview
//! The catalog is rebuilt at every invocation: the directory is scanned for
//! files matching the test-naming convention, each document is parsed and
//! normalized, and malformed files are quarantined as discovery warnings
//! rather than aborting the run. Definition order is lexicographic by
//! derived name, which is also the report order, keeping output diffable
//! across runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use netaudit_core::TestDefinition;
use netaudit_core::TestName;
use serde_json::Value as JsonValue;
use serde_json::json;
use thiserror::Error;

use crate::metadata::extract_fields;

// ============================================================================
// SECTION: Discovery Errors and Warnings
// ============================================================================

/// Fatal discovery errors. Only the directory itself can be fatal; a
/// malformed file never is.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The catalog directory could not be read.
    #[error("cannot read catalog directory {path}: {source}")]
    Directory {
        /// Directory the scan targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal problem encountered while scanning one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryWarning {
    /// File the warning refers to.
    pub file: PathBuf,
    /// What went wrong.
    pub reason: String,
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// The per-run registry of discovered test definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Definitions keyed by derived name, iterated in name order.
    definitions: BTreeMap<TestName, TestDefinition>,
    /// Non-fatal problems recorded during the scan.
    warnings: Vec<DiscoveryWarning>,
}

impl Catalog {
    /// Returns the definitions in catalog order.
    #[must_use]
    pub fn ordered(&self) -> Vec<TestDefinition> {
        self.definitions.values().cloned().collect()
    }

    /// Looks a definition up by name.
    #[must_use]
    pub fn get(&self, name: &TestName) -> Option<&TestDefinition> {
        self.definitions.get(name)
    }

    /// Returns the number of discovered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true when nothing was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the warnings recorded during the scan.
    #[must_use]
    pub fn warnings(&self) -> &[DiscoveryWarning] {
        &self.warnings
    }

    /// Renders the `discovered_tests` listing document.
    #[must_use]
    pub fn listing(&self) -> JsonValue {
        let tests: serde_json::Map<String, JsonValue> = self
            .definitions
            .values()
            .map(|definition| {
                (
                    definition.name.to_string(),
                    json!({
                        "file": definition.file,
                        "description": definition.description,
                        "category": definition.category,
                        "display": definition.display,
                        "environment_classification":
                            definition.metadata.environment_classification,
                        "safety_level": definition.metadata.safety_level,
                        "production_approved": definition.metadata.production_approved,
                        "max_impact_level": definition.metadata.max_impact_level,
                        "approved_for_environments":
                            definition.metadata.approved_for_environments,
                        "restricted_environments":
                            definition.metadata.restricted_environments,
                    }),
                )
            })
            .collect();
        json!({ "discovered_tests": tests })
    }
}

// ============================================================================
// SECTION: Directory Scan
// ============================================================================

/// Scans the directory and builds the catalog.
///
/// Files must carry a `.yml` or `.yaml` extension and a stem that starts or
/// ends with `test`. Duplicate derived names keep the later scan-order entry
/// and record a warning. Parsing the same file twice within a run yields the
/// same definition.
///
/// # Errors
///
/// Returns [`DiscoveryError::Directory`] when the directory itself cannot be
/// read. Individual file failures are warnings, never errors.
pub fn discover(directory: &Path) -> Result<Catalog, DiscoveryError> {
    let entries = fs::read_dir(directory).map_err(|source| DiscoveryError::Directory {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && matches_convention(path))
        .collect();
    files.sort();

    let mut catalog = Catalog::default();
    for path in files {
        scan_file(&mut catalog, &path);
    }

    tracing::debug!(
        directory = %directory.display(),
        discovered = catalog.len(),
        warnings = catalog.warnings.len(),
        "catalog discovery finished"
    );
    Ok(catalog)
}

/// Returns true when the file name matches the test-naming convention.
fn matches_convention(path: &Path) -> bool {
    let extension_ok = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension == "yml" || extension == "yaml");
    if !extension_ok {
        return false;
    }
    stem(path).is_some_and(|stem| stem.starts_with("test") || stem.ends_with("test"))
}

/// Returns the UTF-8 file stem, if any.
fn stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

/// Parses one file into the catalog, recording warnings instead of failing.
fn scan_file(catalog: &mut Catalog, path: &Path) {
    let Some(name) = stem(path) else {
        warn(catalog, path, "file stem is not valid UTF-8");
        return;
    };
    let name = TestName::from(name);

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) => {
            warn(catalog, path, &format!("cannot read file: {error}"));
            return;
        }
    };
    let document: serde_yaml::Value = match serde_yaml::from_str(&contents) {
        Ok(document) => document,
        Err(error) => {
            warn(catalog, path, &format!("cannot parse yaml: {error}"));
            return;
        }
    };

    let fields = extract_fields(&document);
    if fields.metadata_malformed {
        warn(catalog, path, "test_metadata is malformed; conservative default applied");
    }

    let category = if fields.category.is_empty() {
        derived_category(name.as_str())
    } else {
        fields.category
    };

    if catalog.definitions.contains_key(&name) {
        warn(catalog, path, &format!("duplicate test name '{name}'; later file overwrites"));
    }
    catalog.definitions.insert(
        name.clone(),
        TestDefinition {
            name,
            file: path.to_path_buf(),
            description: fields.description,
            category,
            display: fields.display,
            metadata: fields.metadata,
        },
    );
}

/// Derives a category from the test name, e.g. `test_interface_status` to
/// `interface`.
fn derived_category(name: &str) -> String {
    name.split('_')
        .find(|token| !token.is_empty() && *token != "test")
        .unwrap_or("general")
        .to_string()
}

/// Records and logs one discovery warning.
fn warn(catalog: &mut Catalog, path: &Path, reason: &str) {
    tracing::warn!(file = %path.display(), reason, "discovery warning");
    catalog.warnings.push(DiscoveryWarning {
        file: path.to_path_buf(),
        reason: reason.to_string(),
    });
}
