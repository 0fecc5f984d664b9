// netaudit-transport/src/cache.rs
// ============================================================================
// Module: Cache Detail Extractor
// Description: Best-effort field extraction from cached raw response artifacts.
// Purpose: Enrich interface-test results without ever affecting pass/fail.
// Dependencies: netaudit-core, serde_json, std::fs
// ============================================================================

//! ## Overview
//! After a check runs, the most recently modified cached artifact for the
//! host may carry structured fields worth surfacing, currently interface
//! name, operational status, and description. The cache is not
//! authoritative: it may be stale or absent, the artifact may be garbage,
//! and every failure here collapses to `None`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use netaudit_core::DetailExtractor;
use netaudit_core::HostName;
use netaudit_core::TestName;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Interface fields worth extracting, in output order.
const INTERFACE_FIELDS: &[&str] = &["name", "status", "oper-status", "description"];

/// Largest artifact the extractor will read.
const MAX_ARTIFACT_BYTES: u64 = 1024 * 1024;

/// Detail extractor over the raw-response artifact cache.
#[derive(Debug, Clone)]
pub struct CacheDetailExtractor {
    /// Directory holding per-host artifacts.
    cache_dir: PathBuf,
}

impl CacheDetailExtractor {
    /// Creates an extractor over the given cache directory.
    #[must_use]
    pub const fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
        }
    }
}

impl DetailExtractor for CacheDetailExtractor {
    fn extract(&self, host: &HostName, test: &TestName) -> Option<Value> {
        if !test.as_str().contains("interface") {
            return None;
        }
        let artifact = latest_artifact(&self.cache_dir, host)?;
        let metadata = fs::metadata(&artifact).ok()?;
        if metadata.len() > MAX_ARTIFACT_BYTES {
            tracing::debug!(%host, artifact = %artifact.display(), "artifact too large");
            return None;
        }
        let contents = fs::read_to_string(&artifact).ok()?;
        let document: Value = serde_json::from_str(&contents).ok()?;
        interface_fields(&document)
    }
}

// ============================================================================
// SECTION: Artifact Selection
// ============================================================================

/// Finds the most recently modified artifact for the host.
fn latest_artifact(cache_dir: &Path, host: &HostName) -> Option<PathBuf> {
    let prefix = format!("{host}-");
    let entries = fs::read_dir(cache_dir).ok()?;
    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|file_name| file_name.starts_with(&prefix))
        })
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((modified, entry.path()))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}

// ============================================================================
// SECTION: Field Extraction
// ============================================================================

/// Pulls the known interface fields out of the artifact document.
///
/// The interface object may live at the document root or under the
/// `diagnostics` key, depending on which helper produced the artifact.
fn interface_fields(document: &Value) -> Option<Value> {
    let root = document.get("diagnostics").unwrap_or(document);
    let interface = root.get("interface")?;
    let mut fields = Map::new();
    for key in INTERFACE_FIELDS {
        if let Some(value) = interface.get(*key) {
            fields.insert((*key).to_string(), value.clone());
        }
    }
    if fields.is_empty() {
        return None;
    }
    Some(Value::Object(Map::from_iter([(
        "interface".to_string(),
        Value::Object(fields),
    )])))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
