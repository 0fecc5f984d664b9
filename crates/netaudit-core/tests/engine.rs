// netaudit-core/tests/engine.rs
// ============================================================================
// Module: Execution Engine Tests
// Description: Tests for bounded-pool execution, classification, and ordering.
// ============================================================================
//! ## Overview
//! Validates the engine's one-result-per-definition contract, the bounded
//! concurrency policy, the known-defect carve-out, and detail enrichment.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::panic, reason = "Tests fail loudly on unexpected variants.")]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use netaudit_core::CheckError;
use netaudit_core::CheckExecutor;
use netaudit_core::CheckReport;
use netaudit_core::Credentials;
use netaudit_core::DetailExtractor;
use netaudit_core::EngineConfig;
use netaudit_core::ExecutionEngine;
use netaudit_core::HostName;
use netaudit_core::TestDefinition;
use netaudit_core::TestName;
use netaudit_core::runtime::KNOWN_DEFECT_SIGNATURE;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a definition with default metadata for engine tests.
fn definition(name: &str) -> TestDefinition {
    TestDefinition {
        name: name.into(),
        file: format!("{name}.yml").into(),
        description: String::new(),
        category: String::new(),
        display: BTreeMap::new(),
        metadata: netaudit_core::EnvironmentMetadata::default(),
    }
}

/// Default credentials for engine tests.
fn credentials() -> Credentials {
    Credentials {
        username: "auditor".to_string(),
        password: "secret".to_string(),
    }
}

/// Extractor that never finds anything.
struct NoExtractor;

impl DetailExtractor for NoExtractor {
    fn extract(&self, _host: &HostName, _test: &TestName) -> Option<Value> {
        None
    }
}

/// Executor answering from a scripted outcome table.
struct ScriptedExecutor {
    /// Outcomes keyed by test name.
    outcomes: Mutex<BTreeMap<String, Result<CheckReport, CheckError>>>,
}

impl ScriptedExecutor {
    /// Creates an executor from (name, outcome) pairs.
    fn new(outcomes: Vec<(&str, Result<CheckReport, CheckError>)>) -> Self {
        Self {
            outcomes: Mutex::new(
                outcomes.into_iter().map(|(name, outcome)| (name.to_string(), outcome)).collect(),
            ),
        }
    }
}

impl CheckExecutor for ScriptedExecutor {
    fn execute(
        &self,
        _host: &HostName,
        definition: &TestDefinition,
        _credentials: &Credentials,
    ) -> Result<CheckReport, CheckError> {
        self.outcomes
            .lock()
            .unwrap()
            .remove(definition.name.as_str())
            .unwrap_or_else(|| panic!("unscripted test: {}", definition.name))
    }
}

/// Shorthand for a passing report.
fn passing(message: &str) -> Result<CheckReport, CheckError> {
    Ok(CheckReport {
        passed: true,
        message: message.to_string(),
        diagnostics: None,
    })
}

/// Builds an engine over the given executor and extractor.
fn engine(
    executor: impl CheckExecutor + 'static,
    extractor: impl DetailExtractor + 'static,
    config: EngineConfig,
) -> ExecutionEngine {
    ExecutionEngine::new(Arc::new(executor), Arc::new(extractor), config)
}

// ============================================================================
// SECTION: Classification
// ============================================================================

#[tokio::test]
async fn one_result_per_definition_across_failure_paths() {
    let executor = ScriptedExecutor::new(vec![
        ("test_a", passing("ok")),
        (
            "test_b",
            Ok(CheckReport {
                passed: false,
                message: "2 checks failed".to_string(),
                diagnostics: Some(json!({"failed": 2})),
            }),
        ),
        ("test_c", Err(CheckError::Connection("auth refused".to_string()))),
        (
            "test_d",
            Err(CheckError::Execution {
                message: "rpc evaluation failed".to_string(),
                partial: None,
            }),
        ),
    ]);
    let engine = engine(executor, NoExtractor, EngineConfig::default());
    let definitions: Vec<TestDefinition> =
        vec!["test_a", "test_b", "test_c", "test_d"].into_iter().map(definition).collect();

    let results = engine.run(&definitions, &HostName::from("r1"), &credentials()).await;

    assert_eq!(results.len(), 4);
    assert!(results[0].result);
    assert!(!results[1].result);
    assert_eq!(results[1].details, json!({"diagnostics": {"failed": 2}}));
    assert!(!results[2].result);
    assert!(results[2].is_connection_failure());
    assert!(!results[3].result);
    assert_eq!(results[3].message, "rpc evaluation failed");
    assert!(results.iter().all(|result| result.execution_time >= 0.0));
}

#[tokio::test]
async fn defect_with_passing_partial_is_suppressed_pass() {
    let executor = ScriptedExecutor::new(vec![(
        "test_a",
        Err(CheckError::Execution {
            message: format!("backend: {KNOWN_DEFECT_SIGNATURE}"),
            partial: Some(CheckReport {
                passed: true,
                message: "4 checks passed".to_string(),
                diagnostics: None,
            }),
        }),
    )]);
    let engine = engine(executor, NoExtractor, EngineConfig::default());

    let results =
        engine.run(&[definition("test_a")], &HostName::from("r1"), &credentials()).await;

    assert!(results[0].result);
    assert!(results[0].message.contains("suppressed"));
}

#[tokio::test]
async fn defect_without_partial_is_failed() {
    let executor = ScriptedExecutor::new(vec![(
        "test_a",
        Err(CheckError::Execution {
            message: KNOWN_DEFECT_SIGNATURE.to_string(),
            partial: None,
        }),
    )]);
    let engine = engine(executor, NoExtractor, EngineConfig::default());

    let results =
        engine.run(&[definition("test_a")], &HostName::from("r1"), &credentials()).await;

    assert!(!results[0].result);
}

// ============================================================================
// SECTION: Concurrency and Ordering
// ============================================================================

/// Executor that records the peak number of in-flight executions.
struct ConcurrencyMeter {
    /// Currently running executions.
    current: AtomicUsize,
    /// Highest observed concurrency.
    peak: AtomicUsize,
}

impl CheckExecutor for ConcurrencyMeter {
    fn execute(
        &self,
        _host: &HostName,
        _definition: &TestDefinition,
        _credentials: &Credentials,
    ) -> Result<CheckReport, CheckError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(25));
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(CheckReport {
            passed: true,
            message: String::new(),
            diagnostics: None,
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pool_bound_is_respected() {
    let meter = Arc::new(ConcurrencyMeter {
        current: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let engine = ExecutionEngine::new(
        Arc::clone(&meter) as Arc<dyn CheckExecutor>,
        Arc::new(NoExtractor),
        EngineConfig {
            max_concurrency: 2,
            per_test_timeout: Duration::from_secs(10),
        },
    );
    let definitions: Vec<TestDefinition> =
        (0..8).map(|index| definition(&format!("test_{index}"))).collect();

    let results = engine.run(&definitions, &HostName::from("r1"), &credentials()).await;

    assert_eq!(results.len(), 8);
    assert!(meter.peak.load(Ordering::SeqCst) <= 2);
}

/// Executor whose per-test delays invert completion order.
struct StaggeredExecutor;

impl CheckExecutor for StaggeredExecutor {
    fn execute(
        &self,
        _host: &HostName,
        definition: &TestDefinition,
        _credentials: &Credentials,
    ) -> Result<CheckReport, CheckError> {
        // Earlier definitions sleep longer, so completion order is C, B, A.
        let delay = match definition.name.as_str() {
            "test_a" => 60,
            "test_b" => 30,
            _ => 1,
        };
        std::thread::sleep(Duration::from_millis(delay));
        Ok(CheckReport {
            passed: true,
            message: String::new(),
            diagnostics: None,
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn results_follow_definition_order_not_completion_order() {
    let engine = engine(StaggeredExecutor, NoExtractor, EngineConfig::default());
    let definitions = vec![definition("test_a"), definition("test_b"), definition("test_c")];

    let results = engine.run(&definitions, &HostName::from("r1"), &credentials()).await;

    let order: Vec<&str> = results.iter().map(|result| result.test_name.as_str()).collect();
    assert_eq!(order, vec!["test_a", "test_b", "test_c"]);
}

/// Executor that never returns within the test timeout.
struct HangingExecutor;

impl CheckExecutor for HangingExecutor {
    fn execute(
        &self,
        _host: &HostName,
        _definition: &TestDefinition,
        _credentials: &Credentials,
    ) -> Result<CheckReport, CheckError> {
        std::thread::sleep(Duration::from_secs(5));
        Ok(CheckReport {
            passed: true,
            message: String::new(),
            diagnostics: None,
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn per_test_timeout_produces_failed_result() {
    let engine = engine(
        HangingExecutor,
        NoExtractor,
        EngineConfig {
            max_concurrency: 2,
            per_test_timeout: Duration::from_millis(50),
        },
    );

    let results =
        engine.run(&[definition("test_a")], &HostName::from("r1"), &credentials()).await;

    assert_eq!(results.len(), 1);
    assert!(!results[0].result);
    assert!(results[0].message.contains("timed out"));
}

// ============================================================================
// SECTION: Enrichment
// ============================================================================

/// Extractor returning fixed interface fields.
struct InterfaceExtractor;

impl DetailExtractor for InterfaceExtractor {
    fn extract(&self, _host: &HostName, test: &TestName) -> Option<Value> {
        test.as_str().contains("interface").then(|| {
            json!({"interface": {"name": "ge-0/0/0", "status": "up", "description": "uplink"}})
        })
    }
}

#[tokio::test]
async fn extraction_enriches_details_without_changing_outcome() {
    let executor = ScriptedExecutor::new(vec![
        ("test_interface_status", passing("ok")),
        ("test_bgp_summary", passing("ok")),
    ]);
    let engine = engine(executor, InterfaceExtractor, EngineConfig::default());
    let definitions = vec![definition("test_bgp_summary"), definition("test_interface_status")];

    let results = engine.run(&definitions, &HostName::from("r1"), &credentials()).await;

    assert!(results.iter().all(|result| result.result));
    assert_eq!(results[0].details, json!({}));
    assert_eq!(results[1].details["interface"]["status"], json!("up"));
}
