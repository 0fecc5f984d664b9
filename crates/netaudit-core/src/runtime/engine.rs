// netaudit-core/src/runtime/engine.rs
// ============================================================================
// Module: Execution Engine
// Description: Bounded-concurrency check execution with outcome classification.
// Purpose: Produce exactly one result per definition regardless of failure path.
// Dependencies: crate::{core, interfaces, runtime::defect}, tokio, tracing
// ============================================================================

//! ## Overview
//! The engine fans a host's test batch out into a small bounded worker pool,
//! invokes the check-execution collaborator through `spawn_blocking`, and
//! classifies every outcome into a single `TestResult`. The pool bound is a
//! resource-sharing policy, not a throughput knob: target devices have
//! limited concurrent-session capacity. Results are re-sorted to definition
//! order so report output stays deterministic across runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use serde_json::Map;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::CONNECTION_FAILURE_PREFIX;
use crate::core::Credentials;
use crate::core::HostName;
use crate::core::TestDefinition;
use crate::core::TestResult;
use crate::core::rfc3339_now;
use crate::interfaces::CheckError;
use crate::interfaces::CheckExecutor;
use crate::interfaces::CheckReport;
use crate::interfaces::DetailExtractor;
use crate::runtime::defect::DefectResolution;
use crate::runtime::defect::resolve_known_defect;

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Configuration for the execution engine worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum concurrent check executions per host batch.
    pub max_concurrency: usize,
    /// Upper bound on one check execution.
    pub per_test_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            per_test_timeout: Duration::from_secs(60),
        }
    }
}

// ============================================================================
// SECTION: Execution Engine
// ============================================================================

/// Bounded-concurrency execution engine for one host's test batch.
#[derive(Clone)]
pub struct ExecutionEngine {
    /// Check-execution collaborator.
    executor: Arc<dyn CheckExecutor>,
    /// Supplementary detail extraction collaborator.
    extractor: Arc<dyn DetailExtractor>,
    /// Worker pool configuration.
    config: EngineConfig,
}

impl ExecutionEngine {
    /// Creates a new engine over the given collaborators.
    #[must_use]
    pub fn new(
        executor: Arc<dyn CheckExecutor>,
        extractor: Arc<dyn DetailExtractor>,
        config: EngineConfig,
    ) -> Self {
        Self {
            executor,
            extractor,
            config,
        }
    }

    /// Runs every definition against the host under the bounded pool.
    ///
    /// Exactly one [`TestResult`] is returned per definition, in definition
    /// order, regardless of completion order or which failure path each
    /// execution took. A failing test never cancels its siblings.
    pub async fn run(
        &self,
        definitions: &[TestDefinition],
        host: &HostName,
        credentials: &Credentials,
    ) -> Vec<TestResult> {
        let pool = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks: JoinSet<(usize, TestResult)> = JoinSet::new();

        for (index, definition) in definitions.iter().enumerate() {
            let pool = Arc::clone(&pool);
            let executor = Arc::clone(&self.executor);
            let extractor = Arc::clone(&self.extractor);
            let definition = definition.clone();
            let host = host.clone();
            let credentials = credentials.clone();
            let per_test_timeout = self.config.per_test_timeout;

            tasks.spawn(async move {
                let result = match pool.acquire_owned().await {
                    Ok(_permit) => {
                        let attempt = execute_one(
                            executor,
                            extractor,
                            definition,
                            host,
                            credentials,
                            per_test_timeout,
                        );
                        attempt.await
                    }
                    Err(_) => aborted_result(&definition, &host, "worker pool closed"),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<TestResult>> = definitions.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(result);
                    }
                }
                Err(error) => {
                    tracing::error!(host = %host, %error, "execution task failed to join");
                }
            }
        }

        // Any task that never delivered still owes the batch a result.
        definitions
            .iter()
            .zip(slots)
            .map(|(definition, slot)| {
                slot.unwrap_or_else(|| aborted_result(definition, host, "execution task aborted"))
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Single Execution
// ============================================================================

/// Executes one check and classifies its outcome into a result record.
async fn execute_one(
    executor: Arc<dyn CheckExecutor>,
    extractor: Arc<dyn DetailExtractor>,
    definition: TestDefinition,
    host: HostName,
    credentials: Credentials,
    per_test_timeout: Duration,
) -> TestResult {
    let started = Instant::now();

    let blocking_executor = Arc::clone(&executor);
    let blocking_definition = definition.clone();
    let blocking_host = host.clone();
    let invocation = tokio::task::spawn_blocking(move || {
        blocking_executor.execute(&blocking_host, &blocking_definition, &credentials)
    });

    let outcome = tokio::time::timeout(per_test_timeout, invocation).await;
    let (passed, message, diagnostics) = match outcome {
        Err(_) => {
            tracing::warn!(test = %definition.name, host = %host, "check timed out");
            (
                false,
                format!("timed out after {}s", per_test_timeout.as_secs()),
                None,
            )
        }
        Ok(Err(join_error)) => {
            (false, format!("check execution task failed: {join_error}"), None)
        }
        Ok(Ok(raw)) => classify(&definition, &host, raw),
    };

    let mut details = Map::new();
    if let Some(diagnostics) = diagnostics {
        details.insert("diagnostics".to_string(), diagnostics);
    }
    enrich(extractor.as_ref(), &host, &definition, &mut details);

    TestResult {
        test_name: definition.name,
        device: host,
        result: passed,
        message,
        execution_time: started.elapsed().as_secs_f64(),
        details: Value::Object(details),
        timestamp: rfc3339_now(),
    }
}

/// Classifies the raw transport outcome into pass/fail plus diagnostics.
fn classify(
    definition: &TestDefinition,
    host: &HostName,
    raw: Result<CheckReport, CheckError>,
) -> (bool, String, Option<Value>) {
    match raw {
        Ok(report) => {
            let message = if report.message.is_empty() {
                if report.passed { "all checks passed" } else { "checks failed" }.to_string()
            } else {
                report.message
            };
            (report.passed, message, report.diagnostics)
        }
        Err(CheckError::Connection(detail)) => {
            tracing::warn!(test = %definition.name, host = %host, detail = %detail, "session failed");
            (false, format!("{CONNECTION_FAILURE_PREFIX} {detail}"), None)
        }
        Err(CheckError::Execution {
            message,
            partial,
        }) => match resolve_known_defect(&message, partial.as_ref()) {
            Some(DefectResolution::SuppressedPass {
                message,
            }) => {
                tracing::debug!(test = %definition.name, host = %host, "parser defect suppressed");
                let diagnostics = partial.and_then(|report| report.diagnostics);
                (true, message, diagnostics)
            }
            Some(DefectResolution::Failed {
                message,
            }) => (false, message, None),
            None => (false, message, None),
        },
    }
}

/// Merges best-effort extracted fields into the detail map.
///
/// Extraction is independent of pass/fail and its failure is swallowed here;
/// it only ever adds keys.
fn enrich(
    extractor: &dyn DetailExtractor,
    host: &HostName,
    definition: &TestDefinition,
    details: &mut Map<String, Value>,
) {
    let Some(extracted) = extractor.extract(host, &definition.name) else {
        return;
    };
    match extracted {
        Value::Object(fields) => {
            for (key, value) in fields {
                details.insert(key, value);
            }
        }
        other => {
            details.insert("extracted".to_string(), other);
        }
    }
}

/// Builds the failed result owed when an execution never delivered one.
fn aborted_result(definition: &TestDefinition, host: &HostName, reason: &str) -> TestResult {
    TestResult {
        test_name: definition.name.clone(),
        device: host.clone(),
        result: false,
        message: reason.to_string(),
        execution_time: 0.0,
        details: Value::Object(Map::new()),
        timestamp: rfc3339_now(),
    }
}
