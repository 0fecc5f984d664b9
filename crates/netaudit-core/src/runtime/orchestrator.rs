// netaudit-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Run Orchestrator
// Description: Wires selection, probing, execution, and aggregation into one run.
// Purpose: Turn a catalog and a context into exactly one run report.
// Dependencies: crate::{core, interfaces, runtime}, tokio, tracing
// ============================================================================

//! ## Overview
//! Data flows one direction: catalog definitions are narrowed by the
//! classifier, every host is probed before any execution, per-host batches
//! fan out concurrently, and results fold into the final report. Failures
//! are contained at the smallest scope possible; only pre-flight
//! unreachability and explicit environment restrictions abort work before it
//! begins. The orchestrator returns a report for every input; it never
//! panics and never surfaces a raw error to stdout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::core::EnvironmentTier;
use crate::core::ExecutionContext;
use crate::core::HostName;
use crate::core::RunReport;
use crate::core::TestDefinition;
use crate::core::TestResult;
use crate::core::rfc3339_now;
use crate::core::select;
use crate::interfaces::ReachabilityProbe;
use crate::runtime::aggregate::connection_failure;
use crate::runtime::aggregate::summarize;
use crate::runtime::engine::ExecutionEngine;

// ============================================================================
// SECTION: Orchestrator Configuration
// ============================================================================

/// Configuration for pre-flight probing and per-host session bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// TCP port probed before execution.
    pub probe_port: u16,
    /// Upper bound on one probe connect attempt.
    pub probe_timeout: Duration,
    /// Upper bound on one host's whole connect-and-execute batch.
    pub session_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            probe_port: 22,
            probe_timeout: Duration::from_secs(5),
            session_timeout: Duration::from_secs(300),
        }
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Orchestration entry point for one validation run.
pub struct Orchestrator {
    /// Pre-flight reachability collaborator.
    probe: Arc<dyn ReachabilityProbe>,
    /// Per-host execution engine.
    engine: ExecutionEngine,
    /// Probe and session configuration.
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Creates a new orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        probe: Arc<dyn ReachabilityProbe>,
        engine: ExecutionEngine,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            probe,
            engine,
            config,
        }
    }

    /// Executes one run: select, probe, execute, aggregate.
    pub async fn execute(
        &self,
        definitions: &[TestDefinition],
        context: &ExecutionContext,
    ) -> RunReport {
        let environment = context.environment;

        let selected = match select(definitions, context) {
            Ok(selected) => selected,
            Err(error) => {
                tracing::warn!(%error, "test selection aborted the run");
                return RunReport::error(environment, error.to_string());
            }
        };
        if selected.is_empty() {
            return RunReport::error(
                environment,
                format!("no tests applicable to environment '{environment}'"),
            );
        }

        if let Some(report) = self.preflight(environment, &context.hosts) {
            return report;
        }

        let results = self.execute_hosts(&selected, context).await;

        if let Some(message) = connection_failure(&results) {
            return RunReport::error(environment, message);
        }

        RunReport::completed(summarize(results, &context.hosts, environment))
    }

    /// Probes every host before committing any execution resources.
    ///
    /// Returns an error report naming the unreachable hosts, or `None` when
    /// all hosts answered. One precise failure beats N per-test connection
    /// errors.
    fn preflight(&self, environment: EnvironmentTier, hosts: &[HostName]) -> Option<RunReport> {
        let unreachable: Vec<&str> = hosts
            .iter()
            .filter(|host| {
                !self.probe.is_reachable(host, self.config.probe_port, self.config.probe_timeout)
            })
            .map(HostName::as_str)
            .collect();
        if unreachable.is_empty() {
            return None;
        }
        tracing::warn!(hosts = ?unreachable, "pre-flight probe failed");
        Some(RunReport::error(
            environment,
            format!(
                "Unreachable host(s): {} (tcp port {} connect failed)",
                unreachable.join(", "),
                self.config.probe_port
            ),
        ))
    }

    /// Fans per-host batches out concurrently and restores host order.
    async fn execute_hosts(
        &self,
        selected: &[TestDefinition],
        context: &ExecutionContext,
    ) -> Vec<TestResult> {
        let mut batches: JoinSet<(usize, Vec<TestResult>)> = JoinSet::new();
        for (host_index, host) in context.hosts.iter().enumerate() {
            let engine = self.engine.clone();
            let definitions = selected.to_vec();
            let host = host.clone();
            let credentials = context.credentials.clone();
            let session_timeout = self.config.session_timeout;

            batches.spawn(async move {
                let batch = tokio::time::timeout(
                    session_timeout,
                    engine.run(&definitions, &host, &credentials),
                )
                .await
                .unwrap_or_else(|_| {
                    tracing::warn!(%host, "session timed out before the batch completed");
                    timed_out_batch(&definitions, &host, session_timeout)
                });
                (host_index, batch)
            });
        }

        let mut ordered: Vec<(usize, Vec<TestResult>)> = Vec::with_capacity(context.hosts.len());
        while let Some(joined) = batches.join_next().await {
            match joined {
                Ok(batch) => ordered.push(batch),
                Err(error) => {
                    tracing::error!(%error, "host batch failed to join");
                }
            }
        }
        ordered.sort_by_key(|(host_index, _)| *host_index);
        ordered.into_iter().flat_map(|(_, batch)| batch).collect()
    }
}

// ============================================================================
// SECTION: Session Timeout Results
// ============================================================================

/// Synthesizes failed results for a batch whose session never completed.
fn timed_out_batch(
    definitions: &[TestDefinition],
    host: &HostName,
    session_timeout: Duration,
) -> Vec<TestResult> {
    definitions
        .iter()
        .map(|definition| TestResult {
            test_name: definition.name.clone(),
            device: host.clone(),
            result: false,
            message: format!("session timed out after {}s", session_timeout.as_secs()),
            execution_time: session_timeout.as_secs_f64(),
            details: serde_json::Value::Object(serde_json::Map::new()),
            timestamp: rfc3339_now(),
        })
        .collect()
}
