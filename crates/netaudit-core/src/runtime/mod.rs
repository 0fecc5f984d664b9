// netaudit-core/src/runtime/mod.rs
// ============================================================================
// Module: Netaudit Runtime
// Description: Execution engine, aggregation, defect handling, and orchestration.
// Purpose: Group the concurrency-bearing half of the core crate.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime owns all concurrency coordination: the bounded worker pool,
//! per-test and per-host timeouts, and the deterministic result ordering
//! contract. Everything here works through the collaborator interfaces and
//! shares no mutable state between concurrent executions.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aggregate;
pub mod defect;
pub mod engine;
pub mod orchestrator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aggregate::connection_failure;
pub use aggregate::summarize;
pub use defect::DefectResolution;
pub use defect::KNOWN_DEFECT_SIGNATURE;
pub use defect::is_known_defect;
pub use defect::resolve_known_defect;
pub use engine::EngineConfig;
pub use engine::ExecutionEngine;
pub use orchestrator::Orchestrator;
pub use orchestrator::OrchestratorConfig;
