// netaudit-core/src/lib.rs
// ============================================================================
// Module: Netaudit Core Library
// Description: Public API surface for the netaudit core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Netaudit core provides environment-gated test selection, bounded-pool
//! check execution, and deterministic result aggregation for network-device
//! state validation. It is transport-agnostic and integrates through
//! explicit collaborator interfaces rather than embedding any device
//! protocol.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CheckError;
pub use interfaces::CheckExecutor;
pub use interfaces::CheckReport;
pub use interfaces::DetailExtractor;
pub use interfaces::ReachabilityProbe;
pub use runtime::EngineConfig;
pub use runtime::ExecutionEngine;
pub use runtime::Orchestrator;
pub use runtime::OrchestratorConfig;
pub use runtime::connection_failure;
pub use runtime::is_known_defect;
pub use runtime::resolve_known_defect;
pub use runtime::summarize;
