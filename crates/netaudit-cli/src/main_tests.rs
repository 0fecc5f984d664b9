// netaudit-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Unit Tests
// Description: Tests for argument normalization and payload shaping.
// ============================================================================
//! ## Overview
//! Validates host and selection parsing, the error payload shape, and the
//! tier conversion used by the argument surface.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use netaudit_core::EnvironmentTier;
use netaudit_core::TestSelection;

use crate::EnvironmentArg;
use crate::error_payload;
use crate::parse_hosts;
use crate::parse_selection;

// ============================================================================
// SECTION: Host Parsing
// ============================================================================

#[test]
fn single_hostname_parses() {
    let hosts = parse_hosts(Some("192.0.2.1"), None).unwrap();
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].as_str(), "192.0.2.1");
}

#[test]
fn csv_hostnames_parse_in_order_with_trimming() {
    let hosts = parse_hosts(None, Some(" r1 , r2 ,, r3 ")).unwrap();
    let names: Vec<&str> = hosts.iter().map(netaudit_core::HostName::as_str).collect();
    assert_eq!(names, vec!["r1", "r2", "r3"]);
}

#[test]
fn missing_hosts_is_an_error() {
    assert!(parse_hosts(None, None).is_err());
    assert!(parse_hosts(None, Some(" , ")).is_err());
}

#[test]
fn both_host_flags_are_rejected() {
    assert!(parse_hosts(Some("r1"), Some("r2")).is_err());
}

// ============================================================================
// SECTION: Selection Parsing
// ============================================================================

#[test]
fn absent_tests_selects_all() {
    assert_eq!(parse_selection(None), TestSelection::All);
    assert_eq!(parse_selection(Some(" , ")), TestSelection::All);
}

#[test]
fn csv_tests_select_named() {
    let selection = parse_selection(Some("test_a, test_b"));
    let TestSelection::Named(names) = selection else {
        unreachable!("expected named selection");
    };
    assert_eq!(names, vec!["test_a".into(), "test_b".into()]);
}

// ============================================================================
// SECTION: Payload Shape
// ============================================================================

#[test]
fn error_payload_carries_status_and_message() {
    let payload = error_payload(EnvironmentTier::Production, "Unreachable host(s): r1");
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["environment"], "production");
    assert!(payload["message"].as_str().unwrap().contains("Unreachable"));
    assert!(payload.get("results").is_none());
}

// ============================================================================
// SECTION: Tier Conversion
// ============================================================================

#[test]
fn tier_arguments_convert_to_core_tiers() {
    assert_eq!(
        EnvironmentTier::from(EnvironmentArg::Development),
        EnvironmentTier::Development
    );
    assert_eq!(EnvironmentTier::from(EnvironmentArg::Staging), EnvironmentTier::Staging);
    assert_eq!(
        EnvironmentTier::from(EnvironmentArg::Production),
        EnvironmentTier::Production
    );
}
