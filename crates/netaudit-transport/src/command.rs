// netaudit-transport/src/command.rs
// ============================================================================
// Module: Subprocess Check Executor
// Description: Check execution through the external device-session helper.
// Purpose: Implement the opaque RPC-executing dependency boundary.
// Dependencies: netaudit-core, serde_json, std::process
// ============================================================================

//! ## Overview
//! The executor shells out to the device-session helper, which owns all
//! protocol framing. The helper receives host, test file, and username on
//! its command line and the password through its environment; it reports the
//! check verdict as a JSON document on stdout. Helper stdout is also written
//! into the cache directory as the raw response artifact consumed by the
//! detail extractor. Classification into connection versus execution
//! failures happens here, at the boundary; the known-defect carve-out does
//! not — that belongs to the engine.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use netaudit_core::CheckError;
use netaudit_core::CheckExecutor;
use netaudit_core::CheckReport;
use netaudit_core::Credentials;
use netaudit_core::HostName;
use netaudit_core::TestDefinition;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Environment variable the helper reads the device password from.
pub const PASSWORD_ENV: &str = "NETAUDIT_DEVICE_PASSWORD";

/// Stderr fragments identifying session-establishment failures.
///
/// The helper does not emit structured errors, so connection classification
/// matches these fixed fragments case-insensitively.
const CONNECTION_FRAGMENTS: &[&str] = &[
    "connection refused",
    "authentication failed",
    "unable to connect",
    "connect timed out",
    "host key verification failed",
];

/// Configuration for the subprocess executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExecutorConfig {
    /// Device-session helper program.
    pub program: PathBuf,
    /// Arguments placed before the generated ones.
    pub extra_args: Vec<String>,
    /// Directory receiving raw response artifacts.
    pub cache_dir: PathBuf,
}

// ============================================================================
// SECTION: Executor Implementation
// ============================================================================

/// Check executor backed by the external device-session helper.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    /// Executor configuration.
    config: CommandExecutorConfig,
}

impl CommandExecutor {
    /// Creates a new executor with the given configuration.
    #[must_use]
    pub const fn new(config: CommandExecutorConfig) -> Self {
        Self {
            config,
        }
    }

    /// Writes the raw helper output into the cache directory, best effort.
    ///
    /// The cache is not authoritative; a failed write only costs later
    /// supplementary extraction, never correctness.
    fn cache_raw(&self, host: &HostName, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }
        if let Err(error) = fs::create_dir_all(&self.config.cache_dir) {
            tracing::debug!(%host, %error, "cache directory unavailable");
            return;
        }
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis());
        let path = self.config.cache_dir.join(format!("{host}-{stamp}.json"));
        if let Err(error) = fs::write(&path, raw) {
            tracing::debug!(%host, %error, "cache artifact write failed");
        }
    }
}

impl CheckExecutor for CommandExecutor {
    fn execute(
        &self,
        host: &HostName,
        definition: &TestDefinition,
        credentials: &Credentials,
    ) -> Result<CheckReport, CheckError> {
        let output = Command::new(&self.config.program)
            .args(&self.config.extra_args)
            .arg("--host")
            .arg(host.as_str())
            .arg("--test-file")
            .arg(&definition.file)
            .arg("--username")
            .arg(&credentials.username)
            .env(PASSWORD_ENV, &credentials.password)
            .output()
            .map_err(|error| CheckError::Execution {
                message: format!("cannot launch session helper: {error}"),
                partial: None,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        self.cache_raw(host, &stdout);

        if output.status.success() {
            return serde_json::from_str::<CheckReport>(&stdout).map_err(|error| {
                CheckError::Execution {
                    message: format!("unparseable check output: {error}"),
                    partial: None,
                }
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("session helper exited with {}", output.status)
        } else {
            stderr
        };
        if is_connection_failure(&message) {
            return Err(CheckError::Connection(message));
        }

        // A failing helper may still have reported a verdict before dying;
        // carry it as the partial result for the engine's defect carve-out.
        let partial = serde_json::from_str::<CheckReport>(&stdout).ok();
        Err(CheckError::Execution {
            message,
            partial,
        })
    }
}

/// Returns true when the helper message names a session-establishment
/// failure.
fn is_connection_failure(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    CONNECTION_FRAGMENTS.iter().any(|fragment| lowered.contains(fragment))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::Path;

    use netaudit_core::CheckError;
    use netaudit_core::CheckExecutor;
    use netaudit_core::Credentials;
    use netaudit_core::EnvironmentMetadata;
    use netaudit_core::HostName;
    use netaudit_core::TestDefinition;
    use tempfile::TempDir;

    use super::CommandExecutor;
    use super::CommandExecutorConfig;

    /// Builds an executor whose helper is a shell one-liner.
    fn script_executor(cache_dir: &Path, script: &str) -> CommandExecutor {
        CommandExecutor::new(CommandExecutorConfig {
            program: "/bin/sh".into(),
            extra_args: vec!["-c".to_string(), script.to_string(), "helper".to_string()],
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    /// A definition fixture.
    fn definition() -> TestDefinition {
        TestDefinition {
            name: "test_interface_status".into(),
            file: "test_interface_status.yml".into(),
            description: String::new(),
            category: "interface".to_string(),
            display: BTreeMap::new(),
            metadata: EnvironmentMetadata::default(),
        }
    }

    /// Credentials fixture.
    fn credentials() -> Credentials {
        Credentials {
            username: "auditor".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    #[allow(clippy::unwrap_used, reason = "Tests use unwrap on scripted helpers.")]
    fn passing_helper_output_parses_and_caches() {
        let cache = TempDir::new().unwrap();
        let executor = script_executor(
            cache.path(),
            r#"printf '{"passed": true, "message": "2 checks passed"}'"#,
        );

        let report = executor
            .execute(&HostName::from("r1"), &definition(), &credentials())
            .unwrap();

        assert!(report.passed);
        assert_eq!(report.message, "2 checks passed");
        let cached: Vec<_> = std::fs::read_dir(cache.path()).unwrap().collect();
        assert_eq!(cached.len(), 1);
    }

    #[test]
    #[allow(clippy::unwrap_used, reason = "Tests use unwrap on scripted helpers.")]
    fn auth_failure_maps_to_connection_error() {
        let cache = TempDir::new().unwrap();
        let executor = script_executor(
            cache.path(),
            r"echo 'ERROR: Authentication failed for auditor@r1' >&2; exit 1",
        );

        let error = executor
            .execute(&HostName::from("r1"), &definition(), &credentials())
            .unwrap_err();

        assert!(matches!(error, CheckError::Connection(_)));
    }

    #[test]
    #[allow(clippy::unwrap_used, reason = "Tests use unwrap on scripted helpers.")]
    fn failing_helper_carries_partial_report() {
        let cache = TempDir::new().unwrap();
        let executor = script_executor(
            cache.path(),
            r#"printf '{"passed": true, "message": "3 checks passed"}'; echo 'reply parser blew up' >&2; exit 2"#,
        );

        let error = executor
            .execute(&HostName::from("r1"), &definition(), &credentials())
            .unwrap_err();

        match error {
            CheckError::Execution {
                message,
                partial,
            } => {
                assert_eq!(message, "reply parser blew up");
                assert!(partial.is_some_and(|report| report.passed));
            }
            CheckError::Connection(message) => {
                unreachable!("unexpected connection error: {message}")
            }
        }
    }
}
