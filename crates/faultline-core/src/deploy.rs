//! Deployment collaborator: hand a generated infrastructure definition to
//! CloudFormation and optionally wait for the operation to settle.
//!
//! The production implementation drives the `aws` CLI as a subprocess:
//! binary detection up front, stdout parsed as JSON, stderr surfaced in
//! errors. Callers that don't want a real cloud behind them substitute their
//! own [`StackDeployer`].

use crate::config::DeployConfig;
use crate::error::{FaultlineError, Result};
use std::process::Command;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Created,
    Updated,
    NoChange,
}

impl DeployOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            DeployOutcome::Created => "created",
            DeployOutcome::Updated => "updated",
            DeployOutcome::NoChange => "no-change",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeployResult {
    pub outcome: DeployOutcome,
    pub stack_id: Option<String>,
}

// ---------------------------------------------------------------------------
// StackDeployer
// ---------------------------------------------------------------------------

pub trait StackDeployer {
    /// Create or update the named stack from the given template body.
    fn deploy(&self, stack_name: &str, template_body: &str) -> Result<DeployResult>;

    /// Block until the stack reaches a terminal state, within the configured
    /// poll budget.
    fn wait_for_completion(&self, stack_name: &str, outcome: DeployOutcome) -> Result<()>;
}

// ---------------------------------------------------------------------------
// AwsCliDeployer
// ---------------------------------------------------------------------------

pub struct AwsCliDeployer {
    poll_interval: Duration,
    max_attempts: u32,
    region: Option<String>,
}

impl AwsCliDeployer {
    pub fn new(config: &DeployConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
            max_attempts: config.max_poll_attempts,
            region: config.region.clone(),
        }
    }

    fn command(&self, args: &[&str]) -> Result<Command> {
        let aws = which::which("aws").map_err(|_| FaultlineError::AwsCliNotFound)?;
        let mut cmd = Command::new(aws);
        cmd.args(args).args(["--output", "json"]);
        if let Some(region) = &self.region {
            cmd.args(["--region", region]);
        }
        Ok(cmd)
    }

    /// Run an aws subcommand, returning parsed stdout on success and the
    /// collaborator's error text on failure.
    fn run_json(&self, args: &[&str]) -> Result<serde_json::Value> {
        let output = self.command(args)?.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(classify_cli_error(&stderr));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(stdout.trim())?)
    }

    fn stack_exists(&self, stack_name: &str) -> Result<bool> {
        match self.run_json(&["cloudformation", "describe-stacks", "--stack-name", stack_name]) {
            Ok(_) => Ok(true),
            Err(FaultlineError::Deploy { code, .. }) if code == "ValidationError" => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn stack_status(&self, stack_name: &str) -> Result<String> {
        let value =
            self.run_json(&["cloudformation", "describe-stacks", "--stack-name", stack_name])?;
        let status = value["Stacks"][0]["StackStatus"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        Ok(status)
    }
}

impl StackDeployer for AwsCliDeployer {
    fn deploy(&self, stack_name: &str, template_body: &str) -> Result<DeployResult> {
        // Validation failures carry the collaborator's error code and stop
        // the operation before any stack mutation.
        self.run_json(&[
            "cloudformation",
            "validate-template",
            "--template-body",
            template_body,
        ])?;

        let exists = self.stack_exists(stack_name)?;
        let verb = if exists { "update-stack" } else { "create-stack" };
        tracing::info!(stack = stack_name, verb, "deploying stack");

        let result = self.run_json(&[
            "cloudformation",
            verb,
            "--stack-name",
            stack_name,
            "--template-body",
            template_body,
            "--capabilities",
            "CAPABILITY_IAM",
            "CAPABILITY_NAMED_IAM",
        ]);

        match result {
            Ok(value) => Ok(DeployResult {
                outcome: if exists {
                    DeployOutcome::Updated
                } else {
                    DeployOutcome::Created
                },
                stack_id: value["StackId"].as_str().map(String::from),
            }),
            // An update with nothing to do is a successful no-op.
            Err(FaultlineError::Deploy { code, message })
                if code == "ValidationError" && message.contains("No updates") =>
            {
                Ok(DeployResult {
                    outcome: DeployOutcome::NoChange,
                    stack_id: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    fn wait_for_completion(&self, stack_name: &str, outcome: DeployOutcome) -> Result<()> {
        let expected = match outcome {
            DeployOutcome::Created => "CREATE_COMPLETE",
            DeployOutcome::Updated => "UPDATE_COMPLETE",
            DeployOutcome::NoChange => return Ok(()),
        };

        for attempt in 0..self.max_attempts {
            let status = self.stack_status(stack_name)?;
            if status == expected {
                tracing::info!(stack = stack_name, status, "stack settled");
                return Ok(());
            }
            if is_failure_status(&status) {
                return Err(FaultlineError::Deploy {
                    code: status,
                    message: format!("stack '{stack_name}' entered a failure state"),
                });
            }
            tracing::debug!(stack = stack_name, status, attempt, "waiting for stack");
            std::thread::sleep(self.poll_interval);
        }

        Err(FaultlineError::DeployTimeout {
            stack: stack_name.to_string(),
            attempts: self.max_attempts,
        })
    }
}

fn is_failure_status(status: &str) -> bool {
    status.ends_with("_FAILED") || status.contains("ROLLBACK")
}

/// Pull the CloudFormation error code out of CLI stderr, e.g.
/// `An error occurred (ValidationError) when calling ...: No updates ...`.
fn classify_cli_error(stderr: &str) -> FaultlineError {
    let code = stderr
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(code, _)| code.trim().to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    FaultlineError::Deploy {
        code,
        message: stderr.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_extracts_error_code() {
        let err = classify_cli_error(
            "An error occurred (ValidationError) when calling the UpdateStack operation: \
             No updates are to be performed.",
        );
        match err {
            FaultlineError::Deploy { code, message } => {
                assert_eq!(code, "ValidationError");
                assert!(message.contains("No updates"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn classify_without_code_is_unknown() {
        let err = classify_cli_error("connection refused");
        match err {
            FaultlineError::Deploy { code, .. } => assert_eq!(code, "Unknown"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn failure_statuses() {
        assert!(is_failure_status("CREATE_FAILED"));
        assert!(is_failure_status("ROLLBACK_IN_PROGRESS"));
        assert!(is_failure_status("UPDATE_ROLLBACK_COMPLETE"));
        assert!(!is_failure_status("CREATE_IN_PROGRESS"));
        assert!(!is_failure_status("CREATE_COMPLETE"));
    }

    #[test]
    fn no_change_wait_is_immediate() {
        let deployer = AwsCliDeployer::new(&DeployConfig::default());
        deployer
            .wait_for_completion("any", DeployOutcome::NoChange)
            .unwrap();
    }

    #[test]
    fn outcome_strings() {
        assert_eq!(DeployOutcome::Created.as_str(), "created");
        assert_eq!(DeployOutcome::Updated.as_str(), "updated");
        assert_eq!(DeployOutcome::NoChange.as_str(), "no-change");
    }
}
