//! Command proposal and confirmation gate.
//!
//! Invariant: no subordinate process starts unless the user explicitly
//! confirmed the exact candidate string. The gate holds one in-flight
//! proposal at a time and discards it when the cycle ends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GateError {
    #[error("proposal failed: {0}")]
    Proposal(String),
}

/// Captured output of an executed command. A nonzero exit status is data,
/// not an error: the gate reports it and stays healthy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Turns a natural-language request into a single candidate command.
#[async_trait]
pub trait CommandProposer: Send + Sync {
    async fn propose(&self, request: &str) -> Result<String, GateError>;
}

/// Presents a candidate command and obtains a yes/no verdict. Blocks
/// until the user answers; there is no timeout.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, command: &str) -> bool;
}

/// Runs a confirmed command to completion, capturing its output.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, command: &str) -> ExecutionResult;
}

/// Only a recognized affirmative token proceeds to execution; anything
/// else, including an empty reply, declines.
pub fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GateState {
    Idle,
    Proposed,
    Confirmed,
    Declined,
    Executed,
}

#[derive(Debug)]
pub enum GateOutcome {
    Executed {
        command: String,
        result: ExecutionResult,
    },
    Declined {
        command: String,
    },
}

pub struct ConfirmationGate<P, C, E>
where
    P: CommandProposer,
    C: Confirmer,
    E: Executor,
{
    proposer: P,
    confirmer: C,
    executor: E,
}

impl<P, C, E> ConfirmationGate<P, C, E>
where
    P: CommandProposer,
    C: Confirmer,
    E: Executor,
{
    pub fn new(proposer: P, confirmer: C, executor: E) -> Self {
        Self {
            proposer,
            confirmer,
            executor,
        }
    }

    /// One full propose -> confirm -> execute cycle. Both terminal paths
    /// (`Executed`, `Declined`) return the gate to idle; a proposal
    /// failure does the same without ever showing a command.
    pub async fn handle(&self, request: &str) -> Result<GateOutcome, GateError> {
        let mut state = GateState::Idle;
        debug!(?state, request, "handling request");

        let command = self.proposer.propose(request).await?;
        state = GateState::Proposed;
        debug!(?state, command, "proposal accepted");

        if self.confirmer.confirm(&command).await {
            state = GateState::Confirmed;
            debug!(?state, command, "user confirmed");

            // The confirmed string is executed verbatim; nothing may
            // rewrite it between confirmation and execution.
            let result = self.executor.execute(&command).await;
            state = GateState::Executed;
            info!(?state, command, exit_code = ?result.exit_code, "command executed");
            Ok(GateOutcome::Executed { command, result })
        } else {
            state = GateState::Declined;
            info!(?state, command, "user declined");
            Ok(GateOutcome::Declined { command })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedProposer(Result<String, String>);

    #[async_trait]
    impl CommandProposer for FixedProposer {
        async fn propose(&self, _request: &str) -> Result<String, GateError> {
            self.0
                .clone()
                .map_err(GateError::Proposal)
        }
    }

    struct ScriptedConfirmer {
        answer: String,
        shown: Mutex<Option<String>>,
    }

    impl ScriptedConfirmer {
        fn new(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                shown: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Confirmer for ScriptedConfirmer {
        async fn confirm(&self, command: &str) -> bool {
            *self.shown.lock() = Some(command.to_string());
            is_affirmative(&self.answer)
        }
    }

    #[derive(Clone)]
    struct CountingExecutor {
        executions: Arc<AtomicUsize>,
        last_command: Arc<Mutex<Option<String>>>,
    }

    impl CountingExecutor {
        fn new() -> Self {
            Self {
                executions: Arc::new(AtomicUsize::new(0)),
                last_command: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl Executor for CountingExecutor {
        async fn execute(&self, command: &str) -> ExecutionResult {
            self.executions.fetch_add(1, Ordering::SeqCst);
            *self.last_command.lock() = Some(command.to_string());
            ExecutionResult {
                stdout: "ok".to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            }
        }
    }

    #[tokio::test]
    async fn confirmed_command_executes_exact_string() {
        let executor = CountingExecutor::new();
        let gate = ConfirmationGate::new(
            FixedProposer(Ok("df -h".to_string())),
            ScriptedConfirmer::new("y"),
            executor.clone(),
        );

        let outcome = gate.handle("check disk space").await.unwrap();
        match outcome {
            GateOutcome::Executed { command, result } => {
                assert_eq!(command, "df -h");
                assert_eq!(result.exit_code, Some(0));
            }
            other => panic!("expected execution, got {:?}", other),
        }
        assert_eq!(executor.executions.load(Ordering::SeqCst), 1);
        assert_eq!(executor.last_command.lock().as_deref(), Some("df -h"));
    }

    #[tokio::test]
    async fn declined_command_never_executes() {
        for answer in ["n", "", "maybe", "Y E S", "yep"] {
            let executor = CountingExecutor::new();
            let gate = ConfirmationGate::new(
                FixedProposer(Ok("df -h".to_string())),
                ScriptedConfirmer::new(answer),
                executor.clone(),
            );

            let outcome = gate.handle("check disk space").await.unwrap();
            assert!(matches!(outcome, GateOutcome::Declined { .. }));
            assert_eq!(
                executor.executions.load(Ordering::SeqCst),
                0,
                "answer {:?} must not execute",
                answer
            );
        }
    }

    #[tokio::test]
    async fn proposal_failure_shows_no_command_and_runs_nothing() {
        let executor = CountingExecutor::new();
        let confirmer = ScriptedConfirmer::new("y");
        let gate = ConfirmationGate::new(
            FixedProposer(Err("backend unreachable".to_string())),
            confirmer,
            executor.clone(),
        );

        let err = gate.handle("check disk space").await.unwrap_err();
        assert!(err.to_string().contains("backend unreachable"));
        assert_eq!(executor.executions.load(Ordering::SeqCst), 0);
        assert!(gate.confirmer.shown.lock().is_none());
    }

    #[test]
    fn affirmative_tokens_are_a_closed_set() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative(" yes "));
        assert!(is_affirmative("YES"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yeah"));
        assert!(!is_affirmative("ok"));
    }
}
