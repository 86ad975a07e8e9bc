//! End-to-end properties of the propose/confirm/execute flow, run against
//! the real command executor.

use async_trait::async_trait;
use kaia_core::{
    CommandProposer, ConfirmationGate, Confirmer, ExecutionResult, Executor, GateError,
    GateOutcome,
};
use kaia_executor::CommandExecutor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct FixedProposer(Result<String, String>);

#[async_trait]
impl CommandProposer for FixedProposer {
    async fn propose(&self, _request: &str) -> Result<String, GateError> {
        self.0.clone().map_err(GateError::Proposal)
    }
}

struct ScriptedConfirmer(&'static str);

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, _command: &str) -> bool {
        kaia_core::is_affirmative(self.0)
    }
}

/// Executor that counts invocations; panics are avoided so declined
/// paths can assert a zero count.
struct CountingExecutor {
    inner: CommandExecutor,
    count: Arc<AtomicUsize>,
}

impl CountingExecutor {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: CommandExecutor::new(Duration::from_secs(10)),
                count: count.clone(),
            },
            count,
        )
    }
}

#[async_trait]
impl Executor for CountingExecutor {
    async fn execute(&self, command: &str) -> ExecutionResult {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(command).await
    }
}

#[tokio::test]
async fn confirmed_disk_space_check_executes() {
    let (executor, count) = CountingExecutor::new();
    let gate = ConfirmationGate::new(
        FixedProposer(Ok("df -h".to_string())),
        ScriptedConfirmer("y"),
        executor,
    );

    match gate.handle("check disk space").await.unwrap() {
        GateOutcome::Executed { command, result } => {
            assert_eq!(command, "df -h");
            assert_eq!(result.exit_code, Some(0));
            assert!(!result.stdout.is_empty());
        }
        other => panic!("expected execution, got {:?}", other),
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn declined_disk_space_check_runs_nothing() {
    let (executor, count) = CountingExecutor::new();
    let gate = ConfirmationGate::new(
        FixedProposer(Ok("df -h".to_string())),
        ScriptedConfirmer("n"),
        executor,
    );

    match gate.handle("check disk space").await.unwrap() {
        GateOutcome::Declined { command } => assert_eq!(command, "df -h"),
        other => panic!("expected decline, got {:?}", other),
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_confirmation_counts_as_decline() {
    let (executor, count) = CountingExecutor::new();
    let gate = ConfirmationGate::new(
        FixedProposer(Ok("df -h".to_string())),
        ScriptedConfirmer(""),
        executor,
    );

    assert!(matches!(
        gate.handle("check disk space").await.unwrap(),
        GateOutcome::Declined { .. }
    ));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_backend_reports_error_and_runs_nothing() {
    let (executor, count) = CountingExecutor::new();
    let gate = ConfirmationGate::new(
        FixedProposer(Err("connection refused".to_string())),
        ScriptedConfirmer("y"),
        executor,
    );

    let err = gate.handle("check disk space").await.unwrap_err();
    assert!(err.to_string().contains("connection refused"));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn confirmed_missing_command_surfaces_stderr_without_crashing() {
    let (executor, _count) = CountingExecutor::new();
    let gate = ConfirmationGate::new(
        FixedProposer(Ok("no-such-binary-on-this-system --flag".to_string())),
        ScriptedConfirmer("yes"),
        executor,
    );

    match gate.handle("run the thing").await.unwrap() {
        GateOutcome::Executed { result, .. } => {
            assert!(!result.success());
            assert!(!result.stderr.is_empty());
        }
        other => panic!("expected execution attempt, got {:?}", other),
    }
}
