pub mod gate;
pub mod plan;
pub mod planner;
pub mod prompts;
pub mod proposer;

pub use gate::{
    is_affirmative, CommandProposer, ConfirmationGate, Confirmer, ExecutionResult, Executor,
    GateError, GateOutcome,
};
pub use plan::{Action, ActionPlan};
pub use planner::ActionPlanner;
pub use proposer::ModelCommandProposer;
