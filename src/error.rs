//! Error types for the planning core.
//!
//! Every core entry point returns `Result<_, PlanError>`. Infeasibility is an
//! ordinary outcome and is reported through this enum rather than a panic.

use serde::Serialize;
use thiserror::Error;

/// Flat status tag for a planning call.
///
/// Mirrors the outcome of a solve for callers (CLI, WASM) that want a single
/// value instead of matching on [`PlanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    UnknownResource,
    Infeasible,
    Unbounded,
    SolverError,
}

/// Failure of a single planning request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A positive target that no action in the catalog produces.
    #[error("no action produces '{resource}'")]
    UnknownResource { resource: String },

    /// The resource is producible, but not with the supporting resources available.
    #[error("no non-negative action mix satisfies the goal")]
    Infeasible,

    /// The objective can decrease without bound, i.e. some action has a
    /// non-positive effective cost (usually an inconsistent background rate).
    #[error("the action cost is unbounded below; check background rates")]
    Unbounded,

    /// The LP backend failed for any other reason.
    #[error("solver failure: {0}")]
    Solver(String),

    /// An availability override was placed on a resource that is also a positive target.
    #[error("resource '{resource}' is both a target and an availability override")]
    ConflictingBound { resource: String },

    /// Two actions in a catalog share a name.
    #[error("duplicate action '{0}'")]
    DuplicateAction(String),

    /// A delta that is NaN or infinite.
    #[error("action '{action}' has a non-finite delta for '{resource}'")]
    InvalidDelta { action: String, resource: String },
}

impl PlanError {
    /// Returns the status tag a caller should report for this failure.
    ///
    /// Unbounded problems are a modelling bug and are reported as solver errors.
    pub fn status(&self) -> SolveStatus {
        match self {
            PlanError::UnknownResource { .. } => SolveStatus::UnknownResource,
            PlanError::Infeasible => SolveStatus::Infeasible,
            PlanError::Unbounded
            | PlanError::Solver(_)
            | PlanError::ConflictingBound { .. }
            | PlanError::DuplicateAction(_)
            | PlanError::InvalidDelta { .. } => SolveStatus::SolverError,
        }
    }
}
