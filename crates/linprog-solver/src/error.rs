use thiserror::Error;

/// Input-validation failures. Every variant is raised before a tableau is built.
///
/// Infeasible, unbounded and iteration-capped runs are not errors; they come back
/// as a [`Status`](crate::Status) inside the [`SolverResult`](crate::SolverResult).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Constraint {constraint} has {found} coefficients, expected {expected}")]
    DimensionMismatch {
        constraint: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unsupported constraint sign: {0}")]
    UnsupportedConstraintSign(String),
    #[error("Dual construction needs a max problem with only <= constraints: {0}")]
    UnsupportedDualForm(String),
    #[error("Unsupported optimization sense: {0}")]
    UnsupportedSense(String),
    #[error("Unsupported solve method: {0}")]
    UnsupportedMethod(String),
    #[error("Objective has no coefficients")]
    EmptyObjective,
    #[error("Non-finite coefficient in {0}")]
    NonFiniteCoefficient(String),
    #[error("Got {found} variable names for {expected} variables")]
    VariableNameCount { expected: usize, found: usize },
    #[error("Constraint {0} has no slack starting basis; use big_m or two_phase")]
    RequiresArtificialBasis(usize),
}
