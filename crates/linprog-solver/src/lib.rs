mod dual;
mod error;
mod extract;
mod normalize;
mod pivot;
mod problem;
mod sensitivity;
mod simplex;
mod solution;
mod tableau;

pub use dual::construct as construct_dual;
pub use error::SolveError;
pub use extract::{extract, ArtificialPricing};
pub use normalize::{normalize, RawConstraint, RawProblem};
pub use pivot::{Phase, PivotEngine, PivotOutcome, PivotStep};
pub use problem::{Constraint, ConstraintSign, LinearProgram, Method, Sense};
pub use sensitivity::{objective_sensitivity, DEFAULT_STEP};
pub use simplex::{Solver, TracedSolve};
pub use solution::{SolverResult, Status};
pub use tableau::{Column, ColumnCatalog, Tableau};
