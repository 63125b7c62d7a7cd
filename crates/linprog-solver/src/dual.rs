use crate::error::SolveError;
use crate::problem::{default_names, Constraint, ConstraintSign, LinearProgram, Sense};

/// Dual Constructor for a primal `max c·x, Ax <= b, x >= 0`.
///
/// Produces `min b·y, Aᵗy >= c, y >= 0` with variables `y1..ym`, one per primal
/// constraint. Primals with `>=` or `=` rows, or a minimize sense, are rejected.
pub fn construct(primal: &LinearProgram) -> Result<LinearProgram, SolveError> {
    if primal.sense() != Sense::Maximize {
        return Err(SolveError::UnsupportedDualForm("primal must maximize".to_string()));
    }
    if let Some((i, c)) = primal
        .constraints()
        .iter()
        .enumerate()
        .find(|(_, c)| c.sign != ConstraintSign::Le)
    {
        return Err(SolveError::UnsupportedDualForm(format!(
            "constraint {i} uses {}",
            c.sign
        )));
    }
    if primal.num_constraints() == 0 {
        return Err(SolveError::UnsupportedDualForm("primal has no constraints".to_string()));
    }

    let objective: Vec<f64> = primal.constraints().iter().map(|c| c.rhs).collect();
    let constraints = primal
        .objective()
        .iter()
        .enumerate()
        .map(|(j, &c_j)| {
            let column = primal.constraints().iter().map(|c| c.coefficients[j]).collect();
            Constraint::ge(column, c_j)
        })
        .collect();

    let variables = default_names("y", primal.num_constraints());
    LinearProgram::with_variables(Sense::Minimize, objective, constraints, variables)
}
