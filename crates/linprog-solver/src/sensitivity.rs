use std::collections::BTreeMap;

use log::debug;

use crate::error::SolveError;
use crate::problem::{LinearProgram, Method};
use crate::simplex::Solver;

/// Default perturbation applied to each objective coefficient.
pub const DEFAULT_STEP: f64 = 0.01;

/// Finite-difference sensitivity of the optimal objective to each objective
/// coefficient: `(z(c_j + step) - z(c_j)) / step`, keyed by variable name.
///
/// Empty when the unperturbed problem has no optimum. Variables whose perturbed
/// problem stops being optimal are left out.
pub fn objective_sensitivity(
    solver: &Solver,
    program: &LinearProgram,
    method: Method,
    step: f64,
) -> Result<BTreeMap<String, f64>, SolveError> {
    let base = solver.solve(program, method)?;
    if !base.is_optimal() {
        return Ok(BTreeMap::new());
    }

    let mut sensitivities = BTreeMap::new();
    for (j, name) in program.variables().iter().enumerate() {
        let bumped = program.with_objective_coefficient(j, program.objective()[j] + step);
        let result = solver.solve(&bumped, method)?;
        if result.is_optimal() {
            let change = result.objective_value - base.objective_value;
            sensitivities.insert(name.clone(), change / step);
        } else {
            debug!("perturbing {name} left the problem {:?}", result.status);
        }
    }
    Ok(sensitivities)
}
