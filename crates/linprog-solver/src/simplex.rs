use log::{debug, warn};

use crate::dual;
use crate::error::SolveError;
use crate::extract::{extract, ArtificialPricing};
use crate::normalize::{normalize, RawProblem};
use crate::pivot::{pivot, Phase, PivotEngine, PivotOutcome, PivotStep};
use crate::problem::{ConstraintSign, LinearProgram, Method};
use crate::solution::{SolverResult, Status};
use crate::tableau::{Column, Tableau};

/// Lower bound on the Big-M factor: M must sit at least two orders of
/// magnitude above the largest objective coefficient.
const MIN_BIG_M_FACTOR: f64 = 100.0;

/// Tableau simplex solver. Holds configuration only; every call builds and
/// owns its own tableau, so one `Solver` can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots per solve, across all phases
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// M = factor * max(1, largest |objective coefficient|)
    big_m_factor: f64,
}

/// A result together with every pivot that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedSolve {
    pub result: SolverResult,
    pub steps: Vec<PivotStep>,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-9,
            big_m_factor: 1e4,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Values below 100 are raised to 100.
    pub fn with_big_m_factor(mut self, factor: f64) -> Self {
        self.big_m_factor = factor.max(MIN_BIG_M_FACTOR);
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Validate a raw request and solve it with the method it names.
    pub fn solve_raw(&self, raw: &RawProblem) -> Result<SolverResult, SolveError> {
        let (program, method) = normalize(raw)?;
        self.solve(&program, method)
    }

    pub fn solve(
        &self,
        program: &LinearProgram,
        method: Method,
    ) -> Result<SolverResult, SolveError> {
        self.solve_traced(program, method).map(|traced| traced.result)
    }

    /// Solve and keep the full pivot trajectory.
    pub fn solve_traced(
        &self,
        program: &LinearProgram,
        method: Method,
    ) -> Result<TracedSolve, SolveError> {
        debug!(
            "solving {} variables, {} constraints with {method}",
            program.num_variables(),
            program.num_constraints()
        );

        let mut steps = Vec::new();
        let result = match method {
            Method::Simplex => self.simplex(program, &mut steps)?,
            Method::BigM => self.big_m(program, &mut steps),
            Method::TwoPhase => self.two_phase(program, &mut steps),
            Method::Dual => {
                let dual = dual::construct(program)?;
                self.two_phase(&dual, &mut steps)
            }
        };

        debug!("finished with {:?} after {} pivots", result.status, result.iterations);
        Ok(TracedSolve { result, steps })
    }

    /// Penalty placed on every artificial column by the Big-M method.
    pub fn big_m_penalty(&self, program: &LinearProgram) -> f64 {
        let largest = program.objective().iter().fold(1.0_f64, |acc, c| acc.max(c.abs()));
        self.big_m_factor.max(MIN_BIG_M_FACTOR) * largest
    }

    fn engine(&self) -> PivotEngine {
        PivotEngine::new(self.tolerance, self.max_iterations)
    }

    fn simplex(
        &self,
        program: &LinearProgram,
        steps: &mut Vec<PivotStep>,
    ) -> Result<SolverResult, SolveError> {
        if let Some(i) = program
            .constraints()
            .iter()
            .position(|c| c.sign != ConstraintSign::Le || c.rhs < 0.0)
        {
            return Err(SolveError::RequiresArtificialBasis(i));
        }

        let mut tableau = Tableau::build(program);
        tableau.canonicalize();
        let outcome = self.engine().run(&mut tableau, Phase::Main, steps);
        Ok(self.finish(&tableau, program, outcome, ArtificialPricing::Absent, steps.len()))
    }

    fn big_m(&self, program: &LinearProgram, steps: &mut Vec<PivotStep>) -> SolverResult {
        let m = self.big_m_penalty(program);
        debug!("big-M penalty {m}");

        let internal = program.internal_objective();
        let mut tableau = Tableau::build(program);
        tableau.set_objective(|column| match column {
            Column::Decision(j) => -internal[j],
            Column::Artificial(_) => m,
            _ => 0.0,
        });
        tableau.canonicalize();

        let outcome = self.engine().run(&mut tableau, Phase::Main, steps);
        if let Some(row) = self.positive_artificial(&tableau) {
            match outcome {
                PivotOutcome::Optimal => {
                    debug!("artificial in row {row} positive at the big-M optimum, infeasible");
                    return SolverResult::infeasible(steps.len());
                }
                PivotOutcome::Unbounded { column } => {
                    // A ray with an artificial still positive says nothing about
                    // the original program
                    debug!(
                        "column {column} unbounded with the artificial in row {row} positive, \
                         re-solving in two phases"
                    );
                    return self.two_phase(program, steps);
                }
                PivotOutcome::IterationLimit => {}
            }
        }
        self.finish(&tableau, program, outcome, ArtificialPricing::Cost(m), steps.len())
    }

    /// Phase one minimizes the sum of artificials; phase two restores the
    /// objective on the feasible basis. Artificial columns stay in the tableau
    /// for phase two at cost 0 so equality rows can still be priced, but they
    /// are barred from re-entering.
    fn two_phase(&self, program: &LinearProgram, steps: &mut Vec<PivotStep>) -> SolverResult {
        let mut tableau = Tableau::build(program);

        if tableau.catalog().has_artificial() {
            if let Err(result) = self.feasibility_pass(&mut tableau, steps) {
                return result;
            }

            let internal = program.internal_objective();
            tableau.set_objective(|column| match column {
                Column::Decision(j) => -internal[j],
                _ => 0.0,
            });
            tableau.canonicalize();
        }

        let outcome = self
            .engine()
            .barring_artificials()
            .run(&mut tableau, Phase::Main, steps);
        self.finish(&tableau, program, outcome, ArtificialPricing::Cost(0.0), steps.len())
    }

    /// Drives the sum of artificials to zero and pivots the zero-level ones
    /// out of the basis. `Err` holds the final result when the program has no
    /// feasible point or the iteration cap is hit.
    fn feasibility_pass(
        &self,
        tableau: &mut Tableau,
        steps: &mut Vec<PivotStep>,
    ) -> Result<(), SolverResult> {
        tableau.set_objective(|column| if column.is_artificial() { 1.0 } else { 0.0 });
        tableau.canonicalize();

        match self.engine().run(tableau, Phase::Feasibility, steps) {
            PivotOutcome::Optimal => {}
            PivotOutcome::IterationLimit => return Err(SolverResult::iteration_limit(steps.len())),
            PivotOutcome::Unbounded { column } => {
                // The feasibility objective is bounded by zero
                warn!("feasibility pass reported column {column} unbounded");
                return Err(SolverResult::infeasible(steps.len()));
            }
        }

        let infeasibility = tableau.objective_value().abs();
        if infeasibility > self.tolerance {
            debug!("sum of artificials is {infeasibility} after the feasibility pass, infeasible");
            return Err(SolverResult::infeasible(steps.len()));
        }

        self.drive_out_artificials(tableau, steps);
        Ok(())
    }

    /// Pivots every zero-level basic artificial out on a non-artificial column.
    ///
    /// A row with no usable entry is redundant: its artificial stays basic at
    /// zero, and since the row is zero outside the artificial columns no later
    /// pivot can move it.
    fn drive_out_artificials(&self, tableau: &mut Tableau, steps: &mut Vec<PivotStep>) {
        for r in 0..tableau.num_rows() {
            let leaving = tableau.basis()[r];
            if !tableau.catalog().get(leaving).is_artificial() {
                continue;
            }
            let entering = (0..tableau.catalog().len()).find(|&j| {
                !tableau.catalog().get(j).is_artificial()
                    && tableau.entry(r, j).abs() > self.tolerance
            });
            match entering {
                Some(col) => {
                    debug!("driving artificial column {leaving} out of row {r} for column {col}");
                    pivot(tableau, r, col);
                    steps.push(PivotStep {
                        phase: Phase::Feasibility,
                        row: r,
                        entering: col,
                        leaving,
                        ratio: 0.0,
                    });
                }
                None => debug!("row {r} is redundant, its artificial stays basic at zero"),
            }
        }
    }

    /// Row holding a basic artificial at a value above tolerance.
    fn positive_artificial(&self, tableau: &Tableau) -> Option<usize> {
        (0..tableau.num_rows()).find(|&r| {
            tableau.catalog().get(tableau.basis()[r]).is_artificial()
                && tableau.rhs(r) > self.tolerance
        })
    }

    fn finish(
        &self,
        tableau: &Tableau,
        program: &LinearProgram,
        outcome: PivotOutcome,
        pricing: ArtificialPricing,
        iterations: usize,
    ) -> SolverResult {
        let status = match outcome {
            PivotOutcome::Optimal => Status::Optimal,
            PivotOutcome::Unbounded { .. } => {
                return SolverResult::unbounded(program.sense(), iterations);
            }
            PivotOutcome::IterationLimit => Status::IterationLimitExceeded,
        };
        extract(tableau, program, pricing, status, iterations, self.tolerance)
    }
}
