use log::{debug, warn};

use crate::tableau::Tableau;

/// Consecutive zero-ratio pivots tolerated before switching to the
/// smallest-index rule for the rest of the run.
const DEGENERATE_STREAK_LIMIT: usize = 12;

/// Which solve pass a pivot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Single pass of plain simplex or Big-M, or phase two of two-phase
    Main,
    /// Feasibility pass of two-phase, including driving out basic artificials
    Feasibility,
}

/// One basis change, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotStep {
    pub phase: Phase,
    pub row: usize,
    pub entering: usize,
    pub leaving: usize,
    pub ratio: f64,
}

/// How a pivot run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotOutcome {
    Optimal,
    /// The entering column has no positive entry
    Unbounded { column: usize },
    IterationLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// Most negative reduced cost, lowest index on ties
    Dantzig,
    /// Smallest eligible index; leaving ties go to the smallest basic column
    Bland,
}

/// Pivot Engine: repeated optimality test, column and row selection and
/// Gauss-Jordan elimination on a canonical tableau.
#[derive(Debug, Clone, Copy)]
pub struct PivotEngine {
    pub(crate) tolerance: f64,
    pub(crate) max_iterations: usize,
    /// Artificial columns may never enter the basis
    bar_artificials: bool,
}

impl PivotEngine {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            bar_artificials: false,
        }
    }

    /// Keeps artificial columns out of the basis. Used once feasibility is
    /// established, when artificials stay in the tableau only to be priced.
    pub fn barring_artificials(mut self) -> Self {
        self.bar_artificials = true;
        self
    }

    /// Pivots until optimal, unbounded, or `trace` holds `max_iterations` steps.
    ///
    /// The cap counts every step already in `trace`, so it bounds the whole solve
    /// rather than a single phase.
    pub fn run(
        &self,
        tableau: &mut Tableau,
        phase: Phase,
        trace: &mut Vec<PivotStep>,
    ) -> PivotOutcome {
        let mut rule = Rule::Dantzig;
        let mut degenerate_streak = 0;

        loop {
            let Some(col) = self.entering_column(tableau, rule) else {
                debug!(
                    "{phase:?}: optimal after {} pivots, value {}",
                    trace.len(),
                    tableau.objective_value()
                );
                return PivotOutcome::Optimal;
            };
            let Some((row, ratio)) = self.leaving_row(tableau, col, rule) else {
                debug!("{phase:?}: column {col} has no positive entry, unbounded");
                return PivotOutcome::Unbounded { column: col };
            };

            if trace.len() >= self.max_iterations {
                warn!("{phase:?}: iteration limit of {} reached", self.max_iterations);
                return PivotOutcome::IterationLimit;
            }

            if ratio.abs() <= self.tolerance {
                degenerate_streak += 1;
                if rule == Rule::Dantzig && degenerate_streak >= DEGENERATE_STREAK_LIMIT {
                    warn!(
                        "{phase:?}: {degenerate_streak} degenerate pivots in a row, \
                         switching to smallest-index rule"
                    );
                    rule = Rule::Bland;
                }
            } else {
                degenerate_streak = 0;
            }

            let leaving = tableau.basis[row];
            debug!(
                "{phase:?}: pivot row {row}, column {col} enters, column {leaving} leaves, \
                 ratio {ratio}"
            );
            pivot(tableau, row, col);
            trace.push(PivotStep {
                phase,
                row,
                entering: col,
                leaving,
                ratio,
            });
        }
    }

    /// Optimality test and entering column choice in one pass.
    ///
    /// Returns `None` when every objective-row entry is at least `-tolerance`.
    fn entering_column(&self, tableau: &Tableau, rule: Rule) -> Option<usize> {
        let costs = &tableau.objective_row()[..tableau.rhs_col()];
        let eligible =
            |j: usize| !(self.bar_artificials && tableau.catalog().get(j).is_artificial());
        match rule {
            Rule::Dantzig => {
                let mut best = -self.tolerance;
                let mut best_col = None;
                for (j, &cost) in costs.iter().enumerate() {
                    if cost < best && eligible(j) {
                        best = cost;
                        best_col = Some(j);
                    }
                }
                best_col
            }
            Rule::Bland => (0..costs.len()).find(|&j| costs[j] < -self.tolerance && eligible(j)),
        }
    }

    /// Minimum-ratio test over rows whose entry in `col` exceeds the tolerance.
    fn leaving_row(&self, tableau: &Tableau, col: usize, rule: Rule) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for r in 0..tableau.num_rows() {
            let entry = tableau.entry(r, col);
            if entry <= self.tolerance {
                continue;
            }
            let ratio = tableau.rhs(r) / entry;
            best = match best {
                None => Some((r, ratio)),
                Some((_, best_ratio)) if ratio < best_ratio - self.tolerance => Some((r, ratio)),
                Some((best_row, best_ratio))
                    if rule == Rule::Bland
                        && (ratio - best_ratio).abs() <= self.tolerance
                        && tableau.basis[r] < tableau.basis[best_row] =>
                {
                    Some((r, ratio))
                }
                keep => keep,
            };
        }
        best
    }
}

/// Makes `col` basic in `row`: scale the row to a unit pivot, then eliminate
/// `col` from every other row including the objective row.
pub(crate) fn pivot(tableau: &mut Tableau, row: usize, col: usize) {
    tableau.basis[row] = col;

    let pivot_val = tableau.data[row][col];
    for v in tableau.data[row].iter_mut() {
        *v /= pivot_val;
    }
    tableau.data[row][col] = 1.0;

    let pivot_row = tableau.data[row].clone();
    for (i, data_row) in tableau.data.iter_mut().enumerate() {
        if i == row {
            continue;
        }
        let factor = data_row[col];
        if factor != 0.0 {
            for (v, p) in data_row.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
            data_row[col] = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Constraint, LinearProgram, Sense};
    use crate::tableau::Column;

    fn engine() -> PivotEngine {
        PivotEngine::new(1e-9, 1000)
    }

    fn classic() -> LinearProgram {
        // Maximize 3x1 + 5x2 s.t. x1 <= 4, 2x2 <= 12, 3x1 + 2x2 <= 18
        LinearProgram::new(
            Sense::Maximize,
            vec![3.0, 5.0],
            vec![
                Constraint::le(vec![1.0, 0.0], 4.0),
                Constraint::le(vec![0.0, 2.0], 12.0),
                Constraint::le(vec![3.0, 2.0], 18.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_run_to_optimum() {
        let mut t = Tableau::build(&classic());
        let mut trace = Vec::new();
        let outcome = engine().run(&mut t, Phase::Main, &mut trace);

        assert_eq!(outcome, PivotOutcome::Optimal);
        assert!((t.objective_value() - 36.0).abs() < 1e-9);
        assert!(t.is_canonical(1e-9));
        assert!((t.value(0) - 2.0).abs() < 1e-9);
        assert!((t.value(1) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_dantzig_entering_and_ratio_choice() {
        let mut t = Tableau::build(&classic());
        let mut trace = Vec::new();
        engine().run(&mut t, Phase::Main, &mut trace);

        // x2 has the most negative entry (-5); row 1 wins the ratio test (12/2)
        assert_eq!(trace[0].entering, 1);
        assert_eq!(trace[0].row, 1);
        assert_eq!(trace[0].leaving, 3);
        assert!((trace[0].ratio - 6.0).abs() < 1e-12);
        assert_eq!(trace.len(), 2);
    }

    #[test]
    fn test_ratio_tie_takes_lowest_row() {
        // Both rows allow x1 = 2
        let lp = LinearProgram::new(
            Sense::Maximize,
            vec![1.0],
            vec![Constraint::le(vec![2.0], 4.0), Constraint::le(vec![1.0], 2.0)],
        )
        .unwrap();
        let mut t = Tableau::build(&lp);
        let mut trace = Vec::new();
        let outcome = engine().run(&mut t, Phase::Main, &mut trace);

        assert_eq!(outcome, PivotOutcome::Optimal);
        assert_eq!(trace[0].row, 0);
        assert!((t.objective_value() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_unbounded_column_reported() {
        // Maximize x1 + x2 s.t. x1 - x2 <= 1
        let lp = LinearProgram::new(
            Sense::Maximize,
            vec![1.0, 1.0],
            vec![Constraint::le(vec![1.0, -1.0], 1.0)],
        )
        .unwrap();
        let mut t = Tableau::build(&lp);
        let outcome = engine().run(&mut t, Phase::Main, &mut Vec::new());
        assert!(matches!(outcome, PivotOutcome::Unbounded { .. }));
    }

    #[test]
    fn test_iteration_limit_is_its_own_outcome() {
        let mut t = Tableau::build(&classic());
        let mut trace = Vec::new();
        let outcome = PivotEngine::new(1e-9, 1).run(&mut t, Phase::Main, &mut trace);
        assert_eq!(outcome, PivotOutcome::IterationLimit);
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_near_zero_entries_are_not_pivots() {
        let lp = LinearProgram::new(
            Sense::Maximize,
            vec![1.0],
            vec![Constraint::le(vec![1e-12], 1.0)],
        )
        .unwrap();
        let mut t = Tableau::build(&lp);
        let outcome = engine().run(&mut t, Phase::Main, &mut Vec::new());
        assert_eq!(outcome, PivotOutcome::Unbounded { column: 0 });
    }

    #[test]
    fn test_barred_artificials_never_enter() {
        // x1 = 2: the artificial column holds the most negative entry
        let lp = LinearProgram::new(
            Sense::Maximize,
            vec![1.0],
            vec![Constraint::eq(vec![1.0], 2.0)],
        )
        .unwrap();
        let mut t = Tableau::build(&lp);
        t.set_objective(|c| if c.is_artificial() { -5.0 } else { -1.0 });
        assert_eq!(t.catalog().get(1), Column::Artificial(0));

        assert_eq!(engine().entering_column(&t, Rule::Dantzig), Some(1));
        let barred = engine().barring_artificials();
        assert_eq!(barred.entering_column(&t, Rule::Dantzig), Some(0));
        assert_eq!(barred.entering_column(&t, Rule::Bland), Some(0));

        t.set_objective(|c| if c.is_artificial() { -5.0 } else { 0.0 });
        let outcome = barred.run(&mut t, Phase::Main, &mut Vec::new());
        assert_eq!(outcome, PivotOutcome::Optimal);
        assert_eq!(t.basis()[0], 1);
    }

    #[test]
    fn test_pivot_keeps_basis_unit_columns() {
        let mut t = Tableau::build(&classic());
        pivot(&mut t, 2, 0);
        assert_eq!(t.basis()[2], 0);
        assert!(t.is_canonical(1e-12));
        assert!((t.rhs(2) - 6.0).abs() < 1e-12);
    }
}
