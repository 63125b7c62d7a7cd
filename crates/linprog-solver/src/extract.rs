//! Solution Extractor: reads a final tableau into a [`SolverResult`].
//!
//! Extraction is a pure function of its inputs; calling it twice on the same
//! tableau gives identical results.

use std::collections::BTreeMap;

use crate::problem::{LinearProgram, Sense};
use crate::solution::{SolverResult, Status};
use crate::tableau::{Column, Tableau};

/// How artificial columns were priced in the objective row, needed to read
/// equality-constraint dual prices back out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArtificialPricing {
    /// The tableau has no artificial columns
    Absent,
    /// Artificials carry this objective-row cost: `M` under Big-M, 0 in
    /// phase two of two-phase
    Cost(f64),
}

pub fn extract(
    tableau: &Tableau,
    program: &LinearProgram,
    pricing: ArtificialPricing,
    status: Status,
    iterations: usize,
    tolerance: f64,
) -> SolverResult {
    let clean = |v: f64| if v.abs() <= tolerance { 0.0 } else { v };
    let objective = tableau.objective_row();
    let catalog = tableau.catalog();

    let mut variable_values = BTreeMap::new();
    let mut reduced_costs = BTreeMap::new();
    for (j, name) in program.variables().iter().enumerate() {
        let Some(col) = catalog.position(Column::Decision(j)) else {
            continue;
        };
        variable_values.insert(name.clone(), clean(tableau.value(col)));
        reduced_costs.insert(name.clone(), clean(objective[col]));
    }

    let sense_sign = match program.sense() {
        Sense::Maximize => 1.0,
        Sense::Minimize => -1.0,
    };

    let mut dual_prices = BTreeMap::new();
    let mut binding_constraints = Vec::new();
    for r in 0..program.num_constraints() {
        let slack = catalog.position(Column::Slack(r));
        let surplus = catalog.position(Column::Surplus(r));
        let internal = match (slack, surplus, catalog.position(Column::Artificial(r)), pricing) {
            (Some(col), _, _, _) => objective[col],
            (None, Some(col), _, _) => -objective[col],
            (None, None, Some(col), ArtificialPricing::Cost(cost)) => objective[col] - cost,
            _ => 0.0,
        };
        let row_sign = if tableau.is_flipped(r) { -1.0 } else { 1.0 };
        // + 0.0 folds -0.0 into 0.0
        dual_prices.insert(r, clean(sense_sign * row_sign * internal) + 0.0);

        let binding = match slack.or(surplus) {
            Some(col) => tableau.value(col).abs() <= tolerance,
            None => true,
        };
        if binding {
            binding_constraints.push(r);
        }
    }

    SolverResult {
        status,
        objective_value: clean(sense_sign * tableau.objective_value()) + 0.0,
        variable_values,
        reduced_costs,
        dual_prices,
        binding_constraints,
        iterations,
    }
}
