use std::collections::BTreeMap;

use crate::problem::Sense;

/// Terminal state of a solve. Every variant is a normal result, not an error.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// An optimal solution was found
    Optimal,
    /// No assignment satisfies every constraint
    Infeasible,
    /// The objective improves without bound
    Unbounded,
    /// The pivot cap was hit before any of the above was proven
    IterationLimitExceeded,
}

/// The result of solving a linear program
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    pub status: Status,
    /// Objective in the caller's sense. NaN when infeasible, infinite when unbounded.
    ///
    /// JSON has no NaN or infinity, so those serialize as `null`, which reads
    /// back as NaN.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "nan_when_null"))]
    pub objective_value: f64,
    /// Value per decision variable name
    pub variable_values: BTreeMap<String, f64>,
    /// Objective-row entry per decision variable (0 for basic variables)
    pub reduced_costs: BTreeMap<String, f64>,
    /// Change in the objective per unit increase of each constraint's RHS
    pub dual_prices: BTreeMap<usize, f64>,
    /// Constraints that hold with equality at the reported point
    #[cfg_attr(feature = "serde", serde(default))]
    pub binding_constraints: Vec<usize>,
    /// Pivots performed across all phases
    pub iterations: usize,
}

impl SolverResult {
    pub fn infeasible(iterations: usize) -> Self {
        Self::empty(Status::Infeasible, f64::NAN, iterations)
    }

    pub fn unbounded(sense: Sense, iterations: usize) -> Self {
        let objective_value = match sense {
            Sense::Maximize => f64::INFINITY,
            Sense::Minimize => f64::NEG_INFINITY,
        };
        Self::empty(Status::Unbounded, objective_value, iterations)
    }

    /// Iteration cap hit before a usable objective row existed (two-phase
    /// feasibility pass).
    pub fn iteration_limit(iterations: usize) -> Self {
        Self::empty(Status::IterationLimitExceeded, f64::NAN, iterations)
    }

    fn empty(status: Status, objective_value: f64, iterations: usize) -> Self {
        Self {
            status,
            objective_value,
            variable_values: BTreeMap::new(),
            reduced_costs: BTreeMap::new(),
            dual_prices: BTreeMap::new(),
            binding_constraints: Vec::new(),
            iterations,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == Status::Optimal
    }

    /// Value of a decision variable, 0 when absent.
    pub fn value(&self, name: &str) -> f64 {
        self.variable_values.get(name).copied().unwrap_or(0.0)
    }

    /// Variable values in the order of `names`.
    pub fn values_in_order<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Vec<f64> {
        names.into_iter().map(|n| self.value(n)).collect()
    }
}

#[cfg(feature = "serde")]
fn nan_when_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_direction_follows_sense() {
        let max = SolverResult::unbounded(Sense::Maximize, 3);
        assert_eq!(max.objective_value, f64::INFINITY);
        let min = SolverResult::unbounded(Sense::Minimize, 3);
        assert_eq!(min.objective_value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_infeasible_has_no_values() {
        let result = SolverResult::infeasible(7);
        assert_eq!(result.status, Status::Infeasible);
        assert!(result.objective_value.is_nan());
        assert!(result.variable_values.is_empty());
        assert_eq!(result.iterations, 7);
        assert_eq!(result.value("x1"), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_status_serializes_by_name() {
        let json = serde_json::to_string(&Status::IterationLimitExceeded).unwrap();
        assert_eq!(json, "\"IterationLimitExceeded\"");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_non_optimal_results_read_back() {
        for original in [SolverResult::infeasible(4), SolverResult::unbounded(Sense::Minimize, 2)] {
            let json = serde_json::to_string(&original).unwrap();
            assert!(json.contains("\"objective_value\":null"), "{json}");
            let back: SolverResult = serde_json::from_str(&json).unwrap();
            assert_eq!(back.status, original.status);
            assert_eq!(back.iterations, original.iterations);
            assert!(back.objective_value.is_nan());
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_optimal_objective_reads_back() {
        let json = r#"{"status":"Optimal","objective_value":36.0,"variable_values":{"x1":2.0},
            "reduced_costs":{"x1":0.0},"dual_prices":{"0":1.5},"iterations":2}"#;
        let result: SolverResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.objective_value, 36.0);
        assert_eq!(result.dual_prices[&0], 1.5);
        assert!(result.binding_constraints.is_empty());
    }
}
