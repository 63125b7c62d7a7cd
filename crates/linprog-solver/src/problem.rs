use crate::error::SolveError;
use crate::normalize;

/// A validated linear program. Built once, never mutated.
///
/// All decision variables are implicitly non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    variables: Vec<String>,
    objective: Vec<f64>,
    constraints: Vec<Constraint>,
    sense: Sense,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Relation between the left-hand side and `rhs`
    pub sign: ConstraintSign,
    /// Right-hand side value
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSign {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

/// Which tableau procedure drives the solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Slack starting basis only; every constraint must be `<=` with `rhs >= 0`
    #[default]
    Simplex,
    /// Artificials penalised in the objective row
    BigM,
    /// Feasibility pass over the artificials, then the real objective
    TwoPhase,
    /// Solve the dual of a max/`<=` problem
    Dual,
}

impl Constraint {
    pub fn new(coefficients: Vec<f64>, sign: ConstraintSign, rhs: f64) -> Self {
        Self {
            coefficients,
            sign,
            rhs,
        }
    }

    pub fn le(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(coefficients, ConstraintSign::Le, rhs)
    }

    pub fn ge(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(coefficients, ConstraintSign::Ge, rhs)
    }

    pub fn eq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(coefficients, ConstraintSign::Eq, rhs)
    }

    /// Left-hand side evaluated at `values`.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(a, x)| a * x)
            .sum()
    }
}

impl LinearProgram {
    /// Validates and builds a program with default variable names `x1..xn`.
    pub fn new(
        sense: Sense,
        objective: Vec<f64>,
        constraints: Vec<Constraint>,
    ) -> Result<Self, SolveError> {
        let variables = default_names("x", objective.len());
        Self::with_variables(sense, objective, constraints, variables)
    }

    pub fn with_variables(
        sense: Sense,
        objective: Vec<f64>,
        constraints: Vec<Constraint>,
        variables: Vec<String>,
    ) -> Result<Self, SolveError> {
        normalize::validate(&objective, &constraints, &variables)?;
        Ok(Self {
            variables,
            objective,
            constraints,
            sense,
        })
    }

    /// Copy of this program with one objective coefficient replaced.
    pub fn with_objective_coefficient(&self, index: usize, value: f64) -> Self {
        let mut objective = self.objective.clone();
        objective[index] = value;
        Self {
            objective,
            ..self.clone()
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective coefficients of the equivalent maximization problem.
    pub(crate) fn internal_objective(&self) -> Vec<f64> {
        match self.sense {
            Sense::Maximize => self.objective.clone(),
            Sense::Minimize => self.objective.iter().map(|c| -c).collect(),
        }
    }

    /// Objective value of `values` in the caller's sense.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }
}

pub(crate) fn default_names(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}{i}")).collect()
}
