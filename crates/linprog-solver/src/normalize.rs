//! Turns the loosely-typed request shape into a validated [`LinearProgram`].
//!
//! Right-hand-side signs are left as given. Each solve method decides how to
//! orient rows with a negative right-hand side.

use std::fmt;
use std::str::FromStr;

use crate::error::SolveError;
use crate::problem::{default_names, Constraint, ConstraintSign, LinearProgram, Method, Sense};

/// Problem description exactly as it arrives from a caller.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RawProblem {
    pub objective: Vec<f64>,
    pub constraints: Vec<RawConstraint>,
    pub sense: String,
    #[cfg_attr(feature = "serde", serde(default = "default_method"))]
    pub method: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub variable_names: Option<Vec<String>>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RawConstraint {
    pub coeffs: Vec<f64>,
    pub sign: String,
    pub rhs: f64,
}

#[cfg(feature = "serde")]
fn default_method() -> String {
    Method::Simplex.to_string()
}

/// Validates `raw` and returns the program together with the requested method.
pub fn normalize(raw: &RawProblem) -> Result<(LinearProgram, Method), SolveError> {
    let sense: Sense = raw.sense.parse()?;
    let method: Method = raw.method.parse()?;

    let constraints = raw
        .constraints
        .iter()
        .map(|c| Ok(Constraint::new(c.coeffs.clone(), c.sign.parse()?, c.rhs)))
        .collect::<Result<Vec<_>, SolveError>>()?;

    let variables = raw
        .variable_names
        .clone()
        .unwrap_or_else(|| default_names("x", raw.objective.len()));

    let program =
        LinearProgram::with_variables(sense, raw.objective.clone(), constraints, variables)?;
    Ok((program, method))
}

/// Shape checks shared by every constructor of [`LinearProgram`].
pub(crate) fn validate(
    objective: &[f64],
    constraints: &[Constraint],
    variables: &[String],
) -> Result<(), SolveError> {
    let n = objective.len();
    if n == 0 {
        return Err(SolveError::EmptyObjective);
    }
    if variables.len() != n {
        return Err(SolveError::VariableNameCount {
            expected: n,
            found: variables.len(),
        });
    }
    if objective.iter().any(|c| !c.is_finite()) {
        return Err(SolveError::NonFiniteCoefficient("objective".to_string()));
    }

    for (i, c) in constraints.iter().enumerate() {
        if c.coefficients.len() != n {
            return Err(SolveError::DimensionMismatch {
                constraint: i,
                expected: n,
                found: c.coefficients.len(),
            });
        }
        if !c.rhs.is_finite() || c.coefficients.iter().any(|a| !a.is_finite()) {
            return Err(SolveError::NonFiniteCoefficient(format!("constraint {i}")));
        }
    }

    Ok(())
}

impl From<&LinearProgram> for RawProblem {
    fn from(program: &LinearProgram) -> Self {
        Self {
            objective: program.objective().to_vec(),
            constraints: program
                .constraints()
                .iter()
                .map(|c| RawConstraint {
                    coeffs: c.coefficients.clone(),
                    sign: c.sign.to_string(),
                    rhs: c.rhs,
                })
                .collect(),
            sense: program.sense().to_string(),
            method: Method::Simplex.to_string(),
            variable_names: Some(program.variables().to_vec()),
        }
    }
}

impl FromStr for ConstraintSign {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<=" | "≤" => Ok(ConstraintSign::Le),
            ">=" | "≥" => Ok(ConstraintSign::Ge),
            "=" | "==" => Ok(ConstraintSign::Eq),
            other => Err(SolveError::UnsupportedConstraintSign(other.to_string())),
        }
    }
}

impl FromStr for Sense {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximize" => Ok(Sense::Maximize),
            "min" | "minimize" => Ok(Sense::Minimize),
            _ => Err(SolveError::UnsupportedSense(s.to_string())),
        }
    }
}

impl FromStr for Method {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simplex" => Ok(Method::Simplex),
            "big_m" | "m_big" => Ok(Method::BigM),
            "two_phase" => Ok(Method::TwoPhase),
            "dual" => Ok(Method::Dual),
            _ => Err(SolveError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for ConstraintSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintSign::Le => "<=",
            ConstraintSign::Ge => ">=",
            ConstraintSign::Eq => "=",
        })
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::Maximize => "max",
            Sense::Minimize => "min",
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Simplex => "simplex",
            Method::BigM => "big_m",
            Method::TwoPhase => "two_phase",
            Method::Dual => "dual",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(sign: &str, coeffs: Vec<f64>) -> RawProblem {
        RawProblem {
            objective: vec![3.0, 5.0],
            constraints: vec![RawConstraint {
                coeffs,
                sign: sign.to_string(),
                rhs: 4.0,
            }],
            sense: "max".to_string(),
            method: "m_big".to_string(),
            variable_names: None,
        }
    }

    #[test]
    fn test_normalize_valid() {
        let (program, method) = normalize(&raw(">=", vec![1.0, 1.0])).unwrap();
        assert_eq!(method, Method::BigM);
        assert_eq!(program.sense(), Sense::Maximize);
        assert_eq!(program.constraints()[0].sign, ConstraintSign::Ge);
        assert_eq!(program.variables(), &["x1", "x2"]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = normalize(&raw("<=", vec![1.0])).unwrap_err();
        assert_eq!(
            err,
            SolveError::DimensionMismatch {
                constraint: 0,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_unsupported_sign() {
        let err = normalize(&raw("<", vec![1.0, 1.0])).unwrap_err();
        assert!(matches!(err, SolveError::UnsupportedConstraintSign(s) if s == "<"));
    }

    #[test]
    fn test_negative_rhs_left_untouched() {
        let mut problem = raw("<=", vec![1.0, -1.0]);
        problem.constraints[0].rhs = -2.0;
        let (program, _) = normalize(&problem).unwrap();
        assert_eq!(program.constraints()[0].rhs, -2.0);
        assert_eq!(program.constraints()[0].coefficients, vec![1.0, -1.0]);
    }

    #[test]
    fn test_variable_name_count() {
        let mut problem = raw("<=", vec![1.0, 1.0]);
        problem.variable_names = Some(vec!["a".to_string()]);
        assert_eq!(
            normalize(&problem).unwrap_err(),
            SolveError::VariableNameCount { expected: 2, found: 1 }
        );
    }

    #[test]
    fn test_roundtrip_through_raw() {
        let (program, _) = normalize(&raw("=", vec![2.0, 1.0])).unwrap();
        let back = RawProblem::from(&program);
        assert_eq!(back.constraints[0].sign, "=");
        assert_eq!(back.sense, "max");
        let (again, _) = normalize(&back).unwrap();
        assert_eq!(again, program);
    }
}
