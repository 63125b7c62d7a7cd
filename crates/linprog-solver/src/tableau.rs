use crate::problem::{ConstraintSign, LinearProgram};

/// What a tableau column stands for.
///
/// The `usize` in each auxiliary variant is the index of the constraint that
/// owns the column, so no name parsing is needed to recover column semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Decision(usize),
    Slack(usize),
    Surplus(usize),
    Artificial(usize),
}

impl Column {
    pub fn is_artificial(self) -> bool {
        matches!(self, Column::Artificial(_))
    }
}

/// Column descriptors in tableau order, excluding the RHS column.
///
/// Decision columns come first, then slacks, surpluses and artificials, each
/// group in constraint order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnCatalog {
    columns: Vec<Column>,
}

impl ColumnCatalog {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Column {
        self.columns[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|&c| c == column)
    }

    pub fn has_artificial(&self) -> bool {
        self.columns.iter().any(|c| c.is_artificial())
    }

    fn push(&mut self, column: Column) {
        self.columns.push(column);
    }
}

/// Dense simplex tableau: one row per constraint, then the objective row.
///
/// The last column holds the right-hand side. The objective row stores
/// `z_j - c_j` for the internal maximization problem, so a negative entry means
/// the column can still improve the objective.
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    pub(crate) data: Vec<Vec<f64>>,
    /// BasisMap: `basis[r]` is the column basic in row `r`
    pub(crate) basis: Vec<usize>,
    pub(crate) catalog: ColumnCatalog,
    /// Per constraint: was the row negated to make its RHS non-negative
    pub(crate) flipped: Vec<bool>,
}

impl Tableau {
    /// Tableau Builder: augments every constraint with its slack, surplus or
    /// artificial column and picks the initial basis.
    ///
    /// Rows with a negative right-hand side are negated first (`<=` and `>=`
    /// swap). The objective row holds the negated internal objective; artificial
    /// columns start at 0 and are priced by the caller.
    pub fn build(program: &LinearProgram) -> Self {
        let n = program.num_variables();
        let m = program.num_constraints();

        let mut flipped = Vec::with_capacity(m);
        let mut signs = Vec::with_capacity(m);
        for c in program.constraints() {
            let flip = c.rhs < 0.0;
            flipped.push(flip);
            signs.push(match (c.sign, flip) {
                (ConstraintSign::Le, true) => ConstraintSign::Ge,
                (ConstraintSign::Ge, true) => ConstraintSign::Le,
                (sign, _) => sign,
            });
        }

        let mut catalog = ColumnCatalog::default();
        for j in 0..n {
            catalog.push(Column::Decision(j));
        }
        for (i, sign) in signs.iter().enumerate() {
            if *sign == ConstraintSign::Le {
                catalog.push(Column::Slack(i));
            }
        }
        for (i, sign) in signs.iter().enumerate() {
            if *sign == ConstraintSign::Ge {
                catalog.push(Column::Surplus(i));
            }
        }
        for (i, sign) in signs.iter().enumerate() {
            if *sign != ConstraintSign::Le {
                catalog.push(Column::Artificial(i));
            }
        }

        let width = catalog.len() + 1;
        let mut data = vec![vec![0.0; width]; m + 1];
        let mut basis = Vec::with_capacity(m);

        for (i, c) in program.constraints().iter().enumerate() {
            let scale = if flipped[i] { -1.0 } else { 1.0 };
            for (j, &a) in c.coefficients.iter().enumerate() {
                data[i][j] = scale * a;
            }
            data[i][width - 1] = scale * c.rhs;

            // Positions exist by construction of the catalog above
            let basic = match signs[i] {
                ConstraintSign::Le => {
                    let s = catalog.position(Column::Slack(i)).unwrap_or_default();
                    data[i][s] = 1.0;
                    s
                }
                ConstraintSign::Ge => {
                    let s = catalog.position(Column::Surplus(i)).unwrap_or_default();
                    data[i][s] = -1.0;
                    let a = catalog.position(Column::Artificial(i)).unwrap_or_default();
                    data[i][a] = 1.0;
                    a
                }
                ConstraintSign::Eq => {
                    let a = catalog.position(Column::Artificial(i)).unwrap_or_default();
                    data[i][a] = 1.0;
                    a
                }
            };
            basis.push(basic);
        }

        let mut tableau = Self {
            data,
            basis,
            catalog,
            flipped,
        };
        let internal = program.internal_objective();
        tableau.set_objective(|column| match column {
            Column::Decision(j) => -internal[j],
            _ => 0.0,
        });
        tableau
    }

    /// Overwrites the objective row with `entry(column)` and a zero RHS.
    ///
    /// The row is generally not canonical afterwards; call [`Tableau::canonicalize`].
    pub fn set_objective<F: Fn(Column) -> f64>(&mut self, entry: F) {
        let obj = self.num_rows();
        for (j, column) in self.catalog.columns.iter().enumerate() {
            self.data[obj][j] = entry(*column);
        }
        let rhs = self.rhs_col();
        self.data[obj][rhs] = 0.0;
    }

    /// Canonicalizer: eliminates every basic column from the objective row so
    /// the row holds reduced costs relative to the current basis.
    ///
    /// Assumes each basic column already reads 1 in its own row and 0 in the
    /// other constraint rows.
    pub fn canonicalize(&mut self) {
        let obj = self.num_rows();
        for r in 0..self.num_rows() {
            let factor = self.data[obj][self.basis[r]];
            if factor != 0.0 {
                let (rows, objective) = self.data.split_at_mut(obj);
                for (o, a) in objective[0].iter_mut().zip(&rows[r]) {
                    *o -= factor * a;
                }
            }
        }
    }

    /// Number of constraint rows (the objective row excluded).
    pub fn num_rows(&self) -> usize {
        self.data.len() - 1
    }

    /// Index of the RHS column.
    pub fn rhs_col(&self) -> usize {
        self.catalog.len()
    }

    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.data[row][self.rhs_col()]
    }

    pub fn objective_row(&self) -> &[f64] {
        &self.data[self.num_rows()]
    }

    /// RHS of the objective row: the internal (maximized) objective value.
    pub fn objective_value(&self) -> f64 {
        self.data[self.num_rows()][self.rhs_col()]
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }

    pub fn is_flipped(&self, constraint: usize) -> bool {
        self.flipped[constraint]
    }

    /// Row in which `col` is basic.
    pub fn basic_row(&self, col: usize) -> Option<usize> {
        self.basis.iter().position(|&b| b == col)
    }

    /// Current value of the variable behind `col`.
    pub fn value(&self, col: usize) -> f64 {
        self.basic_row(col).map_or(0.0, |r| self.rhs(r))
    }

    /// True when every basic column is a unit vector with a zero objective entry.
    pub fn is_canonical(&self, tolerance: f64) -> bool {
        self.basis.iter().enumerate().all(|(r, &col)| {
            (0..self.data.len()).all(|i| {
                let expected = if i == r { 1.0 } else { 0.0 };
                (self.data[i][col] - expected).abs() <= tolerance
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Constraint, Sense};

    fn mixed() -> LinearProgram {
        LinearProgram::new(
            Sense::Minimize,
            vec![2.0, 3.0],
            vec![
                Constraint::ge(vec![1.0, 1.0], 4.0),
                Constraint::le(vec![1.0, 0.0], 3.0),
                Constraint::eq(vec![0.0, 1.0], 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_catalog_order() {
        let t = Tableau::build(&mixed());
        let columns: Vec<Column> = t.catalog().iter().collect();
        assert_eq!(
            columns,
            vec![
                Column::Decision(0),
                Column::Decision(1),
                Column::Slack(1),
                Column::Surplus(0),
                Column::Artificial(0),
                Column::Artificial(2),
            ]
        );
        assert_eq!(t.data[0].len(), t.catalog().len() + 1);
        assert_eq!(t.data.len(), 4);
    }

    #[test]
    fn test_augmentation_coefficients() {
        let t = Tableau::build(&mixed());
        // >= row: surplus -1, artificial +1, artificial basic
        assert_eq!(t.entry(0, 3), -1.0);
        assert_eq!(t.entry(0, 4), 1.0);
        assert_eq!(t.basis()[0], 4);
        // <= row: slack +1, slack basic
        assert_eq!(t.entry(1, 2), 1.0);
        assert_eq!(t.basis()[1], 2);
        // = row: artificial +1 only
        assert_eq!(t.entry(2, 5), 1.0);
        assert_eq!(t.entry(2, 3), 0.0);
        assert_eq!(t.basis()[2], 5);
        // minimize 2x + 3y becomes maximize -2x - 3y, row holds the negation
        assert_eq!(t.objective_row(), &[2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_negative_rhs_is_flipped() {
        let lp = LinearProgram::new(
            Sense::Maximize,
            vec![1.0],
            vec![Constraint::le(vec![-1.0], -2.0)],
        )
        .unwrap();
        let t = Tableau::build(&lp);
        assert!(t.is_flipped(0));
        assert_eq!(t.entry(0, 0), 1.0);
        assert_eq!(t.rhs(0), 2.0);
        assert_eq!(t.catalog().get(1), Column::Surplus(0));
        assert_eq!(t.catalog().get(2), Column::Artificial(0));
    }

    #[test]
    fn test_canonicalize_clears_basic_columns() {
        let mut t = Tableau::build(&mixed());
        t.set_objective(|c| if c.is_artificial() { 1.0 } else { 0.0 });
        assert!(!t.is_canonical(1e-12));
        t.canonicalize();
        assert!(t.is_canonical(1e-12));
        // -(row 0 + row 2) over the non-artificial columns
        assert_eq!(t.objective_row(), &[-1.0, -2.0, 0.0, 1.0, 0.0, 0.0, -5.0]);
    }

    #[test]
    fn test_slack_tableau_already_canonical() {
        let lp = LinearProgram::new(
            Sense::Maximize,
            vec![3.0, 5.0],
            vec![Constraint::le(vec![1.0, 0.0], 4.0)],
        )
        .unwrap();
        let mut t = Tableau::build(&lp);
        let before = t.clone();
        t.canonicalize();
        assert_eq!(t, before);
        assert!(t.is_canonical(0.0));
    }
}
