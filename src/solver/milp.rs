//! [`Solver`] backed by `good_lp`.
//!
//! `good_lp` only accepts linear objectives, so products of binary variables
//! are replaced by an auxiliary `z` with `z <= a`, `z <= b`, `z >= a + b - 1`,
//! and `a * a` by `a`. Both are exact on `{0, 1}`. Products that involve a
//! continuous variable are rejected.

use good_lp::{
    Constraint as LpConstraint, Expression, ProblemVariables, ResolutionError,
    Solution as _, SolverModel, Variable, variable, variables,
};

use crate::{
    config::{Backend, ZoneConfig},
    model::{Program, Sense, VarKind},
    solver::{SolveError, Solution, Solver},
};

impl From<ResolutionError> for SolveError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::Infeasible => SolveError::Infeasible,
            ResolutionError::Unbounded => SolveError::Unbounded,
            other => SolveError::Failed(other.to_string()),
        }
    }
}

/// MILP engine selected by [`Backend`].
#[derive(Clone, Debug, Default)]
pub struct MilpSolver {
    backend: Backend,
    time_limit: Option<f64>,
}

/// A program translated into `good_lp` terms, not yet bound to an engine.
struct LpModel {
    vars: ProblemVariables,
    columns: Vec<Variable>,
    objective: Expression,
    constraints: Vec<LpConstraint>,
}

impl MilpSolver {
    pub fn new(backend: Backend) -> Self {
        Self { backend, time_limit: None }
    }

    /// Solver with the backend and time limit of `config`.
    pub fn from_config(config: &ZoneConfig) -> Self {
        Self::new(config.backend).with_time_limit(config.time_limit)
    }

    /// Stop the engine after `seconds`, if it supports a limit.
    pub fn with_time_limit(mut self, seconds: Option<f64>) -> Self {
        self.time_limit = seconds;
        self
    }

    #[inline] pub fn backend(&self) -> Backend { self.backend }

    fn translate(program: &Program) -> Result<LpModel, SolveError> {
        let mut vars = variables!();
        let columns = program.vars().iter().map(|def| {
            let column = match def.kind {
                VarKind::Binary => variable().binary(),
                VarKind::Continuous => {
                    let mut column = variable();
                    if def.lower.is_finite() { column = column.min(def.lower) }
                    if def.upper.is_finite() { column = column.max(def.upper) }
                    column
                }
            };
            vars.add(column.name(def.name.clone()))
        }).collect::<Vec<_>>();

        let mut constraints = program.constraints().iter().map(|c| {
            let mut expr = Expression::from(c.expr.constant());
            for &(v, coef) in c.expr.terms() { expr.add_mul(coef, columns[v.index()]) }
            match c.sense {
                Sense::LessEq => expr.leq(c.rhs),
                Sense::GreaterEq => expr.geq(c.rhs),
                Sense::Equal => expr.eq(c.rhs),
            }
        }).collect::<Vec<_>>();

        let objective = program.objective();
        let mut expr = Expression::from(objective.constant());
        for (v, coef) in objective.linear_terms() { expr.add_mul(coef, columns[v.index()]) }

        let mut products = 0;
        for (a, b, coef) in objective.quadratic_terms() {
            if coef == 0.0 { continue }
            let (da, db) = (program.var(a), program.var(b));
            if da.kind != VarKind::Binary || db.kind != VarKind::Binary {
                return Err(SolveError::Unsupported(format!("product {} * {} involves a continuous variable", da.name, db.name)));
            }
            let (ca, cb) = (columns[a.index()], columns[b.index()]);
            if a == b {
                expr.add_mul(coef, ca);
                continue;
            }

            let z = vars.add(variable().min(0.0).max(1.0).name(format!("z[{},{}]", da.name, db.name)));
            constraints.push((z - ca).leq(0.0));
            constraints.push((z - cb).leq(0.0));
            constraints.push((z - ca - cb).geq(-1.0));
            expr.add_mul(coef, z);
            products += 1;
        }

        tracing::debug!(
            "[solver] translated {} variables and {} constraints; linearized {} products",
            columns.len(), program.constraints().len(), products,
        );

        Ok(LpModel { vars, columns, objective: expr, constraints })
    }

    fn solve_microlp(&self, model: LpModel) -> Result<Vec<f64>, SolveError> {
        if self.time_limit.is_some() {
            tracing::warn!("[solver] microlp does not support a time limit; ignoring it");
        }
        let problem = model.vars.minimise(model.objective).using(good_lp::solvers::microlp::microlp);
        run(problem, model.constraints, &model.columns)
    }

    #[cfg(feature = "highs")]
    fn solve_highs(&self, model: LpModel) -> Result<Vec<f64>, SolveError> {
        use good_lp::solvers::WithTimeLimit;

        let mut problem = model.vars.minimise(model.objective).using(good_lp::solvers::highs::highs);
        if let Some(seconds) = self.time_limit {
            problem = problem.with_time_limit(seconds);
        }
        run(problem, model.constraints, &model.columns)
    }

    #[cfg(not(feature = "highs"))]
    fn solve_highs(&self, _model: LpModel) -> Result<Vec<f64>, SolveError> {
        Err(SolveError::Unsupported("the HiGHS backend requires the `highs` feature".into()))
    }
}

/// Add the constraints to an engine-bound problem, solve it, and read back one value per column.
fn run<M>(mut problem: M, constraints: Vec<LpConstraint>, columns: &[Variable]) -> Result<Vec<f64>, SolveError>
where
    M: SolverModel<Error = ResolutionError>,
{
    for constraint in constraints {
        problem.add_constraint(constraint);
    }
    let solution = problem.solve()?;
    Ok(columns.iter().map(|&column| solution.value(column)).collect())
}

impl Solver for MilpSolver {
    fn solve(&self, program: &Program) -> Result<Solution, SolveError> {
        let model = Self::translate(program)?;
        tracing::info!("[solver] solving with {:?}", self.backend);

        let values = match self.backend {
            Backend::MicroLp => self.solve_microlp(model)?,
            Backend::Highs => self.solve_highs(model)?,
        };

        // Report the objective of the original program, not of its linearization.
        let objective = program.objective().evaluate(&values);
        Ok(Solution { values, objective })
    }
}
