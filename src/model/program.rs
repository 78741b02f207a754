//! Solver-agnostic mixed-integer quadratic programs.
//!
//! A [`Program`] is a list of variables, linear constraints, and a quadratic
//! objective to minimize. Backends translate it into whatever their engine
//! accepts; see [`crate::solver`].

use std::collections::BTreeMap;
use std::fmt;

/// Handle to a variable of a [`Program`], in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(usize);

impl Var {
    /// Position of this variable in [`Program::vars`] and in solution vectors.
    #[inline] pub fn index(self) -> usize { self.0 }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Binary,
    Continuous,
}

/// Declaration of a single variable.
#[derive(Clone, Debug, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    /// `f64::INFINITY` when unbounded above.
    pub upper: f64,
}

/// `Σ coef·var + constant`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(Var, f64)>,
    constant: f64,
}

impl LinearExpr {
    #[inline] pub fn new() -> Self { Self::default() }

    /// Sum of the given variables, each with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = Var>) -> Self {
        Self { terms: vars.into_iter().map(|v| (v, 1.0)).collect(), constant: 0.0 }
    }

    /// Add `coef·var` to the expression.
    #[inline]
    pub fn add_term(&mut self, var: Var, coef: f64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    /// Builder form of [`Self::add_term`].
    #[inline]
    pub fn with_term(mut self, var: Var, coef: f64) -> Self {
        self.terms.push((var, coef));
        self
    }

    /// Builder form that adds a constant offset.
    #[inline]
    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant += constant;
        self
    }

    #[inline] pub fn terms(&self) -> &[(Var, f64)] { &self.terms }
    #[inline] pub fn constant(&self) -> f64 { self.constant }

    /// Evaluate the expression at `values` (indexed by [`Var::index`]).
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(v, c)| c * values[v.index()]).sum::<f64>() + self.constant
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    LessEq,
    GreaterEq,
    Equal,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::LessEq => "<=",
            Sense::GreaterEq => ">=",
            Sense::Equal => "==",
        })
    }
}

/// A named linear constraint `expr (sense) rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// Check the constraint at `values`, allowing an absolute slack of `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::LessEq => lhs <= self.rhs + tol,
            Sense::GreaterEq => lhs >= self.rhs - tol,
            Sense::Equal => (lhs - self.rhs).abs() <= tol,
        }
    }
}

/// `Σ coef·a·b + Σ coef·var + constant`, with products stored once per
/// unordered pair `(a, b)`, `a <= b`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuadraticExpr {
    quadratic: BTreeMap<(Var, Var), f64>,
    linear: BTreeMap<Var, f64>,
    constant: f64,
}

impl QuadraticExpr {
    #[inline] pub fn new() -> Self { Self::default() }

    /// Add `coef·a·b`.
    pub fn add_product(&mut self, a: Var, b: Var, coef: f64) {
        *self.quadratic.entry((a.min(b), a.max(b))).or_insert(0.0) += coef;
    }

    /// Add `expr²`, expanded exactly.
    pub fn add_square(&mut self, expr: &LinearExpr) {
        let terms = expr.terms();
        for (i, &(a, ca)) in terms.iter().enumerate() {
            self.add_product(a, a, ca * ca);
            for &(b, cb) in &terms[i + 1..] {
                self.add_product(a, b, 2.0 * ca * cb);
            }
        }
        let c = expr.constant();
        for &(v, cv) in terms {
            *self.linear.entry(v).or_insert(0.0) += 2.0 * c * cv;
        }
        self.constant += c * c;
    }

    /// Product terms `(a, b, coef)` with `a <= b`, in variable order.
    pub fn quadratic_terms(&self) -> impl Iterator<Item = (Var, Var, f64)> + '_ {
        self.quadratic.iter().map(|(&(a, b), &c)| (a, b, c))
    }

    /// Linear terms in variable order.
    pub fn linear_terms(&self) -> impl Iterator<Item = (Var, f64)> + '_ {
        self.linear.iter().map(|(&v, &c)| (v, c))
    }

    #[inline] pub fn constant(&self) -> f64 { self.constant }

    /// Evaluate the expression at `values` (indexed by [`Var::index`]).
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        let quadratic = self.quadratic_terms().map(|(a, b, c)| c * values[a.index()] * values[b.index()]).sum::<f64>();
        let linear = self.linear_terms().map(|(v, c)| c * values[v.index()]).sum::<f64>();
        quadratic + linear + self.constant
    }
}

/// A mixed-integer program with a quadratic objective, always minimized.
#[derive(Clone, Debug, Default)]
pub struct Program {
    vars: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: QuadraticExpr,
}

impl Program {
    #[inline] pub fn new() -> Self { Self::default() }

    /// Add a `{0, 1}` variable.
    pub fn add_binary(&mut self, name: impl Into<String>) -> Var {
        self.add_var(VarDef { name: name.into(), kind: VarKind::Binary, lower: 0.0, upper: 1.0 })
    }

    /// Add a continuous variable with bounds `[lower, upper]`.
    pub fn add_continuous(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> Var {
        assert!(lower <= upper, "lower bound must not exceed upper bound");
        self.add_var(VarDef { name: name.into(), kind: VarKind::Continuous, lower, upper })
    }

    fn add_var(&mut self, def: VarDef) -> Var {
        self.vars.push(def);
        Var(self.vars.len() - 1)
    }

    /// Add the constraint `expr (sense) rhs`.
    pub fn add_constraint(&mut self, name: impl Into<String>, expr: LinearExpr, sense: Sense, rhs: f64) {
        self.constraints.push(Constraint { name: name.into(), expr, sense, rhs });
    }

    /// Replace the objective.
    #[inline] pub fn set_objective(&mut self, objective: QuadraticExpr) { self.objective = objective }

    #[inline] pub fn num_vars(&self) -> usize { self.vars.len() }
    #[inline] pub fn vars(&self) -> &[VarDef] { &self.vars }
    #[inline] pub fn var(&self, var: Var) -> &VarDef { &self.vars[var.index()] }
    #[inline] pub fn constraints(&self) -> &[Constraint] { &self.constraints }
    #[inline] pub fn objective(&self) -> &QuadraticExpr { &self.objective }

    /// Describe every bound, integrality, and constraint violation at `values`.
    pub fn violations(&self, values: &[f64], tol: f64) -> Vec<String> {
        assert!(values.len() == self.num_vars(), "values.len() must equal num_vars");
        let mut violations = Vec::new();

        for (def, &value) in self.vars.iter().zip(values) {
            if value < def.lower - tol || value > def.upper + tol {
                violations.push(format!("{} = {value} outside [{}, {}]", def.name, def.lower, def.upper));
            }
            if def.kind == VarKind::Binary && value.min(1.0 - value).abs() > tol {
                violations.push(format!("{} = {value} is not binary", def.name));
            }
        }

        for constraint in &self.constraints {
            if !constraint.is_satisfied(values, tol) {
                violations.push(format!(
                    "{}: {} {} {}",
                    constraint.name, constraint.expr.evaluate(values), constraint.sense, constraint.rhs,
                ));
            }
        }

        violations
    }
}
