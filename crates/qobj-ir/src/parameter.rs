//! Symbolic parameter expressions.
//!
//! Gate angles and pulse template values are written as small expression
//! trees. Assembly only ever needs a concrete `f64`, so every expression must
//! be fully bound by the time it is lowered.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

use crate::error::{IrError, IrResult};

/// A symbolic or concrete parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A named free symbol.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Check if this expression contains any symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Try to evaluate as a concrete f64 value.
    pub fn as_f64(&self) -> Option<f64> {
        self.evaluate().ok()
    }

    /// Evaluate to a concrete number.
    ///
    /// Fails with [`IrError::UnboundParameter`] naming the first free symbol,
    /// or [`IrError::NonFiniteParameter`] when the arithmetic leaves the reals
    /// (division by zero and the like).
    pub fn evaluate(&self) -> IrResult<f64> {
        let value = match self {
            ParameterExpression::Constant(v) => *v,
            ParameterExpression::Symbol(name) => {
                return Err(IrError::UnboundParameter(name.clone()));
            }
            ParameterExpression::Pi => PI,
            ParameterExpression::Neg(e) => -e.evaluate()?,
            ParameterExpression::Add(a, b) => a.evaluate()? + b.evaluate()?,
            ParameterExpression::Sub(a, b) => a.evaluate()? - b.evaluate()?,
            ParameterExpression::Mul(a, b) => a.evaluate()? * b.evaluate()?,
            ParameterExpression::Div(a, b) => a.evaluate()? / b.evaluate()?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(IrError::NonFiniteParameter(self.to_string()))
        }
    }

    /// All symbol names in this expression, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_symbols(&mut set);
        set
    }

    fn collect_symbols(&self, set: &mut BTreeSet<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(name) => {
                set.insert(name.clone());
            }
            ParameterExpression::Neg(e) => e.collect_symbols(set),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
        }
    }

    /// Bind a symbol to a value, returning a new expression.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        self.substitute(&|symbol: &str| (symbol == name).then_some(value))
    }

    /// Bind every symbol the lookup knows about, leaving the rest free.
    pub fn bind_with(&self, lookup: impl Fn(&str) -> Option<f64>) -> Self {
        self.substitute(&lookup)
    }

    fn substitute(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> Self {
        use ParameterExpression as P;

        let pair = |a: &P, b: &P| (Box::new(a.substitute(lookup)), Box::new(b.substitute(lookup)));
        match self {
            P::Symbol(name) => lookup(name).map_or_else(|| self.clone(), P::Constant),
            P::Constant(_) | P::Pi => self.clone(),
            P::Neg(e) => P::Neg(Box::new(e.substitute(lookup))),
            P::Add(a, b) => {
                let (a, b) = pair(a, b);
                P::Add(a, b)
            }
            P::Sub(a, b) => {
                let (a, b) = pair(a, b);
                P::Sub(a, b)
            }
            P::Mul(a, b) => {
                let (a, b) = pair(a, b);
                P::Mul(a, b)
            }
            P::Div(a, b) => {
                let (a, b) = pair(a, b);
                P::Div(a, b)
            }
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "pi"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

impl From<&str> for ParameterExpression {
    fn from(name: &str) -> Self {
        ParameterExpression::Symbol(name.to_string())
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParameterExpression::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Div for ParameterExpression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ParameterExpression::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}
