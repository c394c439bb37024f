//! Command values that may still hold a free parameter.

use qobj_ir::ParameterExpression;
use std::collections::BTreeSet;

use crate::error::{PulseError, PulseResult};

/// Parameter bindings, by symbol name.
pub type Bindings = rustc_hash::FxHashMap<String, f64>;

/// A command value that is either concrete or a free expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Parametric<T> {
    /// A concrete value.
    Bound(T),
    /// An expression over free symbols.
    Free(ParameterExpression),
}

impl<T: Clone + From<f64>> Parametric<T> {
    /// The concrete value, if bound.
    pub fn value(&self) -> Option<&T> {
        match self {
            Parametric::Bound(v) => Some(v),
            Parametric::Free(_) => None,
        }
    }

    /// Whether this value still needs a binding.
    pub fn is_free(&self) -> bool {
        matches!(self, Parametric::Free(_))
    }

    /// Symbols the value depends on.
    pub fn symbols(&self) -> BTreeSet<String> {
        match self {
            Parametric::Bound(_) => BTreeSet::new(),
            Parametric::Free(expr) => expr.symbols(),
        }
    }

    /// Resolve every free symbol from `bindings`.
    ///
    /// Fails with [`PulseError::UnboundParameter`] if any symbol is missing.
    pub fn bind(&self, bindings: &Bindings) -> PulseResult<Self> {
        match self {
            Parametric::Bound(v) => Ok(Parametric::Bound(v.clone())),
            Parametric::Free(expr) => {
                let value = expr
                    .bind_with(|name| bindings.get(name).copied())
                    .evaluate()
                    .map_err(PulseError::from)?;
                Ok(Parametric::Bound(T::from(value)))
            }
        }
    }
}

impl<T> From<ParameterExpression> for Parametric<T> {
    fn from(expr: ParameterExpression) -> Self {
        Parametric::Free(expr)
    }
}

impl From<f64> for Parametric<f64> {
    fn from(value: f64) -> Self {
        Parametric::Bound(value)
    }
}

impl From<num_complex::Complex64> for Parametric<num_complex::Complex64> {
    fn from(value: num_complex::Complex64) -> Self {
        Parametric::Bound(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_bind_free_phase() {
        let phase: Parametric<f64> = (ParameterExpression::symbol("P0") * 2.0.into()).into();
        assert!(phase.is_free());
        assert_eq!(phase.symbols().into_iter().collect::<Vec<_>>(), vec!["P0"]);

        let mut bindings = Bindings::default();
        bindings.insert("P0".to_string(), 0.5);
        bindings.insert("unused".to_string(), 9.0);
        assert_eq!(phase.bind(&bindings).unwrap(), Parametric::Bound(1.0));
    }

    #[test]
    fn test_missing_binding_fails() {
        let phase: Parametric<f64> = ParameterExpression::symbol("P0").into();
        let err = phase.bind(&Bindings::default()).unwrap_err();
        assert!(matches!(err, PulseError::UnboundParameter(name) if name == "P0"));
    }

    #[test]
    fn test_complex_binding_is_real() {
        let value: Parametric<Complex64> = ParameterExpression::symbol("amp").into();
        let mut bindings = Bindings::default();
        bindings.insert("amp".to_string(), 0.25);
        assert_eq!(
            value.bind(&bindings).unwrap().value(),
            Some(&Complex64::new(0.25, 0.0))
        );
    }
}
