//! Lambda values and the unified built-in/user-function dispatch protocol.
//!
//! Grounded on the teacher's `function.rs` (parameter list + body + captured
//! scope struct shape) and `builtins/mod.rs` (the catalog-dispatch pattern
//! that lets user-defined and built-in callables share one calling
//! convention).

use std::fmt;

use smallvec::SmallVec;

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    parser::Expr,
    value::Value,
};

/// A formal parameter: a name with an optional default-value expression.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Expr>,
}

/// A user-defined closure: parameter list, body expression/block, and the
/// name of the scope it was defined in (for lexical lookup of free
/// variables, resolved by walking from that scope toward the root).
#[derive(Debug, Clone)]
pub struct Lambda {
    pub name: Option<String>,
    pub params: SmallVec<[Parameter; 4]>,
    pub body: Expr,
    pub defining_scope: String,
}

impl Lambda {
    pub fn arity(&self) -> (usize, usize) {
        let required = self.params.iter().take_while(|p| p.default.is_none()).count();
        (required, self.params.len())
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lambda({})", self.name.as_deref().unwrap_or("<anonymous>"))
    }
}

/// Bound call arguments: positional values followed by a name-keyed map of
/// keyword arguments, matching spec's "positional-then-keyword" binding
/// model (no variadic splat — see `DESIGN.md` Open Question 5).
#[derive(Debug, Default, Clone)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn positional(values: Vec<Value>) -> Self {
        Self { positional: values, keyword: Vec::new() }
    }

    /// Binds arguments to a parameter list, filling unspecified trailing
    /// parameters from their default expressions is the caller's
    /// responsibility (defaults need an evaluator to run); this only
    /// validates shape and produces a flat `name -> Value` binding list
    /// for parameters that were supplied.
    pub fn bind_positions(&self, params: &[Parameter]) -> CantusResult<Vec<(String, Option<Value>)>> {
        if self.positional.len() > params.len() {
            return Err(CantusError::argument_count(&format!("at most {}", params.len()), self.positional.len()));
        }
        let mut bound: Vec<(String, Option<Value>)> =
            params.iter().map(|p| (p.name.clone(), None)).collect();
        for (slot, value) in bound.iter_mut().zip(self.positional.iter().cloned()) {
            slot.1 = Some(value);
        }
        for (name, value) in &self.keyword {
            let Some(slot) = bound.iter_mut().find(|(pname, _)| pname == name) else {
                return Err(CantusError::Evaluator(
                    EvaluatorErrorKind::UnknownKeywordArgument,
                    format!("unknown keyword argument `{name}`"),
                ));
            };
            slot.1 = Some(value.clone());
        }
        Ok(bound)
    }
}

/// A callable value: either a user-defined [`Lambda`] or a named built-in
/// dispatched through the evaluator's built-in catalog. Both share this
/// one calling convention, per spec's "unify built-ins and user-defined
/// functions under one name/argument protocol" requirement.
#[derive(Debug, Clone)]
pub enum UserFunction {
    User(Lambda),
    Builtin(&'static str),
}

impl UserFunction {
    pub fn name(&self) -> String {
        match self {
            Self::User(lambda) => lambda.name.clone().unwrap_or_else(|| "<anonymous>".to_string()),
            Self::Builtin(name) => (*name).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str) -> Parameter {
        Parameter { name: name.to_string(), default: None }
    }

    #[test]
    fn bind_positions_rejects_unknown_keyword() {
        let args = CallArgs { positional: vec![], keyword: vec![("z".to_string(), Value::Boolean(true))] };
        let params = vec![param("x")];
        let err = args.bind_positions(&params).unwrap_err();
        assert!(matches!(err, CantusError::Evaluator(EvaluatorErrorKind::UnknownKeywordArgument, _)));
    }

    #[test]
    fn bind_positions_fills_positional_then_keyword() {
        let args = CallArgs {
            positional: vec![Value::Boolean(true)],
            keyword: vec![("y".to_string(), Value::Boolean(false))],
        };
        let params = vec![param("x"), param("y")];
        let bound = args.bind_positions(&params).unwrap();
        assert_eq!(bound[0].1, Some(Value::Boolean(true)));
        assert_eq!(bound[1].1, Some(Value::Boolean(false)));
    }
}
