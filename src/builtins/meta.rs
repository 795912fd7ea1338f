//! Evaluator introspection and housekeeping built-ins: `_AllClear`,
//! `_PrevAns`, `_TypeName`.

use crate::{error::CantusResult, evaluator::Evaluator, function::CallArgs, value::{bigdecimal::BigDecimal, Value}};

/// `_AllClear()`: resets the root scope and previous-answer history.
pub fn all_clear(evaluator: &mut Evaluator, _args: CallArgs) -> CantusResult<Value> {
    evaluator.all_clear();
    Ok(Value::Undefined)
}

/// `_PrevAns(n)`: the `n`th-most-recent top-level result, `0` being the
/// most recent. Missing or out-of-range `n` defaults to `0`.
pub fn prev_ans(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let n = match args.positional.first() {
        Some(Value::Number(n)) => n.to_f64().map(|f| f.max(0.0) as usize).unwrap_or(0),
        _ => 0,
    };
    Ok(evaluator.prev_ans(n))
}

/// `_TypeName(value)`: the variant name of a value, as spec's glossary
/// names them (`"Number"`, `"Matrix"`, `"Lambda"`, ...).
pub fn type_name(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let name = args.positional.first().map(Value::type_name).unwrap_or("Undefined");
    Ok(Value::Text(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;

    #[test]
    fn all_clear_resets_prev_ans() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        evaluator.push_prev_ans(Value::Number(BigDecimal::from_i64(5)));
        all_clear(&mut evaluator, CallArgs::default()).unwrap();
        assert!(evaluator.prev_ans(0).is_undefined());
    }

    #[test]
    fn prev_ans_defaults_to_most_recent() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        evaluator.push_prev_ans(Value::Number(BigDecimal::from_i64(1)));
        evaluator.push_prev_ans(Value::Number(BigDecimal::from_i64(2)));
        let result = prev_ans(&mut evaluator, CallArgs::default()).unwrap();
        assert_eq!(result, Value::Number(BigDecimal::from_i64(2)));
    }

    #[test]
    fn type_name_reports_variant() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let result = type_name(&mut evaluator, CallArgs::positional(vec![Value::Boolean(true)])).unwrap();
        assert_eq!(result, Value::Text("Boolean".to_string()));
    }
}
