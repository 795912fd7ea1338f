//! `Length`, `Push`, `Pop`, `Insert`, `RemoveAt`, `Contains`, `IndexOf`,
//! `Concat`, `Reverse` — generic sequence operations shared by `Matrix`,
//! `Tuple`, and `LinkedList`, per spec §4.F.
//!
//! Grounded on `builtins::collections`'s `take_matrix_and_lambda` bridge
//! pattern, generalized to the three container shapes instead of `Matrix`
//! alone since these operations carry no predicate and apply uniformly.

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    evaluator::Evaluator,
    function::CallArgs,
    value::{bigdecimal::BigDecimal, ordering, HeapObject, Value},
};

/// Reads out a sequence container's elements without mutating it.
fn read_items(evaluator: &Evaluator, value: &Value) -> CantusResult<Vec<Value>> {
    match value {
        Value::Matrix(reference) => match evaluator.arena().get(reference) {
            Some(HeapObject::Matrix { data, .. }) => Ok(data.clone()),
            _ => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Matrix reference")),
        },
        Value::Tuple(reference) => match evaluator.arena().get(reference) {
            Some(HeapObject::Tuple(items)) => Ok(items.clone()),
            _ => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Tuple reference")),
        },
        Value::LinkedList(reference) => match evaluator.arena().get(reference) {
            Some(HeapObject::LinkedList(items)) => Ok(items.iter().cloned().collect()),
            _ => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live LinkedList reference")),
        },
        other => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, format!("expected a sequence container, got {}", other.type_name()))),
    }
}

fn take_container(args: &CallArgs) -> CantusResult<&Value> {
    args.positional.first().ok_or_else(|| CantusError::argument_count("1 sequence container", args.positional.len()))
}

pub fn length(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let items = read_items(evaluator, take_container(&args)?)?;
    Ok(Value::Number(BigDecimal::from_i64(items.len() as i64)))
}

pub fn contains(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let items = read_items(evaluator, take_container(&args)?)?;
    let Some(needle) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(container, value)", args.positional.len()));
    };
    Ok(Value::Boolean(items.iter().any(|item| ordering::values_equal(item, needle))))
}

pub fn index_of(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let items = read_items(evaluator, take_container(&args)?)?;
    let Some(needle) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(container, value)", args.positional.len()));
    };
    match items.iter().position(|item| ordering::values_equal(item, needle)) {
        Some(index) => Ok(Value::Number(BigDecimal::from_i64(index as i64))),
        None => Ok(Value::Undefined),
    }
}

pub fn reverse(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let mut items = read_items(evaluator, take_container(&args)?)?;
    items.reverse();
    rebuild_like(evaluator, take_container(&args)?, items)
}

/// Rebuilds a new container matching `template`'s variant from `items`,
/// leaving `template` itself untouched (append-only operations return a
/// fresh value rather than mutating in place, per spec's value-semantics
/// note for `Tuple`).
fn rebuild_like(evaluator: &mut Evaluator, template: &Value, items: Vec<Value>) -> CantusResult<Value> {
    match template {
        Value::Matrix(_) => {
            let len = items.len();
            let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data: items, rows: 1, cols: len });
            Ok(Value::Matrix(reference))
        }
        Value::Tuple(_) => {
            let reference = evaluator.arena_mut().insert(HeapObject::Tuple(items));
            Ok(Value::Tuple(reference))
        }
        Value::LinkedList(_) => {
            let reference = evaluator.arena_mut().insert(HeapObject::LinkedList(items.into_iter().collect()));
            Ok(Value::LinkedList(reference))
        }
        other => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, format!("expected a sequence container, got {}", other.type_name()))),
    }
}

pub fn push(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let template = take_container(&args)?.clone();
    let mut items = read_items(evaluator, &template)?;
    let Some(value) = args.positional.get(1).cloned() else {
        return Err(CantusError::argument_count("(container, value)", args.positional.len()));
    };
    items.push(value);
    rebuild_like(evaluator, &template, items)
}

pub fn pop(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let items = read_items(evaluator, take_container(&args)?)?;
    Ok(items.last().cloned().unwrap_or(Value::Undefined))
}

pub fn insert(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let template = take_container(&args)?.clone();
    let mut items = read_items(evaluator, &template)?;
    let Some(Value::Number(index)) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(container, index, value)", args.positional.len()));
    };
    let index = index.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "index must be finite"))? as usize;
    let Some(value) = args.positional.get(2).cloned() else {
        return Err(CantusError::argument_count("(container, index, value)", args.positional.len()));
    };
    if index > items.len() {
        return Err(CantusError::evaluator(EvaluatorErrorKind::IndexOutOfRange, format!("index {index} out of range for length {}", items.len())));
    }
    items.insert(index, value);
    rebuild_like(evaluator, &template, items)
}

pub fn remove_at(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let template = take_container(&args)?.clone();
    let mut items = read_items(evaluator, &template)?;
    let Some(Value::Number(index)) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(container, index)", args.positional.len()));
    };
    let index = index.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "index must be finite"))? as usize;
    if index >= items.len() {
        return Err(CantusError::evaluator(EvaluatorErrorKind::IndexOutOfRange, format!("index {index} out of range for length {}", items.len())));
    }
    items.remove(index);
    rebuild_like(evaluator, &template, items)
}

pub fn concat(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let template = take_container(&args)?.clone();
    let mut items = read_items(evaluator, &template)?;
    let Some(other) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(container, container)", args.positional.len()));
    };
    items.extend(read_items(evaluator, other)?);
    rebuild_like(evaluator, &template, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;

    fn make_matrix(evaluator: &mut Evaluator, values: Vec<i64>) -> Value {
        let len = values.len();
        let data = values.into_iter().map(BigDecimal::from_i64).map(Value::Number).collect();
        let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data, rows: 1, cols: len });
        Value::Matrix(reference)
    }

    #[test]
    fn length_counts_elements() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, vec![1, 2, 3]);
        let result = length(&mut evaluator, CallArgs::positional(vec![m])).unwrap();
        assert_eq!(result, Value::Number(BigDecimal::from_i64(3)));
    }

    #[test]
    fn push_returns_a_new_longer_container() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, vec![1, 2]);
        let extended = push(&mut evaluator, CallArgs::positional(vec![m, Value::Number(BigDecimal::from_i64(3))])).unwrap();
        let length_result = length(&mut evaluator, CallArgs::positional(vec![extended])).unwrap();
        assert_eq!(length_result, Value::Number(BigDecimal::from_i64(3)));
    }

    #[test]
    fn index_of_missing_value_is_undefined() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, vec![1, 2, 3]);
        let result = index_of(&mut evaluator, CallArgs::positional(vec![m, Value::Number(BigDecimal::from_i64(9))])).unwrap();
        assert!(result.is_undefined());
    }
}
