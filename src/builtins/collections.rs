//! `Each`, `Select`, `Filter`, `Exclude`, `Get`, `FilterIndex`, `Every`,
//! `Sort` — described precisely by spec §4.I so tests can rely on their
//! exact semantics.
//!
//! Adapted from the teacher's `builtins/{filter,map,min_max,sorted,sum}.rs`
//! call-with-predicate shape into the spec's container-mutation semantics;
//! every predicate invocation runs through
//! [`crate::evaluator::Evaluator::with_default_slot`] so the lambda sees
//! the current element under the default-variable slot.

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    evaluator::Evaluator,
    function::{CallArgs, Lambda},
    value::{ordering, HeapObject, Value},
};

fn take_matrix_and_lambda(evaluator: &Evaluator, args: &CallArgs) -> CantusResult<(Vec<Value>, Lambda)> {
    let [container, Value::Lambda(lambda_ref)] = args.positional.as_slice() else {
        return Err(CantusError::argument_count("(container, lambda)", args.positional.len()));
    };
    let items = match container {
        Value::Matrix(reference) => match evaluator.arena().get(reference) {
            Some(HeapObject::Matrix { data, .. }) => data.clone(),
            _ => return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Matrix reference")),
        },
        other => return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, format!("expected a Matrix, got {}", other.type_name()))),
    };
    let lambda = match evaluator.arena().get(lambda_ref) {
        Some(HeapObject::Lambda(lambda)) => lambda.clone(),
        _ => return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Lambda reference")),
    };
    Ok((items, lambda))
}

fn call_predicate(evaluator: &mut Evaluator, lambda: &Lambda, element: Value) -> CantusResult<Value> {
    evaluator.with_default_slot(element.clone(), |evaluator| {
        evaluator.call_lambda(lambda, CallArgs::positional(vec![element]))
    })
}

/// For each element of the container, sets the default slot and invokes
/// the lambda; the result is ignored. Returns the input container.
pub fn each(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let (items, lambda) = take_matrix_and_lambda(evaluator, &args)?;
    for item in items {
        if evaluator.is_cancelled() {
            return Err(CantusError::Cancelled);
        }
        call_predicate(evaluator, &lambda, item)?;
    }
    Ok(args.positional[0].clone())
}

/// Mutates the input Matrix in place: each element is replaced by the
/// lambda's return value (a non-reference return is wrapped into a new
/// reference by storing it directly, since Cantus stores elements
/// in-line rather than as nested arena handles).
pub fn select(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let (items, lambda) = take_matrix_and_lambda(evaluator, &args)?;
    let mut mapped = Vec::with_capacity(items.len());
    for item in items {
        mapped.push(call_predicate(evaluator, &lambda, item)?);
    }
    let Value::Matrix(reference) = &args.positional[0] else {
        unreachable!("validated by take_matrix_and_lambda")
    };
    if let Some(HeapObject::Matrix { data, .. }) = evaluator.arena_mut().get_mut(reference) {
        *data = mapped;
    }
    Ok(args.positional[0].clone())
}

fn filter_by(evaluator: &mut Evaluator, args: &CallArgs, keep_if_truthy: bool) -> CantusResult<Value> {
    let (items, lambda) = take_matrix_and_lambda(evaluator, args)?;
    let mut kept = Vec::new();
    for item in items {
        let result = call_predicate(evaluator, &lambda, item.clone())?;
        if result.is_truthy() == keep_if_truthy {
            kept.push(item);
        }
    }
    let len = kept.len();
    let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data: kept, rows: 1, cols: len });
    Ok(Value::Matrix(reference))
}

pub fn filter(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    filter_by(evaluator, &args, true)
}

pub fn exclude(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    filter_by(evaluator, &args, false)
}

/// Returns the first element whose predicate is truthy, `Undefined` if
/// none matches.
pub fn get(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let (items, lambda) = take_matrix_and_lambda(evaluator, &args)?;
    for item in items {
        let result = call_predicate(evaluator, &lambda, item.clone())?;
        if result.is_truthy() {
            return Ok(item);
        }
    }
    Ok(Value::Undefined)
}

/// Returns the 0-based index of the first element whose predicate is
/// truthy, `Undefined` if none matches.
pub fn filter_index(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let (items, lambda) = take_matrix_and_lambda(evaluator, &args)?;
    for (index, item) in items.into_iter().enumerate() {
        let result = call_predicate(evaluator, &lambda, item)?;
        if result.is_truthy() {
            return Ok(Value::Number(crate::value::bigdecimal::BigDecimal::from_i64(index as i64)));
        }
    }
    Ok(Value::Undefined)
}

/// Returns true iff every element's predicate evaluates truthy.
pub fn every(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let (items, lambda) = take_matrix_and_lambda(evaluator, &args)?;
    for item in items {
        if !call_predicate(evaluator, &lambda, item)?.is_truthy() {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

/// In-place quicksort; pivot is the middle element; comparator is the
/// canonical comparator unless a Lambda comparer is supplied (which must
/// return a number whose sign orders the pair).
pub fn sort(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let Some(Value::Matrix(reference)) = args.positional.first() else {
        return Err(CantusError::argument_count("(matrix, [comparator])", args.positional.len()));
    };
    let mut items = match evaluator.arena().get(reference) {
        Some(HeapObject::Matrix { data, .. }) => data.clone(),
        _ => return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Matrix reference")),
    };
    let comparator = match args.positional.get(1) {
        Some(Value::Lambda(lambda_ref)) => match evaluator.arena().get(lambda_ref) {
            Some(HeapObject::Lambda(lambda)) => Some(lambda.clone()),
            _ => return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Lambda reference")),
        },
        None => None,
        Some(_) => return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "comparator must be a Lambda")),
    };

    quicksort(evaluator, &mut items, &comparator)?;

    if let Some(HeapObject::Matrix { data, .. }) = evaluator.arena_mut().get_mut(reference) {
        *data = items;
    }
    Ok(args.positional[0].clone())
}

fn quicksort(evaluator: &mut Evaluator, items: &mut [Value], comparator: &Option<Lambda>) -> CantusResult<()> {
    if items.len() <= 1 {
        return Ok(());
    }
    if evaluator.is_cancelled() {
        return Err(CantusError::Cancelled);
    }
    let mid = items.len() / 2;
    let pivot = items[mid].clone();
    let mut less = Vec::new();
    let mut equal = Vec::new();
    let mut greater = Vec::new();
    for item in items.iter() {
        let ordering = compare_with(evaluator, comparator, item, &pivot)?;
        match ordering {
            std::cmp::Ordering::Less => less.push(item.clone()),
            std::cmp::Ordering::Equal => equal.push(item.clone()),
            std::cmp::Ordering::Greater => greater.push(item.clone()),
        }
    }
    quicksort(evaluator, &mut less, comparator)?;
    quicksort(evaluator, &mut greater, comparator)?;
    let mut sorted = less;
    sorted.extend(equal);
    sorted.extend(greater);
    items.clone_from_slice(&sorted);
    Ok(())
}

fn compare_with(evaluator: &mut Evaluator, comparator: &Option<Lambda>, a: &Value, b: &Value) -> CantusResult<std::cmp::Ordering> {
    match comparator {
        None => Ok(ordering::compare(a, b)),
        Some(lambda) => {
            let args = CallArgs::positional(vec![a.clone(), b.clone()]);
            let result = evaluator.call_lambda(lambda, args)?;
            let Value::Number(sign) = result else {
                return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "comparator must return a number"));
            };
            Ok(sign.to_f64().unwrap_or(0.0).partial_cmp(&0.0).unwrap_or(std::cmp::Ordering::Equal))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{evaluator::EvaluatorConfig, parser::Expr, value::bigdecimal::BigDecimal};

    fn make_matrix(evaluator: &mut Evaluator, values: Vec<i64>) -> Value {
        let data = values.into_iter().map(BigDecimal::from_i64).map(Value::Number).collect::<Vec<_>>();
        let len = data.len();
        let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data, rows: 1, cols: len });
        Value::Matrix(reference)
    }

    fn make_identity_lambda(evaluator: &mut Evaluator) -> Value {
        let lambda = Lambda {
            name: None,
            params: smallvec::smallvec![crate::function::Parameter { name: "x".to_string(), default: None }],
            body: Expr::Identifier("x".to_string()),
            defining_scope: "global".to_string(),
        };
        Value::Lambda(evaluator.arena_mut().insert(HeapObject::Lambda(lambda)))
    }

    #[test]
    fn select_preserves_length() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let matrix = make_matrix(&mut evaluator, vec![1, 2, 3]);
        let lambda = make_identity_lambda(&mut evaluator);
        let args = CallArgs::positional(vec![matrix.clone(), lambda]);
        select(&mut evaluator, args).unwrap();
        let Value::Matrix(reference) = matrix else { unreachable!() };
        let Some(HeapObject::Matrix { data, .. }) = evaluator.arena().get(&reference) else { panic!() };
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn filter_and_exclude_partition_the_input() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let matrix = make_matrix(&mut evaluator, vec![1, 2, 3, 4]);
        let is_even = Lambda {
            name: None,
            params: smallvec::smallvec![crate::function::Parameter { name: "x".to_string(), default: None }],
            body: Expr::Binary(
                Box::new(Expr::Binary(Box::new(Expr::Identifier("x".to_string())), crate::parser::BinaryOp::Mod, Box::new(Expr::NumberLiteral("2".to_string())))),
                crate::parser::BinaryOp::Eq,
                Box::new(Expr::NumberLiteral("0".to_string())),
            ),
            defining_scope: "global".to_string(),
        };
        let lambda_value = Value::Lambda(evaluator.arena_mut().insert(HeapObject::Lambda(is_even)));
        let filtered = filter(&mut evaluator, CallArgs::positional(vec![matrix.clone(), lambda_value.clone()])).unwrap();
        let excluded = exclude(&mut evaluator, CallArgs::positional(vec![matrix, lambda_value])).unwrap();
        let Value::Matrix(filtered_ref) = filtered else { unreachable!() };
        let Value::Matrix(excluded_ref) = excluded else { unreachable!() };
        let Some(HeapObject::Matrix { data: filtered_data, .. }) = evaluator.arena().get(&filtered_ref) else { panic!() };
        let Some(HeapObject::Matrix { data: excluded_data, .. }) = evaluator.arena().get(&excluded_ref) else { panic!() };
        assert_eq!(filtered_data.len() + excluded_data.len(), 4);
    }

    #[test]
    fn sort_is_idempotent() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let matrix = make_matrix(&mut evaluator, vec![3, 1, 4, 1, 5, 9, 2, 6]);
        sort(&mut evaluator, CallArgs::positional(vec![matrix.clone()])).unwrap();
        let Value::Matrix(reference) = matrix else { unreachable!() };
        let first_pass = match evaluator.arena().get(&reference) {
            Some(HeapObject::Matrix { data, .. }) => data.clone(),
            _ => panic!(),
        };
        sort(&mut evaluator, CallArgs::positional(vec![Value::Matrix(reference)])).unwrap();
        let second_pass = match evaluator.arena().get(&reference) {
            Some(HeapObject::Matrix { data, .. }) => data.clone(),
            _ => panic!(),
        };
        assert_eq!(first_pass.len(), second_pass.len());
        for (a, b) in first_pass.iter().zip(second_pass.iter()) {
            assert_eq!(a, b);
        }
    }
}
