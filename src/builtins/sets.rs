//! `Set`, `HashSet`, `Union`, `Intersect`, `Difference`, `SymmetricDiff` —
//! operations over [`HeapObject::Set`]/[`HeapObject::HashSet`]'s
//! `IndexSet<OrderedValue>`, per spec §4.F.
//!
//! `Set` preserves insertion order (spec's ordered-set variant); `HashSet`
//! shares the same `IndexSet` backing but is documented as unordered —
//! the distinction spec draws is contractual, not structural, matching
//! how the teacher's own Python-dict-backed reference types distinguished
//! `dict` from `OrderedDict` by contract rather than layout.

use indexmap::IndexSet;

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    evaluator::Evaluator,
    function::CallArgs,
    value::{HeapObject, OrderedValue, Value},
};

fn read_set(evaluator: &Evaluator, value: &Value) -> CantusResult<IndexSet<OrderedValue>> {
    match value {
        Value::Set(reference) | Value::HashSet(reference) => match evaluator.arena().get(reference) {
            Some(HeapObject::Set(items)) | Some(HeapObject::HashSet(items)) => Ok(items.clone()),
            _ => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Set/HashSet reference")),
        },
        other => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, format!("expected a Set, got {}", other.type_name()))),
    }
}

fn store_set(evaluator: &mut Evaluator, items: IndexSet<OrderedValue>, hashed: bool) -> Value {
    let object = if hashed { HeapObject::HashSet(items) } else { HeapObject::Set(items) };
    let reference = evaluator.arena_mut().insert(object);
    if hashed {
        Value::HashSet(reference)
    } else {
        Value::Set(reference)
    }
}

fn is_hashed(template: &Value) -> bool {
    matches!(template, Value::HashSet(_))
}

/// `Set(matrix)`: builds an ordered Set from a Matrix's entries,
/// deduplicating by canonical equality.
pub fn set(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    build_set(evaluator, args, false)
}

/// `HashSet(matrix)`.
pub fn hash_set(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    build_set(evaluator, args, true)
}

fn build_set(evaluator: &mut Evaluator, args: CallArgs, hashed: bool) -> CantusResult<Value> {
    let Some(Value::Matrix(reference)) = args.positional.first() else {
        return Err(CantusError::argument_count("1 Matrix", args.positional.len()));
    };
    let Some(HeapObject::Matrix { data, .. }) = evaluator.arena().get(reference) else {
        return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Matrix reference"));
    };
    let items: IndexSet<OrderedValue> = data.iter().cloned().map(OrderedValue).collect();
    Ok(store_set(evaluator, items, hashed))
}

pub fn union(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let Some(a_value) = args.positional.first() else {
        return Err(CantusError::argument_count("(Set, Set)", args.positional.len()));
    };
    let a = read_set(evaluator, a_value)?;
    let Some(b_value) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(Set, Set)", args.positional.len()));
    };
    let b = read_set(evaluator, b_value)?;
    let result: IndexSet<OrderedValue> = a.into_iter().chain(b).collect();
    Ok(store_set(evaluator, result, is_hashed(a_value)))
}

pub fn intersect(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let Some(a_value) = args.positional.first() else {
        return Err(CantusError::argument_count("(Set, Set)", args.positional.len()));
    };
    let a = read_set(evaluator, a_value)?;
    let Some(b_value) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(Set, Set)", args.positional.len()));
    };
    let b = read_set(evaluator, b_value)?;
    let result: IndexSet<OrderedValue> = a.into_iter().filter(|item| b.contains(item)).collect();
    Ok(store_set(evaluator, result, is_hashed(a_value)))
}

pub fn difference(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let Some(a_value) = args.positional.first() else {
        return Err(CantusError::argument_count("(Set, Set)", args.positional.len()));
    };
    let a = read_set(evaluator, a_value)?;
    let Some(b_value) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(Set, Set)", args.positional.len()));
    };
    let b = read_set(evaluator, b_value)?;
    let result: IndexSet<OrderedValue> = a.into_iter().filter(|item| !b.contains(item)).collect();
    Ok(store_set(evaluator, result, is_hashed(a_value)))
}

pub fn symmetric_diff(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let Some(a_value) = args.positional.first() else {
        return Err(CantusError::argument_count("(Set, Set)", args.positional.len()));
    };
    let a = read_set(evaluator, a_value)?;
    let Some(b_value) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(Set, Set)", args.positional.len()));
    };
    let b = read_set(evaluator, b_value)?;
    let only_a = a.iter().filter(|item| !b.contains(*item)).cloned();
    let only_b = b.iter().filter(|item| !a.contains(*item)).cloned();
    let result: IndexSet<OrderedValue> = only_a.chain(only_b).collect();
    Ok(store_set(evaluator, result, is_hashed(a_value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;
    use crate::value::bigdecimal::BigDecimal;

    fn make_matrix(evaluator: &mut Evaluator, values: Vec<i64>) -> Value {
        let len = values.len();
        let data = values.into_iter().map(BigDecimal::from_i64).map(Value::Number).collect();
        let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data, rows: 1, cols: len });
        Value::Matrix(reference)
    }

    fn set_len(evaluator: &Evaluator, value: &Value) -> usize {
        read_set(evaluator, value).unwrap().len()
    }

    #[test]
    fn set_deduplicates_entries() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, vec![1, 1, 2, 3, 3]);
        let s = set(&mut evaluator, CallArgs::positional(vec![m])).unwrap();
        assert_eq!(set_len(&evaluator, &s), 3);
    }

    #[test]
    fn intersect_keeps_only_shared_members() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let a = make_matrix(&mut evaluator, vec![1, 2, 3]);
        let a = set(&mut evaluator, CallArgs::positional(vec![a])).unwrap();
        let b = make_matrix(&mut evaluator, vec![2, 3, 4]);
        let b = set(&mut evaluator, CallArgs::positional(vec![b])).unwrap();
        let result = intersect(&mut evaluator, CallArgs::positional(vec![a, b])).unwrap();
        assert_eq!(set_len(&evaluator, &result), 2);
    }
}
