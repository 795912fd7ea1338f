//! `Determinant`, `Inverse`, `Transpose`, `Rref` — thin bridges between the
//! `Value`-typed [`crate::value::HeapObject::Matrix`] every script sees and
//! the `f64`-typed [`crate::matrix::MatrixData`] the textbook algorithms in
//! [`crate::matrix`] operate on.

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    evaluator::Evaluator,
    function::CallArgs,
    matrix::{MatrixData, DEFAULT_EPSILON},
    value::{bigdecimal::BigDecimal, HeapObject, Value},
};

fn take_matrix(evaluator: &Evaluator, args: &CallArgs) -> CantusResult<MatrixData> {
    let Some(Value::Matrix(reference)) = args.positional.first() else {
        return Err(CantusError::argument_count("1 Matrix", args.positional.len()));
    };
    let Some(HeapObject::Matrix { data, rows, cols }) = evaluator.arena().get(reference) else {
        return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Matrix reference"));
    };
    let entries = data
        .iter()
        .map(|v| match v {
            Value::Number(n) => n.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "matrix entry is not finite")),
            other => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, format!("matrix entry is a {}, not a Number", other.type_name()))),
        })
        .collect::<CantusResult<Vec<_>>>()?;
    Ok(MatrixData::new(*rows, *cols, entries))
}

fn store_matrix(evaluator: &mut Evaluator, matrix: MatrixData) -> Value {
    let data = matrix.entries.iter().map(|&x| Value::Number(BigDecimal::from_f64_exact(x))).collect();
    let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data, rows: matrix.rows, cols: matrix.cols });
    Value::Matrix(reference)
}

pub fn determinant(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    let value = matrix.determinant()?;
    Ok(Value::Number(BigDecimal::from_f64_exact(value)))
}

pub fn inverse(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    let inverted = matrix.inverse(DEFAULT_EPSILON)?;
    Ok(store_matrix(evaluator, inverted))
}

pub fn transpose(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    Ok(store_matrix(evaluator, matrix.transpose()))
}

pub fn rref(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    let (reduced, _rank) = matrix.rref(DEFAULT_EPSILON);
    Ok(store_matrix(evaluator, reduced))
}

fn take_matrix_at(evaluator: &Evaluator, args: &CallArgs, index: usize) -> CantusResult<MatrixData> {
    let Some(Value::Matrix(reference)) = args.positional.get(index) else {
        return Err(CantusError::argument_count(&format!("Matrix at position {}", index + 1), args.positional.len()));
    };
    let Some(HeapObject::Matrix { data, rows, cols }) = evaluator.arena().get(reference) else {
        return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Matrix reference"));
    };
    let entries = data
        .iter()
        .map(|v| match v {
            Value::Number(n) => n.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "matrix entry is not finite")),
            other => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, format!("matrix entry is a {}, not a Number", other.type_name()))),
        })
        .collect::<CantusResult<Vec<_>>>()?;
    Ok(MatrixData::new(*rows, *cols, entries))
}

fn take_number(args: &CallArgs, index: usize) -> CantusResult<f64> {
    match args.positional.get(index) {
        Some(Value::Number(n)) => n.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a finite number")),
        _ => Err(CantusError::argument_count(&format!("number at position {}", index + 1), args.positional.len())),
    }
}

/// `Matrix(row1, row2, ...)`: each row is a `Tuple` of `Number`s. Requires
/// every row the same length, matching spec's "rectangular on creation"
/// contract.
pub fn matrix(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    if args.positional.is_empty() {
        return Err(CantusError::argument_count("at least 1 row", 0));
    }
    let mut width = None;
    let mut data = Vec::new();
    let rows = args.positional.len();
    for row in &args.positional {
        let Value::Tuple(reference) = row else {
            return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "Matrix rows must be Tuples"));
        };
        let Some(HeapObject::Tuple(items)) = evaluator.arena().get(reference) else {
            return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Tuple reference"));
        };
        match width {
            None => width = Some(items.len()),
            Some(w) if w != items.len() => {
                return Err(CantusError::math(crate::error::MathErrorKind::DimensionMismatch, "Matrix rows must be the same length"));
            }
            _ => {}
        }
        data.extend(items.iter().cloned());
    }
    let cols = width.unwrap_or(0);
    let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data, rows, cols });
    Ok(Value::Matrix(reference))
}

pub fn multiply(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let a = take_matrix_at(evaluator, &args, 0)?;
    let b = take_matrix_at(evaluator, &args, 1)?;
    let product = a.multiply(&b)?;
    Ok(store_matrix(evaluator, product))
}

pub fn scalar_multiply(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    let scalar = take_number(&args, 1)?;
    Ok(store_matrix(evaluator, matrix.scalar_multiply(scalar)))
}

pub fn dot(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let a = take_matrix_at(evaluator, &args, 0)?;
    let b = take_matrix_at(evaluator, &args, 1)?;
    let value = MatrixData::dot(&a.entries, &b.entries)?;
    Ok(Value::Number(BigDecimal::from_f64_exact(value)))
}

pub fn inner(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let a = take_matrix_at(evaluator, &args, 0)?;
    let b = take_matrix_at(evaluator, &args, 1)?;
    let value = MatrixData::inner(&a.entries, &b.entries)?;
    Ok(Value::Number(BigDecimal::from_f64_exact(value)))
}

pub fn cross(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let a = take_matrix_at(evaluator, &args, 0)?;
    let b = take_matrix_at(evaluator, &args, 1)?;
    let result = MatrixData::cross(&a.entries, &b.entries)?;
    Ok(store_matrix(evaluator, MatrixData::new(1, 3, result.to_vec())))
}

pub fn norm(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    Ok(Value::Number(BigDecimal::from_f64_exact(matrix.norm())))
}

pub fn magnitude(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    Ok(Value::Number(BigDecimal::from_f64_exact(matrix.magnitude())))
}

pub fn swap_rows(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let mut matrix = take_matrix(evaluator, &args)?;
    let a = take_number(&args, 1)? as usize;
    let b = take_number(&args, 2)? as usize;
    matrix.swap_rows(a, b);
    Ok(store_matrix(evaluator, matrix))
}

pub fn swap_cols(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let mut matrix = take_matrix(evaluator, &args)?;
    let a = take_number(&args, 1)? as usize;
    let b = take_number(&args, 2)? as usize;
    matrix.swap_cols(a, b);
    Ok(store_matrix(evaluator, matrix))
}

pub fn expo(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    let n = take_number(&args, 1)?;
    Ok(store_matrix(evaluator, matrix.expo(n as u32)?))
}

pub fn is_identity_matrix(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    Ok(Value::Boolean(matrix.is_identity(DEFAULT_EPSILON)))
}

pub fn null_space(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let matrix = take_matrix(evaluator, &args)?;
    let basis = matrix.null_space(DEFAULT_EPSILON);
    let rows = basis.len();
    let cols = basis.first().map(Vec::len).unwrap_or(0);
    let data: Vec<f64> = basis.into_iter().flatten().collect();
    Ok(store_matrix(evaluator, MatrixData::new(rows, cols, data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;

    fn make_matrix(evaluator: &mut Evaluator, rows: usize, cols: usize, values: Vec<f64>) -> Value {
        let data = values.into_iter().map(BigDecimal::from_f64_exact).map(Value::Number).collect();
        let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data, rows, cols });
        Value::Matrix(reference)
    }

    #[test]
    fn determinant_of_known_matrix() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, 2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let result = determinant(&mut evaluator, CallArgs::positional(vec![m])).unwrap();
        let Value::Number(n) = result else { panic!() };
        assert!((n.to_f64().unwrap() - (-2.0)).abs() < 1e-9);
    }

    #[test]
    fn inverse_round_trips_through_determinant_checked_matrix() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, 2, 2, vec![4.0, 7.0, 2.0, 6.0]);
        let inverted = inverse(&mut evaluator, CallArgs::positional(vec![m])).unwrap();
        let Value::Matrix(reference) = inverted else { panic!() };
        let Some(HeapObject::Matrix { data, .. }) = evaluator.arena().get(&reference) else { panic!() };
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn singular_matrix_inverse_surfaces_as_math_error() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, 2, 2, vec![1.0, 2.0, 2.0, 4.0]);
        let err = inverse(&mut evaluator, CallArgs::positional(vec![m])).unwrap_err();
        assert!(matches!(err, CantusError::Math(crate::error::MathErrorKind::SingularMatrix, _)));
    }
}
