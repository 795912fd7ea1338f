//! `Sigma`, `Product`, `Mean`, `Median`, `Mode`, `Variance`, `Stdev`,
//! `Percentile` — Matrix-reducing statistics, per spec §4.F.
//!
//! Grounded on the curated `modules/statistics.rs` reference file's
//! algorithm choices (population variance, nearest-rank percentile,
//! lowest-value tiebreak for `Mode`), rebuilt against the `Matrix`/`Value`
//! model instead of a `Vec<f64>` input.

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    evaluator::Evaluator,
    function::CallArgs,
    value::{bigdecimal::BigDecimal, HeapObject, Value},
};

fn take_numbers(evaluator: &Evaluator, args: &CallArgs) -> CantusResult<Vec<f64>> {
    let Some(Value::Matrix(reference)) = args.positional.first() else {
        return Err(CantusError::argument_count("1 Matrix", args.positional.len()));
    };
    let Some(HeapObject::Matrix { data, .. }) = evaluator.arena().get(reference) else {
        return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Matrix reference"));
    };
    data.iter()
        .map(|v| match v {
            Value::Number(n) => n.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "matrix entry is not finite")),
            other => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, format!("matrix entry is a {}, not a Number", other.type_name()))),
        })
        .collect()
}

fn number(value: f64) -> Value {
    Value::Number(BigDecimal::from_f64_exact(value))
}

/// `Sigma(matrix)`: sum of all entries. Polls cancellation between
/// additions since this can run inside an `Async` task over a large
/// matrix (spec §5).
pub fn sigma(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let values = take_numbers(evaluator, &args)?;
    let mut total = 0.0;
    for value in values {
        if evaluator.is_cancelled() {
            return Err(CantusError::Cancelled);
        }
        total += value;
    }
    Ok(number(total))
}

/// `Product(matrix)`: product of all entries.
pub fn product(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let values = take_numbers(evaluator, &args)?;
    let mut total = 1.0;
    for value in values {
        if evaluator.is_cancelled() {
            return Err(CantusError::Cancelled);
        }
        total *= value;
    }
    Ok(number(total))
}

pub fn mean(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let values = take_numbers(evaluator, &args)?;
    if values.is_empty() {
        return Ok(Value::Undefined);
    }
    Ok(number(values.iter().sum::<f64>() / values.len() as f64))
}

pub fn median(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let mut values = take_numbers(evaluator, &args)?;
    if values.is_empty() {
        return Ok(Value::Undefined);
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = values.len() / 2;
    let result = if values.len() % 2 == 0 { (values[mid - 1] + values[mid]) / 2.0 } else { values[mid] };
    Ok(number(result))
}

/// Most frequent value; ties broken by the lowest value, matching the
/// curated reference's tiebreak rule.
pub fn mode(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let mut values = take_numbers(evaluator, &args)?;
    if values.is_empty() {
        return Ok(Value::Undefined);
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mut best_value = values[0];
    let mut best_count = 0usize;
    let mut run_value = values[0];
    let mut run_count = 0usize;
    for value in &values {
        if (*value - run_value).abs() < 1e-12 {
            run_count += 1;
        } else {
            run_value = *value;
            run_count = 1;
        }
        if run_count > best_count {
            best_count = run_count;
            best_value = run_value;
        }
    }
    Ok(number(best_value))
}

/// Population variance (divide by `n`, not `n - 1`), matching the
/// curated reference's convention.
pub fn variance(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let values = take_numbers(evaluator, &args)?;
    if values.is_empty() {
        return Ok(Value::Undefined);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(number(variance))
}

pub fn stdev(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let Value::Number(variance) = variance(evaluator, args)? else {
        return Ok(Value::Undefined);
    };
    Ok(number(variance.to_f64().unwrap_or(0.0).sqrt()))
}

/// `Percentile(matrix, p)`: nearest-rank method, `p` in `[0, 100]`.
pub fn percentile(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let mut values = take_numbers(evaluator, &args)?;
    let Some(Value::Number(p)) = args.positional.get(1) else {
        return Err(CantusError::argument_count("(matrix, percentile)", args.positional.len()));
    };
    let p = p.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "percentile must be finite"))?;
    if values.is_empty() {
        return Ok(Value::Undefined);
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let rank = ((p / 100.0) * values.len() as f64).ceil() as usize;
    let index = rank.saturating_sub(1).min(values.len() - 1);
    Ok(number(values[index]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;

    fn make_matrix(evaluator: &mut Evaluator, values: Vec<f64>) -> Value {
        let len = values.len();
        let data = values.into_iter().map(BigDecimal::from_f64_exact).map(Value::Number).collect();
        let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data, rows: 1, cols: len });
        Value::Matrix(reference)
    }

    #[test]
    fn sigma_of_one_to_ten_is_fifty_five() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, (1..=10).map(|n| n as f64).collect());
        let result = sigma(&mut evaluator, CallArgs::positional(vec![m])).unwrap();
        assert_eq!(result, number(55.0));
    }

    #[test]
    fn median_of_even_length_averages_middle_two() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, vec![1.0, 2.0, 3.0, 4.0]);
        let result = median(&mut evaluator, CallArgs::positional(vec![m])).unwrap();
        assert_eq!(result, number(2.5));
    }

    #[test]
    fn mode_breaks_ties_toward_lowest_value() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let m = make_matrix(&mut evaluator, vec![1.0, 1.0, 2.0, 2.0, 3.0]);
        let result = mode(&mut evaluator, CallArgs::positional(vec![m])).unwrap();
        assert_eq!(result, number(1.0));
    }
}
