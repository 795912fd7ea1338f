//! Trigonometric built-ins.
//!
//! Dispatches on the evaluator's [`crate::evaluator::AngleMode`]; results
//! are rounded to 10 significant digits to mask floating-point drift, per
//! spec §4.F's "round to 9-11 significant digits" requirement.

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    evaluator::{AngleMode, Evaluator},
    function::CallArgs,
    value::{bigdecimal::BigDecimal, Value},
};

const ROUND_SIG_DIGITS: u32 = 10;

fn one_arg(args: &CallArgs) -> CantusResult<f64> {
    let Some(Value::Number(n)) = args.positional.first() else {
        return Err(CantusError::argument_count("1 numeric", args.positional.len()));
    };
    n.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a finite number"))
}

fn to_radians(evaluator: &Evaluator, angle: f64) -> f64 {
    match evaluator.config.angle_mode {
        AngleMode::Degrees => angle.to_radians(),
        AngleMode::Radians => angle,
    }
}

fn rounded(value: f64) -> Value {
    Value::Number(BigDecimal::from_f64_exact(value).round_sf_banker(ROUND_SIG_DIGITS))
}

pub fn sin(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let x = one_arg(&args)?;
    Ok(rounded(to_radians(evaluator, x).sin()))
}

pub fn cos(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let x = one_arg(&args)?;
    Ok(rounded(to_radians(evaluator, x).cos()))
}

pub fn tan(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let x = one_arg(&args)?;
    Ok(rounded(to_radians(evaluator, x).tan()))
}

pub fn cot(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let x = one_arg(&args)?;
    let t = to_radians(evaluator, x).tan();
    Ok(if t == 0.0 { Value::Undefined } else { rounded(1.0 / t) })
}

pub fn sec(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let x = one_arg(&args)?;
    let c = to_radians(evaluator, x).cos();
    Ok(if c == 0.0 { Value::Undefined } else { rounded(1.0 / c) })
}

pub fn csc(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let x = one_arg(&args)?;
    let s = to_radians(evaluator, x).sin();
    Ok(if s == 0.0 { Value::Undefined } else { rounded(1.0 / s) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;

    #[test]
    fn sin_of_30_degrees_is_one_half() {
        let mut config = EvaluatorConfig::default();
        config.angle_mode = AngleMode::Degrees;
        let mut evaluator = Evaluator::new(config);
        let args = CallArgs::positional(vec![Value::Number(BigDecimal::from_i64(30))]);
        let result = sin(&mut evaluator, args).unwrap();
        let Value::Number(n) = result else { panic!("expected number") };
        assert!((n.to_f64().unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn cot_of_zero_is_undefined() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let args = CallArgs::positional(vec![Value::Number(BigDecimal::zero())]);
        assert!(cot(&mut evaluator, args).unwrap().is_undefined());
    }
}
