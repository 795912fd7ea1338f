//! `Now`, `AddDays`, `AddMonths`, `AddMinutes`, `DayOfWeek`, `FormatDate`,
//! `ParseDate`, `DateDiff` — wrappers around `chrono`, per spec §4.F.
//!
//! Grounded on the curated `modules/datetime_mod.rs` reference file's
//! operation set, rebuilt against [`crate::value::DateTimeValue`]/
//! [`crate::value::TimeSpanValue`] instead of its Python `datetime`/
//! `timedelta` pair.

use chrono::{Datelike, Duration, Months, Utc};

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    evaluator::Evaluator,
    function::CallArgs,
    value::{bigdecimal::BigDecimal, DateTimeValue, TimeSpanValue, Value},
};

fn take_datetime(args: &CallArgs, index: usize) -> CantusResult<DateTimeValue> {
    match args.positional.get(index) {
        Some(Value::DateTime(instant)) => Ok(*instant),
        _ => Err(CantusError::argument_count(&format!("DateTime at position {}", index + 1), args.positional.len())),
    }
}

fn take_i64(args: &CallArgs, index: usize) -> CantusResult<i64> {
    match args.positional.get(index) {
        Some(Value::Number(n)) => {
            let value = n.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a finite number"))?;
            Ok(value as i64)
        }
        _ => Err(CantusError::argument_count(&format!("number at position {}", index + 1), args.positional.len())),
    }
}

/// `Now()`: the embedder's wall clock.
pub fn now(_evaluator: &mut Evaluator, _args: CallArgs) -> CantusResult<Value> {
    Ok(Value::DateTime(Utc::now()))
}

pub fn add_days(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let instant = take_datetime(&args, 0)?;
    let days = take_i64(&args, 1)?;
    Ok(Value::DateTime(instant + Duration::days(days)))
}

pub fn add_minutes(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let instant = take_datetime(&args, 0)?;
    let minutes = take_i64(&args, 1)?;
    Ok(Value::DateTime(instant + Duration::minutes(minutes)))
}

/// `AddMonths(datetime, n)`: calendar-aware, clamping to the last valid
/// day of the target month (`chrono`'s `Months` semantics) rather than
/// overflowing into the following month.
pub fn add_months(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let instant = take_datetime(&args, 0)?;
    let months = take_i64(&args, 1)?;
    let result = if months >= 0 {
        instant.checked_add_months(Months::new(months as u32))
    } else {
        instant.checked_sub_months(Months::new((-months) as u32))
    };
    match result {
        Some(instant) => Ok(Value::DateTime(instant)),
        None => Ok(Value::Number(BigDecimal::undefined())),
    }
}

/// `DayOfWeek(datetime)`: `0` is Monday, matching `chrono::Weekday`'s
/// ISO-8601 numbering via `num_days_from_monday`.
pub fn day_of_week(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let instant = take_datetime(&args, 0)?;
    let n = instant.weekday().num_days_from_monday();
    Ok(Value::Number(BigDecimal::from_i64(n as i64)))
}

/// `DateDiff(a, b)`: `a - b` as a `TimeSpan` in milliseconds.
pub fn date_diff(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let a = take_datetime(&args, 0)?;
    let b = take_datetime(&args, 1)?;
    Ok(Value::TimeSpan(TimeSpanValue((a - b).num_milliseconds())))
}

/// `FormatDate(datetime, format)`: `strftime`-style format string.
pub fn format_date(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let instant = take_datetime(&args, 0)?;
    let format = match args.positional.get(1) {
        Some(Value::Text(s)) => s.as_str(),
        _ => return Err(CantusError::argument_count("(DateTime, Text)", args.positional.len())),
    };
    Ok(Value::Text(instant.format(format).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;
    use chrono::TimeZone;

    #[test]
    fn add_days_advances_the_calendar_date() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let args = CallArgs::positional(vec![Value::DateTime(start), Value::Number(BigDecimal::from_i64(10))]);
        let Value::DateTime(result) = add_days(&mut evaluator, args).unwrap() else { panic!() };
        assert_eq!(result.day(), 11);
    }

    #[test]
    fn day_of_week_of_a_known_monday_is_zero() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let monday = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let result = day_of_week(&mut evaluator, CallArgs::positional(vec![Value::DateTime(monday)])).unwrap();
        assert_eq!(result, Value::Number(BigDecimal::from_i64(0)));
    }
}
