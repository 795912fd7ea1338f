//! Text built-ins: `Split`, `Join`, `Replace`, `ToUpper`, `ToLower`, `Trim`,
//! `PadLeft`, `PadRight`, `RegexMatch`, `RegexReplace`, `ParseNumber`.
//!
//! `RegexMatch`/`RegexReplace` use `fancy-regex` rather than `regex` since
//! spec's pattern language allows backreferences and lookaround that
//! `regex`'s linear-time engine rejects at compile time.

use fancy_regex::Regex;

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    evaluator::Evaluator,
    function::CallArgs,
    value::{bigdecimal::BigDecimal, HeapObject, Value},
};

fn take_text(args: &CallArgs, index: usize) -> CantusResult<&str> {
    match args.positional.get(index) {
        Some(Value::Text(s)) => Ok(s.as_str()),
        _ => Err(CantusError::argument_count(&format!("Text at position {}", index + 1), args.positional.len())),
    }
}

fn compile(pattern: &str) -> CantusResult<Regex> {
    Regex::new(pattern).map_err(|err| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, format!("invalid pattern: {err}")))
}

/// `Split(text, separator)`.
pub fn split(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let text = take_text(&args, 0)?;
    let sep = take_text(&args, 1)?;
    let parts: Vec<Value> = text.split(sep).map(|s| Value::Text(s.to_string())).collect();
    let len = parts.len();
    let reference = evaluator.arena_mut().insert(HeapObject::Matrix { data: parts, rows: 1, cols: len });
    Ok(Value::Matrix(reference))
}

/// `Join(matrix, separator)`: joins a Matrix of `Text` entries.
pub fn join(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let Some(Value::Matrix(reference)) = args.positional.first() else {
        return Err(CantusError::argument_count("(Matrix, Text)", args.positional.len()));
    };
    let sep = take_text(&args, 1)?;
    let Some(HeapObject::Matrix { data, .. }) = evaluator.arena().get(reference) else {
        return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Matrix reference"));
    };
    let parts = data
        .iter()
        .map(|v| match v {
            Value::Text(s) => Ok(s.clone()),
            other => Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, format!("expected Text, got {}", other.type_name()))),
        })
        .collect::<CantusResult<Vec<_>>>()?;
    Ok(Value::Text(parts.join(sep)))
}

/// `Replace(text, from, to)`: plain substring replacement, all
/// occurrences.
pub fn replace(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let text = take_text(&args, 0)?;
    let from = take_text(&args, 1)?;
    let to = take_text(&args, 2)?;
    Ok(Value::Text(text.replace(from, to)))
}

pub fn to_upper(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    Ok(Value::Text(take_text(&args, 0)?.to_uppercase()))
}

pub fn to_lower(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    Ok(Value::Text(take_text(&args, 0)?.to_lowercase()))
}

pub fn trim(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    Ok(Value::Text(take_text(&args, 0)?.trim().to_string()))
}

fn take_pad_width(args: &CallArgs) -> CantusResult<usize> {
    match args.positional.get(1) {
        Some(Value::Number(n)) => {
            let width = n.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "pad width must be finite"))?;
            Ok(width.max(0.0) as usize)
        }
        _ => Err(CantusError::argument_count("(Text, width)", args.positional.len())),
    }
}

pub fn pad_left(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let text = take_text(&args, 0)?;
    let width = take_pad_width(&args)?;
    Ok(Value::Text(format!("{text:>width$}")))
}

pub fn pad_right(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let text = take_text(&args, 0)?;
    let width = take_pad_width(&args)?;
    Ok(Value::Text(format!("{text:<width$}")))
}

/// `RegexMatch(text, pattern)`: the first match, or `Undefined`.
pub fn regex_match(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let text = take_text(&args, 0)?;
    let pattern = take_text(&args, 1)?;
    let regex = compile(pattern)?;
    match regex.find(text).map_err(|err| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, err.to_string()))? {
        Some(found) => Ok(Value::Text(found.as_str().to_string())),
        None => Ok(Value::Undefined),
    }
}

/// `RegexReplace(text, pattern, replacement)`: all matches replaced.
pub fn regex_replace(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let text = take_text(&args, 0)?;
    let pattern = take_text(&args, 1)?;
    let replacement = take_text(&args, 2)?;
    let regex = compile(pattern)?;
    Ok(Value::Text(regex.replace_all(text, replacement).into_owned()))
}

/// `ParseNumber(text)`: `Undefined` on a malformed number rather than an
/// error, matching spec's "Undefined propagation over structural errors
/// where a representable result exists" policy.
pub fn parse_number(_evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let text = take_text(&args, 0)?;
    match BigDecimal::from_str_lenient(text) {
        Ok(n) => Ok(Value::Number(n)),
        Err(_) => Ok(Value::Number(BigDecimal::undefined())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;

    #[test]
    fn split_and_join_round_trip() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let text = Value::Text("a,b,c".to_string());
        let sep = Value::Text(",".to_string());
        let parts = split(&mut evaluator, CallArgs::positional(vec![text, sep.clone()])).unwrap();
        let rejoined = join(&mut evaluator, CallArgs::positional(vec![parts, sep])).unwrap();
        assert_eq!(rejoined, Value::Text("a,b,c".to_string()));
    }

    #[test]
    fn regex_replace_substitutes_every_match() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let args = CallArgs::positional(vec![
            Value::Text("a1b2c3".to_string()),
            Value::Text(r"\d".to_string()),
            Value::Text("#".to_string()),
        ]);
        let result = regex_replace(&mut evaluator, args).unwrap();
        assert_eq!(result, Value::Text("a#b#c#".to_string()));
    }

    #[test]
    fn parse_number_of_garbage_is_undefined_not_an_error() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let result = parse_number(&mut evaluator, CallArgs::positional(vec![Value::Text("nope".to_string())])).unwrap();
        assert!(result.is_undefined());
    }
}
