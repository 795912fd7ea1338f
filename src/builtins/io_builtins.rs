//! `Print`, `ReadLine`, `ReadChar`, `Confirm`, `ClearConsole` — thin
//! call-throughs to [`crate::io::IoCallbacks`], per spec §6.

use crate::{
    error::{CantusError, CantusResult},
    evaluator::Evaluator,
    function::CallArgs,
    io::{OutputKind, ReadMode},
    value::Value,
};

fn render_argument(evaluator: &Evaluator, value: &Value) -> String {
    crate::render::render(evaluator, value)
}

/// `Print(value)`: writes the rendered value followed by a newline,
/// returns the value unchanged (so `Print` can sit inside an expression
/// chain).
pub fn print(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let value = args.positional.first().cloned().unwrap_or(Value::Undefined);
    let text = render_argument(evaluator, &value);
    evaluator.io().on_write(OutputKind::Print, &text);
    Ok(value)
}

/// `ReadLine(prompt)`: `Undefined` if the host surface has no input to
/// give (EOF, closed stream) — this is an `Io` condition a script can
/// recover from via `try`/`catch`, not automatic.
pub fn read_line(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let prompt = match args.positional.first() {
        Some(Value::Text(s)) => s.as_str(),
        _ => "",
    };
    evaluator.io().on_read(ReadMode::Line, prompt).ok_or_else(|| CantusError::Io("no input available".to_string()))
}

pub fn read_char(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let prompt = match args.positional.first() {
        Some(Value::Text(s)) => s.as_str(),
        _ => "",
    };
    evaluator.io().on_read(ReadMode::Char, prompt).ok_or_else(|| CantusError::Io("no input available".to_string()))
}

/// `Confirm(prompt)`: `Boolean`, defaulting to `false` on no input rather
/// than erroring, since a yes/no prompt has a natural closed-world
/// default.
pub fn confirm(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let prompt = match args.positional.first() {
        Some(Value::Text(s)) => s.as_str(),
        _ => "",
    };
    Ok(evaluator.io().on_read(ReadMode::Confirm, prompt).unwrap_or(Value::Boolean(false)))
}

pub fn clear_console(evaluator: &mut Evaluator, _args: CallArgs) -> CantusResult<Value> {
    evaluator.io().on_clear_console();
    Ok(Value::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;

    #[test]
    fn print_returns_its_argument_unchanged() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let value = Value::Text("hello".to_string());
        let result = print(&mut evaluator, CallArgs::positional(vec![value.clone()])).unwrap();
        assert_eq!(result, value);
    }
}
