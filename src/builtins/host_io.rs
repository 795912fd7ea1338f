//! `ReadFile`, `WriteFile`, `AppendFile`, `FileExists`, `DeleteFile`,
//! `StartProcess`, `StartProcessWait`, `WebGet`, `WebPost`,
//! `ClipboardGet`, `ClipboardSet` — call-throughs to
//! [`crate::host::HostServices`].
//!
//! These are the one built-in family with no fallback behavior when no
//! host is attached (`Evaluator::with_host` was never called): they
//! surface an `Io` error naming the missing capability, rather than
//! silently returning `Undefined`, since a script that calls `WriteFile`
//! expects either a write or a diagnosable failure.

use crate::{error::{CantusError, CantusResult}, evaluator::Evaluator, function::CallArgs, value::Value};

fn host(evaluator: &Evaluator, capability: &str) -> CantusResult<&dyn crate::host::HostServices> {
    evaluator.host().ok_or_else(|| CantusError::Io(format!("no host attached for `{capability}`")))
}

fn take_text<'a>(args: &'a CallArgs, index: usize) -> CantusResult<&'a str> {
    match args.positional.get(index) {
        Some(Value::Text(s)) => Ok(s.as_str()),
        _ => Err(CantusError::argument_count(&format!("Text at position {}", index + 1), args.positional.len())),
    }
}

fn take_text_list(args: &CallArgs, start: usize) -> Vec<String> {
    args.positional[start..]
        .iter()
        .filter_map(|v| match v {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

pub fn read_file(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let path = take_text(&args, 0)?;
    Ok(Value::Text(host(evaluator, "ReadFile")?.read_file(path)?))
}

pub fn write_file(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let path = take_text(&args, 0)?;
    let contents = take_text(&args, 1)?;
    host(evaluator, "WriteFile")?.write_file(path, contents)?;
    Ok(Value::Undefined)
}

pub fn append_file(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let path = take_text(&args, 0)?;
    let contents = take_text(&args, 1)?;
    host(evaluator, "AppendFile")?.append_file(path, contents)?;
    Ok(Value::Undefined)
}

pub fn file_exists(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let path = take_text(&args, 0)?;
    Ok(Value::Boolean(host(evaluator, "FileExists")?.file_exists(path)))
}

pub fn delete_file(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let path = take_text(&args, 0)?;
    host(evaluator, "DeleteFile")?.delete_file(path)?;
    Ok(Value::Undefined)
}

pub fn start_process(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let command = take_text(&args, 0)?;
    let rest = take_text_list(&args, 1);
    host(evaluator, "StartProcess")?.start_process(command, &rest)?;
    Ok(Value::Undefined)
}

pub fn start_process_wait(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let command = take_text(&args, 0)?;
    let rest = take_text_list(&args, 1);
    Ok(Value::Text(host(evaluator, "StartProcessWait")?.start_process_wait(command, &rest)?))
}

pub fn web_get(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let url = take_text(&args, 0)?;
    Ok(Value::Text(host(evaluator, "WebGet")?.web_get(url)?))
}

pub fn web_post(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let url = take_text(&args, 0)?;
    let body = take_text(&args, 1)?;
    Ok(Value::Text(host(evaluator, "WebPost")?.web_post(url, body)?))
}

pub fn clipboard_get(evaluator: &mut Evaluator, _args: CallArgs) -> CantusResult<Value> {
    Ok(Value::Text(host(evaluator, "ClipboardGet")?.clipboard_get()?))
}

pub fn clipboard_set(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let text = take_text(&args, 0)?;
    host(evaluator, "ClipboardSet")?.clipboard_set(text)?;
    Ok(Value::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;

    #[test]
    fn missing_host_surfaces_as_io_error() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let args = CallArgs::positional(vec![Value::Text("/tmp/x".to_string())]);
        let err = read_file(&mut evaluator, args).unwrap_err();
        assert!(matches!(err, CantusError::Io(_)));
    }
}
