//! `Async`, `Wait`, `JoinThread`, `KillThread`, `StopAll` — the
//! script-facing face of [`crate::tasks::ThreadController`].
//!
//! `Async` spawns the given lambda's body on its own OS thread, returning
//! a task id `Number` immediately; the spawned thread gets its own
//! [`Evaluator`]-shaped call via [`Evaluator::call_lambda`] driven with the
//! task's cancellation token bound so `Each`/`Filter`/`Sort` inside it poll
//! cooperatively (spec §5).

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    evaluator::Evaluator,
    function::CallArgs,
    tasks::TaskId,
    value::{HeapObject, Value},
};

fn take_lambda(evaluator: &Evaluator, args: &CallArgs) -> CantusResult<crate::function::Lambda> {
    let Some(Value::Lambda(reference)) = args.positional.first() else {
        return Err(CantusError::argument_count("1 Lambda", args.positional.len()));
    };
    let Some(HeapObject::Lambda(lambda)) = evaluator.arena().get(reference) else {
        return Err(CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a live Lambda reference"));
    };
    Ok(lambda.clone())
}

fn take_task_id(args: &CallArgs) -> CantusResult<TaskId> {
    match args.positional.first() {
        Some(Value::Number(n)) => {
            let raw = n.to_f64().ok_or_else(|| CantusError::evaluator(EvaluatorErrorKind::TypeMismatch, "expected a finite task id"))?;
            Ok(TaskId::from_raw(raw as u32))
        }
        _ => Err(CantusError::argument_count("1 task id", args.positional.len())),
    }
}

/// `Async(lambda)`: spawns `lambda` with no arguments on a new thread,
/// returning its task id. The spawned body runs in a fresh `Evaluator`
/// sharing nothing with the caller — scripts that need shared state pass
/// it in as captured lambda parameters, matching spec's "no shared
/// mutable heap across threads" note.
pub fn async_spawn(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let lambda = take_lambda(evaluator, &args)?;
    let config = evaluator.config;
    let id = evaluator.threads.spawn_tracked(move |token| {
        let mut worker = Evaluator::new(config);
        worker.set_current_task_token(Some(token));
        worker.call_lambda(&lambda, CallArgs::default())
    });
    Ok(Value::Number(crate::value::bigdecimal::BigDecimal::from_i64(id.raw() as i64)))
}

/// `Wait(id)`: blocks until the task finishes and returns its result.
pub fn wait(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let id = take_task_id(&args)?;
    evaluator.threads.join(id)
}

/// `JoinThread(id)`: an alias for `Wait`, matching spec's naming.
pub fn join_thread(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    wait(evaluator, args)
}

/// `KillThread(id)`: requests cooperative cancellation, returning whether
/// a task with that id was tracked.
pub fn kill_thread(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let id = take_task_id(&args)?;
    Ok(Value::Boolean(evaluator.threads.kill(id)))
}

/// `StopAll()`: cooperative cancellation of every tracked task.
pub fn stop_all(evaluator: &mut Evaluator, _args: CallArgs) -> CantusResult<Value> {
    evaluator.threads.stop_all();
    Ok(Value::Undefined)
}

/// `IsTaskFinished(id)`.
pub fn is_task_finished(evaluator: &mut Evaluator, args: CallArgs) -> CantusResult<Value> {
    let id = take_task_id(&args)?;
    Ok(Value::Boolean(evaluator.threads.is_finished(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;
    use crate::function::{Lambda, Parameter};
    use crate::parser::Expr;
    use smallvec::smallvec;

    fn make_const_lambda(evaluator: &mut Evaluator, value: i64) -> Value {
        let lambda = Lambda {
            name: None,
            params: smallvec![Parameter { name: "x".into(), default: None }],
            body: Expr::NumberLiteral(value.to_string()),
            defining_scope: "global".to_string(),
        };
        let reference = evaluator.arena_mut().insert(HeapObject::Lambda(lambda));
        Value::Lambda(reference)
    }

    #[test]
    fn async_then_wait_round_trips_the_result() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let lambda = make_const_lambda(&mut evaluator, 7);
        let id = async_spawn(&mut evaluator, CallArgs::positional(vec![lambda])).unwrap();
        let result = wait(&mut evaluator, CallArgs::positional(vec![id])).unwrap();
        assert_eq!(result, Value::Number(crate::value::bigdecimal::BigDecimal::from_i64(7)));
    }

    #[test]
    fn kill_thread_of_unknown_id_returns_false() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let id = Value::Number(crate::value::bigdecimal::BigDecimal::from_i64(999));
        let result = kill_thread(&mut evaluator, CallArgs::positional(vec![id])).unwrap();
        assert_eq!(result, Value::Boolean(false));
    }
}
