//! Pluggable I/O callback surface.
//!
//! Grounded on the teacher's `io.rs` callback-trait shape, adapted to
//! spec §6's `on_write`/`on_read`/`on_clear_console` contract. A default
//! stdin/stdout-backed implementation is provided for embedders that do
//! not need to intercept console I/O.

use std::io::Write as _;

use crate::value::Value;

/// Distinguishes `Print`-style output from diagnostic/error output so a
/// host can route them to different surfaces (e.g. a REPL's output pane
/// vs. its status bar).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Print,
    Error,
}

/// The kind of input a `Read`-family built-in is requesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Line,
    Char,
    Confirm,
}

/// Host-supplied console I/O. Built-ins route through this trait instead
/// of touching stdin/stdout directly, so an embedding GUI or web host can
/// redirect script I/O without the evaluator knowing the difference.
pub trait IoCallbacks {
    fn on_write(&self, kind: OutputKind, text: &str);
    fn on_read(&self, mode: ReadMode, prompt: &str) -> Option<Value>;
    fn on_clear_console(&self);
}

/// Default stdin/stdout-backed callbacks, used when an embedder attaches
/// no custom [`IoCallbacks`].
#[derive(Debug, Default)]
pub struct StdIoCallbacks;

impl IoCallbacks for StdIoCallbacks {
    fn on_write(&self, kind: OutputKind, text: &str) {
        match kind {
            OutputKind::Print => {
                println!("{text}");
            }
            OutputKind::Error => {
                eprintln!("{text}");
            }
        }
        let _ = std::io::stdout().flush();
    }

    fn on_read(&self, mode: ReadMode, prompt: &str) -> Option<Value> {
        if !prompt.is_empty() {
            print!("{prompt}");
            let _ = std::io::stdout().flush();
        }
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return None;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        match mode {
            ReadMode::Line => Some(Value::Text(line.to_string())),
            ReadMode::Char => Some(Value::Text(line.chars().next()?.to_string())),
            ReadMode::Confirm => Some(Value::Boolean(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))),
        }
    }

    fn on_clear_console(&self) {
        print!("\x1B[2J\x1B[1;1H");
        let _ = std::io::stdout().flush();
    }
}
