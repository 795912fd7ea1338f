//! External host-services collaborator.
//!
//! Filesystem, process, clipboard, and HTTP primitives are explicitly out
//! of scope for the evaluator itself (spec §1 Non-goals); they are
//! specified here only as an interface an embedder implements. Built-ins
//! in `builtins::host_io` are thin call-throughs to this trait.

use crate::error::CantusResult;

/// Host-provided filesystem, process, clipboard, and network primitives.
pub trait HostServices {
    fn read_file(&self, path: &str) -> CantusResult<String>;
    fn write_file(&self, path: &str, contents: &str) -> CantusResult<()>;
    fn append_file(&self, path: &str, contents: &str) -> CantusResult<()>;
    fn file_exists(&self, path: &str) -> bool;
    fn delete_file(&self, path: &str) -> CantusResult<()>;

    /// Starts a process, returning immediately without waiting.
    fn start_process(&self, command: &str, args: &[String]) -> CantusResult<()>;
    /// Starts a process and blocks until it exits, returning captured
    /// stdout.
    fn start_process_wait(&self, command: &str, args: &[String]) -> CantusResult<String>;

    fn web_get(&self, url: &str) -> CantusResult<String>;
    fn web_post(&self, url: &str, body: &str) -> CantusResult<String>;

    fn clipboard_get(&self) -> CantusResult<String>;
    fn clipboard_set(&self, text: &str) -> CantusResult<()>;
}
