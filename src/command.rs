use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::fault::{FaultSink, LoggingFaultSink};
use crate::types::OutputDest;

/// Specification for one child process launch.
///
/// Fields may be filled in directly or through
/// [`ProcessCommandBuilder`](crate::ProcessCommandBuilder). The
/// specification is consumed by [`spawn`](Self::spawn); the stdin source,
/// if any, moves into its relay task.
pub struct ProcessCommand {
    /// Program to execute.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Environment as ordered `KEY=VALUE` entries, applied onto a cleared
    /// environment; a later duplicate key overrides an earlier one. Leave
    /// empty to run the child with no environment at all, or use
    /// [`inherit_env`](crate::ProcessCommandBuilder::inherit_env) to copy
    /// the parent's.
    pub env: Vec<String>,
    /// Optional source of stdin lines. Lines are written verbatim, so a
    /// line that should be newline-terminated must carry its own newline.
    /// Once every sender is dropped, the child's stdin is closed.
    pub stdin: Option<mpsc::Receiver<String>>,
    /// Where stdout lines go.
    pub stdout: OutputDest,
    /// Where stderr lines go.
    pub stderr: OutputDest,
    /// Receives relay faults for this launch.
    pub fault_sink: Arc<dyn FaultSink>,
}

impl ProcessCommand {
    /// Specification with no arguments or environment that echoes both
    /// output streams, supplies no stdin, and logs relay faults.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            env: Vec::new(),
            stdin: None,
            stdout: OutputDest::Echo,
            stderr: OutputDest::Echo,
            fault_sink: Arc::new(LoggingFaultSink),
        }
    }
}

impl fmt::Debug for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env)
            .field("stdin", &self.stdin.as_ref().map(|_| "source"))
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .finish_non_exhaustive()
    }
}
