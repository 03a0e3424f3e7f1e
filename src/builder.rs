use std::sync::Arc;

use tokio::sync::mpsc;

use crate::command::ProcessCommand;
use crate::fault::FaultSink;
use crate::types::OutputDest;

pub struct ProcessCommandBuilder {
    command: ProcessCommand,
}

impl ProcessCommandBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            command: ProcessCommand::new(program),
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.command.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.command
            .args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Append one `KEY=VALUE` entry. A later entry overrides an earlier
    /// one with the same key.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.command.env.push(format!("{}={}", key, value));
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            self.command
                .env
                .push(format!("{}={}", key.as_ref(), value.as_ref()));
        }
        self
    }

    /// Copy the parent process's environment into the entry list. The
    /// child inherits nothing unless this (or an explicit `env` call)
    /// provides it.
    pub fn inherit_env(mut self) -> Self {
        self.command
            .env
            .extend(std::env::vars().map(|(key, value)| format!("{}={}", key, value)));
        self
    }

    /// Feed the child's stdin from `source`. Lines are written verbatim;
    /// stdin is closed once every sender is dropped.
    pub fn stdin(mut self, source: mpsc::Receiver<String>) -> Self {
        self.command.stdin = Some(source);
        self
    }

    /// Route stdout lines. Accepts an [`OutputDest`] or an
    /// `mpsc::Sender<String>` sink directly.
    pub fn stdout(mut self, dest: impl Into<OutputDest>) -> Self {
        self.command.stdout = dest.into();
        self
    }

    /// Route stderr lines.
    pub fn stderr(mut self, dest: impl Into<OutputDest>) -> Self {
        self.command.stderr = dest.into();
        self
    }

    /// Replace the default logging fault sink.
    pub fn fault_sink(mut self, sink: impl FaultSink + 'static) -> Self {
        self.command.fault_sink = Arc::new(sink);
        self
    }

    pub fn build(self) -> ProcessCommand {
        self.command
    }
}
