//! Launch path: command construction, pipe wiring, and the relay tasks.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[cfg(unix)]
use tokio::sync::oneshot;

use crate::command::ProcessCommand;
use crate::error::{RelayFault, SpawnError};
use crate::fault::FaultSink;
use crate::handle::ProcessHandle;
use crate::types::{OutputDest, StreamSource};

impl ProcessCommand {
    /// Launch the child and start its relay tasks.
    ///
    /// Must be called from within a tokio runtime. Returns once the child
    /// is running with its relays attached; await the returned
    /// [`ProcessHandle`] to reap the child. Cancelling `token` kills the
    /// child, after which the relays drain to end-of-file and shut down on
    /// their own.
    pub fn spawn(self, token: CancellationToken) -> Result<ProcessHandle, SpawnError> {
        log_spawn(&self);

        let mut cmd = configure_command(&self);
        let mut child = cmd.spawn().map_err(|e| map_spawn_error(&self, e))?;

        let stdin_pipe = child.stdin.take();
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        if self.stdin.is_some() && stdin_pipe.is_none() {
            return Err(abort_spawn(&mut child, "stdin"));
        }
        let stdout_pipe = match stdout_pipe {
            Some(pipe) => pipe,
            None => return Err(abort_spawn(&mut child, "stdout")),
        };
        let stderr_pipe = match stderr_pipe {
            Some(pipe) => pipe,
            None => return Err(abort_spawn(&mut child, "stderr")),
        };

        // Every handle is in hand; only now do any tasks start.
        if let (Some(source), Some(pipe)) = (self.stdin, stdin_pipe) {
            tokio::spawn(relay_stdin(source, pipe, Arc::clone(&self.fault_sink)));
        }
        tokio::spawn(relay_output(
            StreamSource::Stdout,
            stdout_pipe,
            self.stdout,
            Arc::clone(&self.fault_sink),
        ));
        tokio::spawn(relay_output(
            StreamSource::Stderr,
            stderr_pipe,
            self.stderr,
            Arc::clone(&self.fault_sink),
        ));

        #[cfg(unix)]
        let watcher_guard = child.id().map(|pid| spawn_kill_watcher(pid, token.clone()));

        Ok(ProcessHandle {
            child,
            token,
            #[cfg(unix)]
            watcher_guard,
        })
    }
}

fn configure_command(command: &ProcessCommand) -> Command {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args);

    // The child sees exactly the configured entries, nothing inherited.
    cmd.env_clear();
    for entry in &command.env {
        match entry.split_once('=') {
            Some((key, value)) => cmd.env(key, value),
            None => cmd.env(entry, ""),
        };
    }

    cmd.stdin(match command.stdin {
        Some(_) => Stdio::piped(),
        None => Stdio::null(),
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd
}

fn map_spawn_error(command: &ProcessCommand, err: std::io::Error) -> SpawnError {
    if err.kind() == std::io::ErrorKind::NotFound {
        SpawnError::CommandNotFound(command.program.clone())
    } else {
        SpawnError::Spawn {
            command: format_command(command),
            source: err,
        }
    }
}

// A pipe we configured is missing; don't leave the child running.
fn abort_spawn(child: &mut Child, stream: &'static str) -> SpawnError {
    let _ = child.start_kill();
    SpawnError::Pipe { stream }
}

fn format_command(command: &ProcessCommand) -> String {
    if command.args.is_empty() {
        command.program.clone()
    } else {
        format!("{} {}", command.program, command.args.join(" "))
    }
}

fn log_spawn(command: &ProcessCommand) {
    tracing::debug!("Spawning process: {}", format_command(command));
    if !command.env.is_empty() {
        tracing::trace!("Environment entries: {}", command.env.len());
    }
}

/// Writes each line from the source to the child's stdin, verbatim, then
/// closes stdin exactly once when the source is exhausted.
async fn relay_stdin(
    mut source: mpsc::Receiver<String>,
    mut pipe: ChildStdin,
    faults: Arc<dyn FaultSink>,
) {
    while let Some(line) = source.recv().await {
        if let Err(e) = pipe.write_all(line.as_bytes()).await {
            faults.report(RelayFault::StdinWrite(e));
            return;
        }
    }
    match pipe.shutdown().await {
        Ok(()) => tracing::trace!("stdin source exhausted; child stdin closed"),
        Err(e) => faults.report(RelayFault::StdinClose(e)),
    }
}

async fn relay_output<R>(stream: StreamSource, pipe: R, dest: OutputDest, faults: Arc<dyn FaultSink>)
where
    R: AsyncRead + Unpin,
{
    let lines = BufReader::new(pipe).lines();
    match dest {
        OutputDest::Forward(sink) => forward_lines(stream, lines, sink, faults).await,
        OutputDest::Echo => match stream {
            StreamSource::Stdout => echo_lines(stream, lines, tokio::io::stdout(), faults).await,
            StreamSource::Stderr => echo_lines(stream, lines, tokio::io::stderr(), faults).await,
        },
    }
}

/// Forwards decoded lines into the sink, in order, blocking while the sink
/// is full. The sink closes when this task drops it, on the end-of-stream
/// and fault paths alike.
async fn forward_lines<R>(
    stream: StreamSource,
    mut lines: Lines<BufReader<R>>,
    sink: mpsc::Sender<String>,
    faults: Arc<dyn FaultSink>,
) where
    R: AsyncRead + Unpin,
{
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if sink.send(line).await.is_err() {
                    faults.report(RelayFault::SinkClosed { stream });
                    return;
                }
            }
            Ok(None) => {
                tracing::trace!("{} relay reached end of stream", stream);
                return;
            }
            Err(e) => {
                faults.report(RelayFault::Read { stream, source: e });
                return;
            }
        }
    }
}

/// Copies decoded lines to the parent's own stream, re-appending the
/// newline the line reader strips.
async fn echo_lines<R, W>(
    stream: StreamSource,
    mut lines: Lines<BufReader<R>>,
    mut out: W,
    faults: Arc<dyn FaultSink>,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let buffered = format!("{}\n", line);
                if let Err(e) = out.write_all(buffered.as_bytes()).await {
                    faults.report(RelayFault::Echo { stream, source: e });
                    return;
                }
                if let Err(e) = out.flush().await {
                    faults.report(RelayFault::Echo { stream, source: e });
                    return;
                }
            }
            Ok(None) => {
                tracing::trace!("{} relay reached end of stream", stream);
                return;
            }
            Err(e) => {
                faults.report(RelayFault::Read { stream, source: e });
                return;
            }
        }
    }
}

/// Kills the child if the token fires before the handle stands the watcher
/// down. Runs until one of the two happens.
#[cfg(unix)]
fn spawn_kill_watcher(pid: u32, token: CancellationToken) -> oneshot::Sender<()> {
    let (guard, stand_down) = oneshot::channel::<()>();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Cancellation requested; killing pid {}", pid);
                kill_process(pid);
            }
            _ = stand_down => {}
        }
    });
    guard
}

#[cfg(unix)]
fn kill_process(pid: u32) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        tracing::debug!("Failed to kill pid {}: {}", pid, e);
    }
}
