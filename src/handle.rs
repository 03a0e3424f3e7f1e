use std::io;

use tokio::process::Child;
use tokio_util::sync::CancellationToken;

#[cfg(unix)]
use tokio::sync::oneshot;

/// Final status of an awaited child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    /// Exit code, if the child exited on its own.
    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }

    /// Terminating signal, if there was one.
    pub fn signal(&self) -> Option<i32> {
        match self {
            ExitStatus::Signal(sig) => Some(*sig),
            _ => None,
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if status.success() {
            ExitStatus::Success
        } else if let Some(code) = status.code() {
            ExitStatus::Error(code)
        } else {
            parse_signal_status(status)
        }
    }
}

#[cfg(unix)]
fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    status
        .signal()
        .map(ExitStatus::Signal)
        .unwrap_or(ExitStatus::Error(-1))
}

#[cfg(not(unix))]
fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
    ExitStatus::Error(-1)
}

/// A live child process.
///
/// Await [`wait`](Self::wait) to reap the child and obtain its status; the
/// relay tasks run on their own and need no further attention. Dropping the
/// handle without waiting detaches the child rather than killing it; only
/// the cancellation token passed to spawn stops a running child.
#[derive(Debug)]
pub struct ProcessHandle {
    pub(crate) child: Child,
    pub(crate) token: CancellationToken,
    #[cfg(unix)]
    pub(crate) watcher_guard: Option<oneshot::Sender<()>>,
}

impl ProcessHandle {
    /// OS pid, while the child has not been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to exit. A cancellation observed while waiting
    /// kills the child first, then reaps it.
    pub async fn wait(mut self) -> io::Result<ExitStatus> {
        // The pid-based watcher stands down before the child can be
        // reaped; from here the select below covers cancellation.
        #[cfg(unix)]
        drop(self.watcher_guard.take());

        tokio::select! {
            status = self.child.wait() => Ok(ExitStatus::from(status?)),
            _ = self.token.cancelled() => {
                let _ = self.child.start_kill();
                let status = self.child.wait().await?;
                Ok(ExitStatus::from(status))
            }
        }
    }
}
