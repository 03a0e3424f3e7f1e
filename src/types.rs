//! Stream identifiers and output destinations.

use tokio::sync::mpsc;

/// Stream source identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

impl std::fmt::Display for StreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamSource::Stdout => write!(f, "stdout"),
            StreamSource::Stderr => write!(f, "stderr"),
        }
    }
}

/// Destination for one of the child's output streams, chosen at
/// configuration time.
#[derive(Debug, Clone)]
pub enum OutputDest {
    /// Push each line into the sink, waiting whenever it is full. The
    /// relay drops the sender when the stream ends, which closes the
    /// channel on the receiving side.
    Forward(mpsc::Sender<String>),
    /// Write each line, with a trailing newline, to the parent's own
    /// stdout or stderr.
    Echo,
}

impl Default for OutputDest {
    fn default() -> Self {
        Self::Echo
    }
}

impl From<mpsc::Sender<String>> for OutputDest {
    fn from(sink: mpsc::Sender<String>) -> Self {
        OutputDest::Forward(sink)
    }
}
