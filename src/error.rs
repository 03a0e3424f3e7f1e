use thiserror::Error;

use crate::types::StreamSource;

/// Errors returned by [`ProcessCommand::spawn`](crate::ProcessCommand::spawn)
/// before any relay work begins. No child process is left running when one
/// of these comes back.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to capture {stream} pipe")]
    Pipe { stream: &'static str },
}

/// I/O failures inside a relay task, reported through the launch's
/// [`FaultSink`](crate::FaultSink) once the child is already running.
///
/// A relay task reports at most one fault and then stops relaying.
#[derive(Error, Debug)]
pub enum RelayFault {
    #[error("Failed to write line to child stdin: {0}")]
    StdinWrite(#[source] std::io::Error),

    #[error("Failed to close child stdin: {0}")]
    StdinClose(#[source] std::io::Error),

    #[error("Failed to read child {stream}: {source}")]
    Read {
        stream: StreamSource,
        #[source]
        source: std::io::Error,
    },

    #[error("{stream} sink closed before the stream ended")]
    SinkClosed { stream: StreamSource },

    #[error("Failed to echo child {stream}: {source}")]
    Echo {
        stream: StreamSource,
        #[source]
        source: std::io::Error,
    },
}
