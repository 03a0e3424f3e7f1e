//! # procstream
//!
//! Launch a child process and stream its line-oriented I/O over async
//! channels: lines from an optional source feed the child's stdin, and
//! each output stream is relayed line-by-line into a sink or echoed to the
//! parent's own stdout/stderr. Cancelling the token passed to spawn kills
//! the child.
//!
//! ## Usage
//!
//! ```no_run
//! use procstream::{CancellationToken, ProcessCommandBuilder};
//! use tokio::sync::mpsc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let (tx, mut rx) = mpsc::channel::<String>(16);
//! let command = ProcessCommandBuilder::new("echo")
//!     .arg("Hello George")
//!     .stdout(tx)
//!     .build();
//!
//! let handle = command.spawn(CancellationToken::new())?;
//! while let Some(line) = rx.recv().await {
//!     println!("child: {}", line);
//! }
//! let status = handle.wait().await?;
//! assert!(status.success());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `command` - the process specification
//! - `builder` - fluent specification construction
//! - `types` - stream identifiers and output destinations
//! - `error` - launch errors and relay faults
//! - `fault` - fault sinks for relay failures
//! - `handle` - the live process handle and exit status
pub mod builder;
pub mod command;
pub mod error;
pub mod fault;
pub mod handle;
pub mod types;

mod spawn;

#[cfg(test)]
mod tests;

pub use builder::ProcessCommandBuilder;
pub use command::ProcessCommand;
pub use error::{RelayFault, SpawnError};
pub use fault::{ChannelFaultSink, FaultSink, LoggingFaultSink};
pub use handle::{ExitStatus, ProcessHandle};
pub use types::{OutputDest, StreamSource};

pub use tokio_util::sync::CancellationToken;
