//! Fault reporting for relay tasks.
//!
//! A relay task that hits an I/O failure after the child has started has no
//! caller to return to; the launch call came back long ago. Each launch
//! instead carries a [`FaultSink`] that receives such failures. The default
//! sink logs them; hosts that want to observe or escalate faults install
//! their own.

use tokio::sync::mpsc;

use crate::error::RelayFault;

/// Receives relay faults for a single launch.
///
/// `report` is called from inside a relay task, at most once per task, and
/// must not block.
pub trait FaultSink: Send + Sync {
    fn report(&self, fault: RelayFault);
}

/// Default sink: log the fault at error level and move on.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingFaultSink;

impl FaultSink for LoggingFaultSink {
    fn report(&self, fault: RelayFault) {
        tracing::error!("Relay fault: {}", fault);
    }
}

/// Forwards faults into a channel so the host can react to them.
#[derive(Debug, Clone)]
pub struct ChannelFaultSink {
    sender: mpsc::UnboundedSender<RelayFault>,
}

impl ChannelFaultSink {
    pub fn new(sender: mpsc::UnboundedSender<RelayFault>) -> Self {
        Self { sender }
    }
}

impl FaultSink for ChannelFaultSink {
    fn report(&self, fault: RelayFault) {
        if self.sender.send(fault).is_err() {
            tracing::debug!("Fault receiver dropped; discarding relay fault");
        }
    }
}
