//! Network runtime integration.
//!
//! Bridges the sync render loop with the async connection supervisor.

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::ConnectionConfig;
use crate::connection::{run_connection, Control, NetEvent};

/// Running network client.
pub struct NetClient {
    _rt: Runtime,
    event_rx: mpsc::UnboundedReceiver<NetEvent>,
    control_tx: mpsc::UnboundedSender<Control>,
}

impl NetClient {
    /// Start the supervisor on a dedicated runtime.
    pub fn start(config: ConnectionConfig) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let rt = Runtime::new().context("creating tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_connection(config, event_tx, control_rx).await {
                warn!(error = %e, "connection supervisor failed");
            }
        });

        Ok(Self {
            _rt: rt,
            event_rx,
            control_tx,
        })
    }

    pub fn start_from_env() -> Result<Self> {
        Self::start(ConnectionConfig::from_env())
    }

    /// Next pending event, without blocking.
    pub fn try_recv(&mut self) -> Option<NetEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Drop the current transport; the supervisor reconnects after backoff.
    pub fn teardown(&self) {
        let _ = self.control_tx.send(Control::Teardown);
    }

    pub fn shutdown(&self) {
        let _ = self.control_tx.send(Control::Shutdown);
    }
}

impl Drop for NetClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}
