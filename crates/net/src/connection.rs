//! Connection supervisor.
//!
//! A single async loop owns the transport. It walks an explicit state machine
//! (`Connecting -> Open -> Closing -> Reconnecting -> Connecting`) and reports
//! everything the render loop needs as [`NetEvent`]s on an unbounded channel.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::protocol::{parse_message, Inbound};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Reconnecting,
}

impl ConnectionState {
    /// Whether `self -> to` is a legal transition.
    pub fn can_transition(self, to: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, to),
            (Connecting, Open)
                | (Connecting, Closing)
                | (Open, Closing)
                | (Closing, Reconnecting)
                | (Reconnecting, Connecting)
        )
    }
}

/// What the network side tells the render loop.
#[derive(Debug, Clone, PartialEq)]
pub enum NetEvent {
    Connected,
    Message(Inbound),
    /// The transport closed. All per-session viewer state must be rebuilt.
    Disconnected { reason: String },
}

/// Requests from the render loop to the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Drop the current transport and reconnect.
    Teardown,
    /// Stop for good.
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionEnd {
    Lost(String),
    TornDown,
    Shutdown,
}

struct Supervisor {
    state: ConnectionState,
}

impl Supervisor {
    fn transition(&mut self, to: ConnectionState) {
        debug_assert!(
            self.state.can_transition(to),
            "illegal transition {:?} -> {:?}",
            self.state,
            to
        );
        debug!(from = ?self.state, to = ?to, "connection state");
        self.state = to;
    }
}

/// Run the supervisor until shut down.
///
/// Returns when a [`Control::Shutdown`] arrives or either channel closes.
pub async fn run_connection(
    config: ConnectionConfig,
    events: mpsc::UnboundedSender<NetEvent>,
    mut control: mpsc::UnboundedReceiver<Control>,
) -> anyhow::Result<()> {
    let address = config.address();
    let connect_line = config.connect_message().to_line()?;
    let mut sup = Supervisor {
        state: ConnectionState::Connecting,
    };

    loop {
        let end = match TcpStream::connect(&address).await {
            Ok(stream) => {
                sup.transition(ConnectionState::Open);
                info!(%address, "connected");
                if events.send(NetEvent::Connected).is_err() {
                    return Ok(());
                }
                run_session(stream, &connect_line, &config, &events, &mut control).await
            }
            Err(e) => SessionEnd::Lost(format!("connect failed: {e}")),
        };

        sup.transition(ConnectionState::Closing);
        let reason = match end {
            SessionEnd::Shutdown => {
                info!("connection supervisor shutting down");
                return Ok(());
            }
            SessionEnd::TornDown => "torn down".to_string(),
            SessionEnd::Lost(reason) => reason,
        };
        warn!(%address, %reason, "transport closed");
        if events
            .send(NetEvent::Disconnected {
                reason: reason.clone(),
            })
            .is_err()
        {
            return Ok(());
        }

        sup.transition(ConnectionState::Reconnecting);
        if wait_backoff(config.reconnect_backoff, &mut control).await {
            return Ok(());
        }
        sup.transition(ConnectionState::Connecting);
    }
}

/// Sleep out the backoff. Returns `true` if a shutdown arrived meanwhile.
async fn wait_backoff(backoff: Duration, control: &mut mpsc::UnboundedReceiver<Control>) -> bool {
    let sleep = time::sleep(backoff);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            ctl = control.recv() => match ctl {
                // Already reconnecting.
                Some(Control::Teardown) => continue,
                Some(Control::Shutdown) | None => return true,
            },
        }
    }
}

async fn run_session(
    stream: TcpStream,
    connect_line: &str,
    config: &ConnectionConfig,
    events: &mpsc::UnboundedSender<NetEvent>,
    control: &mut mpsc::UnboundedReceiver<Control>,
) -> SessionEnd {
    let (reader, mut writer) = stream.into_split();

    if let Err(e) = writer.write_all(connect_line.as_bytes()).await {
        return SessionEnd::Lost(format!("sending connect: {e}"));
    }
    if let Err(e) = writer.flush().await {
        return SessionEnd::Lost(format!("sending connect: {e}"));
    }

    let mut lines = BufReader::new(reader).lines();
    let mut health = time::interval_at(Instant::now() + config.health_check, config.health_check);
    health.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_line = Instant::now();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    last_line = Instant::now();
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match parse_message(trimmed) {
                        Ok(msg) => {
                            if events.send(NetEvent::Message(msg)).is_err() {
                                return SessionEnd::Shutdown;
                            }
                        }
                        Err(e) => debug!(error = %e, "dropping unparseable line"),
                    }
                }
                Ok(None) => return SessionEnd::Lost("server closed the connection".into()),
                Err(e) => return SessionEnd::Lost(format!("read failed: {e}")),
            },
            _ = health.tick() => {
                if last_line.elapsed() >= config.idle_timeout {
                    return SessionEnd::Lost(format!(
                        "no data for {}s",
                        config.idle_timeout.as_secs()
                    ));
                }
            },
            ctl = control.recv() => match ctl {
                Some(Control::Teardown) => return SessionEnd::TornDown,
                Some(Control::Shutdown) | None => return SessionEnd::Shutdown,
            },
        }
    }
}
