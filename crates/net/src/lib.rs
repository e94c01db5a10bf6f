//! Network side of the viewer.
//!
//! - [`protocol`]: line-delimited JSON messages and their conversion into
//!   pipeline types
//! - [`connection`]: the async supervisor owning the transport
//! - [`runtime`]: sync handle for the render loop
//! - [`config`]: connection settings from the environment

pub mod config;
pub mod connection;
pub mod protocol;
pub mod runtime;

pub use rogue_view_types as types;

pub use config::ConnectionConfig;
pub use connection::{run_connection, ConnectionState, Control, NetEvent};
pub use protocol::{parse_message, BrowserConnectMessage, Inbound, ProtocolError, RoundState, UiUpdateMessage};
pub use runtime::NetClient;
