//! Tokio runtime for the PBAP client.
//!
//! [`PbapClient::enable`] spawns one actor task per session. The actor owns
//! the sans-IO [`Session`](pbap_protocol::Session), executes its outputs
//! against the collaborator traits in [`transport`] and [`file_io`], and
//! drives the response timer.

mod actor;
pub mod client;
pub mod config;
pub mod error;
pub mod file_io;
pub mod logging;
pub mod transport;

pub use client::PbapClient;
pub use config::ClientConfig;
pub use error::{ClientError, ConfigError, TransportError};
pub use file_io::{FileStore, FsFileStore};
pub use transport::{ObexTransport, ServiceDiscovery, TransportEvents};
