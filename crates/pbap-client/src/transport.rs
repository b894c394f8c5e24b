//! Collaborator traits for the OBEX transport and service discovery.
//!
//! The session never touches a socket. The runtime hands each
//! [`ObexRequest`] to an [`ObexTransport`] and each discovery to a
//! [`ServiceDiscovery`]; the transport reports responses back through
//! [`TransportEvents`].

use pbap_core::types::{BdAddr, ObexHandle};
use pbap_protocol::session::{ObexEvent, ObexRequest, ServiceRecord, SessionEvent};
use tokio::sync::mpsc;

use crate::error::{ClientError, TransportError};

/// OBEX client transport (RFCOMM or L2CAP) implemented by the platform.
pub trait ObexTransport: Send + Sync + 'static {
    /// Issue one request. `handle` is `None` until the connection has
    /// produced its first callback.
    ///
    /// Returning an error is treated as loss of the OBEX connection.
    fn send(
        &self,
        handle: Option<ObexHandle>,
        request: ObexRequest,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// SDP lookup of the PSE service record on a peer.
pub trait ServiceDiscovery: Send + Sync + 'static {
    /// Resolve the service record for `target` on `peer`.
    ///
    /// The future is dropped if the session cancels the discovery.
    fn discover(
        &self,
        peer: BdAddr,
        target: [u8; 16],
    ) -> impl Future<Output = Result<ServiceRecord, TransportError>> + Send;
}

/// Sender the transport uses to deliver OBEX callbacks to a session.
#[derive(Debug, Clone)]
pub struct TransportEvents {
    tx: mpsc::Sender<SessionEvent>,
}

impl TransportEvents {
    pub(crate) fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Deliver one OBEX callback.
    pub async fn deliver(&self, event: ObexEvent) -> Result<(), ClientError> {
        self.tx
            .send(SessionEvent::Obex(event))
            .await
            .map_err(|_| ClientError::Closed)
    }
}
