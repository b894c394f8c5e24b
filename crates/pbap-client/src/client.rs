//! Application handle for a running PBAP client session.

use pbap_core::obex::SetPathFlag;
use pbap_core::types::BdAddr;
use pbap_protocol::params::{ListParams, PullParams};
use pbap_protocol::session::{
    AuthKey, ClientEvent, GetFileRequest, ListDirRequest, Session, SessionEvent,
};
use tokio::sync::mpsc;

use crate::actor::SessionActor;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::file_io::{FileStore, run_file_worker};
use crate::transport::{ObexTransport, ServiceDiscovery, TransportEvents};

const MAILBOX_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 64;
const FILE_QUEUE_CAPACITY: usize = 16;

/// Cloneable handle to one PBAP client session.
///
/// Every method enqueues a single event and returns once it is queued; the
/// outcome arrives later on the event receiver returned by
/// [`enable`](Self::enable).
#[derive(Debug, Clone)]
pub struct PbapClient {
    tx: mpsc::Sender<SessionEvent>,
    security: u8,
}

impl PbapClient {
    /// Start a session actor and its file worker on the current tokio runtime.
    ///
    /// The first event on the returned receiver is [`ClientEvent::Enabled`].
    pub fn enable<T, D, F>(
        config: &ClientConfig,
        transport: T,
        discovery: D,
        files: F,
    ) -> Result<(Self, mpsc::Receiver<ClientEvent>), ClientError>
    where
        T: ObexTransport,
        D: ServiceDiscovery,
        F: FileStore,
    {
        let (session, initial) = Session::enable(config.session_config()?)?;

        let (tx, mailbox) = mpsc::channel(MAILBOX_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);
        let (file_tx, file_rx) = mpsc::channel(FILE_QUEUE_CAPACITY);

        tokio::spawn(run_file_worker(files, file_rx, tx.downgrade()));
        let actor = SessionActor::new(
            session,
            transport,
            discovery,
            mailbox,
            tx.downgrade(),
            file_tx,
            event_tx,
        );
        tokio::spawn(actor.run(initial));

        tracing::info!(pce_name = %config.client.pce_name, "PBAP client started");
        Ok((
            Self {
                tx,
                security: config.client.security_mask,
            },
            event_rx,
        ))
    }

    async fn post(&self, event: SessionEvent) -> Result<(), ClientError> {
        self.tx.send(event).await.map_err(|_| ClientError::Closed)
    }

    /// Sender for the OBEX transport's callbacks.
    pub fn transport_events(&self) -> TransportEvents {
        TransportEvents::new(self.tx.clone())
    }

    /// Open a session to `peer` using the configured security mask.
    pub async fn open(&self, peer: BdAddr) -> Result<(), ClientError> {
        self.post(SessionEvent::Open {
            peer,
            security: self.security,
        })
        .await
    }

    pub async fn close(&self) -> Result<(), ClientError> {
        self.post(SessionEvent::Close).await
    }

    /// Pull a phone book object or single vCard into `local_name`.
    pub async fn get_file(
        &self,
        remote_name: &str,
        local_name: &str,
        params: PullParams,
    ) -> Result<(), ClientError> {
        self.post(SessionEvent::GetFile(GetFileRequest {
            remote_name: remote_name.to_string(),
            local_name: local_name.to_string(),
            params,
        }))
        .await
    }

    pub async fn list_dir(&self, dir_name: &str, params: ListParams) -> Result<(), ClientError> {
        self.post(SessionEvent::ListDir(ListDirRequest {
            dir_name: dir_name.to_string(),
            params,
        }))
        .await
    }

    pub async fn change_dir(&self, name: &str, flag: SetPathFlag) -> Result<(), ClientError> {
        self.post(SessionEvent::ChangeDir {
            name: name.to_string(),
            flag,
        })
        .await
    }

    /// Answer an authentication challenge. An empty `key` declines it.
    pub async fn auth_response(
        &self,
        key: &[u8],
        user_id: Option<&str>,
    ) -> Result<(), ClientError> {
        self.post(SessionEvent::AuthResponse {
            key: AuthKey::new(key),
            user_id: user_id.map(str::to_string),
        })
        .await
    }

    pub async fn abort(&self) -> Result<(), ClientError> {
        self.post(SessionEvent::Abort).await
    }

    /// Close any connection and stop the session. The actor exits after
    /// delivering [`ClientEvent::Disabled`].
    pub async fn disable(&self) -> Result<(), ClientError> {
        self.post(SessionEvent::Disable).await
    }

    /// Wait until the session actor has exited.
    pub async fn closed(&self) {
        self.tx.closed().await;
    }
}
