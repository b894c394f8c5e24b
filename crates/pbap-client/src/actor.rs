//! The session actor: one task owning a [`Session`] and its timer.

use std::collections::VecDeque;
use std::sync::Arc;

use pbap_core::types::{BdAddr, ObexHandle};
use pbap_protocol::session::{
    ClientEvent, FileCallout, ObexEvent, ObexEventKind, ObexParams, ObexRequest, Output,
    SdpResult, Session, SessionEvent,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::transport::{ObexTransport, ServiceDiscovery};

pub(crate) struct SessionActor<T, D> {
    session: Session,
    transport: T,
    discovery: Arc<D>,
    mailbox: mpsc::Receiver<SessionEvent>,
    /// Used by spawned discovery tasks to post their result. Weak so the
    /// mailbox closes once every client handle is dropped.
    mailbox_tx: mpsc::WeakSender<SessionEvent>,
    files: mpsc::Sender<FileCallout>,
    events: mpsc::Sender<ClientEvent>,
    /// Events synthesized by the actor itself, handled before the mailbox.
    backlog: VecDeque<SessionEvent>,
    timer: Option<(u64, Instant)>,
    discovery_task: Option<JoinHandle<()>>,
}

impl<T: ObexTransport, D: ServiceDiscovery> SessionActor<T, D> {
    pub(crate) fn new(
        session: Session,
        transport: T,
        discovery: D,
        mailbox: mpsc::Receiver<SessionEvent>,
        mailbox_tx: mpsc::WeakSender<SessionEvent>,
        files: mpsc::Sender<FileCallout>,
        events: mpsc::Sender<ClientEvent>,
    ) -> Self {
        Self {
            session,
            transport,
            discovery: Arc::new(discovery),
            mailbox,
            mailbox_tx,
            files,
            events,
            backlog: VecDeque::new(),
            timer: None,
            discovery_task: None,
        }
    }

    /// Run until the session is disabled or every handle is dropped.
    pub(crate) async fn run(mut self, initial: Vec<Output>) {
        self.apply(initial).await;
        tracing::debug!("session actor started");

        loop {
            if let Some(event) = self.backlog.pop_front() {
                if !self.dispatch(event).await {
                    break;
                }
                continue;
            }

            let deadline = self.timer.map(|(_, at)| at);
            tokio::select! {
                biased;

                event = self.mailbox.recv() => {
                    match event {
                        Some(event) => {
                            if !self.dispatch(event).await {
                                break;
                            }
                        }
                        None => {
                            tracing::info!("all client handles dropped, exiting");
                            break;
                        }
                    }
                }

                _ = expiry(deadline), if deadline.is_some() => {
                    if let Some((token, _)) = self.timer.take() {
                        tracing::trace!(token, "timer fired");
                        if !self.dispatch(SessionEvent::TimerExpired { token }).await {
                            break;
                        }
                    }
                }
            }
        }
        self.shutdown();
    }

    /// Feed one event to the session. Returns `false` once it is disabled.
    async fn dispatch(&mut self, event: SessionEvent) -> bool {
        match self.session.handle(event) {
            Ok(outputs) => {
                self.apply(outputs).await;
                self.session.is_enabled()
            }
            Err(e) => {
                tracing::warn!("event rejected: {e}");
                false
            }
        }
    }

    async fn apply(&mut self, outputs: Vec<Output>) {
        for output in outputs {
            match output {
                Output::Transport(request) => self.send(request).await,
                Output::StartDiscovery { peer, target } => self.start_discovery(peer, target),
                Output::CancelDiscovery => {
                    if let Some(task) = self.discovery_task.take() {
                        tracing::debug!("cancelling service discovery");
                        task.abort();
                    }
                }
                Output::File(callout) => {
                    if self.files.send(callout).await.is_err() {
                        tracing::warn!("file worker gone, dropping call-out");
                    }
                }
                Output::StartTimer { token, duration } => {
                    self.timer = Some((token, Instant::now() + duration));
                }
                Output::StopTimer => self.timer = None,
                Output::Notify(event) => {
                    if self.events.send(event).await.is_err() {
                        tracing::trace!("event receiver dropped");
                    }
                }
                Output::PowerState(state) => {
                    tracing::debug!(?state, "power state");
                }
            }
        }
    }

    async fn send(&mut self, request: ObexRequest) {
        let handle = self.session.obex_handle();
        tracing::trace!(?handle, ?request, "OBEX request");
        if let Err(e) = self.transport.send(handle, request).await {
            tracing::warn!("OBEX transport send failed: {e}");
            // Report the failed send as a dropped connection.
            self.backlog.push_back(SessionEvent::Obex(ObexEvent {
                handle: handle.unwrap_or(ObexHandle(0)),
                kind: ObexEventKind::Close,
                response_code: 0,
                params: ObexParams::default(),
                packet: None,
            }));
        }
    }

    fn start_discovery(&mut self, peer: BdAddr, target: [u8; 16]) {
        if let Some(task) = self.discovery_task.take() {
            task.abort();
        }
        let discovery = Arc::clone(&self.discovery);
        let mailbox = self.mailbox_tx.clone();
        self.discovery_task = Some(tokio::spawn(async move {
            let result = match discovery.discover(peer, target).await {
                Ok(record) => SdpResult::Found(record),
                Err(e) => {
                    tracing::warn!(%peer, "service discovery failed: {e}");
                    SdpResult::Failed
                }
            };
            if let Some(mailbox) = mailbox.upgrade() {
                let _ = mailbox.send(SessionEvent::Discovery(result)).await;
            }
        }));
    }

    fn shutdown(&mut self) {
        if let Some(task) = self.discovery_task.take() {
            task.abort();
        }
        tracing::info!("session actor stopped");
    }
}

async fn expiry(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
