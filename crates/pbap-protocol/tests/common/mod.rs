//! Shared harness for session tests.

#![allow(dead_code)]

use pbap_core::constants::VERSION_1_1;
use pbap_core::obex::ObexResponseCode;
use pbap_core::types::{BdAddr, ObexHandle, Repositories};
use pbap_protocol::session::{
    ClientEvent, FileCallout, FileHandle, ObexEvent, ObexEventKind, ObexPacket, ObexParams,
    ObexRequest, Output, SdpResult, ServiceChannel, ServiceRecord, Session, SessionConfig,
    SessionEvent, SessionState,
};

pub const PEER: BdAddr = BdAddr([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
pub const HANDLE: ObexHandle = ObexHandle(7);
pub const FD: FileHandle = FileHandle(3);

pub const OK: u8 = ObexResponseCode::Ok as u8;
pub const CONTINUE: u8 = ObexResponseCode::Continue as u8;

pub struct Harness {
    pub session: Session,
    /// Every output produced since creation.
    pub log: Vec<Output>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let (session, outputs) = Session::enable(config).unwrap();
        Self {
            session,
            log: outputs,
        }
    }

    pub fn send(&mut self, event: SessionEvent) -> Vec<Output> {
        let outputs = self.session.handle(event).unwrap();
        self.log.extend(outputs.iter().cloned());
        outputs
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Drive IDLE to CONNECTED against a server with the given record.
    pub fn connect(&mut self, version: u16, repositories: Repositories) -> Vec<Output> {
        self.send(SessionEvent::Open {
            peer: PEER,
            security: 0,
        });
        self.send(SessionEvent::Discovery(SdpResult::Found(ServiceRecord {
            version,
            channel: ServiceChannel::Rfcomm(19),
            features: None,
            repositories,
        })));
        let out = self.send(obex_event(ObexEventKind::ConnectResponse, OK, None));
        assert_eq!(self.state(), SessionState::Connected);
        out
    }

    pub fn connect_default(&mut self) -> Vec<Output> {
        self.connect(VERSION_1_1, Repositories::LOCAL | Repositories::SIM)
    }

    /// Token of the most recently armed timer.
    pub fn timer_token(&self) -> Option<u64> {
        self.log.iter().rev().find_map(|o| match o {
            Output::StartTimer { token, .. } => Some(*token),
            _ => None,
        })
    }

    pub fn expire_timer(&mut self) -> Vec<Output> {
        let token = self.timer_token().expect("no timer armed");
        self.send(SessionEvent::TimerExpired { token })
    }

    pub fn notifications(&self) -> Vec<ClientEvent> {
        notifications(&self.log)
    }

    pub fn file_callouts(&self) -> Vec<FileCallout> {
        file_callouts(&self.log)
    }

    pub fn transport(&self) -> Vec<ObexRequest> {
        transport(&self.log)
    }
}

pub fn obex_event(kind: ObexEventKind, code: u8, packet: Option<ObexPacket>) -> SessionEvent {
    SessionEvent::Obex(ObexEvent {
        handle: HANDLE,
        kind,
        response_code: code,
        params: ObexParams {
            peer_mtu: 1024,
            ..ObexParams::default()
        },
        packet,
    })
}

pub fn get_rsp(code: u8, body: &[u8], end_of_body: bool) -> SessionEvent {
    obex_event(
        ObexEventKind::GetResponse,
        code,
        Some(ObexPacket {
            body: body.to_vec(),
            end_of_body,
            length: None,
            app_params: None,
        }),
    )
}

pub fn notifications(outputs: &[Output]) -> Vec<ClientEvent> {
    outputs
        .iter()
        .filter_map(|o| match o {
            Output::Notify(e) => Some(e.clone()),
            _ => None,
        })
        .collect()
}

pub fn transport(outputs: &[Output]) -> Vec<ObexRequest> {
    outputs
        .iter()
        .filter_map(|o| match o {
            Output::Transport(r) => Some(r.clone()),
            _ => None,
        })
        .collect()
}

pub fn file_callouts(outputs: &[Output]) -> Vec<FileCallout> {
    outputs
        .iter()
        .filter_map(|o| match o {
            Output::File(f) => Some(f.clone()),
            _ => None,
        })
        .collect()
}

/// Number of close call-outs issued for `fd`.
pub fn closes_for(outputs: &[Output], fd: FileHandle) -> usize {
    file_callouts(outputs)
        .iter()
        .filter(|f| matches!(f, FileCallout::Close { fd: closed, .. } if *closed == fd))
        .count()
}

pub fn close_completes(outputs: &[Output]) -> usize {
    notifications(outputs)
        .iter()
        .filter(|e| matches!(e, ClientEvent::CloseComplete { .. }))
        .count()
}
