//! Property tests: random event sequences must never break the session's
//! structural invariants.

mod common;

use common::*;
use pbap_core::constants::VERSION_1_1;
use pbap_core::obex::{ObexResponseCode, SetPathFlag};
use pbap_core::types::Repositories;
use pbap_protocol::params::{ListParams, PullParams};
use pbap_protocol::session::{
    AuthKey, FileHandle, GetFileRequest, ListDirRequest, ObexEventKind, SdpResult,
    ServiceChannel, ServiceRecord, SessionEvent, SessionState,
};
use pbap_protocol::{PbcStatus, SessionError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Open,
    Close,
    GetFile,
    ListDir,
    ChangeDir,
    Abort,
    Disable,
    SdpFound,
    SdpFailed,
    Connect(bool),
    Password,
    AuthResponse(bool),
    GetResponse { last: bool },
    SetPathResponse,
    AbortResponse,
    LinkClosed,
    TransportTimeout,
    FileOpened(bool),
    FileWritten(bool),
    ExpireTimer,
    StaleTimer,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Open),
        Just(Step::Close),
        Just(Step::GetFile),
        Just(Step::ListDir),
        Just(Step::ChangeDir),
        Just(Step::Abort),
        Just(Step::Disable),
        Just(Step::SdpFound),
        Just(Step::SdpFailed),
        any::<bool>().prop_map(Step::Connect),
        Just(Step::Password),
        any::<bool>().prop_map(Step::AuthResponse),
        any::<bool>().prop_map(|last| Step::GetResponse { last }),
        Just(Step::SetPathResponse),
        Just(Step::AbortResponse),
        Just(Step::LinkClosed),
        Just(Step::TransportTimeout),
        any::<bool>().prop_map(Step::FileOpened),
        any::<bool>().prop_map(Step::FileWritten),
        Just(Step::ExpireTimer),
        Just(Step::StaleTimer),
    ]
}

/// Turns abstract steps into concrete events, handing out a fresh file
/// handle for every successful open.
struct Driver {
    next_fd: u32,
    last_fd: FileHandle,
    opened: Vec<FileHandle>,
}

impl Driver {
    fn new() -> Self {
        Self {
            next_fd: 10,
            last_fd: FileHandle(10),
            opened: Vec::new(),
        }
    }

    fn event(&mut self, step: Step, h: &Harness) -> SessionEvent {
        let code = |ok: bool| {
            if ok {
                ObexResponseCode::Ok as u8
            } else {
                ObexResponseCode::Forbidden as u8
            }
        };
        match step {
            Step::Open => SessionEvent::Open {
                peer: PEER,
                security: 0,
            },
            Step::Close => SessionEvent::Close,
            Step::GetFile => SessionEvent::GetFile(GetFileRequest {
                remote_name: "telecom/pb.vcf".into(),
                local_name: "pb.vcf".into(),
                params: PullParams::default(),
            }),
            Step::ListDir => SessionEvent::ListDir(ListDirRequest {
                dir_name: "telecom/pb".into(),
                params: ListParams::default(),
            }),
            Step::ChangeDir => SessionEvent::ChangeDir {
                name: "telecom".into(),
                flag: SetPathFlag::Down,
            },
            Step::Abort => SessionEvent::Abort,
            Step::Disable => SessionEvent::Disable,
            Step::SdpFound => SessionEvent::Discovery(SdpResult::Found(ServiceRecord {
                version: VERSION_1_1,
                channel: ServiceChannel::Rfcomm(4),
                features: None,
                repositories: Repositories::V1_1,
            })),
            Step::SdpFailed => SessionEvent::Discovery(SdpResult::Failed),
            Step::Connect(ok) => obex_event(ObexEventKind::ConnectResponse, code(ok), None),
            Step::Password => obex_event(
                ObexEventKind::Password,
                ObexResponseCode::Unauthorized as u8,
                None,
            ),
            Step::AuthResponse(declined) => SessionEvent::AuthResponse {
                key: if declined {
                    AuthKey::empty()
                } else {
                    AuthKey::new(b"1234")
                },
                user_id: None,
            },
            Step::GetResponse { last } => {
                if last {
                    get_rsp(OK, b"</vCard-listing>", true)
                } else {
                    get_rsp(CONTINUE, b"<vCard-listing version=\"1.0\">", false)
                }
            }
            Step::SetPathResponse => obex_event(ObexEventKind::SetPathResponse, OK, None),
            Step::AbortResponse => obex_event(ObexEventKind::AbortResponse, OK, None),
            Step::LinkClosed => obex_event(ObexEventKind::Close, OK, None),
            Step::TransportTimeout => obex_event(ObexEventKind::Timeout, OK, None),
            Step::FileOpened(ok) => {
                if ok {
                    self.next_fd += 1;
                    self.last_fd = FileHandle(self.next_fd);
                    self.opened.push(self.last_fd);
                    SessionEvent::FileOpened {
                        status: PbcStatus::Ok,
                        fd: Some(self.last_fd),
                    }
                } else {
                    SessionEvent::FileOpened {
                        status: PbcStatus::FileError,
                        fd: None,
                    }
                }
            }
            Step::FileWritten(ok) => SessionEvent::FileWritten {
                status: if ok { PbcStatus::Ok } else { PbcStatus::FileError },
                fd: self.last_fd,
            },
            Step::ExpireTimer => SessionEvent::TimerExpired {
                token: h.timer_token().unwrap_or(0),
            },
            Step::StaleTimer => SessionEvent::TimerExpired { token: u64::MAX },
        }
    }
}

fn check_invariants(h: &Harness) {
    let session = &h.session;
    assert_eq!(
        !session.operation().is_none(),
        session.state() == SessionState::InTransaction,
        "operation {:?} in state {}",
        session.operation().name(),
        session.state()
    );
    assert_eq!(
        session.is_timer_armed(),
        session.is_request_pending(),
        "timer and pending request disagree in state {}",
        session.state()
    );
    if session.state() == SessionState::Idle {
        assert!(session.obex_handle().is_none());
        assert!(!session.is_request_pending());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_sequences_keep_invariants(steps in prop::collection::vec(step(), 1..80)) {
        let mut h = Harness::new();
        let mut driver = Driver::new();

        for step in steps {
            let event = driver.event(step, &h);
            match h.session.handle(event) {
                Ok(outputs) => h.log.extend(outputs),
                Err(SessionError::Disabled) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
            check_invariants(&h);
        }

        for fd in &driver.opened {
            prop_assert!(closes_for(&h.log, *fd) <= 1, "{fd} closed more than once");
        }
    }

    #[test]
    fn close_always_reaches_idle(steps in prop::collection::vec(step(), 0..40)) {
        let mut h = Harness::new();
        let mut driver = Driver::new();

        for step in steps {
            if matches!(step, Step::Disable) {
                continue;
            }
            let event = driver.event(step, &h);
            h.send(event);
        }

        h.send(SessionEvent::Close);
        if h.state() == SessionState::Closing {
            h.expire_timer();
        }
        prop_assert_eq!(h.state(), SessionState::Idle);
        prop_assert!(!h.session.is_request_pending());
    }
}
