//! The (state, event) transition table.
//!
//! The next state is applied before the action runs. Actions that need to
//! branch raise an internal completion event instead of picking a state
//! themselves, so every state change is visible in this table.

use super::event::EventKind;
use super::state::SessionState;
use crate::status::PbcStatus;

/// Action routine selected by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Drop the event.
    Ignore,
    /// Report the request as failed with `status` without any I/O.
    Reject(PbcStatus),
    InitOpen,
    StartClient,
    OpenFail,
    ConnectResponse,
    AuthChallenge,
    SendAuthResponse,
    InitGetFile,
    InitListDir,
    InitChangeDir,
    /// Abort the operation in flight.
    Abort,
    /// Abort with nothing to abort: reports success.
    AbortNoop,
    CiOpen,
    CiWrite,
    GetResponse,
    SetPathResponse,
    AbortResponse,
    AbortTimeout,
    ForceClose,
    TransComplete,
    /// Begin a graceful close (cancel discovery or disconnect).
    Close,
    /// Close requested while already closed: report success at once.
    CloseNoop,
    /// Close requested while already closing: fold into the pending one.
    CoalesceClose,
    LinkClosed,
    CloseComplete,
    Disable,
    DisableWhileClosing,
    DisableIdle,
    DisableComplete,
    /// A call-in for an operation that no longer exists.
    StrayCallIn,
}

/// Table lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: Action,
    /// `None` keeps the current state.
    pub next: Option<SessionState>,
}

const fn stay(action: Action) -> Transition {
    Transition { action, next: None }
}

const fn to(action: Action, next: SessionState) -> Transition {
    Transition {
        action,
        next: Some(next),
    }
}

/// Look up the transition for `kind` in `state`.
pub fn lookup(state: SessionState, kind: EventKind) -> Transition {
    use Action as A;
    use EventKind as E;
    use SessionState as S;

    match (state, kind) {
        // -------------------------------------------------------------------
        // IDLE
        // -------------------------------------------------------------------
        (S::Idle, E::Open) => to(A::InitOpen, S::Opening),
        (S::Idle, E::Close) => stay(A::CloseNoop),
        (S::Idle, E::GetFile | E::ListDir | E::ChangeDir | E::AuthResponse) => {
            stay(A::Reject(PbcStatus::NotConnected))
        }
        (S::Idle, E::Abort) => stay(A::AbortNoop),
        (S::Idle, E::Disable) => stay(A::DisableIdle),
        (S::Idle, E::DisableComplete) => stay(A::DisableComplete),
        (S::Idle, E::CiOpen | E::CiWrite) => stay(A::StrayCallIn),
        (S::Idle, _) => stay(A::Ignore),

        // -------------------------------------------------------------------
        // OPENING
        // -------------------------------------------------------------------
        (S::Opening, E::Open) => stay(A::Reject(PbcStatus::Busy)),
        (S::Opening, E::Close) => to(A::Close, S::Closing),
        (S::Opening, E::GetFile | E::ListDir | E::ChangeDir) => {
            stay(A::Reject(PbcStatus::NotConnected))
        }
        (S::Opening, E::AuthResponse) => stay(A::SendAuthResponse),
        (S::Opening, E::Abort) => stay(A::AbortNoop),
        (S::Opening, E::Disable) => to(A::Disable, S::Closing),
        (S::Opening, E::SdpOk) => stay(A::StartClient),
        (S::Opening, E::SdpFail) => to(A::OpenFail, S::Idle),
        (S::Opening, E::ConnectResponse) => to(A::ConnectResponse, S::Connected),
        (S::Opening, E::Password) => stay(A::AuthChallenge),
        (S::Opening, E::ObxClose) => to(A::LinkClosed, S::Closing),
        (S::Opening, E::AbortTimeout | E::StopTimeout) => to(A::ForceClose, S::Closing),
        (S::Opening, E::CiOpen | E::CiWrite) => stay(A::StrayCallIn),
        (S::Opening, _) => stay(A::Ignore),

        // -------------------------------------------------------------------
        // CONNECTED
        // -------------------------------------------------------------------
        (S::Connected, E::Open) => stay(A::Reject(PbcStatus::Busy)),
        (S::Connected, E::Close) => to(A::Close, S::Closing),
        (S::Connected, E::GetFile) => to(A::InitGetFile, S::InTransaction),
        (S::Connected, E::ListDir) => to(A::InitListDir, S::InTransaction),
        (S::Connected, E::ChangeDir) => to(A::InitChangeDir, S::InTransaction),
        (S::Connected, E::AuthResponse) => stay(A::Reject(PbcStatus::BadRequest)),
        (S::Connected, E::Abort) => stay(A::AbortNoop),
        (S::Connected, E::Disable) => to(A::Disable, S::Closing),
        (S::Connected, E::ObxClose) => to(A::LinkClosed, S::Closing),
        (S::Connected, E::AbortTimeout | E::StopTimeout) => to(A::ForceClose, S::Closing),
        (S::Connected, E::CloseComplete) => to(A::CloseComplete, S::Idle),
        (S::Connected, E::CiOpen | E::CiWrite) => stay(A::StrayCallIn),
        (S::Connected, _) => stay(A::Ignore),

        // -------------------------------------------------------------------
        // IN_TRANSACTION
        // -------------------------------------------------------------------
        (S::InTransaction, E::Open) => stay(A::Reject(PbcStatus::Busy)),
        (S::InTransaction, E::Close) => to(A::Close, S::Closing),
        (S::InTransaction, E::GetFile | E::ListDir | E::ChangeDir) => {
            stay(A::Reject(PbcStatus::Busy))
        }
        (S::InTransaction, E::AuthResponse) => stay(A::Reject(PbcStatus::BadRequest)),
        (S::InTransaction, E::Abort) => stay(A::Abort),
        (S::InTransaction, E::Disable) => to(A::Disable, S::Closing),
        (S::InTransaction, E::CiOpen) => stay(A::CiOpen),
        (S::InTransaction, E::CiWrite) => stay(A::CiWrite),
        (S::InTransaction, E::GetResponse) => stay(A::GetResponse),
        (S::InTransaction, E::SetPathResponse) => stay(A::SetPathResponse),
        (S::InTransaction, E::AbortResponse) => stay(A::AbortResponse),
        (S::InTransaction, E::AbortTimeout) => stay(A::AbortTimeout),
        (S::InTransaction, E::StopTimeout) => to(A::ForceClose, S::Closing),
        (S::InTransaction, E::ObxClose) => to(A::LinkClosed, S::Closing),
        (S::InTransaction, E::ObxComplete) => to(A::TransComplete, S::Connected),
        (S::InTransaction, _) => stay(A::Ignore),

        // -------------------------------------------------------------------
        // CLOSING
        // -------------------------------------------------------------------
        (S::Closing, E::Open) => stay(A::Reject(PbcStatus::Busy)),
        (S::Closing, E::Close) => stay(A::CoalesceClose),
        (S::Closing, E::GetFile | E::ListDir | E::ChangeDir | E::AuthResponse) => {
            stay(A::Reject(PbcStatus::NotConnected))
        }
        (S::Closing, E::Abort) => stay(A::AbortNoop),
        (S::Closing, E::Disable) => stay(A::DisableWhileClosing),
        (
            S::Closing,
            E::ObxClose | E::AbortTimeout | E::StopTimeout | E::CloseComplete,
        ) => to(A::CloseComplete, S::Idle),
        (S::Closing, E::CiOpen | E::CiWrite) => stay(A::StrayCallIn),
        (S::Closing, _) => stay(A::Ignore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [SessionState; 5] = [
        SessionState::Idle,
        SessionState::Opening,
        SessionState::Connected,
        SessionState::InTransaction,
        SessionState::Closing,
    ];

    #[test]
    fn only_connected_starts_transactions() {
        for state in ALL_STATES {
            for kind in [EventKind::GetFile, EventKind::ListDir, EventKind::ChangeDir] {
                let t = lookup(state, kind);
                if state == SessionState::Connected {
                    assert_eq!(t.next, Some(SessionState::InTransaction));
                } else {
                    assert!(matches!(t.action, Action::Reject(_)), "{state} {kind:?}");
                    assert_eq!(t.next, None);
                }
            }
        }
    }

    #[test]
    fn in_transaction_rejects_as_busy() {
        assert_eq!(
            lookup(SessionState::InTransaction, EventKind::GetFile).action,
            Action::Reject(PbcStatus::Busy)
        );
    }

    #[test]
    fn leaving_in_transaction() {
        // Every exit from IN_TRANSACTION goes through an action that
        // finalizes the operation.
        for kind in [
            EventKind::Close,
            EventKind::Disable,
            EventKind::StopTimeout,
            EventKind::ObxClose,
            EventKind::ObxComplete,
        ] {
            let t = lookup(SessionState::InTransaction, kind);
            assert!(t.next.is_some(), "{kind:?}");
            assert!(
                matches!(
                    t.action,
                    Action::Close
                        | Action::Disable
                        | Action::ForceClose
                        | Action::LinkClosed
                        | Action::TransComplete
                ),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn closing_ends_in_idle() {
        for kind in [
            EventKind::ObxClose,
            EventKind::StopTimeout,
            EventKind::CloseComplete,
        ] {
            assert_eq!(
                lookup(SessionState::Closing, kind),
                to(Action::CloseComplete, SessionState::Idle)
            );
        }
        assert_eq!(
            lookup(SessionState::Closing, EventKind::Close).action,
            Action::CoalesceClose
        );
    }

    #[test]
    fn abort_is_always_answered() {
        for state in ALL_STATES {
            let action = lookup(state, EventKind::Abort).action;
            assert!(matches!(action, Action::Abort | Action::AbortNoop));
        }
    }

    #[test]
    fn stray_responses_ignored_outside_transaction() {
        for state in [SessionState::Idle, SessionState::Connected, SessionState::Closing] {
            for kind in [
                EventKind::GetResponse,
                EventKind::SetPathResponse,
                EventKind::AbortResponse,
            ] {
                assert_eq!(lookup(state, kind).action, Action::Ignore);
            }
        }
    }
}
