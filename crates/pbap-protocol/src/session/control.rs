//! The Session Control Block and its event dispatcher.

use std::collections::VecDeque;

use pbap_core::types::{BdAddr, ObexHandle, Repositories, SupportedFeatures};

use super::config::SessionConfig;
use super::event::{Event, ObexEvent, ObexEventKind, SdpResult, SessionEvent, is_response_kind};
use super::operation::{ActiveOperation, PacketCursor};
use super::output::{ClientEvent, ObexRequest, Output};
use super::state::{AbortState, PmState, SessionState, TimerOp};
use super::table;
use crate::error::SessionError;
use crate::status::PbcStatus;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ArmedTimer {
    pub token: u64,
    pub op: TimerOp,
}

#[derive(Debug, Default)]
pub(crate) struct Flags {
    pub disabling: bool,
    pub req_pending: bool,
    pub sdp_pending: bool,
    /// A file call-out is awaiting its call-in.
    pub cout_active: bool,
    pub first_get_pkt: bool,
    pub close_requested: bool,
    /// OpenComplete has been delivered for the current connection attempt.
    pub open_reported: bool,
}

/// One PBAP client session.
///
/// Feed events in with [`handle`](Self::handle) and carry out the returned
/// [`Output`]s. Events must be delivered one at a time in arrival order.
#[derive(Debug)]
pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) state: SessionState,
    pub(crate) enabled: bool,
    pub(crate) peer: Option<BdAddr>,
    pub(crate) security: u8,
    pub(crate) obx_handle: Option<ObexHandle>,
    pub(crate) operation: ActiveOperation,
    pub(crate) cursor: PacketCursor,
    /// Status the active operation will complete with, if not success.
    pub(crate) op_status: Option<PbcStatus>,
    pub(crate) abort: AbortState,
    pub(crate) timer: Option<ArmedTimer>,
    next_token: u64,
    pub(crate) peer_version: u16,
    pub(crate) peer_features: SupportedFeatures,
    pub(crate) peer_repositories: Repositories,
    pub(crate) peer_mtu: u16,
    pub(crate) flags: Flags,
    /// Reason reported when the connection ends without a close request.
    pub(crate) close_status: PbcStatus,
    pub(crate) auth_rounds: u8,
    power: PmState,
    pub(crate) folder: Vec<String>,
    queue: VecDeque<Event>,
    outputs: Vec<Output>,
}

impl Session {
    /// Create an enabled session. The returned outputs carry the
    /// `Enabled` notification.
    pub fn enable(config: SessionConfig) -> Result<(Self, Vec<Output>), SessionError> {
        config.validate()?;
        let session = Self {
            config,
            state: SessionState::Idle,
            enabled: true,
            peer: None,
            security: 0,
            obx_handle: None,
            operation: ActiveOperation::None,
            cursor: PacketCursor::default(),
            op_status: None,
            abort: AbortState::None,
            timer: None,
            next_token: 0,
            peer_version: 0,
            peer_features: SupportedFeatures::default(),
            peer_repositories: Repositories::default(),
            peer_mtu: 0,
            flags: Flags::default(),
            close_status: PbcStatus::Ok,
            auth_rounds: 0,
            power: PmState::Idle,
            folder: Vec::new(),
            queue: VecDeque::new(),
            outputs: Vec::new(),
        };
        tracing::info!("PBAP client enabled");
        Ok((session, vec![Output::Notify(ClientEvent::Enabled)]))
    }

    /// Process one event to completion and return the side effects it caused.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<Output>, SessionError> {
        if !self.enabled {
            return Err(SessionError::Disabled);
        }
        if let Some(event) = self.classify(event) {
            self.queue.push_back(event);
        }
        self.run();
        Ok(std::mem::take(&mut self.outputs))
    }

    fn run(&mut self) {
        while let Some(event) = self.queue.pop_front() {
            let kind = event.kind();
            let transition = table::lookup(self.state, kind);
            tracing::trace!(
                state = %self.state,
                event = ?kind,
                action = ?transition.action,
                "dispatch"
            );
            if let Some(next) = transition.next
                && next != self.state
            {
                tracing::debug!(from = %self.state, to = %next, "state transition");
                self.state = next;
            }
            self.execute(transition.action, event);
        }
        self.update_power_state();
    }

    // -----------------------------------------------------------------------
    // Event classification
    // -----------------------------------------------------------------------

    fn classify(&mut self, event: SessionEvent) -> Option<Event> {
        let event = match event {
            SessionEvent::Open { peer, security } => Event::Open { peer, security },
            SessionEvent::Close => Event::Close,
            SessionEvent::GetFile(req) => Event::GetFile(req),
            SessionEvent::ListDir(req) => Event::ListDir(req),
            SessionEvent::ChangeDir { name, flag } => Event::ChangeDir { name, flag },
            SessionEvent::AuthResponse { key, user_id } => Event::AuthResponse { key, user_id },
            SessionEvent::Abort => Event::Abort,
            SessionEvent::Disable => Event::Disable,
            SessionEvent::Discovery(result) => {
                if !self.flags.sdp_pending {
                    tracing::warn!("discarding discovery result with no discovery pending");
                    return None;
                }
                match result {
                    SdpResult::Found(record) => Event::SdpOk(record),
                    SdpResult::Failed => Event::SdpFail,
                }
            }
            SessionEvent::Obex(obx) => return self.classify_obex(obx),
            SessionEvent::FileOpened { status, fd } => Event::CiOpen { status, fd },
            SessionEvent::FileWritten { status, fd } => Event::CiWrite { status, fd },
            SessionEvent::TimerExpired { token } => return self.classify_timer(token),
        };
        Some(event)
    }

    fn classify_obex(&mut self, obx: ObexEvent) -> Option<Event> {
        if let Some(handle) = self.obx_handle
            && handle != obx.handle
        {
            tracing::warn!(expected = %handle, got = %obx.handle, kind = ?obx.kind, "discarding OBEX event for another handle");
            return None;
        }
        if is_response_kind(obx.kind) && !self.flags.req_pending {
            tracing::warn!(kind = ?obx.kind, code = obx.response_code, "discarding stray OBEX response");
            return None;
        }
        let event = match obx.kind {
            ObexEventKind::ConnectResponse => Event::ConnectResponse {
                handle: obx.handle,
                code: obx.response_code,
                params: obx.params,
            },
            ObexEventKind::Password => Event::Password {
                handle: obx.handle,
                params: obx.params,
            },
            ObexEventKind::GetResponse => Event::GetResponse {
                code: obx.response_code,
                packet: obx.packet,
            },
            ObexEventKind::SetPathResponse => Event::SetPathResponse {
                code: obx.response_code,
            },
            ObexEventKind::AbortResponse => Event::AbortResponse {
                code: obx.response_code,
            },
            ObexEventKind::Timeout => {
                tracing::warn!("transport reported timeout");
                self.clear_request();
                Event::StopTimeout
            }
            ObexEventKind::Close => Event::ObxClose,
        };
        Some(event)
    }

    fn classify_timer(&mut self, token: u64) -> Option<Event> {
        match self.timer {
            Some(armed) if armed.token == token => {
                self.timer = None;
                self.flags.req_pending = false;
                tracing::debug!(token, op = ?armed.op, "response timer expired");
                Some(match armed.op {
                    TimerOp::Abort => Event::AbortTimeout,
                    TimerOp::Stop => Event::StopTimeout,
                })
            }
            _ => {
                tracing::trace!(token, "ignoring stale timer expiry");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers used by the action routines
    // -----------------------------------------------------------------------

    pub(crate) fn emit(&mut self, output: Output) {
        self.outputs.push(output);
    }

    pub(crate) fn notify(&mut self, event: ClientEvent) {
        self.outputs.push(Output::Notify(event));
    }

    pub(crate) fn raise(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Send a GET or SETPATH, armed with the configured timeout action.
    pub(crate) fn send_transaction_request(&mut self, request: ObexRequest) {
        let op = match self.config.timeout_action {
            super::config::TimeoutAction::Abort => TimerOp::Abort,
            super::config::TimeoutAction::Close => TimerOp::Stop,
        };
        let duration = self.config.request_timeout;
        self.send_request(request, op, duration);
    }

    /// Send a Connect, auth response, Abort or Disconnect.
    pub(crate) fn send_control_request(&mut self, request: ObexRequest) {
        let duration = self.config.stopabort_timeout;
        self.send_request(request, TimerOp::Stop, duration);
    }

    fn send_request(&mut self, request: ObexRequest, op: TimerOp, duration: std::time::Duration) {
        self.flags.req_pending = true;
        self.next_token += 1;
        let token = self.next_token;
        self.timer = Some(ArmedTimer { token, op });
        self.outputs.push(Output::StartTimer { token, duration });
        self.outputs.push(Output::Transport(request));
    }

    /// The outstanding request got its answer (or was abandoned).
    pub(crate) fn clear_request(&mut self) {
        self.flags.req_pending = false;
        if self.timer.take().is_some() {
            self.outputs.push(Output::StopTimer);
        }
    }

    fn update_power_state(&mut self) {
        let power = if self.flags.req_pending || self.flags.cout_active {
            PmState::Busy
        } else {
            PmState::Idle
        };
        if power != self.power {
            self.power = power;
            self.outputs.push(Output::PowerState(power));
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn peer(&self) -> Option<BdAddr> {
        self.peer
    }

    pub fn obex_handle(&self) -> Option<ObexHandle> {
        self.obx_handle
    }

    pub fn operation(&self) -> &ActiveOperation {
        &self.operation
    }

    pub fn peer_version(&self) -> u16 {
        self.peer_version
    }

    pub fn peer_features(&self) -> SupportedFeatures {
        self.peer_features
    }

    pub fn peer_repositories(&self) -> Repositories {
        self.peer_repositories
    }

    pub fn peer_mtu(&self) -> u16 {
        self.peer_mtu
    }

    pub fn is_request_pending(&self) -> bool {
        self.flags.req_pending
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn power_state(&self) -> PmState {
        self.power
    }

    /// Remote folder the server is positioned in, `/`-joined, empty at root.
    pub fn current_folder(&self) -> String {
        self.folder.join("/")
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
