//! Action routines invoked by the state table.
//!
//! Each routine either issues a transport request and leaves a waiting
//! marker (`req_pending` or `cout_active`), rejects a request locally, or
//! finalizes the active operation.

use pbap_core::app_params::{AppParam, ApplicationParameters};
use pbap_core::constants::{
    LEN_UNKNOWN, MAX_REALM_LEN, PB_ACCESS_TARGET_UUID, PULL_LIST_FAV_NAME, PULL_LIST_SPD_NAME,
    PULL_PB_FAV_NAME, PULL_PB_SPD_NAME, PULL_VCARD_LISTING_TYPE, SIM_PREFIX,
};
use pbap_core::obex::{ObexResponseCode, SetPathFlag};
use pbap_core::types::{BdAddr, ObexHandle, Repositories};

use super::control::Session;
use super::event::{
    Event, EventKind, FileHandle, GetFileRequest, ListDirRequest, ObexPacket, ObexParams,
    ServiceRecord,
};
use super::operation::{ActiveOperation, ChangeDirOp, GetFileOp, ListOp};
use super::output::{AuthKey, ClientEvent, FileCallout, GetHeaders, ObexRequest, Output, ResponseParams};
use super::state::AbortState;
use super::table::Action;
use crate::listing::ListingAssembler;
use crate::params::ObjectType;
use crate::status::PbcStatus;

impl Session {
    pub(crate) fn execute(&mut self, action: Action, event: Event) {
        match (action, event) {
            (Action::Ignore, event) => {
                tracing::trace!(state = %self.state, event = ?event.kind(), "event ignored");
            }
            (Action::Reject(status), event) => self.reject(&event, status),
            (Action::InitOpen, Event::Open { peer, security }) => self.init_open(peer, security),
            (Action::StartClient, Event::SdpOk(record)) => self.start_client(record),
            (Action::OpenFail, _) => self.open_fail(),
            (Action::ConnectResponse, Event::ConnectResponse { handle, code, params }) => {
                self.connect_response(handle, code, &params);
            }
            (Action::AuthChallenge, Event::Password { handle, params }) => {
                self.auth_challenge(handle, params);
            }
            (Action::SendAuthResponse, Event::AuthResponse { key, user_id }) => {
                self.send_auth_response(key, user_id);
            }
            (Action::InitGetFile, Event::GetFile(req)) => self.init_get_file(req),
            (Action::InitListDir, Event::ListDir(req)) => self.init_list_dir(req),
            (Action::InitChangeDir, Event::ChangeDir { name, flag }) => {
                self.init_change_dir(name, flag);
            }
            (Action::Abort, _) => self.abort(),
            (Action::AbortNoop, _) => {
                tracing::debug!(state = %self.state, "abort with no operation in flight");
                self.notify(ClientEvent::AbortStatus {
                    status: PbcStatus::Ok,
                });
            }
            (Action::CiOpen, Event::CiOpen { status, fd }) => self.ci_open(status, fd),
            (Action::CiWrite, Event::CiWrite { status, fd }) => self.ci_write(status, fd),
            (Action::GetResponse, Event::GetResponse { code, packet }) => {
                self.get_response(code, packet);
            }
            (Action::SetPathResponse, Event::SetPathResponse { code }) => {
                self.set_path_response(code);
            }
            (Action::AbortResponse, Event::AbortResponse { code }) => self.abort_response(code),
            (Action::AbortTimeout, _) => self.abort_timeout(),
            (Action::ForceClose, _) => self.force_close(),
            (Action::TransComplete, _) => self.finish_operation(PbcStatus::Ok),
            (Action::Close, _) => self.begin_close(),
            (Action::CloseNoop, _) => self.notify(ClientEvent::CloseComplete {
                status: PbcStatus::Ok,
            }),
            (Action::CoalesceClose, _) => {
                tracing::debug!("close already in progress");
                self.flags.close_requested = true;
            }
            (Action::LinkClosed, _) => self.link_closed(),
            (Action::CloseComplete, _) => self.close_complete(),
            (Action::Disable, _) => {
                self.flags.disabling = true;
                self.begin_close();
            }
            (Action::DisableWhileClosing, _) => self.flags.disabling = true,
            (Action::DisableIdle, _) => self.raise(Event::DisableComplete),
            (Action::DisableComplete, _) => self.disable_complete(),
            (Action::StrayCallIn, event) => self.stray_call_in(event),
            (action, event) => {
                tracing::error!(?action, event = ?event.kind(), "action received mismatched event");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Local rejection
    // -----------------------------------------------------------------------

    fn reject(&mut self, event: &Event, status: PbcStatus) {
        let kind = event.kind();
        tracing::debug!(state = %self.state, event = ?kind, %status, "request rejected");
        let reply = match kind {
            EventKind::Open => ClientEvent::OpenComplete {
                status,
                repositories: self.peer_repositories,
                features: self.peer_features,
            },
            EventKind::Close => ClientEvent::CloseComplete { status },
            EventKind::GetFile => ClientEvent::GetComplete {
                status,
                bytes_transferred: 0,
                params: ResponseParams::default(),
            },
            EventKind::ListDir => ClientEvent::ListComplete {
                status,
                listing: None,
                params: ResponseParams::default(),
            },
            EventKind::ChangeDir => ClientEvent::ChangeDirComplete { status },
            EventKind::AuthResponse => ClientEvent::AuthRejected { status },
            EventKind::Abort => ClientEvent::AbortStatus { status },
            other => {
                tracing::warn!(event = ?other, "no rejection callback for event");
                return;
            }
        };
        self.notify(reply);
    }

    // -----------------------------------------------------------------------
    // Open / authentication
    // -----------------------------------------------------------------------

    fn init_open(&mut self, peer: BdAddr, security: u8) {
        tracing::info!(%peer, "opening PBAP session");
        self.peer = Some(peer);
        self.security = security;
        self.obx_handle = None;
        self.peer_version = 0;
        self.peer_features = Default::default();
        self.peer_repositories = Repositories::default();
        self.peer_mtu = 0;
        self.close_status = PbcStatus::Ok;
        self.auth_rounds = 0;
        self.folder.clear();
        self.flags.close_requested = false;
        self.flags.open_reported = false;
        self.flags.sdp_pending = true;
        self.emit(Output::StartDiscovery {
            peer,
            target: PB_ACCESS_TARGET_UUID,
        });
    }

    fn start_client(&mut self, record: ServiceRecord) {
        self.flags.sdp_pending = false;
        self.peer_version = record.version;
        self.peer_features = record.features.unwrap_or_default();
        self.peer_repositories = record.repositories;
        tracing::debug!(
            version = format_args!("{:#06x}", record.version),
            channel = ?record.channel,
            repositories = ?record.repositories,
            features = self.peer_features.bits(),
            "PSE discovered"
        );

        // Servers that publish features expect ours in the Connect request.
        let app_params = record.features.and_then(|_| {
            ApplicationParameters::new()
                .with(AppParam::SupportedFeatures(self.config.local_features))
                .encode()
                .map_err(|e| tracing::warn!(error = %e, "cannot encode local features"))
                .ok()
        });

        let peer = self.peer.unwrap_or_default();
        self.send_control_request(ObexRequest::Connect {
            peer,
            channel: record.channel,
            target: PB_ACCESS_TARGET_UUID,
            security: self.security,
            app_params,
        });
    }

    fn open_fail(&mut self) {
        self.flags.sdp_pending = false;
        self.flags.open_reported = true;
        tracing::info!(peer = ?self.peer, "PSE service discovery failed");
        self.notify(ClientEvent::OpenComplete {
            status: PbcStatus::SdpError,
            repositories: self.peer_repositories,
            features: self.peer_features,
        });
    }

    fn connect_response(&mut self, handle: ObexHandle, code: u8, params: &ObexParams) {
        self.clear_request();
        self.obx_handle = Some(handle);

        let success = ObexResponseCode::from_u8(code).is_some_and(ObexResponseCode::is_success);
        if success {
            self.peer_mtu = params.peer_mtu;
            self.flags.open_reported = true;
            self.folder.clear();
            tracing::info!(%handle, peer_mtu = params.peer_mtu, "PBAP session connected");
            self.notify(ClientEvent::OpenComplete {
                status: PbcStatus::Ok,
                repositories: self.peer_repositories,
                features: self.peer_features,
            });
            return;
        }

        let status = PbcStatus::from_obex(code);
        tracing::info!(code = format_args!("{code:#04x}"), %status, "OBEX connect refused");
        if self.auth_rounds > 0 && status == PbcStatus::NoPermission {
            self.notify(ClientEvent::AuthRejected { status });
        }
        self.close_status = status;
        self.raise(Event::CloseComplete);
    }

    fn auth_challenge(&mut self, handle: ObexHandle, params: ObexParams) {
        self.clear_request();
        self.obx_handle = Some(handle);
        self.auth_rounds = self.auth_rounds.saturating_add(1);
        tracing::debug!(round = self.auth_rounds, "OBEX authentication challenge");
        if self.auth_rounds == 1 {
            let realm = params
                .realm
                .map(|r| r.chars().take(MAX_REALM_LEN).collect::<String>());
            self.notify(ClientEvent::AuthChallenge {
                realm,
                userid_required: params.userid_required,
            });
        } else {
            self.notify(ClientEvent::PasswordRequired);
        }
    }

    fn send_auth_response(&mut self, key: AuthKey, user_id: Option<String>) {
        if self.auth_rounds == 0 || self.flags.req_pending {
            self.notify(ClientEvent::AuthRejected {
                status: PbcStatus::BadRequest,
            });
            return;
        }
        if key.is_empty() {
            tracing::info!("authentication declined by user");
            self.close_status = PbcStatus::NoPermission;
            self.send_control_request(ObexRequest::Disconnect);
            return;
        }
        let user_id = user_id.map(|u| u.chars().take(MAX_REALM_LEN).collect::<String>());
        self.send_control_request(ObexRequest::AuthResponse { key, user_id });
    }

    // -----------------------------------------------------------------------
    // Request validation
    // -----------------------------------------------------------------------

    fn check_remote_name(&self, name: &str) -> Result<(), PbcStatus> {
        if name.len() > self.config.max_path_len {
            return Err(PbcStatus::InvalidArgument);
        }
        self.check_repository(name)
    }

    fn check_local_name(&self, name: &str) -> Result<(), PbcStatus> {
        if name.is_empty() || name.len() > self.config.max_path_len {
            return Err(PbcStatus::InvalidArgument);
        }
        let leaf = name.rsplit(self.config.path_separator).next().unwrap_or(name);
        if leaf.is_empty() || leaf.len() > self.config.max_file_len {
            return Err(PbcStatus::InvalidArgument);
        }
        Ok(())
    }

    /// Reject names that address a repository the server did not advertise.
    fn check_repository(&self, name: &str) -> Result<(), PbcStatus> {
        let path = name.trim_start_matches('/');
        let leaf = path.rsplit('/').next().unwrap_or(path);
        let repos = self.peer_repositories;

        let sim = path == SIM_PREFIX
            || path
                .strip_prefix(SIM_PREFIX)
                .is_some_and(|rest| rest.starts_with('/'));
        if sim && !repos.contains(Repositories::SIM) {
            return Err(PbcStatus::NotSupported);
        }
        let speed_dial = path == PULL_PB_SPD_NAME || leaf == PULL_LIST_SPD_NAME;
        if speed_dial && !repos.contains(Repositories::SPEED_DIAL) {
            return Err(PbcStatus::NotSupported);
        }
        let favorites = path == PULL_PB_FAV_NAME || leaf == PULL_LIST_FAV_NAME;
        if favorites && !repos.contains(Repositories::FAVORITES) {
            return Err(PbcStatus::NotSupported);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    fn init_get_file(&mut self, req: GetFileRequest) {
        let object = ObjectType::classify(&req.remote_name);
        let checked = self
            .check_remote_name(&req.remote_name)
            .and_then(|()| {
                if req.remote_name.is_empty() {
                    Err(PbcStatus::InvalidArgument)
                } else {
                    Ok(())
                }
            })
            .and_then(|()| self.check_local_name(&req.local_name))
            .and_then(|()| {
                if self.flags.cout_active {
                    Err(PbcStatus::Busy)
                } else {
                    Ok(())
                }
            })
            .and_then(|()| {
                req.params
                    .to_app_params(object, self.peer_version)
                    .map_err(|_| PbcStatus::InvalidArgument)
            });

        tracing::debug!(
            remote = %req.remote_name,
            local = %req.local_name,
            object = ?object,
            "get file"
        );
        let (app_params, status) = match checked {
            Ok(bytes) => (bytes, None),
            Err(status) => (Vec::new(), Some(status)),
        };

        self.operation = ActiveOperation::GetFile(GetFileOp {
            remote_name: req.remote_name,
            local_name: req.local_name.clone(),
            object,
            app_params,
            fd: None,
            expected_len: None,
            received: 0,
            response: ResponseParams::default(),
        });

        if let Some(status) = status {
            self.op_status = Some(status);
            self.raise(Event::ObxComplete);
            return;
        }
        self.flags.cout_active = true;
        self.emit(Output::File(FileCallout::Open {
            name: req.local_name,
        }));
    }

    fn init_list_dir(&mut self, req: ListDirRequest) {
        let checked = self.check_remote_name(&req.dir_name).and_then(|()| {
            req.params
                .to_app_params(self.peer_version)
                .map_err(|_| PbcStatus::InvalidArgument)
        });
        tracing::debug!(dir = %req.dir_name, "list directory");

        let (app_params, status) = match checked {
            Ok(bytes) => (bytes, None),
            Err(status) => (Vec::new(), Some(status)),
        };
        self.operation = ActiveOperation::ListDir(ListOp {
            dir_name: req.dir_name.clone(),
            app_params: app_params.clone(),
            assembler: ListingAssembler::new(self.config.max_listing_len),
            listing: None,
            response: ResponseParams::default(),
        });

        if let Some(status) = status {
            self.op_status = Some(status);
            self.raise(Event::ObxComplete);
            return;
        }
        self.flags.first_get_pkt = true;
        self.send_transaction_request(ObexRequest::Get(GetHeaders {
            name: req.dir_name,
            mime_type: PULL_VCARD_LISTING_TYPE,
            app_params,
        }));
    }

    fn init_change_dir(&mut self, name: String, flag: SetPathFlag) {
        let target = match flag {
            SetPathFlag::Root | SetPathFlag::Up => Ok(None),
            SetPathFlag::Down => {
                if name.is_empty() || name.len() > self.config.max_file_len || name.contains('/')
                {
                    Err(PbcStatus::InvalidArgument)
                } else if name == SIM_PREFIX
                    && !self.peer_repositories.contains(Repositories::SIM)
                {
                    Err(PbcStatus::NotSupported)
                } else {
                    Ok(Some(name))
                }
            }
        };
        tracing::debug!(?flag, target = ?target, "change directory");

        match target {
            Ok(name) => {
                self.operation = ActiveOperation::ChangeDir(ChangeDirOp {
                    name: name.clone(),
                    flag,
                });
                self.send_transaction_request(ObexRequest::SetPath { name, flag });
            }
            Err(status) => {
                self.operation = ActiveOperation::ChangeDir(ChangeDirOp { name: None, flag });
                self.op_status = Some(status);
                self.raise(Event::ObxComplete);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Call-ins from the file collaborator
    // -----------------------------------------------------------------------

    fn ci_open(&mut self, status: PbcStatus, fd: Option<FileHandle>) {
        let awaiting_open = self.flags.cout_active
            && matches!(&self.operation, ActiveOperation::GetFile(op) if op.fd.is_none());
        if !awaiting_open {
            self.stray_call_in(Event::CiOpen { status, fd });
            return;
        }
        self.flags.cout_active = false;

        let (Some(fd), true) = (fd, status.is_ok()) else {
            tracing::warn!(%status, "local file open failed");
            if let Some(fd) = fd {
                self.emit(Output::File(FileCallout::Close { fd, remove: true }));
            }
            self.op_status = Some(PbcStatus::FileError);
            self.raise(Event::ObxComplete);
            return;
        };

        let ActiveOperation::GetFile(op) = &mut self.operation else {
            return;
        };
        op.fd = Some(fd);
        let headers = GetHeaders {
            name: op.remote_name.clone(),
            mime_type: op.object.mime_type(),
            app_params: op.app_params.clone(),
        };

        if self.abort != AbortState::None {
            self.op_status = Some(PbcStatus::Aborted);
            self.raise(Event::ObxComplete);
            return;
        }
        tracing::trace!(%fd, "local file open, sending GET");
        self.flags.first_get_pkt = true;
        self.send_transaction_request(ObexRequest::Get(headers));
    }

    fn ci_write(&mut self, status: PbcStatus, fd: FileHandle) {
        let awaiting_write = self.flags.cout_active
            && matches!(&self.operation, ActiveOperation::GetFile(op) if op.fd == Some(fd));
        if !awaiting_write {
            self.stray_call_in(Event::CiWrite { status, fd });
            return;
        }
        self.flags.cout_active = false;

        if !status.is_ok() {
            tracing::warn!(%fd, %status, "local file write failed");
            self.op_status = Some(PbcStatus::FileError);
            if self.cursor.is_final() {
                self.raise(Event::ObxComplete);
            } else {
                self.send_abort();
            }
            return;
        }

        let written = self.cursor.consume(self.cursor.bytes_left());
        if let ActiveOperation::GetFile(op) = &mut self.operation {
            op.received += written as u64;
            tracing::trace!(%fd, written, total = op.received, "body written");
        }
        self.packet_done();
    }

    fn stray_call_in(&mut self, event: Event) {
        self.flags.cout_active = false;
        match event {
            Event::CiOpen {
                status,
                fd: Some(fd),
            } => {
                tracing::warn!(%fd, %status, "closing file opened for a cancelled operation");
                self.emit(Output::File(FileCallout::Close { fd, remove: true }));
            }
            other => {
                tracing::debug!(event = ?other.kind(), "ignoring stray call-in");
            }
        }
    }

    // -----------------------------------------------------------------------
    // OBEX responses
    // -----------------------------------------------------------------------

    fn get_response(&mut self, code: u8, packet: Option<ObexPacket>) {
        if self.abort == AbortState::Sent {
            tracing::debug!("GET response crossed an abort, waiting for abort response");
            return;
        }
        self.clear_request();

        let rsp = ObexResponseCode::from_u8(code);
        let proceed = rsp.is_some_and(|c| c.is_success() || c == ObexResponseCode::Continue);
        if !proceed {
            let status = PbcStatus::from_obex(code);
            tracing::info!(code = format_args!("{code:#04x}"), %status, "GET refused");
            self.op_status.get_or_insert(status);
            self.raise(Event::ObxComplete);
            return;
        }

        let packet = packet.unwrap_or_default();
        let final_packet = rsp != Some(ObexResponseCode::Continue) || packet.end_of_body;
        if self.flags.first_get_pkt {
            self.flags.first_get_pkt = false;
            self.record_first_packet(&packet);
        }

        if self.abort == AbortState::Requested {
            if final_packet {
                self.op_status.get_or_insert(PbcStatus::Aborted);
                self.raise(Event::ObxComplete);
            } else {
                self.send_abort();
            }
            return;
        }

        tracing::trace!(len = packet.body.len(), final_packet, "GET response packet");
        self.cursor.load(packet.body, final_packet);

        match &self.operation {
            ActiveOperation::GetFile(_) => self.write_packet(),
            ActiveOperation::ListDir(_) => self.feed_listing(),
            other => {
                tracing::warn!(operation = other.name(), "GET response for non-GET operation");
                self.cursor.reset();
                self.op_status.get_or_insert(PbcStatus::BadRequest);
                self.raise(Event::ObxComplete);
            }
        }
    }

    fn record_first_packet(&mut self, packet: &ObexPacket) {
        let params = packet
            .app_params
            .as_deref()
            .and_then(|raw| match ApplicationParameters::decode(raw) {
                Ok(decoded) => Some(ResponseParams::from(&decoded)),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring malformed response parameters");
                    None
                }
            })
            .unwrap_or_default();
        if let Some(db) = params.database_identifier {
            tracing::debug!(database_id = %hex::encode(db), "server database identifier");
        }
        match &mut self.operation {
            ActiveOperation::GetFile(op) => {
                op.expected_len = packet.length.filter(|len| *len != LEN_UNKNOWN);
                op.response = params;
            }
            ActiveOperation::ListDir(op) => op.response = params,
            ActiveOperation::ChangeDir(_) | ActiveOperation::None => {}
        }
    }

    /// Hand the current packet body to the file collaborator.
    fn write_packet(&mut self) {
        let fd = match &self.operation {
            ActiveOperation::GetFile(op) => op.fd,
            _ => None,
        };
        let Some(fd) = fd else {
            tracing::error!("GET response with no open file");
            self.cursor.reset();
            self.op_status.get_or_insert(PbcStatus::FileError);
            self.raise(Event::ObxComplete);
            return;
        };
        if self.cursor.bytes_left() == 0 {
            self.packet_done();
            return;
        }
        let data = self.cursor.remaining().to_vec();
        self.flags.cout_active = true;
        self.emit(Output::File(FileCallout::Write { fd, data }));
    }

    /// Move the current packet body into the listing assembler.
    fn feed_listing(&mut self) {
        if let ActiveOperation::ListDir(op) = &mut self.operation {
            op.assembler.extend(self.cursor.remaining());
            let n = self.cursor.bytes_left();
            self.cursor.consume(n);

            if self.cursor.is_final() {
                match op.assembler.finish() {
                    Ok(listing) => {
                        tracing::debug!(dir = %op.dir_name, entries = listing.len(), "listing parsed");
                        op.listing = Some(listing);
                    }
                    Err(e) => {
                        tracing::warn!(dir = %op.dir_name, error = %e, "malformed listing");
                        self.op_status.get_or_insert(PbcStatus::FormatError);
                    }
                }
            }
        }
        self.packet_done();
    }

    /// The current packet is fully consumed: finish or ask for more.
    fn packet_done(&mut self) {
        if self.cursor.is_final() {
            self.raise(Event::ObxComplete);
        } else if self.abort == AbortState::Requested {
            self.send_abort();
        } else {
            self.send_transaction_request(ObexRequest::GetContinue);
        }
    }

    fn set_path_response(&mut self, code: u8) {
        self.clear_request();
        let status = PbcStatus::from_obex(code);
        if status.is_ok()
            && let ActiveOperation::ChangeDir(op) = &self.operation
        {
            match op.flag {
                SetPathFlag::Root => self.folder.clear(),
                SetPathFlag::Up => {
                    self.folder.pop();
                }
                SetPathFlag::Down => {
                    if let Some(name) = &op.name {
                        self.folder.push(name.clone());
                    }
                }
            }
            tracing::debug!(folder = %self.folder.join("/"), "remote folder changed");
        }
        self.op_status.get_or_insert(status);
        self.raise(Event::ObxComplete);
    }

    // -----------------------------------------------------------------------
    // Abort
    // -----------------------------------------------------------------------

    fn abort(&mut self) {
        self.notify(ClientEvent::AbortStatus {
            status: PbcStatus::Ok,
        });
        if self.abort != AbortState::None {
            tracing::debug!(abort = ?self.abort, "abort already in progress");
            return;
        }
        if matches!(self.operation, ActiveOperation::ChangeDir(_)) {
            tracing::debug!("SETPATH cannot be aborted");
            return;
        }
        if self.flags.req_pending || self.flags.cout_active {
            tracing::debug!("abort deferred until the outstanding response");
            self.abort = AbortState::Requested;
        } else {
            self.send_abort();
        }
    }

    fn send_abort(&mut self) {
        tracing::debug!(operation = self.operation.name(), "sending OBEX abort");
        self.abort = AbortState::Sent;
        self.cursor.reset();
        self.send_control_request(ObexRequest::Abort);
    }

    fn abort_response(&mut self, code: u8) {
        self.clear_request();
        tracing::debug!(code = format_args!("{code:#04x}"), "abort response");
        self.op_status.get_or_insert(PbcStatus::Aborted);
        self.raise(Event::ObxComplete);
    }

    fn abort_timeout(&mut self) {
        tracing::warn!(operation = self.operation.name(), "response timed out, aborting");
        self.op_status.get_or_insert(PbcStatus::Timeout);
        self.send_abort();
    }

    // -----------------------------------------------------------------------
    // Completion and teardown
    // -----------------------------------------------------------------------

    /// Complete the active operation, closing its file exactly once.
    pub(crate) fn finish_operation(&mut self, fallback: PbcStatus) {
        let status = self.op_status.take().unwrap_or(fallback);
        let operation = std::mem::take(&mut self.operation);
        self.cursor.reset();
        self.abort = AbortState::None;
        self.flags.first_get_pkt = false;

        let event = match operation {
            ActiveOperation::None => return,
            ActiveOperation::GetFile(op) => {
                if let Some(fd) = op.fd {
                    self.emit(Output::File(FileCallout::Close {
                        fd,
                        remove: !status.is_ok(),
                    }));
                }
                if let Some(expected) = op.expected_len
                    && status.is_ok()
                    && u64::from(expected) != op.received
                {
                    tracing::warn!(expected, received = op.received, "object length mismatch");
                }
                tracing::info!(remote = %op.remote_name, %status, bytes = op.received, "get complete");
                ClientEvent::GetComplete {
                    status,
                    bytes_transferred: op.received,
                    params: op.response,
                }
            }
            ActiveOperation::ListDir(op) => {
                tracing::info!(dir = %op.dir_name, %status, "list complete");
                ClientEvent::ListComplete {
                    status,
                    listing: if status.is_ok() { op.listing } else { None },
                    params: op.response,
                }
            }
            ActiveOperation::ChangeDir(_) => ClientEvent::ChangeDirComplete { status },
        };
        self.notify(event);
    }

    fn cancel_discovery(&mut self) {
        if self.flags.sdp_pending {
            self.flags.sdp_pending = false;
            self.emit(Output::CancelDiscovery);
        }
    }

    fn begin_close(&mut self) {
        self.flags.close_requested = true;
        if self.flags.sdp_pending {
            tracing::info!("close during discovery, cancelling");
            self.cancel_discovery();
            self.raise(Event::CloseComplete);
            return;
        }
        if !self.operation.is_none() {
            self.finish_operation(PbcStatus::Aborted);
        }
        tracing::info!(handle = ?self.obx_handle, "disconnecting");
        self.send_control_request(ObexRequest::Disconnect);
    }

    fn force_close(&mut self) {
        tracing::warn!(state = %self.state, "no response from server, forcing close");
        self.clear_request();
        self.cancel_discovery();
        if self.close_status.is_ok() {
            self.close_status = PbcStatus::Timeout;
        }
        if !self.operation.is_none() {
            self.finish_operation(PbcStatus::Timeout);
        }
        self.emit(Output::Transport(ObexRequest::Disconnect));
        self.raise(Event::CloseComplete);
    }

    fn link_closed(&mut self) {
        self.clear_request();
        self.cancel_discovery();
        if self.close_status.is_ok() && !self.flags.close_requested {
            self.close_status = PbcStatus::LinkLost;
        }
        tracing::info!(status = %self.close_status, "OBEX connection closed");
        if !self.operation.is_none() {
            self.finish_operation(PbcStatus::LinkLost);
        }
        self.raise(Event::CloseComplete);
    }

    fn close_complete(&mut self) {
        self.clear_request();
        self.cancel_discovery();
        if !self.operation.is_none() {
            self.finish_operation(PbcStatus::LinkLost);
        }

        let failure = if self.close_status.is_ok() {
            PbcStatus::Fail
        } else {
            self.close_status
        };
        let event = if self.flags.close_requested {
            ClientEvent::CloseComplete {
                status: PbcStatus::Ok,
            }
        } else if !self.flags.open_reported {
            ClientEvent::OpenComplete {
                status: failure,
                repositories: self.peer_repositories,
                features: self.peer_features,
            }
        } else {
            ClientEvent::CloseComplete { status: failure }
        };
        tracing::info!(peer = ?self.peer, "PBAP session closed");
        self.notify(event);

        self.obx_handle = None;
        self.peer_mtu = 0;
        self.abort = AbortState::None;
        self.cursor.reset();
        self.folder.clear();
        self.auth_rounds = 0;
        self.close_status = PbcStatus::Ok;
        self.flags.close_requested = false;
        self.flags.open_reported = false;

        if self.flags.disabling {
            self.raise(Event::DisableComplete);
        }
    }

    fn disable_complete(&mut self) {
        self.flags.disabling = false;
        self.enabled = false;
        tracing::info!("PBAP client disabled");
        self.notify(ClientEvent::Disabled);
    }
}
