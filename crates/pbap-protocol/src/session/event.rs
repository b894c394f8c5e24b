//! Inputs to the session: application requests, collaborator callbacks,
//! call-ins and timer expiry.
//!
//! External inputs are [`SessionEvent`]s. The control block filters and
//! classifies them into the internal [`Event`] stream the state table is
//! keyed on, which also carries the completion events actions raise for
//! themselves.

use core::fmt;

use pbap_core::obex::SetPathFlag;
use pbap_core::types::{BdAddr, ObexHandle, Repositories, SupportedFeatures};

use super::output::AuthKey;
use crate::params::{ListParams, PullParams};
use crate::status::PbcStatus;

/// Local file handle issued by the file collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle(pub u32);

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd#{}", self.0)
    }
}

/// Channel the PSE service listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceChannel {
    Rfcomm(u8),
    L2cap(u16),
}

/// Attributes of the discovered PSE service record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRecord {
    pub version: u16,
    pub channel: ServiceChannel,
    /// Absent on 1.1 servers.
    pub features: Option<SupportedFeatures>,
    pub repositories: Repositories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpResult {
    Found(ServiceRecord),
    Failed,
}

/// Kind of OBEX transport callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObexEventKind {
    ConnectResponse,
    GetResponse,
    SetPathResponse,
    AbortResponse,
    /// The server challenged the connect with OBEX authentication.
    Password,
    /// The transport gave up waiting on the peer.
    Timeout,
    /// Disconnect confirmation or link loss.
    Close,
}

/// Connection-level parameters carried by some callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObexParams {
    pub peer_mtu: u16,
    pub realm: Option<String>,
    pub userid_required: bool,
}

/// One GET response packet, owned by the session once delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObexPacket {
    pub body: Vec<u8>,
    /// End-of-Body header seen.
    pub end_of_body: bool,
    /// Length header, if the server announced one.
    pub length: Option<u32>,
    /// Raw Application Parameters header value.
    pub app_params: Option<Vec<u8>>,
}

/// A callback from the OBEX transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObexEvent {
    pub handle: ObexHandle,
    pub kind: ObexEventKind,
    pub response_code: u8,
    pub params: ObexParams,
    pub packet: Option<ObexPacket>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetFileRequest {
    pub remote_name: String,
    pub local_name: String,
    pub params: PullParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDirRequest {
    pub dir_name: String,
    pub params: ListParams,
}

/// Everything that can be fed into [`Session::handle`](super::Session::handle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Open { peer: BdAddr, security: u8 },
    Close,
    GetFile(GetFileRequest),
    ListDir(ListDirRequest),
    ChangeDir { name: String, flag: SetPathFlag },
    /// Answer to an auth challenge. An empty key declines it.
    AuthResponse { key: AuthKey, user_id: Option<String> },
    Abort,
    Disable,
    Discovery(SdpResult),
    Obex(ObexEvent),
    /// Call-in answering a file open call-out.
    FileOpened { status: PbcStatus, fd: Option<FileHandle> },
    /// Call-in answering a file write call-out.
    FileWritten { status: PbcStatus, fd: FileHandle },
    TimerExpired { token: u64 },
}

// ---------------------------------------------------------------------------
// Classified events
// ---------------------------------------------------------------------------

/// Event kinds the state table is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Open,
    Close,
    GetFile,
    ListDir,
    ChangeDir,
    AuthResponse,
    Abort,
    Disable,
    SdpOk,
    SdpFail,
    CiOpen,
    CiWrite,
    ConnectResponse,
    Password,
    GetResponse,
    SetPathResponse,
    AbortResponse,
    ObxClose,
    AbortTimeout,
    StopTimeout,
    ObxComplete,
    CloseComplete,
    DisableComplete,
}

/// A classified event with its payload.
#[derive(Debug)]
pub(crate) enum Event {
    Open { peer: BdAddr, security: u8 },
    Close,
    GetFile(GetFileRequest),
    ListDir(ListDirRequest),
    ChangeDir { name: String, flag: SetPathFlag },
    AuthResponse { key: AuthKey, user_id: Option<String> },
    Abort,
    Disable,
    SdpOk(ServiceRecord),
    SdpFail,
    CiOpen { status: PbcStatus, fd: Option<FileHandle> },
    CiWrite { status: PbcStatus, fd: FileHandle },
    ConnectResponse { handle: ObexHandle, code: u8, params: ObexParams },
    Password { handle: ObexHandle, params: ObexParams },
    GetResponse { code: u8, packet: Option<ObexPacket> },
    SetPathResponse { code: u8 },
    AbortResponse { code: u8 },
    ObxClose,
    AbortTimeout,
    StopTimeout,
    ObxComplete,
    CloseComplete,
    DisableComplete,
}

impl Event {
    pub(crate) fn kind(&self) -> EventKind {
        match self {
            Self::Open { .. } => EventKind::Open,
            Self::Close => EventKind::Close,
            Self::GetFile(_) => EventKind::GetFile,
            Self::ListDir(_) => EventKind::ListDir,
            Self::ChangeDir { .. } => EventKind::ChangeDir,
            Self::AuthResponse { .. } => EventKind::AuthResponse,
            Self::Abort => EventKind::Abort,
            Self::Disable => EventKind::Disable,
            Self::SdpOk(_) => EventKind::SdpOk,
            Self::SdpFail => EventKind::SdpFail,
            Self::CiOpen { .. } => EventKind::CiOpen,
            Self::CiWrite { .. } => EventKind::CiWrite,
            Self::ConnectResponse { .. } => EventKind::ConnectResponse,
            Self::Password { .. } => EventKind::Password,
            Self::GetResponse { .. } => EventKind::GetResponse,
            Self::SetPathResponse { .. } => EventKind::SetPathResponse,
            Self::AbortResponse { .. } => EventKind::AbortResponse,
            Self::ObxClose => EventKind::ObxClose,
            Self::AbortTimeout => EventKind::AbortTimeout,
            Self::StopTimeout => EventKind::StopTimeout,
            Self::ObxComplete => EventKind::ObxComplete,
            Self::CloseComplete => EventKind::CloseComplete,
            Self::DisableComplete => EventKind::DisableComplete,
        }
    }
}

/// Whether an OBEX callback answers an outstanding request.
///
/// Responses are only meaningful while a request is pending; link closure
/// and transport timeouts are accepted at any time.
pub fn is_response_kind(kind: ObexEventKind) -> bool {
    matches!(
        kind,
        ObexEventKind::ConnectResponse
            | ObexEventKind::GetResponse
            | ObexEventKind::SetPathResponse
            | ObexEventKind::AbortResponse
            | ObexEventKind::Password
    )
}
