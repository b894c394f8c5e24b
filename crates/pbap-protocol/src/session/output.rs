//! Side effects requested by the session.
//!
//! The session performs no I/O. Every transport request, call-out, timer
//! operation and application callback is returned as an [`Output`] for the
//! runtime to carry out.

use std::time::Duration;

use pbap_core::app_params::ApplicationParameters;
use pbap_core::constants::MAX_AUTH_KEY_SIZE;
use pbap_core::obex::SetPathFlag;
use pbap_core::types::{BdAddr, Repositories, SupportedFeatures};

use super::event::{FileHandle, ServiceChannel};
use super::state::PmState;
use crate::listing::Listing;
use crate::status::PbcStatus;

/// OBEX authentication key, at most [`MAX_AUTH_KEY_SIZE`] bytes.
///
/// Key material is zeroed when the value is dropped.
pub struct AuthKey {
    bytes: [u8; MAX_AUTH_KEY_SIZE],
    len: usize,
}

impl AuthKey {
    /// Copy a key, truncating anything past [`MAX_AUTH_KEY_SIZE`] bytes.
    pub fn new(key: &[u8]) -> Self {
        let len = key.len().min(MAX_AUTH_KEY_SIZE);
        let mut bytes = [0u8; MAX_AUTH_KEY_SIZE];
        bytes[..len].copy_from_slice(&key[..len]);
        Self { bytes, len }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthKey").field(&"[REDACTED]").finish()
    }
}

impl Clone for AuthKey {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes,
            len: self.len,
        }
    }
}

impl PartialEq for AuthKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for AuthKey {}

impl Drop for AuthKey {
    fn drop(&mut self) {
        self.bytes.fill(0);
        self.len = 0;
    }
}

/// Headers of an OBEX GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetHeaders {
    pub name: String,
    pub mime_type: &'static str,
    pub app_params: Vec<u8>,
}

/// Request handed to the OBEX transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObexRequest {
    Connect {
        peer: BdAddr,
        channel: ServiceChannel,
        target: [u8; 16],
        security: u8,
        /// Application Parameters header, sent to servers that advertise features.
        app_params: Option<Vec<u8>>,
    },
    Get(GetHeaders),
    /// Ask for the next packet of the object in flight.
    GetContinue,
    SetPath {
        /// `None` for root and parent moves.
        name: Option<String>,
        flag: SetPathFlag,
    },
    Abort,
    Disconnect,
    AuthResponse {
        key: AuthKey,
        user_id: Option<String>,
    },
}

/// Call-out to the file collaborator. Answered by a call-in event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCallout {
    Open { name: String },
    Write { fd: FileHandle, data: Vec<u8> },
    /// Not answered. `remove` discards a partial download.
    Close { fd: FileHandle, remove: bool },
}

/// Application Parameters returned by the server with a pull or listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseParams {
    pub phonebook_size: Option<u16>,
    pub new_missed_calls: Option<u8>,
    pub primary_version_counter: Option<[u8; 16]>,
    pub secondary_version_counter: Option<[u8; 16]>,
    pub database_identifier: Option<[u8; 16]>,
}

impl From<&ApplicationParameters> for ResponseParams {
    fn from(params: &ApplicationParameters) -> Self {
        Self {
            phonebook_size: params.phonebook_size(),
            new_missed_calls: params.new_missed_calls(),
            primary_version_counter: params.primary_version_counter(),
            secondary_version_counter: params.secondary_version_counter(),
            database_identifier: params.database_identifier(),
        }
    }
}

/// Callback delivered to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Enabled,
    OpenComplete {
        status: PbcStatus,
        repositories: Repositories,
        features: SupportedFeatures,
    },
    CloseComplete {
        status: PbcStatus,
    },
    GetComplete {
        status: PbcStatus,
        bytes_transferred: u64,
        params: ResponseParams,
    },
    ListComplete {
        status: PbcStatus,
        listing: Option<Listing>,
        params: ResponseParams,
    },
    ChangeDirComplete {
        status: PbcStatus,
    },
    AuthChallenge {
        realm: Option<String>,
        userid_required: bool,
    },
    /// The server challenged again after a response was sent.
    PasswordRequired,
    AuthRejected {
        status: PbcStatus,
    },
    AbortStatus {
        status: PbcStatus,
    },
    Disabled,
}

/// One side effect for the runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Transport(ObexRequest),
    StartDiscovery { peer: BdAddr, target: [u8; 16] },
    CancelDiscovery,
    File(FileCallout),
    /// (Re)arm the single response timer. Expiry is reported with `token`.
    StartTimer { token: u64, duration: Duration },
    StopTimer,
    Notify(ClientEvent),
    PowerState(PmState),
}
