//! Client-level status codes reported to the application.

use core::fmt;

use pbap_core::obex::ObexResponseCode;

/// Outcome of a client request, carried in every completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PbcStatus {
    Ok,
    Fail,
    NoPermission,
    NotFound,
    Full,
    Busy,
    Aborted,
    ServiceUnavailable,
    SdpError,
    BadRequest,
    NotImplemented,
    NotConnected,
    InvalidArgument,
    NotSupported,
    FileError,
    FormatError,
    Timeout,
    LinkLost,
}

impl PbcStatus {
    /// Map an OBEX response code (final bit optional) to a client status.
    #[must_use]
    pub fn from_obex(code: u8) -> Self {
        let Some(rsp) = ObexResponseCode::from_u8(code) else {
            return Self::Fail;
        };
        if rsp.is_success() || rsp == ObexResponseCode::Continue {
            return Self::Ok;
        }
        match rsp {
            ObexResponseCode::Unauthorized | ObexResponseCode::Forbidden => Self::NoPermission,
            ObexResponseCode::NotFound => Self::NotFound,
            ObexResponseCode::ServiceUnavailable => Self::ServiceUnavailable,
            ObexResponseCode::BadRequest | ObexResponseCode::NotAcceptable => Self::BadRequest,
            ObexResponseCode::NotImplemented => Self::NotImplemented,
            ObexResponseCode::DatabaseFull => Self::Full,
            _ => Self::Fail,
        }
    }

    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for PbcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Fail => "failed",
            Self::NoPermission => "no permission",
            Self::NotFound => "not found",
            Self::Full => "full",
            Self::Busy => "busy",
            Self::Aborted => "aborted",
            Self::ServiceUnavailable => "service unavailable",
            Self::SdpError => "service discovery failed",
            Self::BadRequest => "bad request",
            Self::NotImplemented => "not implemented",
            Self::NotConnected => "not connected",
            Self::InvalidArgument => "invalid argument",
            Self::NotSupported => "not supported by peer",
            Self::FileError => "file error",
            Self::FormatError => "format error",
            Self::Timeout => "timed out",
            Self::LinkLost => "link lost",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obex_success_maps_to_ok() {
        assert_eq!(PbcStatus::from_obex(0xA0), PbcStatus::Ok);
        assert_eq!(PbcStatus::from_obex(0x20), PbcStatus::Ok);
        assert_eq!(PbcStatus::from_obex(0x90), PbcStatus::Ok);
    }

    #[test]
    fn obex_errors_map_to_taxonomy() {
        assert_eq!(PbcStatus::from_obex(0xC1), PbcStatus::NoPermission);
        assert_eq!(PbcStatus::from_obex(0xC3), PbcStatus::NoPermission);
        assert_eq!(PbcStatus::from_obex(0xC4), PbcStatus::NotFound);
        assert_eq!(PbcStatus::from_obex(0xD3), PbcStatus::ServiceUnavailable);
        assert_eq!(PbcStatus::from_obex(0xC0), PbcStatus::BadRequest);
        assert_eq!(PbcStatus::from_obex(0xD1), PbcStatus::NotImplemented);
        assert_eq!(PbcStatus::from_obex(0xE0), PbcStatus::Full);
        assert_eq!(PbcStatus::from_obex(0xD0), PbcStatus::Fail);
    }

    #[test]
    fn unknown_code_is_failure() {
        assert_eq!(PbcStatus::from_obex(0x00), PbcStatus::Fail);
        assert_eq!(PbcStatus::from_obex(0xFF), PbcStatus::Fail);
    }
}
