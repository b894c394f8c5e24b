//! OBEX identifiers consumed by the PBAP client.
//!
//! Only the response codes and SETPATH flags are modelled here; packet
//! framing belongs to the transport.

/// OBEX response codes, with the final bit (0x80) set as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObexResponseCode {
    Continue = 0x90,
    Ok = 0xA0,
    Created = 0xA1,
    Accepted = 0xA2,
    NonAuthoritative = 0xA3,
    NoContent = 0xA4,
    ResetContent = 0xA5,
    PartialContent = 0xA6,
    BadRequest = 0xC0,
    Unauthorized = 0xC1,
    PaymentRequired = 0xC2,
    Forbidden = 0xC3,
    NotFound = 0xC4,
    MethodNotAllowed = 0xC5,
    NotAcceptable = 0xC6,
    ProxyAuthRequired = 0xC7,
    RequestTimeout = 0xC8,
    Conflict = 0xC9,
    Gone = 0xCA,
    LengthRequired = 0xCB,
    PreconditionFailed = 0xCC,
    EntityTooLarge = 0xCD,
    UriTooLarge = 0xCE,
    UnsupportedMediaType = 0xCF,
    InternalServerError = 0xD0,
    NotImplemented = 0xD1,
    BadGateway = 0xD2,
    ServiceUnavailable = 0xD3,
    GatewayTimeout = 0xD4,
    VersionNotSupported = 0xD5,
    DatabaseFull = 0xE0,
    DatabaseLocked = 0xE1,
}

impl ObexResponseCode {
    /// Parse a response code. The final bit is implied: `0x10` and `0x90`
    /// both decode to `Continue`.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        let code = match value | 0x80 {
            0x90 => Self::Continue,
            0xA0 => Self::Ok,
            0xA1 => Self::Created,
            0xA2 => Self::Accepted,
            0xA3 => Self::NonAuthoritative,
            0xA4 => Self::NoContent,
            0xA5 => Self::ResetContent,
            0xA6 => Self::PartialContent,
            0xC0 => Self::BadRequest,
            0xC1 => Self::Unauthorized,
            0xC2 => Self::PaymentRequired,
            0xC3 => Self::Forbidden,
            0xC4 => Self::NotFound,
            0xC5 => Self::MethodNotAllowed,
            0xC6 => Self::NotAcceptable,
            0xC7 => Self::ProxyAuthRequired,
            0xC8 => Self::RequestTimeout,
            0xC9 => Self::Conflict,
            0xCA => Self::Gone,
            0xCB => Self::LengthRequired,
            0xCC => Self::PreconditionFailed,
            0xCD => Self::EntityTooLarge,
            0xCE => Self::UriTooLarge,
            0xCF => Self::UnsupportedMediaType,
            0xD0 => Self::InternalServerError,
            0xD1 => Self::NotImplemented,
            0xD2 => Self::BadGateway,
            0xD3 => Self::ServiceUnavailable,
            0xD4 => Self::GatewayTimeout,
            0xD5 => Self::VersionNotSupported,
            0xE0 => Self::DatabaseFull,
            0xE1 => Self::DatabaseLocked,
            _ => return None,
        };
        Some(code)
    }

    /// Whether this is a 2xx-class success code.
    #[must_use]
    pub fn is_success(self) -> bool {
        (self as u8) & 0xF0 == 0xA0
    }
}

/// SETPATH direction requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetPathFlag {
    /// Go to the root folder (empty name).
    Root,
    /// Go up one level (backup flag, no name).
    Up,
    /// Enter the named child folder.
    Down,
}

impl SetPathFlag {
    /// OBEX SETPATH flags byte: bit 0 = backup, bit 1 = don't create.
    #[must_use]
    pub fn flags_byte(self) -> u8 {
        match self {
            Self::Up => 0x03,
            Self::Root | Self::Down => 0x02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_bit_is_implied() {
        assert_eq!(ObexResponseCode::from_u8(0x10), Some(ObexResponseCode::Continue));
        assert_eq!(ObexResponseCode::from_u8(0x90), Some(ObexResponseCode::Continue));
        assert_eq!(ObexResponseCode::from_u8(0x20), Some(ObexResponseCode::Ok));
        assert_eq!(ObexResponseCode::from_u8(0x44), Some(ObexResponseCode::NotFound));
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(ObexResponseCode::from_u8(0xBF), None);
        assert_eq!(ObexResponseCode::from_u8(0x00), None);
        assert_eq!(ObexResponseCode::from_u8(0xE2), None);
    }

    #[test]
    fn success_class() {
        assert!(ObexResponseCode::Ok.is_success());
        assert!(ObexResponseCode::PartialContent.is_success());
        assert!(!ObexResponseCode::Continue.is_success());
        assert!(!ObexResponseCode::Forbidden.is_success());
    }

    #[test]
    fn setpath_flags() {
        assert_eq!(SetPathFlag::Up.flags_byte(), 0x03);
        assert_eq!(SetPathFlag::Down.flags_byte(), 0x02);
        assert_eq!(SetPathFlag::Root.flags_byte(), 0x02);
    }
}
