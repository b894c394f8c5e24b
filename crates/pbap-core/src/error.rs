//! Error types for the pbap-core crate.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AppParamError {
    #[error("truncated application parameter: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("invalid length {len} for tag {tag:#04x}")]
    InvalidLength { tag: u8, len: usize },

    #[error("value too long for tag {tag:#04x}: {len} bytes")]
    ValueTooLong { tag: u8, len: usize },

    #[error("invalid value {value:#04x} for tag {tag:#04x}")]
    InvalidValue { tag: u8, value: u8 },

    #[error("search value is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid device address length: expected 6 octets, got {0}")]
    InvalidLength(usize),

    #[error("invalid device address octet: {0:?}")]
    InvalidOctet(String),
}
