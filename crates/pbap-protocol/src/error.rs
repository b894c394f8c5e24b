//! Protocol error types.
//!
//! Application-visible outcomes of requests are [`PbcStatus`](crate::PbcStatus)
//! values carried in completion events. The errors here cover misuse of the
//! session object and malformed listing documents.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has been disabled")]
    Disabled,

    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("listing is empty")]
    Empty,

    #[error("listing ended before the root element closed")]
    Truncated,

    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    #[error("<{element}> is missing the {attribute:?} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("invalid {attribute:?} attribute value {value:?}")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },

    #[error("listing is not valid UTF-8")]
    InvalidUtf8,

    #[error("listing too large: {len} bytes (max {max})")]
    TooLarge { len: usize, max: usize },

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
}
