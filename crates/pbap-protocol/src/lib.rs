//! Sans-IO client engine for the Phone Book Access Profile.
//!
//! A [`Session`] is fed application requests, OBEX transport callbacks,
//! service discovery results, file call-ins and timer expiries, and answers
//! each with a list of [`Output`]s: transport requests, file call-outs,
//! timer operations and application callbacks. It never blocks and owns no
//! I/O resources.

pub mod error;
pub mod listing;
pub mod params;
pub mod session;
pub mod status;

pub use error::{ListingError, SessionError};
pub use listing::{FileEntry, FolderListing, Listing, ListingAssembler, VCardEntry};
pub use params::{ListParams, ObjectType, PullParams, SelectorParams};
pub use session::{
    AuthKey, ClientEvent, FileCallout, FileHandle, ObexRequest, Output, Session, SessionConfig,
    SessionEvent, SessionState,
};
pub use status::PbcStatus;
