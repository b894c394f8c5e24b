//! The PBAP client session: control block, event model and state machine.
//!
//! ```text
//!  app request ─┐
//!  OBEX callback ├─> Session::handle ─> classify ─> table::lookup ─> action ─> [Output]
//!  call-in / timer┘                        ^                           │
//!                                          └──── internal completions ─┘
//! ```

mod actions;
pub mod config;
mod control;
pub mod event;
pub mod operation;
pub mod output;
pub mod state;
pub mod table;

pub use config::{SessionConfig, TimeoutAction};
pub use control::Session;
pub use event::{
    EventKind, FileHandle, GetFileRequest, ListDirRequest, ObexEvent, ObexEventKind, ObexPacket,
    ObexParams, SdpResult, ServiceChannel, ServiceRecord, SessionEvent,
};
pub use operation::{ActiveOperation, PacketCursor};
pub use output::{
    AuthKey, ClientEvent, FileCallout, GetHeaders, ObexRequest, Output, ResponseParams,
};
pub use state::{AbortState, PmState, SessionState, TimerOp};
