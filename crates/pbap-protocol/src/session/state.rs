//! Session states and the small enums tracked by the control block.

use core::fmt;

/// Client session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Service discovery and OBEX connect in progress.
    Opening,
    /// Connected and ready for requests.
    Connected,
    /// A GET, listing or SETPATH is outstanding.
    InTransaction,
    /// Graceful disconnect in progress.
    Closing,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Opening => "opening",
            Self::Connected => "connected",
            Self::InTransaction => "in_transaction",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recovery applied when the response timer expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOp {
    /// Send an OBEX Abort and wait once more.
    Abort,
    /// Give up and force the session closed.
    Stop,
}

/// Host power-management hint derived from outstanding work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PmState {
    #[default]
    Idle,
    Busy,
}

/// Progress of a user abort on the active operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbortState {
    #[default]
    None,
    /// Requested while a response or call-in was outstanding; sent later.
    Requested,
    /// OBEX Abort is on the wire.
    Sent,
}
