//! The operation in flight and its packet cursor.

use pbap_core::obex::SetPathFlag;

use super::event::FileHandle;
use super::output::ResponseParams;
use crate::listing::{Listing, ListingAssembler};
use crate::params::ObjectType;

/// A file download.
#[derive(Debug)]
pub struct GetFileOp {
    pub remote_name: String,
    pub local_name: String,
    pub object: ObjectType,
    pub app_params: Vec<u8>,
    /// Destination handle, owned by this operation until closed.
    pub fd: Option<FileHandle>,
    /// Length header from the first response.
    pub expected_len: Option<u32>,
    pub received: u64,
    pub response: ResponseParams,
}

/// A listing download.
#[derive(Debug)]
pub struct ListOp {
    pub dir_name: String,
    pub app_params: Vec<u8>,
    pub assembler: ListingAssembler,
    pub listing: Option<Listing>,
    pub response: ResponseParams,
}

#[derive(Debug)]
pub struct ChangeDirOp {
    pub name: Option<String>,
    pub flag: SetPathFlag,
}

/// At most one of these is in flight per session.
#[derive(Debug, Default)]
pub enum ActiveOperation {
    #[default]
    None,
    GetFile(GetFileOp),
    ListDir(ListOp),
    ChangeDir(ChangeDirOp),
}

impl ActiveOperation {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::GetFile(_) => "get_file",
            Self::ListDir(_) => "list_dir",
            Self::ChangeDir(_) => "change_dir",
        }
    }

    /// Whether the operation streams a multi-packet GET body.
    pub fn is_get(&self) -> bool {
        matches!(self, Self::GetFile(_) | Self::ListDir(_))
    }
}

/// Progress through the Body of the current GET response packet.
#[derive(Debug, Default)]
pub struct PacketCursor {
    body: Option<Vec<u8>>,
    offset: usize,
    bytes_left: usize,
    final_packet: bool,
}

impl PacketCursor {
    /// Take ownership of a packet body.
    pub fn load(&mut self, body: Vec<u8>, final_packet: bool) {
        self.bytes_left = body.len();
        self.offset = 0;
        self.body = Some(body);
        self.final_packet = final_packet;
    }

    /// Unconsumed bytes of the current packet, without consuming them.
    pub fn remaining(&self) -> &[u8] {
        match &self.body {
            Some(body) => &body[self.offset..self.offset + self.bytes_left],
            None => &[],
        }
    }

    /// Mark `n` bytes as consumed. Releases the buffer once drained.
    pub fn consume(&mut self, n: usize) -> usize {
        let n = n.min(self.bytes_left);
        self.offset += n;
        self.bytes_left -= n;
        if self.bytes_left == 0 {
            self.body = None;
            self.offset = 0;
        }
        n
    }

    pub fn bytes_left(&self) -> usize {
        self.bytes_left
    }

    pub fn is_final(&self) -> bool {
        self.final_packet
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_none() && !self.final_packet
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_consumes_and_releases() {
        let mut cursor = PacketCursor::default();
        assert!(cursor.is_empty());

        cursor.load(vec![1, 2, 3, 4], false);
        assert_eq!(cursor.remaining(), &[1, 2, 3, 4]);
        assert_eq!(cursor.consume(3), 3);
        assert_eq!(cursor.remaining(), &[4]);
        assert_eq!(cursor.consume(10), 1);
        assert_eq!(cursor.bytes_left(), 0);
        assert!(cursor.remaining().is_empty());
        assert!(cursor.is_empty());
    }

    #[test]
    fn final_flag_survives_drain() {
        let mut cursor = PacketCursor::default();
        cursor.load(vec![9], true);
        cursor.consume(1);
        assert!(cursor.is_final());
        assert!(!cursor.is_empty());
        cursor.reset();
        assert!(cursor.is_empty());
    }

    #[test]
    fn operation_kinds() {
        assert!(ActiveOperation::None.is_none());
        let op = ActiveOperation::ChangeDir(ChangeDirOp {
            name: None,
            flag: SetPathFlag::Root,
        });
        assert_eq!(op.name(), "change_dir");
        assert!(!op.is_get());
    }
}
