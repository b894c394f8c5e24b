//! Reassembly of a listing body spread over several GET responses.

use super::{Listing, parse_listing};
use crate::error::ListingError;

/// Accumulates listing body bytes until the final packet arrives.
#[derive(Debug)]
pub struct ListingAssembler {
    buf: Vec<u8>,
    max_len: usize,
    overflowed: bool,
}

impl ListingAssembler {
    pub fn new(max_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_len,
            overflowed: false,
        }
    }

    /// Append one packet's worth of body bytes.
    ///
    /// Bytes beyond `max_len` are dropped and the overflow is reported by
    /// [`finish`](Self::finish).
    pub fn extend(&mut self, chunk: &[u8]) {
        if self.overflowed {
            return;
        }
        if self.buf.len() + chunk.len() > self.max_len {
            tracing::warn!(
                have = self.buf.len(),
                chunk = chunk.len(),
                max = self.max_len,
                "listing exceeds size limit"
            );
            self.overflowed = true;
            return;
        }
        self.buf.extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Parse the accumulated document and release the buffer.
    pub fn finish(&mut self) -> Result<Listing, ListingError> {
        let buf = std::mem::take(&mut self.buf);
        if self.overflowed {
            return Err(ListingError::TooLarge {
                len: buf.len(),
                max: self.max_len,
            });
        }
        parse_listing(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOLDER: &str = r#"<?xml version="1.0"?><folder-listing version="1.0"><parent-folder/><folder name="pb"/><folder name="ich"/><file name="pb.vcf" size="1024"/></folder-listing>"#;

    #[test]
    fn split_mid_attribute() {
        let mut asm = ListingAssembler::new(4096);
        let bytes = FOLDER.as_bytes();
        let cut = FOLDER.find("ich").unwrap() + 1;
        asm.extend(&bytes[..cut]);
        asm.extend(&bytes[cut..]);
        assert_eq!(asm.finish().unwrap(), parse_listing(bytes).unwrap());
        assert!(asm.is_empty());
    }

    #[test]
    fn overflow_is_reported() {
        let mut asm = ListingAssembler::new(16);
        asm.extend(FOLDER.as_bytes());
        assert!(matches!(asm.finish(), Err(ListingError::TooLarge { max: 16, .. })));
    }
}
