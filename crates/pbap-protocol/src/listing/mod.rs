//! Folder-listing and vCard-listing objects.
//!
//! Listing bodies arrive split across any number of GET response packets.
//! [`ListingAssembler`] collects the body and parses it once the final packet
//! has been seen, so an element straddling a packet boundary is never cut.

pub mod assembler;
pub mod parser;

pub use assembler::ListingAssembler;
pub use parser::parse_listing;

/// One entry of a `vCard-listing` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardEntry {
    pub handle: String,
    pub name: String,
}

/// A file entry of a `folder-listing` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: Option<u64>,
}

/// A parsed `folder-listing` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderListing {
    pub has_parent: bool,
    pub folders: Vec<String>,
    pub files: Vec<FileEntry>,
}

/// A parsed listing, keyed by its root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    VCards(Vec<VCardEntry>),
    Folder(FolderListing),
}

impl Listing {
    /// Number of entries (cards, or folders plus files).
    pub fn len(&self) -> usize {
        match self {
            Self::VCards(cards) => cards.len(),
            Self::Folder(folder) => folder.folders.len() + folder.files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
