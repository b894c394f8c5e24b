//! Test vector types for listings.json
//!
//! vCard-listing and folder-listing documents with their expected entries.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CardEntry {
    pub handle: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct VCardListingVector {
    pub description: String,
    pub xml: String,
    pub entries: Vec<CardEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct FolderListingVector {
    pub description: String,
    pub xml: String,
    pub has_parent: bool,
    pub folders: Vec<String>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MalformedVector {
    pub description: String,
    pub xml: String,
    /// One of `truncated`, `xml`, `missing_attribute`, `unexpected_root`,
    /// `empty`, `invalid_attribute`.
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingsVectors {
    pub description: String,
    pub source: String,
    pub vcard_listings: Vec<VCardListingVector>,
    pub folder_listings: Vec<FolderListingVector>,
    pub malformed: Vec<MalformedVector>,
}

pub fn load() -> ListingsVectors {
    let json = include_str!("../../../.test-vectors/listings.json");
    serde_json::from_str(json).expect("Failed to deserialize listings.json")
}
