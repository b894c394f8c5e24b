//! Listing XML parser built on `quick-xml`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{FileEntry, FolderListing, Listing, VCardEntry};
use crate::error::ListingError;

const VCARD_LISTING: &[u8] = b"vCard-listing";
const FOLDER_LISTING: &[u8] = b"folder-listing";

enum Root {
    VCards(Vec<VCardEntry>),
    Folder(FolderListing),
}

/// Parse a complete listing document.
///
/// The root element decides the listing kind. Unknown child elements and
/// anything nested below the entries are skipped.
pub fn parse_listing(data: &[u8]) -> Result<Listing, ListingError> {
    let text = std::str::from_utf8(data).map_err(|_| ListingError::InvalidUtf8)?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut root: Option<Root> = None;
    let mut depth = 0usize;
    let mut closed = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                on_element(&e, depth, &mut root)?;
                depth += 1;
            }
            Event::Empty(e) => {
                on_element(&e, depth, &mut root)?;
                if depth == 0 {
                    closed = true;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    closed = true;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        if closed {
            break;
        }
    }

    match root {
        None => Err(ListingError::Empty),
        Some(_) if !closed => Err(ListingError::Truncated),
        Some(Root::VCards(cards)) => Ok(Listing::VCards(cards)),
        Some(Root::Folder(folder)) => Ok(Listing::Folder(folder)),
    }
}

fn on_element(e: &BytesStart<'_>, depth: usize, root: &mut Option<Root>) -> Result<(), ListingError> {
    let name = e.name();
    let name = name.as_ref();

    if depth == 0 {
        *root = Some(match name {
            VCARD_LISTING => Root::VCards(Vec::new()),
            FOLDER_LISTING => Root::Folder(FolderListing::default()),
            other => return Err(ListingError::UnexpectedRoot(String::from_utf8_lossy(other).into_owned())),
        });
        return Ok(());
    }
    if depth > 1 {
        return Ok(());
    }

    match (root, name) {
        (Some(Root::VCards(cards)), b"card") => {
            let handle = attribute(e, b"handle")?.ok_or(ListingError::MissingAttribute {
                element: "card",
                attribute: "handle",
            })?;
            let name = attribute(e, b"name")?.unwrap_or_default();
            cards.push(VCardEntry { handle, name });
        }
        (Some(Root::Folder(folder)), b"folder") => {
            let name = attribute(e, b"name")?.ok_or(ListingError::MissingAttribute {
                element: "folder",
                attribute: "name",
            })?;
            folder.folders.push(name);
        }
        (Some(Root::Folder(folder)), b"file") => {
            let name = attribute(e, b"name")?.ok_or(ListingError::MissingAttribute {
                element: "file",
                attribute: "name",
            })?;
            let size = match attribute(e, b"size")? {
                Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                    ListingError::InvalidAttribute {
                        attribute: "size",
                        value: raw.clone(),
                    }
                })?),
                None => None,
            };
            folder.files.push(FileEntry { name, size });
        }
        (Some(Root::Folder(folder)), b"parent-folder") => folder.has_parent = true,
        (_, other) => {
            tracing::trace!(element = %String::from_utf8_lossy(other), "skipping listing element");
        }
    }
    Ok(())
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, ListingError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
