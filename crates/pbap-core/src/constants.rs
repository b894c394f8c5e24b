//! Phone Book Access Profile constants.
//!
//! Values are taken from the PBAP 1.1/1.2 specification and the OBEX
//! identifiers shared with the peer Phone Book Server Equipment (PSE).

/// OBEX Target header value identifying the PBAP PSE service.
pub const PB_ACCESS_TARGET_UUID: [u8; 16] = [
    0x79, 0x61, 0x35, 0xF0, 0xF0, 0xC5, 0x11, 0xD8, 0x09, 0x66, 0x08, 0x00, 0x20, 0x0C, 0x9A, 0x66,
];

/// Length of a UUID in bytes.
pub const UUID_LENGTH: usize = 16;

/// Maximum OBEX authentication key length.
pub const MAX_AUTH_KEY_SIZE: usize = 16;

/// Maximum OBEX authentication realm / user id length.
pub const MAX_REALM_LEN: usize = 30;

/// Sentinel for "object length not announced by the peer".
pub const LEN_UNKNOWN: u32 = 0xFFFF_FFFF;

// ---------------------------------------------------------------------------
// OBEX Type header values
// ---------------------------------------------------------------------------

/// Folder listing object type.
pub const FOLDER_LISTING_TYPE: &str = "x-obex/folder-listing";

/// PullPhoneBook object type.
pub const PULL_PB_TYPE: &str = "x-bt/phonebook";

/// PullvCardListing object type.
pub const PULL_VCARD_LISTING_TYPE: &str = "x-bt/vcard-listing";

/// PullvCardEntry object type.
pub const PULL_VCARD_ENTRY_TYPE: &str = "x-bt/vcard";

// ---------------------------------------------------------------------------
// Well-known names
// ---------------------------------------------------------------------------

/// Speed dial phone book object.
pub const PULL_PB_SPD_NAME: &str = "telecom/spd.vcf";

/// Favorites phone book object.
pub const PULL_PB_FAV_NAME: &str = "telecom/fav.vcf";

/// Speed dial listing folder.
pub const PULL_LIST_SPD_NAME: &str = "spd";

/// Favorites listing folder.
pub const PULL_LIST_FAV_NAME: &str = "fav";

/// Prefix of names addressing the SIM repository.
pub const SIM_PREFIX: &str = "SIM1";

// ---------------------------------------------------------------------------
// Profile versions and defaults
// ---------------------------------------------------------------------------

/// PBAP 1.1.
pub const VERSION_1_1: u16 = 0x0101;

/// PBAP 1.2.
pub const VERSION_1_2: u16 = 0x0102;

/// Peer supported features assumed when the SDP record carries none.
pub const DEFAULT_SUPPORTED_FEATURES: u32 = 0x0000_0003;

/// Default path separator for local file names.
pub const DEFAULT_PATH_SEPARATOR: char = '/';

/// Default maximum path length (includes the appended file name).
pub const DEFAULT_MAX_PATH_LEN: usize = 294;

/// Default maximum file name length.
pub const DEFAULT_MAX_FILE_LEN: usize = 256;

/// Default timeout in milliseconds to wait for an abort or disconnect response.
pub const DEFAULT_STOPABORT_TIMEOUT_MS: u64 = 2000;
