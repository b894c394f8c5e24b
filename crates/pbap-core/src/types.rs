//! Newtype wrappers and small value types shared across the PBAP stack.
//!
//! Bitmask types are thin wrappers over the wire integer so they round-trip
//! bit-for-bit with what the peer advertises.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign};
use core::str::FromStr;

use crate::error::AddressError;

/// A 48-bit Bluetooth device address, most significant octet first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[must_use]
pub struct BdAddr(pub [u8; 6]);

impl BdAddr {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BdAddr({self})")
    }
}

impl FromStr for BdAddr {
    type Err = AddressError;

    /// Parse `AA:BB:CC:DD:EE:FF` (or `-` separated) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(AddressError::InvalidLength(parts.len()));
        }
        let mut out = [0u8; 6];
        for (slot, part) in out.iter_mut().zip(&parts) {
            if part.len() != 2 {
                return Err(AddressError::InvalidOctet((*part).to_string()));
            }
            *slot = u8::from_str_radix(part, 16)
                .map_err(|_| AddressError::InvalidOctet((*part).to_string()))?;
        }
        Ok(Self(out))
    }
}

/// Opaque handle the OBEX transport uses to tag callbacks for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObexHandle(pub u32);

impl fmt::Display for ObexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obx#{}", self.0)
    }
}

/// Phone book repositories supported by a PSE (SDP attribute, 1 byte).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Repositories(pub u8);

impl Repositories {
    pub const LOCAL: Self = Self(0x01);
    pub const SIM: Self = Self(0x02);
    pub const SPEED_DIAL: Self = Self(0x04);
    pub const FAVORITES: Self = Self(0x08);

    /// Repositories a PBAP 1.1 server exposes.
    pub const V1_1: Self = Self(0x03);
    /// Repositories a PBAP 1.2 server may expose.
    pub const V1_2: Self = Self(0x0F);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Repositories {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Repositories {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for Repositories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::LOCAL, "LOCAL"),
            (Self::SIM, "SIM"),
            (Self::SPEED_DIAL, "SPEED_DIAL"),
            (Self::FAVORITES, "FAVORITES"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Repositories({})", set.join("|"))
    }
}

/// PBAP supported features bitmask (SDP attribute / app param 0x10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SupportedFeatures(pub u32);

impl SupportedFeatures {
    pub const DOWNLOAD: Self = Self(0x0001);
    pub const BROWSING: Self = Self(0x0002);
    pub const DATABASE_IDENTIFIER: Self = Self(0x0004);
    pub const FOLDER_VERSION_COUNTERS: Self = Self(0x0008);
    pub const VCARD_SELECTING: Self = Self(0x0010);
    pub const ENHANCED_MISSED_CALLS: Self = Self(0x0020);
    pub const X_BT_UCI: Self = Self(0x0040);
    pub const X_BT_UID: Self = Self(0x0080);
    pub const CONTACT_REFERENCING: Self = Self(0x0100);
    pub const DEFAULT_CONTACT_IMAGE_FORMAT: Self = Self(0x0200);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for SupportedFeatures {
    fn default() -> Self {
        Self(crate::constants::DEFAULT_SUPPORTED_FEATURES)
    }
}

/// vCard property selector (app params 0x06 and 0x0C, 8 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PropertyMask(pub u64);

impl PropertyMask {
    /// Empty filter: the server returns all attributes.
    pub const ALL: Self = Self(0);
    pub const VERSION: Self = Self(1 << 0);
    pub const FN: Self = Self(1 << 1);
    pub const N: Self = Self(1 << 2);
    pub const PHOTO: Self = Self(1 << 3);
    pub const BDAY: Self = Self(1 << 4);
    pub const ADR: Self = Self(1 << 5);
    pub const LABEL: Self = Self(1 << 6);
    pub const TEL: Self = Self(1 << 7);
    pub const EMAIL: Self = Self(1 << 8);
    pub const MAILER: Self = Self(1 << 9);
    pub const TZ: Self = Self(1 << 10);
    pub const GEO: Self = Self(1 << 11);
    pub const TITLE: Self = Self(1 << 12);
    pub const ROLE: Self = Self(1 << 13);
    pub const LOGO: Self = Self(1 << 14);
    pub const AGENT: Self = Self(1 << 15);
    pub const ORG: Self = Self(1 << 16);
    pub const NOTE: Self = Self(1 << 17);
    pub const REV: Self = Self(1 << 18);
    pub const SOUND: Self = Self(1 << 19);
    pub const URL: Self = Self(1 << 20);
    pub const UID: Self = Self(1 << 21);
    pub const KEY: Self = Self(1 << 22);
    pub const NICKNAME: Self = Self(1 << 23);
    pub const CATEGORIES: Self = Self(1 << 24);
    pub const PROID: Self = Self(1 << 25);
    pub const CLASS: Self = Self(1 << 26);
    pub const SORT_STRING: Self = Self(1 << 27);
    pub const CALL_DATETIME: Self = Self(1 << 28);
    pub const X_BT_SPEEDDIALKEY: Self = Self(1 << 29);
    pub const X_BT_UCI: Self = Self(1 << 30);
    pub const X_BT_UID: Self = Self(1 << 31);
    /// Proprietary filter bit: when set, bits 40-63 carry vendor filters.
    pub const PROPRIETARY: Self = Self(1 << 39);

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for PropertyMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PropertyMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// vCard format requested from the server (app param 0x07).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VCardFormat {
    #[default]
    V21 = 0x00,
    V30 = 0x01,
}

impl VCardFormat {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::V21),
            0x01 => Some(Self::V30),
            _ => None,
        }
    }
}

/// Listing sort order (app param 0x01).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ListOrder {
    #[default]
    Indexed = 0x00,
    Alphabetical = 0x01,
    Phonetical = 0x02,
}

impl ListOrder {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Indexed),
            0x01 => Some(Self::Alphabetical),
            0x02 => Some(Self::Phonetical),
            _ => None,
        }
    }
}

/// Attribute the search value is matched against (app param 0x03).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SearchAttribute {
    #[default]
    Name = 0x00,
    Number = 0x01,
    Sound = 0x02,
}

impl SearchAttribute {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Name),
            0x01 => Some(Self::Number),
            0x02 => Some(Self::Sound),
            _ => None,
        }
    }
}

/// How the vCard selector bits combine (app param 0x0E).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SelectorOperator {
    #[default]
    Or = 0x00,
    And = 0x01,
}

impl SelectorOperator {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Or),
            0x01 => Some(Self::And),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bdaddr_parse_and_display() {
        let addr: BdAddr = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        assert_eq!(addr.0, [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(addr.to_string(), "AA:BB:CC:DD:EE:FF");

        let dashed: BdAddr = "00-11-22-33-44-55".parse().unwrap();
        assert_eq!(dashed.0, [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    }

    #[test]
    fn bdaddr_rejects_malformed() {
        assert_eq!(
            "AA:BB:CC".parse::<BdAddr>(),
            Err(AddressError::InvalidLength(3))
        );
        assert!(matches!(
            "AA:BB:CC:DD:EE:GG".parse::<BdAddr>(),
            Err(AddressError::InvalidOctet(_))
        ));
        assert!(matches!(
            "AAA:BB:CC:DD:EE:FF".parse::<BdAddr>(),
            Err(AddressError::InvalidOctet(_))
        ));
    }

    #[test]
    fn repositories_masks() {
        let repos = Repositories::LOCAL | Repositories::SIM;
        assert_eq!(repos, Repositories::V1_1);
        assert!(repos.contains(Repositories::SIM));
        assert!(!repos.contains(Repositories::FAVORITES));
        assert_eq!(format!("{repos:?}"), "Repositories(LOCAL|SIM)");
    }

    #[test]
    fn default_features_match_profile_default() {
        assert_eq!(SupportedFeatures::default().bits(), 0x0000_0003);
        assert!(SupportedFeatures::default().contains(SupportedFeatures::BROWSING));
    }

    #[test]
    fn enum_from_u8_bounds() {
        assert_eq!(VCardFormat::from_u8(1), Some(VCardFormat::V30));
        assert_eq!(VCardFormat::from_u8(2), None);
        assert_eq!(ListOrder::from_u8(2), Some(ListOrder::Phonetical));
        assert_eq!(ListOrder::from_u8(3), None);
        assert_eq!(SearchAttribute::from_u8(1), Some(SearchAttribute::Number));
        assert_eq!(SelectorOperator::from_u8(1), Some(SelectorOperator::And));
        assert_eq!(SelectorOperator::from_u8(7), None);
    }
}
