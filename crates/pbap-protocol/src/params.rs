//! Request parameters for pull and listing operations.
//!
//! These are the application-facing knobs; they are lowered into an
//! Application Parameters header at send time, taking the peer's profile
//! version into account.

use pbap_core::app_params::{AppParam, ApplicationParameters};
use pbap_core::constants::{PULL_PB_TYPE, PULL_VCARD_ENTRY_TYPE, VERSION_1_2};
use pbap_core::error::AppParamError;
use pbap_core::types::{ListOrder, PropertyMask, SearchAttribute, SelectorOperator, VCardFormat};

/// Maximum list count meaning "no limit".
pub const UNLIMITED_LIST_COUNT: u16 = 0xFFFF;

/// Which PBAP function a `get_file` maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// PullPhoneBook: a whole phone book object such as `telecom/pb.vcf`.
    PhoneBook,
    /// PullvCardEntry: a single entry addressed by handle, such as `3.vcf`.
    VCardEntry,
}

impl ObjectType {
    /// Classify a remote name. Names carrying a folder path are phone books.
    pub fn classify(remote_name: &str) -> Self {
        if remote_name.contains('/') {
            Self::PhoneBook
        } else {
            Self::VCardEntry
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::PhoneBook => PULL_PB_TYPE,
            Self::VCardEntry => PULL_VCARD_ENTRY_TYPE,
        }
    }
}

/// Parameters shared by PBAP 1.2 requests; ignored for older peers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectorParams {
    pub vcard_selector: Option<PropertyMask>,
    pub selector_operator: SelectorOperator,
    pub reset_new_missed_calls: bool,
}

impl SelectorParams {
    fn append(&self, out: &mut ApplicationParameters, peer_version: u16) {
        if peer_version < VERSION_1_2 {
            return;
        }
        if self.reset_new_missed_calls {
            out.push(AppParam::ResetNewMissedCalls);
        }
        if let Some(selector) = self.vcard_selector {
            out.push(AppParam::VCardSelector(selector));
            out.push(AppParam::VCardSelectorOperator(self.selector_operator));
        }
    }
}

/// Parameters for PullPhoneBook / PullvCardEntry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullParams {
    pub filter: PropertyMask,
    pub format: VCardFormat,
    pub max_list_count: u16,
    pub list_start_offset: u16,
    pub selector: SelectorParams,
}

impl Default for PullParams {
    fn default() -> Self {
        Self {
            filter: PropertyMask::ALL,
            format: VCardFormat::V21,
            max_list_count: UNLIMITED_LIST_COUNT,
            list_start_offset: 0,
            selector: SelectorParams::default(),
        }
    }
}

impl PullParams {
    /// Build the Application Parameters for this request.
    ///
    /// Single entries only carry the filter and format; list counts and
    /// selectors apply to whole phone books.
    pub fn to_app_params(
        &self,
        object: ObjectType,
        peer_version: u16,
    ) -> Result<Vec<u8>, AppParamError> {
        let mut out = ApplicationParameters::new();
        if !self.filter.is_empty() {
            out.push(AppParam::PropertySelector(self.filter));
        }
        out.push(AppParam::Format(self.format));
        if object == ObjectType::PhoneBook {
            out.push(AppParam::MaxListCount(self.max_list_count));
            if self.list_start_offset != 0 {
                out.push(AppParam::ListStartOffset(self.list_start_offset));
            }
            self.selector.append(&mut out, peer_version);
        }
        out.encode()
    }
}

/// Parameters for PullvCardListing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub order: ListOrder,
    pub search_value: Option<String>,
    pub search_attribute: SearchAttribute,
    pub max_list_count: u16,
    pub list_start_offset: u16,
    pub selector: SelectorParams,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            order: ListOrder::Indexed,
            search_value: None,
            search_attribute: SearchAttribute::Name,
            max_list_count: UNLIMITED_LIST_COUNT,
            list_start_offset: 0,
            selector: SelectorParams::default(),
        }
    }
}

impl ListParams {
    pub fn to_app_params(&self, peer_version: u16) -> Result<Vec<u8>, AppParamError> {
        let mut out = ApplicationParameters::new();
        out.push(AppParam::Order(self.order));
        if let Some(value) = &self.search_value {
            out.push(AppParam::SearchValue(value.clone()));
            out.push(AppParam::SearchAttribute(self.search_attribute));
        }
        out.push(AppParam::MaxListCount(self.max_list_count));
        if self.list_start_offset != 0 {
            out.push(AppParam::ListStartOffset(self.list_start_offset));
        }
        self.selector.append(&mut out, peer_version);
        out.encode()
    }
}
