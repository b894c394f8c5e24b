//! Application Parameters header codec.
//!
//! PBAP carries its request and response parameters in the OBEX Application
//! Parameters header as a sequence of `tag(1) || length(1) || value` triplets.
//! Multi-byte integers are big-endian. Tag IDs are shared with the peer and
//! must not change.

use crate::error::AppParamError;
use crate::types::{
    ListOrder, PropertyMask, SearchAttribute, SelectorOperator, SupportedFeatures, VCardFormat,
};

/// Application Parameter tag IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AppParamTag {
    Order = 0x01,
    SearchValue = 0x02,
    SearchAttribute = 0x03,
    MaxListCount = 0x04,
    ListStartOffset = 0x05,
    PropertySelector = 0x06,
    Format = 0x07,
    PhonebookSize = 0x08,
    NewMissedCalls = 0x09,
    PrimaryVersionCounter = 0x0A,
    SecondaryVersionCounter = 0x0B,
    VCardSelector = 0x0C,
    DatabaseIdentifier = 0x0D,
    VCardSelectorOperator = 0x0E,
    ResetNewMissedCalls = 0x0F,
    SupportedFeatures = 0x10,
}

/// Highest tag ID defined by the profile.
pub const MAX_TAG: u8 = AppParamTag::SupportedFeatures as u8;

impl AppParamTag {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Order),
            0x02 => Some(Self::SearchValue),
            0x03 => Some(Self::SearchAttribute),
            0x04 => Some(Self::MaxListCount),
            0x05 => Some(Self::ListStartOffset),
            0x06 => Some(Self::PropertySelector),
            0x07 => Some(Self::Format),
            0x08 => Some(Self::PhonebookSize),
            0x09 => Some(Self::NewMissedCalls),
            0x0A => Some(Self::PrimaryVersionCounter),
            0x0B => Some(Self::SecondaryVersionCounter),
            0x0C => Some(Self::VCardSelector),
            0x0D => Some(Self::DatabaseIdentifier),
            0x0E => Some(Self::VCardSelectorOperator),
            0x0F => Some(Self::ResetNewMissedCalls),
            0x10 => Some(Self::SupportedFeatures),
            _ => None,
        }
    }

    /// Fixed value length for this tag, or `None` for variable-length text.
    #[must_use]
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            Self::Order
            | Self::SearchAttribute
            | Self::Format
            | Self::NewMissedCalls
            | Self::VCardSelectorOperator
            | Self::ResetNewMissedCalls => Some(1),
            Self::MaxListCount | Self::ListStartOffset | Self::PhonebookSize => Some(2),
            Self::SupportedFeatures => Some(4),
            Self::PropertySelector | Self::VCardSelector => Some(8),
            Self::PrimaryVersionCounter
            | Self::SecondaryVersionCounter
            | Self::DatabaseIdentifier => Some(16),
            Self::SearchValue => None,
        }
    }
}

/// A single typed application parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppParam {
    Order(ListOrder),
    SearchValue(String),
    SearchAttribute(SearchAttribute),
    MaxListCount(u16),
    ListStartOffset(u16),
    PropertySelector(PropertyMask),
    Format(VCardFormat),
    PhonebookSize(u16),
    NewMissedCalls(u8),
    PrimaryVersionCounter([u8; 16]),
    SecondaryVersionCounter([u8; 16]),
    VCardSelector(PropertyMask),
    DatabaseIdentifier([u8; 16]),
    VCardSelectorOperator(SelectorOperator),
    ResetNewMissedCalls,
    SupportedFeatures(SupportedFeatures),
    /// A tag this implementation does not know, preserved verbatim.
    Unknown { tag: u8, value: Vec<u8> },
}

impl AppParam {
    /// The wire tag ID of this parameter.
    #[must_use]
    pub fn tag(&self) -> u8 {
        let tag = match self {
            Self::Order(_) => AppParamTag::Order,
            Self::SearchValue(_) => AppParamTag::SearchValue,
            Self::SearchAttribute(_) => AppParamTag::SearchAttribute,
            Self::MaxListCount(_) => AppParamTag::MaxListCount,
            Self::ListStartOffset(_) => AppParamTag::ListStartOffset,
            Self::PropertySelector(_) => AppParamTag::PropertySelector,
            Self::Format(_) => AppParamTag::Format,
            Self::PhonebookSize(_) => AppParamTag::PhonebookSize,
            Self::NewMissedCalls(_) => AppParamTag::NewMissedCalls,
            Self::PrimaryVersionCounter(_) => AppParamTag::PrimaryVersionCounter,
            Self::SecondaryVersionCounter(_) => AppParamTag::SecondaryVersionCounter,
            Self::VCardSelector(_) => AppParamTag::VCardSelector,
            Self::DatabaseIdentifier(_) => AppParamTag::DatabaseIdentifier,
            Self::VCardSelectorOperator(_) => AppParamTag::VCardSelectorOperator,
            Self::ResetNewMissedCalls => AppParamTag::ResetNewMissedCalls,
            Self::SupportedFeatures(_) => AppParamTag::SupportedFeatures,
            Self::Unknown { tag, .. } => return *tag,
        };
        tag as u8
    }

    fn value_bytes(&self) -> Vec<u8> {
        match self {
            Self::Order(v) => vec![*v as u8],
            Self::SearchValue(s) => s.as_bytes().to_vec(),
            Self::SearchAttribute(v) => vec![*v as u8],
            Self::MaxListCount(v) | Self::ListStartOffset(v) | Self::PhonebookSize(v) => {
                v.to_be_bytes().to_vec()
            }
            Self::PropertySelector(m) | Self::VCardSelector(m) => m.bits().to_be_bytes().to_vec(),
            Self::Format(v) => vec![*v as u8],
            Self::NewMissedCalls(v) => vec![*v],
            Self::PrimaryVersionCounter(b)
            | Self::SecondaryVersionCounter(b)
            | Self::DatabaseIdentifier(b) => b.to_vec(),
            Self::VCardSelectorOperator(v) => vec![*v as u8],
            Self::ResetNewMissedCalls => vec![0x01],
            Self::SupportedFeatures(f) => f.bits().to_be_bytes().to_vec(),
            Self::Unknown { value, .. } => value.clone(),
        }
    }

    /// Decode one parameter from its tag and raw value.
    pub fn decode(tag: u8, value: &[u8]) -> Result<Self, AppParamError> {
        let Some(known) = AppParamTag::from_u8(tag) else {
            return Ok(Self::Unknown {
                tag,
                value: value.to_vec(),
            });
        };

        if let Some(len) = known.fixed_len()
            && value.len() != len
        {
            return Err(AppParamError::InvalidLength {
                tag,
                len: value.len(),
            });
        }

        let invalid = || AppParamError::InvalidValue { tag, value: value[0] };

        let param = match known {
            AppParamTag::Order => Self::Order(ListOrder::from_u8(value[0]).ok_or_else(invalid)?),
            AppParamTag::SearchValue => Self::SearchValue(
                String::from_utf8(value.to_vec()).map_err(|_| AppParamError::InvalidUtf8)?,
            ),
            AppParamTag::SearchAttribute => Self::SearchAttribute(
                SearchAttribute::from_u8(value[0]).ok_or_else(invalid)?,
            ),
            AppParamTag::MaxListCount => Self::MaxListCount(be_u16(value)),
            AppParamTag::ListStartOffset => Self::ListStartOffset(be_u16(value)),
            AppParamTag::PropertySelector => Self::PropertySelector(PropertyMask(be_u64(value))),
            AppParamTag::Format => {
                Self::Format(VCardFormat::from_u8(value[0]).ok_or_else(invalid)?)
            }
            AppParamTag::PhonebookSize => Self::PhonebookSize(be_u16(value)),
            AppParamTag::NewMissedCalls => Self::NewMissedCalls(value[0]),
            AppParamTag::PrimaryVersionCounter => Self::PrimaryVersionCounter(be_16(value)),
            AppParamTag::SecondaryVersionCounter => Self::SecondaryVersionCounter(be_16(value)),
            AppParamTag::VCardSelector => Self::VCardSelector(PropertyMask(be_u64(value))),
            AppParamTag::DatabaseIdentifier => Self::DatabaseIdentifier(be_16(value)),
            AppParamTag::VCardSelectorOperator => Self::VCardSelectorOperator(
                SelectorOperator::from_u8(value[0]).ok_or_else(invalid)?,
            ),
            AppParamTag::ResetNewMissedCalls => Self::ResetNewMissedCalls,
            AppParamTag::SupportedFeatures => {
                Self::SupportedFeatures(SupportedFeatures(u32::from_be_bytes([
                    value[0], value[1], value[2], value[3],
                ])))
            }
        };
        Ok(param)
    }
}

fn be_u16(v: &[u8]) -> u16 {
    u16::from_be_bytes([v[0], v[1]])
}

fn be_u64(v: &[u8]) -> u64 {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(v);
    u64::from_be_bytes(arr)
}

fn be_16(v: &[u8]) -> [u8; 16] {
    let mut arr = [0u8; 16];
    arr.copy_from_slice(v);
    arr
}

/// An ordered collection of application parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationParameters {
    params: Vec<AppParam>,
}

impl ApplicationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, param: AppParam) {
        self.params.push(param);
    }

    #[must_use]
    pub fn with(mut self, param: AppParam) -> Self {
        self.push(param);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppParam> {
        self.params.iter()
    }

    /// Encode to the header value: `tag || len || value` for each parameter.
    pub fn encode(&self) -> Result<Vec<u8>, AppParamError> {
        let mut out = Vec::new();
        for param in &self.params {
            let value = param.value_bytes();
            let len = u8::try_from(value.len()).map_err(|_| AppParamError::ValueTooLong {
                tag: param.tag(),
                len: value.len(),
            })?;
            out.push(param.tag());
            out.push(len);
            out.extend_from_slice(&value);
        }
        tracing::trace!(count = self.params.len(), len = out.len(), "encoded app params");
        Ok(out)
    }

    /// Decode a header value into its parameters.
    pub fn decode(data: &[u8]) -> Result<Self, AppParamError> {
        let mut params = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            if data.len() - pos < 2 {
                return Err(AppParamError::Truncated {
                    needed: 2,
                    actual: data.len() - pos,
                });
            }
            let tag = data[pos];
            let len = data[pos + 1] as usize;
            pos += 2;
            if data.len() - pos < len {
                return Err(AppParamError::Truncated {
                    needed: len,
                    actual: data.len() - pos,
                });
            }
            params.push(AppParam::decode(tag, &data[pos..pos + len])?);
            pos += len;
        }
        Ok(Self { params })
    }

    pub fn phonebook_size(&self) -> Option<u16> {
        self.params.iter().find_map(|p| match p {
            AppParam::PhonebookSize(v) => Some(*v),
            _ => None,
        })
    }

    pub fn new_missed_calls(&self) -> Option<u8> {
        self.params.iter().find_map(|p| match p {
            AppParam::NewMissedCalls(v) => Some(*v),
            _ => None,
        })
    }

    pub fn primary_version_counter(&self) -> Option<[u8; 16]> {
        self.params.iter().find_map(|p| match p {
            AppParam::PrimaryVersionCounter(v) => Some(*v),
            _ => None,
        })
    }

    pub fn secondary_version_counter(&self) -> Option<[u8; 16]> {
        self.params.iter().find_map(|p| match p {
            AppParam::SecondaryVersionCounter(v) => Some(*v),
            _ => None,
        })
    }

    pub fn database_identifier(&self) -> Option<[u8; 16]> {
        self.params.iter().find_map(|p| match p {
            AppParam::DatabaseIdentifier(v) => Some(*v),
            _ => None,
        })
    }

    pub fn supported_features(&self) -> Option<SupportedFeatures> {
        self.params.iter().find_map(|p| match p {
            AppParam::SupportedFeatures(v) => Some(*v),
            _ => None,
        })
    }
}

impl FromIterator<AppParam> for ApplicationParameters {
    fn from_iter<I: IntoIterator<Item = AppParam>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_param() -> impl Strategy<Value = AppParam> {
        prop_oneof![
            (0..=2u8).prop_map(|v| AppParam::Order(ListOrder::from_u8(v).unwrap())),
            "[a-zA-Z0-9 ]{0,64}".prop_map(AppParam::SearchValue),
            any::<u16>().prop_map(AppParam::MaxListCount),
            any::<u16>().prop_map(AppParam::ListStartOffset),
            any::<u64>().prop_map(|v| AppParam::PropertySelector(PropertyMask(v))),
            any::<u16>().prop_map(AppParam::PhonebookSize),
            any::<u8>().prop_map(AppParam::NewMissedCalls),
            any::<[u8; 16]>().prop_map(AppParam::DatabaseIdentifier),
            any::<u32>().prop_map(|v| AppParam::SupportedFeatures(SupportedFeatures(v))),
            Just(AppParam::ResetNewMissedCalls),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn decode_inverts_encode(params in proptest::collection::vec(any_param(), 0..8)) {
            let set: ApplicationParameters = params.into_iter().collect();
            let bytes = set.encode().unwrap();
            prop_assert_eq!(ApplicationParameters::decode(&bytes).unwrap(), set);
        }
    }
}
