//! Core types, constants, and wire formats for the Phone Book Access Profile.
//!
//! This crate defines the profile identifiers shared with the peer server,
//! newtype wrappers for addresses and bitmasks, the OBEX response codes the
//! client interprets, and the Application Parameters header codec.

pub mod app_params;
pub mod constants;
pub mod error;
pub mod obex;
pub mod types;

pub use app_params::{AppParam, AppParamTag, ApplicationParameters};
pub use error::{AddressError, AppParamError};
pub use obex::{ObexResponseCode, SetPathFlag};
pub use types::{
    BdAddr, ListOrder, ObexHandle, PropertyMask, Repositories, SearchAttribute, SelectorOperator,
    SupportedFeatures, VCardFormat,
};
