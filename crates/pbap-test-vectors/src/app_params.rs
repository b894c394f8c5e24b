//! Test vector types for app_params.json
//!
//! Application Parameters header encodings and malformed inputs.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RawParam {
    pub tag: u8,
    /// Hex-encoded value bytes.
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidVector {
    pub description: String,
    pub params: Vec<RawParam>,
    pub encoded: String,
}

#[derive(Debug, Deserialize)]
pub struct InvalidVector {
    pub description: String,
    pub encoded: String,
    /// One of `truncated`, `invalid_length`, `invalid_value`, `invalid_utf8`.
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct AppParamsVectors {
    pub description: String,
    pub source: String,
    pub valid: Vec<ValidVector>,
    pub invalid: Vec<InvalidVector>,
}

pub fn load() -> AppParamsVectors {
    let json = include_str!("../../../.test-vectors/app_params.json");
    serde_json::from_str(json).expect("Failed to deserialize app_params.json")
}
