//! Test vector loading infrastructure for the PBAP client stack.
//!
//! Each module corresponds to a single JSON file under `.test-vectors/` and
//! provides typed structs matching the JSON schema plus a `load()` function
//! that deserializes the embedded JSON via `include_str!`.
//!
//! # Usage
//!
//! ```rust
//! let vectors = pbap_test_vectors::app_params::load();
//! for v in &vectors.valid {
//!     let encoded = hex::decode(&v.encoded).unwrap();
//!     // ... decode and compare against v.params
//! }
//! ```

pub mod app_params;
pub mod listings;

pub use app_params::AppParamsVectors;
pub use listings::ListingsVectors;
