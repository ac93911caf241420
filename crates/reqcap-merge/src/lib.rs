//! Require-Capability merging.
//!
//! Combines a `Require-Capability` value derived by analysis with the one
//! already present on a manifest. Clauses are deduplicated by their text,
//! an authored `osgi.ee` requirement takes precedence over a derived one,
//! and a derived `osgi.ee` requirement retires the legacy
//! `Bundle-RequiredExecutionEnvironment` header.
//!
//! # Key Types
//!
//! - [`Attributes`] — Ordered, case-insensitive manifest main attributes
//! - [`merge`] / [`enhance_require_capability`] — The merge entry points
//! - [`MergeReport`] / [`MergeOutcome`] — What a merge changed

pub mod attributes;
pub mod merger;

pub use attributes::Attributes;
pub use merger::{enhance_require_capability, merge, MergeOutcome, MergeReport};
pub use reqcap_header::{HeaderError, HeaderResult};
