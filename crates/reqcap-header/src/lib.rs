//! OSGi manifest header grammar.
//!
//! This crate parses header values such as `Require-Capability` into an
//! ordered [`Parameters`] map, and turns those into [`Capability`] clauses
//! that can be compared and serialized again. It knows nothing about
//! manifests themselves; see `reqcap-merge` for that.
//!
//! # Key Types
//!
//! - [`Parameters`] — Ordered clause key to [`Attrs`] mapping
//! - [`Attrs`] / [`Attr`] — Attributes and directives of a clause
//! - [`AttrType`] — Declared attribute type (`Long`, `Version`, `List<…>`, …)
//! - [`Capability`] — Namespace plus attributes, the unit of deduplication
//! - [`HeaderError`] — Malformed header errors

pub mod attrs;
pub mod capability;
pub mod error;
pub mod names;
pub mod parameters;

pub use attrs::{Attr, AttrKind, AttrType, Attrs, ScalarType};
pub use capability::Capability;
pub use error::{HeaderError, HeaderResult};
pub use names::{
    BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT, EXECUTION_ENVIRONMENT_NAMESPACE, REQUIRE_CAPABILITY,
};
pub use parameters::Parameters;
