//! Well-known manifest header and namespace names.

/// The `Require-Capability` manifest header.
pub const REQUIRE_CAPABILITY: &str = "Require-Capability";

/// The deprecated `Bundle-RequiredExecutionEnvironment` header, superseded
/// by an `osgi.ee` requirement in `Require-Capability`.
pub const BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT: &str = "Bundle-RequiredExecutionEnvironment";

/// The execution environment capability namespace.
pub const EXECUTION_ENVIRONMENT_NAMESPACE: &str = "osgi.ee";

/// Separator between a clause key and the suffix given to repeated keys.
pub const DUPLICATE_MARKER: char = '~';

