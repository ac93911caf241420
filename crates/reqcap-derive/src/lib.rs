//! Manifest processor for derived `Require-Capability` headers.
//!
//! Runs an external [`Analyzer`] over a project's compiled output and
//! classpath, then merges the `Require-Capability` it computed into the
//! project's manifest with [`reqcap_merge::merge`]. Everything here is
//! best effort: a failure is logged and leaves the manifest as it was.
//!
//! # Key Types
//!
//! - [`ManifestProcessor`] — Gate, classpath collection, merge, failure policy
//! - [`ProcessorConfig`] / [`DeriveHeaderOption`] — Whether derivation runs
//! - [`Analyzer`] / [`AnalyzerFactory`] / [`ClasspathContributor`] — Injected collaborators
//! - [`StaticAnalyzer`] — Analyzer reporting a precomputed header
//! - [`Project`] / [`Artifact`] / [`ClasspathEntry`] — Build unit description

pub mod analyzer;
pub mod config;
pub mod error;
pub mod processor;
pub mod project;

pub use analyzer::{
    Analyzer, AnalyzerFactory, ClasspathContributor, FixedContributor, StaticAnalyzer,
    StaticAnalyzerFactory,
};
pub use config::{DeriveHeaderOption, ProcessorConfig};
pub use error::{DeriveError, DeriveResult};
pub use processor::{ManifestProcessor, ProcessOutcome, SkipReason};
pub use project::{Artifact, ClasspathEntry, Project};
