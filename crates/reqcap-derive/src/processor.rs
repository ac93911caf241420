use reqcap_merge::{enhance_require_capability, Attributes, MergeReport};
use serde::Serialize;
use tracing::{debug, error, warn, Level};

use crate::analyzer::{AnalyzerFactory, ClasspathContributor};
use crate::config::ProcessorConfig;
use crate::error::DeriveResult;
use crate::project::Project;

const FAILURE_MESSAGE: &str = "Cannot derive header from source";

// ---------------------------------------------------------------------------
// ProcessOutcome
// ---------------------------------------------------------------------------

/// Why derivation did not run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The derive option resolved to off.
    Disabled,
    /// The project has no compiled output to analyze.
    NoOutput,
}

/// The outcome of processing one manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessOutcome {
    Skipped { reason: SkipReason },
    Applied {
        report: MergeReport,
        /// Classpath locations the analyzer accepted.
        classpath_entries: usize,
    },
    /// Derivation failed; the manifest was left as it was.
    Failed { message: String },
}

impl ProcessOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

// ---------------------------------------------------------------------------
// ManifestProcessor
// ---------------------------------------------------------------------------

/// Derives `Require-Capability` from a project's compiled output and merges
/// it into the project's manifest.
///
/// Derivation is best effort: a failure is logged and the manifest is left
/// untouched, it never fails the build.
pub struct ManifestProcessor {
    factory: Box<dyn AnalyzerFactory>,
    contributors: Vec<Box<dyn ClasspathContributor>>,
    config: ProcessorConfig,
}

impl ManifestProcessor {
    pub fn new(factory: Box<dyn AnalyzerFactory>, config: ProcessorConfig) -> Self {
        Self {
            factory,
            contributors: Vec::new(),
            config,
        }
    }

    /// Register an additional classpath source.
    pub fn add_contributor(&mut self, contributor: Box<dyn ClasspathContributor>) {
        self.contributors.push(contributor);
    }

    /// Process `manifest` for `project`.
    pub fn process_manifest(&self, project: &Project, manifest: &mut Attributes) -> ProcessOutcome {
        if !self.config.derive_enabled() {
            return ProcessOutcome::Skipped {
                reason: SkipReason::Disabled,
            };
        }
        if !project.output_directory.exists() {
            debug!(project = %project.id, "no compiled output; skipping");
            return ProcessOutcome::Skipped {
                reason: SkipReason::NoOutput,
            };
        }

        match self.derive(project, manifest) {
            Ok(outcome) => outcome,
            Err(err) => {
                if tracing::enabled!(Level::DEBUG) {
                    error!(project = %project.id, error = ?err, "{FAILURE_MESSAGE}");
                } else {
                    warn!(project = %project.id, "{FAILURE_MESSAGE} ({err})");
                }
                ProcessOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    fn derive(&self, project: &Project, manifest: &mut Attributes) -> DeriveResult<ProcessOutcome> {
        let mut analyzer = self.factory.open(&project.id, &project.output_directory)?;
        let mut classpath_entries = 0;

        for artifact in &project.artifacts {
            let Some(file) = artifact.usable_file() else {
                debug!(artifact = %artifact.id, "skipping artifact without usable file");
                continue;
            };
            analyzer.add_classpath(file)?;
            classpath_entries += 1;
        }

        for contributor in &self.contributors {
            for entry in contributor.additional_classpath_entries(project) {
                for location in &entry.locations {
                    match analyzer.add_classpath(location) {
                        Ok(()) => classpath_entries += 1,
                        Err(err) => {
                            debug!(location = %location.display(), error = %err, "ignoring classpath entry")
                        }
                    }
                }
            }
        }

        let calculated = analyzer.calc_manifest()?;

        // Merge into a copy; `manifest` only changes on success.
        let mut updated = manifest.clone();
        let report = enhance_require_capability(&mut updated, &calculated)?;
        *manifest = updated;

        Ok(ProcessOutcome::Applied {
            report,
            classpath_entries,
        })
    }
}
