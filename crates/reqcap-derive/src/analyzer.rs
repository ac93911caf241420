//! Seams to the external analysis step.
//!
//! Computing capabilities from bytecode is not done here. An [`Analyzer`]
//! is handed the compiled output and a classpath and returns the manifest
//! attributes it computed; the processor only consumes its
//! `Require-Capability` value.

use std::path::{Path, PathBuf};

use reqcap_header::REQUIRE_CAPABILITY;
use reqcap_merge::Attributes;

use crate::error::{DeriveError, DeriveResult};
use crate::project::{ClasspathEntry, Project};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Computes manifest headers from a project's compiled output.
pub trait Analyzer {
    /// Add a classpath location used to resolve references.
    fn add_classpath(&mut self, location: &Path) -> DeriveResult<()>;

    /// Compute the manifest main attributes.
    fn calc_manifest(&mut self) -> DeriveResult<Attributes>;
}

/// Opens an [`Analyzer`] over a project's output directory.
pub trait AnalyzerFactory {
    fn open(&self, project_id: &str, output_directory: &Path) -> DeriveResult<Box<dyn Analyzer>>;
}

/// Supplies classpath locations beyond the project's own artifacts
/// (compile scope).
pub trait ClasspathContributor {
    fn additional_classpath_entries(&self, project: &Project) -> Vec<ClasspathEntry>;
}

// ---------------------------------------------------------------------------
// StaticAnalyzer
// ---------------------------------------------------------------------------

/// An analyzer whose result is known up front.
///
/// It reports a fixed `Require-Capability` value, e.g. one produced by an
/// out-of-process tool, and only checks that classpath locations can be
/// read.
#[derive(Clone, Debug, Default)]
pub struct StaticAnalyzer {
    derived: Option<String>,
    classpath: Vec<PathBuf>,
}

impl StaticAnalyzer {
    pub fn new(derived: Option<String>) -> Self {
        Self {
            derived,
            classpath: Vec::new(),
        }
    }

    /// Locations accepted so far.
    pub fn classpath(&self) -> &[PathBuf] {
        &self.classpath
    }
}

impl Analyzer for StaticAnalyzer {
    fn add_classpath(&mut self, location: &Path) -> DeriveResult<()> {
        std::fs::metadata(location).map_err(|e| DeriveError::io(location, e))?;
        self.classpath.push(location.to_path_buf());
        Ok(())
    }

    fn calc_manifest(&mut self) -> DeriveResult<Attributes> {
        let mut attrs = Attributes::new();
        if let Some(derived) = &self.derived {
            attrs.insert(REQUIRE_CAPABILITY, derived.clone());
        }
        Ok(attrs)
    }
}

/// Factory for [`StaticAnalyzer`]s reporting the same derived header.
#[derive(Clone, Debug, Default)]
pub struct StaticAnalyzerFactory {
    derived: Option<String>,
}

impl StaticAnalyzerFactory {
    pub fn new(derived: Option<String>) -> Self {
        Self { derived }
    }
}

impl AnalyzerFactory for StaticAnalyzerFactory {
    fn open(&self, project_id: &str, output_directory: &Path) -> DeriveResult<Box<dyn Analyzer>> {
        if !output_directory.is_dir() {
            return Err(DeriveError::analysis(format!(
                "output of {project_id} is not a directory: {}",
                output_directory.display()
            )));
        }
        Ok(Box::new(StaticAnalyzer::new(self.derived.clone())))
    }
}

/// A contributor returning a fixed list of entries.
#[derive(Clone, Debug, Default)]
pub struct FixedContributor {
    entries: Vec<ClasspathEntry>,
}

impl FixedContributor {
    pub fn new(entries: Vec<ClasspathEntry>) -> Self {
        Self { entries }
    }
}

impl ClasspathContributor for FixedContributor {
    fn additional_classpath_entries(&self, _project: &Project) -> Vec<ClasspathEntry> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_analyzer_reports_derived_header() {
        let mut analyzer = StaticAnalyzer::new(Some("a.cap".into()));
        let attrs = analyzer.calc_manifest().unwrap();
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some("a.cap"));
    }

    #[test]
    fn static_analyzer_without_header() {
        let mut analyzer = StaticAnalyzer::new(None);
        assert!(analyzer.calc_manifest().unwrap().is_empty());
    }

    #[test]
    fn static_analyzer_rejects_missing_location() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = StaticAnalyzer::new(None);
        analyzer.add_classpath(dir.path()).unwrap();
        let err = analyzer.add_classpath(&dir.path().join("missing.jar")).unwrap_err();
        assert!(matches!(err, DeriveError::Io { .. }));
        assert_eq!(analyzer.classpath(), &[dir.path().to_path_buf()]);
    }

    #[test]
    fn factory_requires_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let factory = StaticAnalyzerFactory::new(None);
        assert!(factory.open("p", dir.path()).is_ok());
        assert!(matches!(
            factory.open("p", &dir.path().join("classes")),
            Err(DeriveError::Analysis(_))
        ));
    }
}
