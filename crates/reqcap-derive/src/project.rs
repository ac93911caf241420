use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A resolved dependency of the project being packaged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Coordinates or any other human-readable identifier.
    pub id: String,
    /// Resolved file, if the artifact has one.
    pub file: Option<PathBuf>,
}

impl Artifact {
    pub fn new(id: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            file: Some(file.into()),
        }
    }

    /// The file to put on the analysis classpath, if it is worth trying:
    /// it must exist and must not be empty.
    pub fn usable_file(&self) -> Option<&Path> {
        let file = self.file.as_deref()?;
        match std::fs::metadata(file) {
            Ok(meta) if meta.len() > 0 => Some(file),
            _ => None,
        }
    }
}

/// The build unit whose manifest is being processed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// Directory holding the compiled classes.
    pub output_directory: PathBuf,
    pub artifacts: Vec<Artifact>,
}

impl Project {
    pub fn new(id: impl Into<String>, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            output_directory: output_directory.into(),
            artifacts: Vec::new(),
        }
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }
}

/// Additional classpath locations supplied by a [`ClasspathContributor`].
///
/// [`ClasspathContributor`]: crate::analyzer::ClasspathContributor
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClasspathEntry {
    pub locations: Vec<PathBuf>,
}

impl ClasspathEntry {
    pub fn new(locations: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }
}
