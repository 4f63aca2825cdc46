use std::path::PathBuf;

use regex::Regex;

/// Which files of a directory tree belong to a collection.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    /// Lowercase extensions without the dot.
    pub extensions: Vec<String>,
    /// Explicit files, already resolved against the metadata directory.
    pub files: Vec<PathBuf>,
    pub regex: Option<Regex>,
}

impl FileFilter {
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.files.is_empty() && self.regex.is_none()
    }
}

/// A named, ordered grouping of games.
///
/// Member indices are kept by the search context, not here, so a collection
/// never owns its games.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    name: String,
    pub shortname: String,
    pub summary: String,
    pub description: String,

    /// Defaults inherited by member games without their own command.
    pub launch_cmd: Option<String>,
    pub launch_workdir: Option<PathBuf>,

    /// Roots scanned for member files, in addition to the metadata directory.
    pub directories: Vec<PathBuf>,
    pub include: FileFilter,
    pub exclude: FileFilter,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
