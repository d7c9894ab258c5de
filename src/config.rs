use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSION: &str = "csv";

/// Where a database persists its tables.
///
/// The database directory is `root/<database name>`, and each table is
/// written to `<table>.<extension>` inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    root: PathBuf,
    extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// A leading `.` is dropped, so `".tsv"` and `"tsv"` are the same.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    pub fn file_extension(&self) -> &str {
        &self.extension
    }
}
