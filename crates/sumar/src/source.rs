//! Source file resolution for source-annotated rendering.

use std::path::{Path, PathBuf};

/// Tab width renderers use for column alignment in source listings.
pub const TAB_WIDTH: usize = 4;

/// Resolves package-relative source files for a module.
///
/// Absence of a source file is a legitimate, common case; implementations
/// return `None` and the report renders without annotation for that file.
pub trait SourceLocator {
    /// Read the source for `package_name`/`file_name`, or `None` when no
    /// readable regular file exists.
    fn read_source(&self, package_name: &str, file_name: &str) -> Option<String>;

    /// Tab width for column alignment
    fn tab_width(&self) -> usize {
        TAB_WIDTH
    }
}

/// Locator searching an ordered list of source roots, first hit wins.
#[derive(Debug, Clone, Default)]
pub struct SourceFileCollection {
    roots: Vec<PathBuf>,
}

impl SourceFileCollection {
    /// Create a locator over ordered source roots
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    fn candidate(&self, root: &Path, package_name: &str, file_name: &str) -> PathBuf {
        if package_name.is_empty() {
            root.join(file_name)
        } else {
            root.join(package_name).join(file_name)
        }
    }
}

impl SourceLocator for SourceFileCollection {
    fn read_source(&self, package_name: &str, file_name: &str) -> Option<String> {
        for root in &self.roots {
            let path = self.candidate(root, package_name, file_name);
            if path.is_file() {
                // first existing file wins; an unreadable file degrades to
                // an unannotated report rather than failing the run
                match std::fs::read(&path) {
                    Ok(bytes) => return Some(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(_) => return None,
                }
            }
        }
        None
    }
}

/// Locator that never resolves anything; used where no source roots apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSourceLocator;

impl SourceLocator for NoSourceLocator {
    fn read_source(&self, _package_name: &str, _file_name: &str) -> Option<String> {
        None
    }
}
