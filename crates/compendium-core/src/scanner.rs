//! Directory scanner for discovering compendium XML files

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of scanning directories for compendium documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root directories that were scanned
    pub roots: Vec<PathBuf>,
    /// Discovered XML files, sorted by path
    pub files: Vec<PathBuf>,
}

impl ScanResult {
    /// Total number of files found
    pub fn total_files(&self) -> usize {
        self.files.len()
    }
}

/// Scan one or more directories for XML files
pub fn scan_roots<P: AsRef<Path>>(roots: &[P]) -> Result<ScanResult> {
    let mut files = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root.as_ref()).follow_links(true) {
            let entry = entry?;
            if entry.file_type().is_file() && is_compendium_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    Ok(ScanResult {
        roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
        files,
    })
}

/// Check whether a path carries the compendium file extension
pub fn is_compendium_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_compendium_file() {
        assert!(is_compendium_file(Path::new("srd/compendium.xml")));
        assert!(is_compendium_file(Path::new("UPPER.XML")));
        assert!(!is_compendium_file(Path::new("notes.txt")));
        assert!(!is_compendium_file(Path::new("compendium.xml.bak")));
        assert!(!is_compendium_file(Path::new("xml")));
    }
}
