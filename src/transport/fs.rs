use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::FileListError;
use crate::types::ProtocolName;

/// Filesystem view of a database base directory.
pub struct ProtocolTree {
    root: PathBuf,
}

impl ProtocolTree {
    /// Open the tree rooted at `root`, which must be an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, FileListError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(FileListError::InvalidDirectory { path: root });
        }
        Ok(Self { root })
    }

    /// Base directory of the tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the direct subdirectories of the root, sorted.
    ///
    /// Symlinked protocol directories count as directories.
    pub fn protocol_dirs(&self) -> Vec<ProtocolName> {
        let mut names: Vec<ProtocolName> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

/// True if `path` exists as a regular file.
pub fn is_list_file(path: &Path) -> bool {
    path.is_file()
}

/// True if `path` exists as a directory.
pub fn is_group_dir(path: &Path) -> bool {
    path.is_dir()
}
