use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::annotations::{DEFAULT_ANNOTATION_EXTENSION, DEFAULT_ANNOTATION_TYPE};
use crate::constants::layout::{
    DEFAULT_DEV_SUBDIR, DEFAULT_EVAL_SUBDIR, DEFAULT_MODELS_FILENAME,
    DEFAULT_OPTIONAL_WORLD_1_FILENAME, DEFAULT_OPTIONAL_WORLD_2_FILENAME, DEFAULT_PROBES_FILENAME,
    DEFAULT_SCORES_FILENAME, DEFAULT_TNORM_FILENAME, DEFAULT_WORLD_FILENAME, DEFAULT_ZNORM_FILENAME,
};
use crate::errors::FileListError;
use crate::probe_mode::ProbeMode;
use crate::selectors::{Group, ListKind};

/// Configuration of a file-list database.
///
/// Every name below `base_dir` is relative to a protocol root: the base
/// directory itself, or `<base_dir>/<protocol>` when a query names a protocol.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory holding the lists, or one subdirectory per protocol.
    pub base_dir: PathBuf,
    /// Subdirectory of the development lists.
    pub dev_subdir: String,
    /// Subdirectory of the evaluation lists.
    pub eval_subdir: String,
    /// Training list (`sample client`).
    pub world_filename: PathBuf,
    /// First optional training list.
    pub optional_world_1_filename: PathBuf,
    /// Second optional training list.
    pub optional_world_2_filename: PathBuf,
    /// Enrollment list name inside `dev`/`eval`.
    pub models_filename: String,
    /// Explicit dense probe list name; `for_probes.lst` when unset.
    pub probes_filename: Option<String>,
    /// Explicit sparse score list name; `for_scores.lst` when unset.
    pub scores_filename: Option<String>,
    /// T-norm enrollment list name.
    pub tnorm_filename: String,
    /// Z-norm probe list name.
    pub znorm_filename: String,
    /// Forces dense or sparse probing instead of detecting it from the lists.
    pub probe_mode: Option<ProbeMode>,
    /// Keep parsed lists for the lifetime of the database.
    pub keep_lists_in_memory: bool,
    /// Directory of the original sample data.
    pub original_directory: Option<PathBuf>,
    /// Candidate extensions of the original sample data, tried in order.
    pub original_extensions: Vec<String>,
    /// Directory of per-sample annotation files.
    pub annotation_directory: Option<PathBuf>,
    /// Extension of annotation files.
    pub annotation_extension: String,
    /// Opaque annotation format selector passed to annotation readers.
    pub annotation_type: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::new(),
            dev_subdir: DEFAULT_DEV_SUBDIR.to_string(),
            eval_subdir: DEFAULT_EVAL_SUBDIR.to_string(),
            world_filename: PathBuf::from(DEFAULT_WORLD_FILENAME),
            optional_world_1_filename: PathBuf::from(DEFAULT_OPTIONAL_WORLD_1_FILENAME),
            optional_world_2_filename: PathBuf::from(DEFAULT_OPTIONAL_WORLD_2_FILENAME),
            models_filename: DEFAULT_MODELS_FILENAME.to_string(),
            probes_filename: None,
            scores_filename: None,
            tnorm_filename: DEFAULT_TNORM_FILENAME.to_string(),
            znorm_filename: DEFAULT_ZNORM_FILENAME.to_string(),
            probe_mode: None,
            keep_lists_in_memory: true,
            original_directory: None,
            original_extensions: Vec::new(),
            annotation_directory: None,
            annotation_extension: DEFAULT_ANNOTATION_EXTENSION.to_string(),
            annotation_type: DEFAULT_ANNOTATION_TYPE.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Create a config for `base_dir` with default layout names.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Load a config from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FileListError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|err| {
            FileListError::Configuration(format!(
                "failed parsing database config {}: {err}",
                path.display()
            ))
        })
    }

    /// Override the development subdirectory.
    pub fn with_dev_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.dev_subdir = subdir.into();
        self
    }

    /// Override the evaluation subdirectory.
    pub fn with_eval_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.eval_subdir = subdir.into();
        self
    }

    /// Override the training list location.
    pub fn with_world_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.world_filename = filename.into();
        self
    }

    /// Override the first optional training list location.
    pub fn with_optional_world_1_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.optional_world_1_filename = filename.into();
        self
    }

    /// Override the second optional training list location.
    pub fn with_optional_world_2_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.optional_world_2_filename = filename.into();
        self
    }

    /// Override the enrollment list name.
    pub fn with_models_filename(mut self, filename: impl Into<String>) -> Self {
        self.models_filename = filename.into();
        self
    }

    /// Name the dense probe list explicitly.
    pub fn with_probes_filename(mut self, filename: impl Into<String>) -> Self {
        self.probes_filename = Some(filename.into());
        self
    }

    /// Name the sparse score list explicitly.
    pub fn with_scores_filename(mut self, filename: impl Into<String>) -> Self {
        self.scores_filename = Some(filename.into());
        self
    }

    /// Override the T-norm list name.
    pub fn with_tnorm_filename(mut self, filename: impl Into<String>) -> Self {
        self.tnorm_filename = filename.into();
        self
    }

    /// Override the Z-norm list name.
    pub fn with_znorm_filename(mut self, filename: impl Into<String>) -> Self {
        self.znorm_filename = filename.into();
        self
    }

    /// Force dense or sparse probing.
    pub fn with_probe_mode(mut self, mode: ProbeMode) -> Self {
        self.probe_mode = Some(mode);
        self
    }

    /// Enable or disable list retention.
    pub fn with_keep_lists_in_memory(mut self, keep: bool) -> Self {
        self.keep_lists_in_memory = keep;
        self
    }

    /// Set the original data directory and candidate extensions.
    pub fn with_original_data<I, S>(mut self, directory: impl Into<PathBuf>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.original_directory = Some(directory.into());
        self.original_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the annotation directory, extension, and format selector.
    pub fn with_annotations(
        mut self,
        directory: impl Into<PathBuf>,
        extension: impl Into<String>,
        annotation_type: impl Into<String>,
    ) -> Self {
        self.annotation_directory = Some(directory.into());
        self.annotation_extension = extension.into();
        self.annotation_type = annotation_type.into();
        self
    }

    /// Dense probe list name, explicit or default.
    pub fn probes_list_name(&self) -> &str {
        self.probes_filename
            .as_deref()
            .unwrap_or(DEFAULT_PROBES_FILENAME)
    }

    /// Sparse score list name, explicit or default.
    pub fn scores_list_name(&self) -> &str {
        self.scores_filename
            .as_deref()
            .unwrap_or(DEFAULT_SCORES_FILENAME)
    }

    /// Directory of `protocol`, or the base directory when none is given.
    pub fn protocol_root(&self, protocol: Option<&str>) -> PathBuf {
        match protocol {
            Some(name) if !name.is_empty() => self.base_dir.join(name),
            _ => self.base_dir.clone(),
        }
    }

    /// Directory of a `dev`/`eval` group; training groups map to the protocol root.
    pub fn group_dir(&self, protocol: Option<&str>, group: Group) -> PathBuf {
        let root = self.protocol_root(protocol);
        match group {
            Group::Dev => root.join(&self.dev_subdir),
            Group::Eval => root.join(&self.eval_subdir),
            Group::World | Group::OptionalWorld1 | Group::OptionalWorld2 => root,
        }
    }

    /// Path of the list of `kind` in `group`; `kind` is ignored for training groups.
    pub fn list_file(&self, protocol: Option<&str>, group: Group, kind: ListKind) -> PathBuf {
        let root = self.protocol_root(protocol);
        match group {
            Group::World => root.join(&self.world_filename),
            Group::OptionalWorld1 => root.join(&self.optional_world_1_filename),
            Group::OptionalWorld2 => root.join(&self.optional_world_2_filename),
            Group::Dev | Group::Eval => {
                let name = match kind {
                    ListKind::Models => self.models_filename.as_str(),
                    ListKind::Probes => self.probes_list_name(),
                    ListKind::Scores => self.scores_list_name(),
                    ListKind::TNorm => self.tnorm_filename.as_str(),
                    ListKind::ZNorm => self.znorm_filename.as_str(),
                };
                self.group_dir(protocol, group).join(name)
            }
        }
    }
}
