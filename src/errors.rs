use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::selectors::Group;
use crate::types::{ClientId, ModelId};

/// Error type for configuration, list parsing, and query failures.
#[derive(Debug, Error)]
pub enum FileListError {
    #[error("invalid directory specified '{}'", path.display())]
    InvalidDirectory { path: PathBuf },
    #[error("file '{}' does not exist", path.display())]
    MissingFile { path: PathBuf },
    #[error("malformed list '{}' at line {line}: {details}", path.display())]
    MalformedList {
        path: PathBuf,
        line: usize,
        details: String,
    },
    #[error(
        "model id '{model_id}' in '{}' is associated to two different client ids '{first_client}' and '{second_client}'",
        path.display()
    )]
    ConflictingModelMapping {
        model_id: ModelId,
        first_client: ClientId,
        second_client: ClientId,
        path: PathBuf,
    },
    #[error("unable to determine which way of probing should be used: {0}")]
    AmbiguousProbeMode(String),
    #[error("invalid {selector} '{value}'; valid values are {valid}")]
    InvalidSelector {
        selector: &'static str,
        value: String,
        valid: String,
    },
    #[error("invalid list kind '{0}'")]
    InvalidKind(String),
    #[error("model id '{model_id}' cannot be found in groups {groups:?}")]
    UnknownModelId {
        model_id: ModelId,
        groups: Vec<Group>,
    },
    #[error("T-norm model id '{model_id}' cannot be found in groups {groups:?}")]
    UnknownTModelId {
        model_id: ModelId,
        groups: Vec<Group>,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}
