use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::FileListError;

pub use crate::types::{ClientId, ModelId, SampleId};

/// One parsed list row: a sample and the identities attached to it.
///
/// The model id only distinguishes repeated probe rows that point at the same
/// physical sample under different enrollments. It stays inside the crate and
/// is reachable only through model-id filters on the query API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SampleRecord {
    /// List-relative sample path; doubles as the stable identifier.
    pub id: SampleId,
    /// True owner of the sample.
    pub client_id: ClientId,
    /// Identity the sample claims to be when probing.
    pub claimed_id: ClientId,
    #[serde(skip)]
    model_id: ModelId,
}

impl SampleRecord {
    /// Build a record; `model_id` and `claimed_id` default to `client_id`.
    pub fn new(
        id: impl Into<SampleId>,
        client_id: impl Into<ClientId>,
        model_id: Option<ModelId>,
        claimed_id: Option<ClientId>,
    ) -> Self {
        let client_id = client_id.into();
        Self {
            id: id.into(),
            model_id: model_id.unwrap_or_else(|| client_id.clone()),
            claimed_id: claimed_id.unwrap_or_else(|| client_id.clone()),
            client_id,
        }
    }

    /// Sample path relative to the data root (identical to `id`).
    pub fn path(&self) -> &str {
        &self.id
    }

    pub(crate) fn model_id(&self) -> &str {
        &self.model_id
    }

    /// True for genuine accesses (owner equals claimed identity).
    pub fn is_genuine(&self) -> bool {
        self.client_id == self.claimed_id
    }

    /// Join an optional `directory`, the sample path, and an optional `extension`.
    ///
    /// The extension is appended verbatim and normally carries its leading dot.
    pub fn make_path(&self, directory: Option<&Path>, extension: Option<&str>) -> PathBuf {
        let file_name = format!("{}{}", self.id, extension.unwrap_or(""));
        match directory {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Hand `payload` to `sink` at the path built by [`make_path`](Self::make_path).
    pub fn save(
        &self,
        sink: &dyn PayloadSink,
        payload: &[u8],
        directory: Option<&Path>,
        extension: &str,
        create_directories: bool,
    ) -> Result<PathBuf, FileListError> {
        let path = self.make_path(directory, Some(extension));
        if create_directories
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        sink.save(payload, &path)?;
        Ok(path)
    }
}

impl PartialOrd for SampleRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SampleRecord {
    /// Records order by id; remaining fields only break ties between rows of the same sample.
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.client_id.cmp(&other.client_id))
            .then_with(|| self.claimed_id.cmp(&other.claimed_id))
            .then_with(|| self.model_id.cmp(&other.model_id))
    }
}

/// Persistence backend for numeric payloads attached to samples.
pub trait PayloadSink {
    /// Write `payload` to `path`.
    fn save(&self, payload: &[u8], path: &Path) -> Result<(), FileListError>;
}

/// A client identity returned by the client listing queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Client {
    /// Client identifier as it appears in the lists.
    pub id: ClientId,
}

impl Client {
    /// Client with identity `id`.
    pub fn new(id: impl Into<ClientId>) -> Self {
        Self { id: id.into() }
    }
}

/// Model id to client id mapping derived from an enrollment list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelIndex {
    models: IndexMap<ModelId, ClientId>,
}

impl ModelIndex {
    /// Build the index from `records` read out of `source`.
    ///
    /// A model id bound to two different clients is a data error.
    pub fn from_records(records: &[SampleRecord], source: &Path) -> Result<Self, FileListError> {
        let mut models: IndexMap<ModelId, ClientId> = IndexMap::new();
        for record in records {
            match models.get(record.model_id()) {
                None => {
                    models.insert(record.model_id().to_string(), record.client_id.clone());
                }
                Some(existing) if existing != &record.client_id => {
                    return Err(FileListError::ConflictingModelMapping {
                        model_id: record.model_id().to_string(),
                        first_client: existing.clone(),
                        second_client: record.client_id.clone(),
                        path: source.to_path_buf(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(Self { models })
    }

    /// Client that owns `model_id`, if the model is known.
    pub fn client_for(&self, model_id: &str) -> Option<&ClientId> {
        self.models.get(model_id)
    }

    /// True if `model_id` is enrolled in the indexed list.
    pub fn contains(&self, model_id: &str) -> bool {
        self.models.contains_key(model_id)
    }

    /// Model ids in first-seen order.
    pub fn model_ids(&self) -> impl Iterator<Item = &ModelId> {
        self.models.keys()
    }

    /// Number of distinct models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when the list enrolls no model.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
