//! Query façade over one protocol tree.
//!
//! The database resolves the probing mode once, when opened, and reads lists
//! lazily through its [`ListCache`]. Every query is a blocking read; nothing
//! is written back to disk.

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::annotations::{AnnotationLocator, AnnotationSource, Annotations};
use crate::config::DatabaseConfig;
use crate::constants::groups::{ALL_GROUPS, DEFAULT_GROUPS, EVALUATION_GROUPS, WORLD_GROUPS};
use crate::data::{Client, SampleRecord};
use crate::errors::FileListError;
use crate::lists::{ListCache, SharedList};
use crate::probe_mode::{ProbeMode, ProbeModeResolver};
use crate::query::ObjectQuery;
use crate::selectors::{AccessClass, Group, ListKind, Purpose, resolve_selection};
use crate::transport::fs::{ProtocolTree, is_group_dir, is_list_file};
use crate::types::{ClientId, ModelId, SampleId};

/// Read-only query interface over biometric verification file lists.
pub struct FileListDatabase {
    config: DatabaseConfig,
    tree: ProtocolTree,
    probe_mode: ProbeMode,
    cache: ListCache,
    annotation_source: Option<Box<dyn AnnotationSource + Send>>,
}

impl FileListDatabase {
    /// Open the database described by `config` and resolve its probing mode.
    pub fn new(config: DatabaseConfig) -> Result<Self, FileListError> {
        let tree = ProtocolTree::open(&config.base_dir)?;
        let probe_mode = ProbeModeResolver::new(&config, &tree).resolve()?;
        let cache = ListCache::new(config.keep_lists_in_memory);
        Ok(Self {
            config,
            tree,
            probe_mode,
            cache,
            annotation_source: None,
        })
    }

    /// Attach the collaborator used by [`annotations`](Self::annotations).
    pub fn with_annotation_source(mut self, source: impl AnnotationSource + Send + 'static) -> Self {
        self.annotation_source = Some(Box::new(source));
        self
    }

    /// Configuration the database was opened with.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Validated base directory.
    pub fn base_dir(&self) -> &Path {
        self.tree.root()
    }

    /// Probing mode resolved when the database was opened.
    pub fn probe_mode(&self) -> ProbeMode {
        self.probe_mode
    }

    /// Path of the list of `kind` in `group`.
    pub fn list_file(&self, group: Group, kind: ListKind, protocol: Option<&str>) -> PathBuf {
        self.config.list_file(protocol, group, kind)
    }

    /// Groups whose directory or list file exists, in canonical order.
    pub fn groups(&self, protocol: Option<&str>) -> Vec<Group> {
        ALL_GROUPS
            .into_iter()
            .filter(|group| self.group_exists(protocol, *group))
            .collect()
    }

    fn group_exists(&self, protocol: Option<&str>, group: Group) -> bool {
        if group.is_world_family() {
            is_list_file(&self.config.list_file(protocol, group, ListKind::Models))
        } else {
            is_group_dir(&self.config.group_dir(protocol, group))
        }
    }

    /// True when T-norm and Z-norm lists exist for every requested group.
    pub fn implements_zt(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<bool, FileListError> {
        let groups = resolve_selection(groups, &EVALUATION_GROUPS, &EVALUATION_GROUPS)?;
        Ok(groups.iter().all(|group| {
            [ListKind::TNorm, ListKind::ZNorm]
                .iter()
                .all(|kind| is_list_file(&self.config.list_file(protocol, *group, *kind)))
        }))
    }

    fn read_list(
        &self,
        protocol: Option<&str>,
        group: Group,
        kind: ListKind,
    ) -> Result<SharedList, FileListError> {
        let path = self.config.list_file(protocol, group, kind);
        self.cache.read_list(&path, protocol, group, kind)
    }

    fn collect_client_ids(
        &self,
        protocol: Option<&str>,
        groups: &[Group],
        kind: ListKind,
    ) -> Result<BTreeSet<ClientId>, FileListError> {
        let mut ids = BTreeSet::new();
        for group in groups {
            let records = self.read_list(protocol, *group, kind)?;
            ids.extend(records.iter().map(|record| record.client_id.clone()));
        }
        Ok(ids)
    }

    fn collect_model_ids(
        &self,
        protocol: Option<&str>,
        groups: &[Group],
        kind: ListKind,
    ) -> Result<BTreeSet<ModelId>, FileListError> {
        let mut ids = BTreeSet::new();
        for group in groups {
            let path = self.config.list_file(protocol, *group, kind);
            let index = self.cache.read_models(&path, protocol, *group, kind)?;
            ids.extend(index.model_ids().cloned());
        }
        Ok(ids)
    }

    fn find_client(
        &self,
        model_id: &str,
        protocol: Option<&str>,
        groups: &[Group],
        kind: ListKind,
    ) -> Result<Option<ClientId>, FileListError> {
        for group in groups {
            let path = self.config.list_file(protocol, *group, kind);
            let index = self.cache.read_models(&path, protocol, *group, kind)?;
            if let Some(client) = index.client_for(model_id) {
                return Ok(Some(client.clone()));
            }
        }
        Ok(None)
    }

    /// Client ids of the enrollment (or training) lists of `groups`.
    ///
    /// Defaults to `dev`, `eval`, and `world`.
    pub fn client_ids(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<BTreeSet<ClientId>, FileListError> {
        let groups = resolve_selection(groups, &ALL_GROUPS, &DEFAULT_GROUPS)?;
        self.collect_client_ids(protocol, &groups, ListKind::Models)
    }

    /// Client ids of the T-norm lists of `groups` (`dev`/`eval`).
    pub fn tclient_ids(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<BTreeSet<ClientId>, FileListError> {
        let groups = resolve_selection(groups, &EVALUATION_GROUPS, &EVALUATION_GROUPS)?;
        self.collect_client_ids(protocol, &groups, ListKind::TNorm)
    }

    /// Client ids of the Z-norm lists of `groups` (`dev`/`eval`).
    pub fn zclient_ids(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<BTreeSet<ClientId>, FileListError> {
        let groups = resolve_selection(groups, &EVALUATION_GROUPS, &EVALUATION_GROUPS)?;
        self.collect_client_ids(protocol, &groups, ListKind::ZNorm)
    }

    /// [`client_ids`](Self::client_ids) wrapped as [`Client`] values.
    pub fn clients(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<Vec<Client>, FileListError> {
        Ok(self
            .client_ids(protocol, groups)?
            .into_iter()
            .map(Client::new)
            .collect())
    }

    /// T-norm clients of `groups`.
    pub fn tclients(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<Vec<Client>, FileListError> {
        Ok(self
            .tclient_ids(protocol, groups)?
            .into_iter()
            .map(Client::new)
            .collect())
    }

    /// Z-norm clients of `groups`.
    pub fn zclients(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<Vec<Client>, FileListError> {
        Ok(self
            .zclient_ids(protocol, groups)?
            .into_iter()
            .map(Client::new)
            .collect())
    }

    /// Model ids enrolled in `groups`; defaults to `dev`, `eval`, and `world`.
    pub fn model_ids(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<BTreeSet<ModelId>, FileListError> {
        let groups = resolve_selection(groups, &ALL_GROUPS, &DEFAULT_GROUPS)?;
        self.collect_model_ids(protocol, &groups, ListKind::Models)
    }

    /// T-norm model ids of `groups` (`dev`/`eval`).
    pub fn tmodel_ids(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<BTreeSet<ModelId>, FileListError> {
        let groups = resolve_selection(groups, &EVALUATION_GROUPS, &EVALUATION_GROUPS)?;
        self.collect_model_ids(protocol, &groups, ListKind::TNorm)
    }

    /// Client owning `model_id`; the first requested group that knows the model wins.
    pub fn get_client_id_from_model_id(
        &self,
        model_id: &str,
        groups: Option<&[Group]>,
        protocol: Option<&str>,
    ) -> Result<ClientId, FileListError> {
        let groups = resolve_selection(groups, &ALL_GROUPS, &DEFAULT_GROUPS)?;
        self.find_client(model_id, protocol, &groups, ListKind::Models)?
            .ok_or_else(|| FileListError::UnknownModelId {
                model_id: model_id.to_string(),
                groups,
            })
    }

    /// Client owning the T-norm model `model_id`.
    pub fn get_client_id_from_tmodel_id(
        &self,
        model_id: &str,
        groups: Option<&[Group]>,
        protocol: Option<&str>,
    ) -> Result<ClientId, FileListError> {
        let groups = resolve_selection(groups, &EVALUATION_GROUPS, &EVALUATION_GROUPS)?;
        self.find_client(model_id, protocol, &groups, ListKind::TNorm)?
            .ok_or_else(|| FileListError::UnknownTModelId {
                model_id: model_id.to_string(),
                groups,
            })
    }

    /// Samples matching `query`, deduplicated by id in first-seen order.
    ///
    /// Training and enrollment lists are merged before probe lists. Model-id
    /// filters apply to every list except dense probe lists, whose probes are
    /// scored against all models. Class filters need sparse probing.
    pub fn objects(&self, query: &ObjectQuery) -> Result<Vec<SampleRecord>, FileListError> {
        if self.probe_mode.is_dense()
            && let Some(classes) = &query.classes
        {
            return Err(FileListError::InvalidSelector {
                selector: "class",
                value: classes
                    .iter()
                    .map(AccessClass::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                valid: format!(
                    "none with dense probing; use the '{}' list to select classes",
                    self.config.scores_list_name()
                ),
            });
        }

        let purposes = resolve_selection(query.purposes.as_deref(), &Purpose::ALL, &Purpose::ALL)?;
        let groups = resolve_selection(query.groups.as_deref(), &ALL_GROUPS, &DEFAULT_GROUPS)?;
        let classes = resolve_selection(
            query.classes.as_deref(),
            &AccessClass::ALL,
            &AccessClass::ALL,
        )?;
        let model_filter: Option<HashSet<&str>> = query
            .model_ids
            .as_ref()
            .map(|ids| ids.iter().map(String::as_str).collect());
        let protocol = query.protocol.as_deref();

        let mut plain_lists: Vec<SharedList> = Vec::new();
        for group in WORLD_GROUPS {
            if groups.contains(&group) {
                plain_lists.push(self.read_list(protocol, group, ListKind::Models)?);
            }
        }
        let mut probe_lists: Vec<SharedList> = Vec::new();
        for group in EVALUATION_GROUPS {
            if !groups.contains(&group) {
                continue;
            }
            if purposes.contains(&Purpose::Enroll) {
                plain_lists.push(self.read_list(protocol, group, ListKind::Models)?);
            }
            if purposes.contains(&Purpose::Probe) {
                probe_lists.push(self.read_list(
                    protocol,
                    group,
                    self.probe_mode.probe_list_kind(),
                )?);
            }
        }

        let admits_model = |record: &SampleRecord| {
            model_filter
                .as_ref()
                .is_none_or(|ids| ids.contains(record.model_id()))
        };
        let admits_class = |record: &SampleRecord| {
            classes
                .iter()
                .any(|class| class.admits(&record.client_id, &record.claimed_id))
        };

        let mut merged: IndexMap<SampleId, SampleRecord> = IndexMap::new();
        for record in plain_lists.iter().flat_map(|list| list.iter()) {
            if admits_model(record) && !merged.contains_key(&record.id) {
                merged.insert(record.id.clone(), record.clone());
            }
        }
        for record in probe_lists.iter().flat_map(|list| list.iter()) {
            let admitted = match self.probe_mode {
                ProbeMode::Dense => true,
                ProbeMode::Sparse => admits_model(record) && admits_class(record),
            };
            if admitted && !merged.contains_key(&record.id) {
                merged.insert(record.id.clone(), record.clone());
            }
        }

        debug!(
            protocol = protocol.unwrap_or(""),
            groups = ?groups,
            purposes = ?purposes,
            plain_lists = plain_lists.len(),
            probe_lists = probe_lists.len(),
            samples = merged.len(),
            "objects query"
        );
        Ok(merged.into_values().collect())
    }

    /// T-norm enrollment samples of `groups`, optionally restricted to `model_ids`.
    ///
    /// Lists of different groups are concatenated without deduplication.
    pub fn tobjects(
        &self,
        protocol: Option<&str>,
        model_ids: Option<&[&str]>,
        groups: Option<&[Group]>,
    ) -> Result<Vec<SampleRecord>, FileListError> {
        let groups = resolve_selection(groups, &EVALUATION_GROUPS, &EVALUATION_GROUPS)?;
        let mut samples = Vec::new();
        for group in groups {
            let records = self.read_list(protocol, group, ListKind::TNorm)?;
            samples.extend(
                records
                    .iter()
                    .filter(|record| model_ids.is_none_or(|ids| ids.contains(&record.model_id())))
                    .cloned(),
            );
        }
        Ok(samples)
    }

    /// Z-norm samples of `groups`, concatenated without filtering.
    pub fn zobjects(
        &self,
        protocol: Option<&str>,
        groups: Option<&[Group]>,
    ) -> Result<Vec<SampleRecord>, FileListError> {
        let groups = resolve_selection(groups, &EVALUATION_GROUPS, &EVALUATION_GROUPS)?;
        let mut samples = Vec::new();
        for group in groups {
            let records = self.read_list(protocol, group, ListKind::ZNorm)?;
            samples.extend(records.iter().cloned());
        }
        Ok(samples)
    }

    /// Location convention for annotation files, when an annotation directory is configured.
    pub fn annotation_locator(&self) -> Option<AnnotationLocator> {
        self.config.annotation_directory.as_ref().map(|directory| {
            AnnotationLocator::new(
                directory.clone(),
                self.config.annotation_extension.clone(),
                self.config.annotation_type.clone(),
            )
        })
    }

    /// Annotations of `record` from the attached source.
    ///
    /// `None` unless both an annotation directory and a source are configured.
    pub fn annotations(&self, record: &SampleRecord) -> Result<Option<Annotations>, FileListError> {
        if self.config.annotation_directory.is_none() {
            return Ok(None);
        }
        match &self.annotation_source {
            Some(source) => source.annotations(&record.id),
            None => Ok(None),
        }
    }

    /// Path of the original data file of `record`.
    ///
    /// Configured extensions are tried in order and the first existing file
    /// wins. With at most one extension and `check_existence` disabled the
    /// path is returned without touching the filesystem.
    pub fn original_file_name(
        &self,
        record: &SampleRecord,
        check_existence: bool,
    ) -> Result<PathBuf, FileListError> {
        let directory = self.config.original_directory.as_deref();
        let extensions = &self.config.original_extensions;
        if !check_existence && extensions.len() <= 1 {
            return Ok(record.make_path(directory, extensions.first().map(String::as_str)));
        }
        let candidates: Vec<PathBuf> = if extensions.is_empty() {
            vec![record.make_path(directory, None)]
        } else {
            extensions
                .iter()
                .map(|extension| record.make_path(directory, Some(extension)))
                .collect()
        };
        candidates
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| FileListError::MissingFile {
                path: record.make_path(directory, None),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sparse_tree() -> TempDir {
        let temp = tempdir().unwrap();
        write(temp.path(), "norm/train_world.lst", "w/a1 a\nw/a2 a\nw/b1 b\n");
        write(temp.path(), "dev/for_models.lst", "d/m1 m1 c1\nd/m2 m2 c2\nshared m2 c2\n");
        write(
            temp.path(),
            "dev/for_scores.lst",
            "p/1 m1 c1 c1\np/1 m2 c2 c1\np/2 m2 c2 c2\nshared m1 c1 c2\n",
        );
        temp
    }

    #[test]
    fn open_rejects_non_directory() {
        let temp = tempdir().unwrap();
        let err = FileListDatabase::new(DatabaseConfig::new(temp.path().join("missing")))
            .err()
            .unwrap();
        assert!(matches!(err, FileListError::InvalidDirectory { .. }));
    }

    #[test]
    fn enrollment_row_shadows_later_probe_occurrence() {
        let temp = sparse_tree();
        let db = FileListDatabase::new(DatabaseConfig::new(temp.path())).unwrap();
        assert_eq!(db.probe_mode(), ProbeMode::Sparse);

        let samples = db
            .objects(&ObjectQuery::new().with_groups([Group::Dev]))
            .unwrap();
        let ids: Vec<&str> = samples.iter().map(|record| record.path()).collect();
        assert_eq!(ids, vec!["d/m1", "d/m2", "shared", "p/1", "p/2"]);
        let shared = samples.iter().find(|record| record.id == "shared").unwrap();
        assert_eq!(shared.model_id(), "m2");
    }

    #[test]
    fn filtered_out_probe_rows_do_not_block_later_rows_of_same_sample() {
        let temp = sparse_tree();
        let db = FileListDatabase::new(DatabaseConfig::new(temp.path())).unwrap();

        let samples = db
            .objects(
                &ObjectQuery::new()
                    .with_groups([Group::Dev])
                    .with_purposes([Purpose::Probe])
                    .with_model_ids(["m2"]),
            )
            .unwrap();
        let ids: Vec<&str> = samples.iter().map(|record| record.path()).collect();
        assert_eq!(ids, vec!["p/1", "p/2"]);
        assert!(samples.iter().all(|record| record.model_id() == "m2"));
    }

    #[test]
    fn impostor_filter_uses_claimed_identity() {
        let temp = sparse_tree();
        let db = FileListDatabase::new(DatabaseConfig::new(temp.path())).unwrap();

        let impostors = db
            .objects(
                &ObjectQuery::new()
                    .with_groups([Group::Dev])
                    .with_purposes([Purpose::Probe])
                    .with_classes([AccessClass::Impostor]),
            )
            .unwrap();
        let ids: Vec<&str> = impostors.iter().map(|record| record.path()).collect();
        assert_eq!(ids, vec!["p/1", "shared"]);
        assert!(impostors.iter().all(|record| !record.is_genuine()));
    }

    #[test]
    fn world_model_ids_are_client_ids() {
        let temp = sparse_tree();
        let db = FileListDatabase::new(DatabaseConfig::new(temp.path())).unwrap();
        let models = db.model_ids(None, Some(&[Group::World])).unwrap();
        assert_eq!(models.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            db.get_client_id_from_model_id("b", Some(&[Group::World]), None)
                .unwrap(),
            "b"
        );
        assert!(matches!(
            db.get_client_id_from_model_id("b", Some(&[Group::Dev]), None),
            Err(FileListError::UnknownModelId { .. })
        ));
    }

    #[test]
    fn original_file_name_tries_extensions_in_order() {
        let temp = sparse_tree();
        write(temp.path(), "data/d/m1.png", "");
        let config = DatabaseConfig::new(temp.path())
            .with_original_data(temp.path().join("data"), [".jpg", ".png"]);
        let db = FileListDatabase::new(config).unwrap();
        let record = SampleRecord::new("d/m1", "c1", None, None);

        assert_eq!(
            db.original_file_name(&record, true).unwrap(),
            temp.path().join("data/d/m1.png")
        );

        let missing = SampleRecord::new("d/m2", "c2", None, None);
        assert!(matches!(
            db.original_file_name(&missing, false),
            Err(FileListError::MissingFile { .. })
        ));
    }

    #[test]
    fn single_extension_without_existence_check_returns_path() {
        let temp = sparse_tree();
        let config =
            DatabaseConfig::new(temp.path()).with_original_data("/originals", [".jpg"]);
        let db = FileListDatabase::new(config).unwrap();
        let record = SampleRecord::new("d/m9", "c9", None, None);
        assert_eq!(
            db.original_file_name(&record, false).unwrap(),
            PathBuf::from("/originals/d/m9.jpg")
        );
        assert!(db.original_file_name(&record, true).is_err());
    }
}
