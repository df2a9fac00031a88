use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::data::{ModelIndex, SampleRecord};
use crate::errors::FileListError;
use crate::lists::parser::read_records;
use crate::selectors::{Group, ListKind};
use crate::types::ProtocolName;

/// Parsed list shared between the cache and query results.
pub type SharedList = Arc<Vec<SampleRecord>>;

/// Cache slot of one physical list.
///
/// Training groups have a single list each, so their kind is not part of the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ListKey {
    protocol: Option<ProtocolName>,
    group: Group,
    kind: Option<ListKind>,
}

impl ListKey {
    fn new(protocol: Option<&str>, group: Group, kind: ListKind) -> Self {
        Self {
            protocol: protocol.map(str::to_string),
            group,
            kind: (!group.is_world_family()).then_some(kind),
        }
    }
}

/// Memo of parsed lists and derived model indexes.
///
/// Retention is fixed at construction: when disabled, every read goes back to
/// disk. The cache uses interior mutability without locking, so it is `Send`
/// but not `Sync`; callers sharing one instance across threads must serialize
/// access themselves.
#[derive(Debug)]
pub struct ListCache {
    retain: bool,
    lists: RefCell<HashMap<ListKey, SharedList>>,
    models: RefCell<HashMap<ListKey, Arc<ModelIndex>>>,
}

impl ListCache {
    /// Create a cache; `retain` keeps parsed lists for the cache lifetime.
    pub fn new(retain: bool) -> Self {
        Self {
            retain,
            lists: RefCell::new(HashMap::new()),
            models: RefCell::new(HashMap::new()),
        }
    }

    /// Records of the list at `path`, parsed with the arity implied by `group` and `kind`.
    pub fn read_list(
        &self,
        path: &Path,
        protocol: Option<&str>,
        group: Group,
        kind: ListKind,
    ) -> Result<SharedList, FileListError> {
        let key = ListKey::new(protocol, group, kind);
        if let Some(list) = self.lists.borrow().get(&key) {
            debug!(path = %path.display(), group = %group, kind = %kind, "list cache hit");
            return Ok(Arc::clone(list));
        }
        let arity = kind.arity_in(group);
        let records = Arc::new(read_records(path, arity)?);
        debug!(
            path = %path.display(),
            group = %group,
            kind = %kind,
            arity,
            rows = records.len(),
            "parsed list"
        );
        if self.retain {
            self.lists.borrow_mut().insert(key, Arc::clone(&records));
        }
        Ok(records)
    }

    /// Model index of the enrollment list at `path`.
    ///
    /// Only model-defining kinds (`for_models`, `for_tnorm`) are accepted.
    pub fn read_models(
        &self,
        path: &Path,
        protocol: Option<&str>,
        group: Group,
        kind: ListKind,
    ) -> Result<Arc<ModelIndex>, FileListError> {
        if !kind.defines_models() {
            return Err(FileListError::InvalidKind(format!(
                "{kind} does not define models"
            )));
        }
        let key = ListKey::new(protocol, group, kind);
        if let Some(index) = self.models.borrow().get(&key) {
            return Ok(Arc::clone(index));
        }
        let records = self.read_list(path, protocol, group, kind)?;
        let index = Arc::new(ModelIndex::from_records(&records, path)?);
        if self.retain {
            self.models.borrow_mut().insert(key, Arc::clone(&index));
        }
        Ok(index)
    }

    /// Drop every cached list and index.
    pub fn clear(&self) {
        self.lists.borrow_mut().clear();
        self.models.borrow_mut().clear();
    }
}
