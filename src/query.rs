use crate::selectors::{AccessClass, Group, Purpose};
use crate::types::{ModelId, ProtocolName};

/// Selection passed to [`FileListDatabase::objects`](crate::FileListDatabase::objects).
///
/// Unset selectors mean "no narrowing": all purposes, the default groups
/// (`dev`, `eval`, `world`), both access classes, and no model-id filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectQuery {
    /// Protocol subdirectory to query; the base directory when unset.
    pub protocol: Option<ProtocolName>,
    /// Enrollment and/or probe samples; ignored for training groups.
    pub purposes: Option<Vec<Purpose>>,
    /// Keep only rows contributing to these models.
    pub model_ids: Option<Vec<ModelId>>,
    /// Groups to collect samples from.
    pub groups: Option<Vec<Group>>,
    /// Genuine and/or impostor probes; only valid with sparse probing.
    pub classes: Option<Vec<AccessClass>>,
}

impl ObjectQuery {
    /// Query without any narrowing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query the protocol subdirectory `protocol`.
    pub fn with_protocol(mut self, protocol: impl Into<ProtocolName>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Restrict to enrollment and/or probe samples.
    pub fn with_purposes(mut self, purposes: impl IntoIterator<Item = Purpose>) -> Self {
        self.purposes = Some(purposes.into_iter().collect());
        self
    }

    /// Keep only rows of these models.
    pub fn with_model_ids<I, S>(mut self, model_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModelId>,
    {
        self.model_ids = Some(model_ids.into_iter().map(Into::into).collect());
        self
    }

    /// Collect samples from these groups.
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = Group>) -> Self {
        self.groups = Some(groups.into_iter().collect());
        self
    }

    /// Restrict sparse probes to genuine and/or impostor accesses.
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = AccessClass>) -> Self {
        self.classes = Some(classes.into_iter().collect());
        self
    }
}
