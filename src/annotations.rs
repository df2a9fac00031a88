//! Annotation lookup seam.
//!
//! Decoding annotation files is left to external readers; this module only
//! defines the lookup contract and the default file location convention.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::FileListError;
use crate::types::AnnotationLabel;

/// Landmark coordinates keyed by label, as `(y, x)` pairs.
pub type Annotations = BTreeMap<AnnotationLabel, (f64, f64)>;

/// Resolves the annotations of a sample.
pub trait AnnotationSource {
    /// Annotations of `sample_id`, or `None` when the sample has none.
    fn annotations(&self, sample_id: &str) -> Result<Option<Annotations>, FileListError>;
}

/// Location convention for annotation files: `<directory>/<sample id><extension>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationLocator {
    /// Directory holding the annotation files.
    pub directory: PathBuf,
    /// Extension appended to the sample id, including its leading dot.
    pub extension: String,
    /// Opaque format selector understood by the decoding collaborator.
    pub annotation_type: String,
}

impl AnnotationLocator {
    /// Locator for `<directory>/<sample id><extension>` files of `annotation_type`.
    pub fn new(
        directory: impl Into<PathBuf>,
        extension: impl Into<String>,
        annotation_type: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
            annotation_type: annotation_type.into(),
        }
    }

    /// Annotation file path of `sample_id`.
    pub fn path_for(&self, sample_id: &str) -> PathBuf {
        self.directory
            .join(format!("{sample_id}{}", self.extension))
    }
}

/// Annotation source backed by a decoding function over located files.
///
/// Missing annotation files yield `None`; decoding errors propagate.
pub struct FileAnnotationSource<F>
where
    F: Fn(&Path, &str) -> Result<Annotations, FileListError>,
{
    locator: AnnotationLocator,
    decode: F,
}

impl<F> FileAnnotationSource<F>
where
    F: Fn(&Path, &str) -> Result<Annotations, FileListError>,
{
    /// Wrap `decode`, which receives the file path and the annotation type.
    pub fn new(locator: AnnotationLocator, decode: F) -> Self {
        Self { locator, decode }
    }

    /// Location convention used to find annotation files.
    pub fn locator(&self) -> &AnnotationLocator {
        &self.locator
    }
}

impl<F> AnnotationSource for FileAnnotationSource<F>
where
    F: Fn(&Path, &str) -> Result<Annotations, FileListError>,
{
    fn annotations(&self, sample_id: &str) -> Result<Option<Annotations>, FileListError> {
        let path = self.locator.path_for(sample_id);
        if !path.is_file() {
            return Ok(None);
        }
        (self.decode)(&path, &self.locator.annotation_type).map(Some)
    }
}
