#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Annotation lookup contract and file location convention.
pub mod annotations;
/// Database configuration and list layout.
pub mod config;
/// Centralized defaults for layout, parsing, and group sets.
pub mod constants;
/// Sample records, model indexes, and payload persistence seam.
pub mod data;
/// Query façade over a protocol tree.
pub mod database;
/// List parsing and memoization.
pub mod lists;
/// Dense/sparse probing detection.
pub mod probe_mode;
/// Object query selection type.
pub mod query;
/// Closed selector domains and selection validation.
pub mod selectors;
/// Filesystem access used to discover protocols and lists.
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use annotations::{AnnotationLocator, AnnotationSource, Annotations, FileAnnotationSource};
pub use config::DatabaseConfig;
pub use data::{Client, ModelIndex, PayloadSink, SampleRecord};
pub use database::FileListDatabase;
pub use errors::FileListError;
pub use lists::{ListCache, SharedList};
pub use probe_mode::{ProbeMode, ProbeModeResolver};
pub use query::ObjectQuery;
pub use selectors::{AccessClass, Group, ListKind, Purpose};
pub use types::{AnnotationLabel, ClientId, ListRow, ModelId, ProtocolName, SampleId};
