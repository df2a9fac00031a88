//! Closed selector domains used by queries: groups, purposes, access classes, and list kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::groups::WORLD_GROUPS;
use crate::errors::FileListError;

/// Protocol partition a list belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    /// Development set.
    Dev,
    /// Evaluation set.
    Eval,
    /// Training set.
    World,
    /// First optional training set.
    #[serde(rename = "optional_world_1")]
    OptionalWorld1,
    /// Second optional training set.
    #[serde(rename = "optional_world_2")]
    OptionalWorld2,
}

impl Group {
    /// Canonical lowercase name used in lists and error messages.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Group::Dev => "dev",
            Group::Eval => "eval",
            Group::World => "world",
            Group::OptionalWorld1 => "optional_world_1",
            Group::OptionalWorld2 => "optional_world_2",
        }
    }

    /// True for the training groups, whose lists are always `sample client`.
    pub fn is_world_family(&self) -> bool {
        WORLD_GROUPS.contains(self)
    }
}

/// Why a sample is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Samples used to enroll models.
    Enroll,
    /// Samples scored against enrolled models.
    Probe,
}

impl Purpose {
    /// All purposes, in query order.
    pub const ALL: [Purpose; 2] = [Purpose::Enroll, Purpose::Probe];

    /// Canonical lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Purpose::Enroll => "enroll",
            Purpose::Probe => "probe",
        }
    }
}

/// Access class of a sparse probe row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessClass {
    /// Genuine access: the sample's owner is the claimed identity.
    Client,
    /// Impostor access: the sample's owner differs from the claimed identity.
    Impostor,
}

impl AccessClass {
    /// All access classes.
    pub const ALL: [AccessClass; 2] = [AccessClass::Client, AccessClass::Impostor];

    /// Canonical lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccessClass::Client => "client",
            AccessClass::Impostor => "impostor",
        }
    }

    /// True when a row owned by `client_id` claiming `claimed_id` falls into this class.
    pub fn admits(&self, client_id: &str, claimed_id: &str) -> bool {
        match self {
            AccessClass::Client => client_id == claimed_id,
            AccessClass::Impostor => client_id != claimed_id,
        }
    }
}

/// Kind of list inside a `dev`/`eval` group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    /// `for_models`: enrollment rows.
    #[serde(rename = "for_models")]
    Models,
    /// `for_probes`: dense probe rows.
    #[serde(rename = "for_probes")]
    Probes,
    /// `for_scores`: sparse model/probe pairs.
    #[serde(rename = "for_scores")]
    Scores,
    /// `for_tnorm`: T-norm enrollment rows.
    #[serde(rename = "for_tnorm")]
    TNorm,
    /// `for_znorm`: Z-norm probe rows.
    #[serde(rename = "for_znorm")]
    ZNorm,
}

impl ListKind {
    /// All list kinds.
    pub const ALL: [ListKind; 5] = [
        ListKind::Models,
        ListKind::Probes,
        ListKind::Scores,
        ListKind::TNorm,
        ListKind::ZNorm,
    ];

    /// Canonical list-kind name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ListKind::Models => "for_models",
            ListKind::Probes => "for_probes",
            ListKind::Scores => "for_scores",
            ListKind::TNorm => "for_tnorm",
            ListKind::ZNorm => "for_znorm",
        }
    }

    /// Column arity requested when reading this kind of list in `group`.
    ///
    /// Training groups are always read as `sample client`.
    pub fn arity_in(&self, group: Group) -> usize {
        if group.is_world_family() {
            return 2;
        }
        match self {
            ListKind::Models | ListKind::TNorm => 3,
            ListKind::Scores => 4,
            ListKind::Probes | ListKind::ZNorm => 2,
        }
    }

    /// True for kinds that define enrolled models.
    pub fn defines_models(&self) -> bool {
        matches!(self, ListKind::Models | ListKind::TNorm)
    }
}

/// Closed enumeration that can appear in a query selector.
pub trait SelectorValue: Copy + Eq + fmt::Debug + 'static {
    /// Human-readable selector name used in error messages.
    const SELECTOR: &'static str;

    /// Canonical name of this value.
    fn name(&self) -> &'static str;
}

impl SelectorValue for Group {
    const SELECTOR: &'static str = "group";

    fn name(&self) -> &'static str {
        self.as_str()
    }
}

impl SelectorValue for Purpose {
    const SELECTOR: &'static str = "purpose";

    fn name(&self) -> &'static str {
        self.as_str()
    }
}

impl SelectorValue for AccessClass {
    const SELECTOR: &'static str = "class";

    fn name(&self) -> &'static str {
        self.as_str()
    }
}

/// Validate `requested` against `valid`, substituting `defaults` when nothing was requested.
///
/// Duplicates are dropped; the first occurrence keeps its position.
pub fn resolve_selection<T: SelectorValue>(
    requested: Option<&[T]>,
    valid: &[T],
    defaults: &[T],
) -> Result<Vec<T>, FileListError> {
    let requested = match requested {
        Some(values) if !values.is_empty() => values,
        _ => defaults,
    };
    let mut resolved = Vec::with_capacity(requested.len());
    for value in requested {
        if !valid.contains(value) {
            return Err(invalid_selector(value.name(), valid));
        }
        if !resolved.contains(value) {
            resolved.push(*value);
        }
    }
    Ok(resolved)
}

fn invalid_selector<T: SelectorValue>(value: &str, valid: &[T]) -> FileListError {
    FileListError::InvalidSelector {
        selector: T::SELECTOR,
        value: value.to_string(),
        valid: valid
            .iter()
            .map(|value| format!("'{}'", value.name()))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn parse_from<T: SelectorValue>(value: &str, domain: &[T]) -> Result<T, FileListError> {
    domain
        .iter()
        .copied()
        .find(|candidate| candidate.name() == value)
        .ok_or_else(|| invalid_selector(value, domain))
}

impl FromStr for Group {
    type Err = FileListError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_from(value, &crate::constants::groups::ALL_GROUPS)
    }
}

impl FromStr for Purpose {
    type Err = FileListError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_from(value, &Purpose::ALL)
    }
}

impl FromStr for AccessClass {
    type Err = FileListError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_from(value, &AccessClass::ALL)
    }
}

impl FromStr for ListKind {
    type Err = FileListError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ListKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| FileListError::InvalidKind(value.to_string()))
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
