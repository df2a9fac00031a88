//! Detection of dense vs. sparse probing for a protocol tree.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::FileListError;
use crate::selectors::{Group, ListKind};
use crate::transport::fs::{ProtocolTree, is_group_dir, is_list_file};

/// How probe samples are paired with enrolled models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMode {
    /// Every probe of `for_probes` is scored against every model.
    Dense,
    /// `for_scores` pairs each probe with one model and a claimed identity.
    Sparse,
}

impl ProbeMode {
    /// True when probes are scored against every model.
    pub fn is_dense(&self) -> bool {
        matches!(self, ProbeMode::Dense)
    }

    /// List kind holding the probe rows in this mode.
    pub fn probe_list_kind(&self) -> ListKind {
        match self {
            ProbeMode::Dense => ListKind::Probes,
            ProbeMode::Sparse => ListKind::Scores,
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProbeMode::Dense => "dense",
            ProbeMode::Sparse => "sparse",
        })
    }
}

/// Decides the probing mode once, when a database is opened.
///
/// First applicable rule wins:
/// 1. only an explicit probe list name was configured: dense;
/// 2. only an explicit score list name was configured: sparse;
/// 3. an explicit mode was configured: that mode;
/// 4. the base directory is a protocol (`dev` directory or world list present):
///    inspect its `dev` lists;
/// 5. otherwise inspect the `dev` lists of every protocol subdirectory, which
///    must all agree.
pub struct ProbeModeResolver<'a> {
    config: &'a DatabaseConfig,
    tree: &'a ProtocolTree,
}

impl<'a> ProbeModeResolver<'a> {
    /// Resolver over `config` and the opened base directory `tree`.
    pub fn new(config: &'a DatabaseConfig, tree: &'a ProtocolTree) -> Self {
        Self { config, tree }
    }

    /// Resolve the probing mode according to the rules above.
    pub fn resolve(&self) -> Result<ProbeMode, FileListError> {
        let (mode, reason) = match (
            self.config.probes_filename.is_some(),
            self.config.scores_filename.is_some(),
        ) {
            (true, false) => (ProbeMode::Dense, "explicit probe list"),
            (false, true) => (ProbeMode::Sparse, "explicit score list"),
            _ => match self.config.probe_mode {
                Some(mode) => (mode, "explicit mode"),
                None if self.is_protocol_root() => (self.detect(None)?, "dev lists"),
                None => (self.detect_across_protocols()?, "protocol subdirectories"),
            },
        };
        info!(
            base_dir = %self.tree.root().display(),
            mode = %mode,
            reason,
            "resolved probe mode"
        );
        Ok(mode)
    }

    fn is_protocol_root(&self) -> bool {
        is_group_dir(&self.config.group_dir(None, Group::Dev))
            || is_list_file(&self.config.list_file(None, Group::World, ListKind::Models))
    }

    /// Mode implied by which of the `dev` probe/score lists exists in `protocol`.
    fn detect(&self, protocol: Option<&str>) -> Result<ProbeMode, FileListError> {
        let probes = is_list_file(&self.config.list_file(protocol, Group::Dev, ListKind::Probes));
        let scores = is_list_file(&self.config.list_file(protocol, Group::Dev, ListKind::Scores));
        match (probes, scores) {
            (true, false) => Ok(ProbeMode::Dense),
            (false, true) => Ok(ProbeMode::Sparse),
            (true, true) => Err(FileListError::AmbiguousProbeMode(format!(
                "both '{}' and '{}' exist{}; please specify",
                self.config.probes_list_name(),
                self.config.scores_list_name(),
                protocol_suffix(protocol)
            ))),
            (false, false) => Err(FileListError::AmbiguousProbeMode(format!(
                "neither '{}' nor '{}' exists{}; please specify",
                self.config.probes_list_name(),
                self.config.scores_list_name(),
                protocol_suffix(protocol)
            ))),
        }
    }

    fn detect_across_protocols(&self) -> Result<ProbeMode, FileListError> {
        let protocols = self.tree.protocol_dirs();
        let mut resolved: Option<ProbeMode> = None;
        for protocol in &protocols {
            let mode = self.detect(Some(protocol.as_str()))?;
            match resolved {
                None => resolved = Some(mode),
                Some(previous) if previous != mode => {
                    return Err(FileListError::AmbiguousProbeMode(format!(
                        "protocols disagree ('{protocol}' uses {mode} probing, earlier protocols use {previous}); please specify"
                    )));
                }
                Some(_) => {}
            }
        }
        resolved.ok_or_else(|| {
            FileListError::AmbiguousProbeMode(
                "no protocol directories found; please specify".to_string(),
            )
        })
    }
}

fn protocol_suffix(protocol: Option<&str>) -> String {
    protocol
        .map(|name| format!(" in protocol '{name}'"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "s001 c01\n").unwrap();
    }

    fn resolve(config: &DatabaseConfig) -> Result<ProbeMode, FileListError> {
        let tree = ProtocolTree::open(&config.base_dir)?;
        ProbeModeResolver::new(config, &tree).resolve()
    }

    #[test]
    fn explicit_list_names_decide_before_anything_else() {
        let temp = tempdir().unwrap();
        let dense = DatabaseConfig::new(temp.path())
            .with_probes_filename("p.lst")
            .with_probe_mode(ProbeMode::Sparse);
        assert_eq!(resolve(&dense).unwrap(), ProbeMode::Dense);

        let sparse = DatabaseConfig::new(temp.path()).with_scores_filename("s.lst");
        assert_eq!(resolve(&sparse).unwrap(), ProbeMode::Sparse);
    }

    #[test]
    fn explicit_mode_applies_when_both_or_neither_list_is_named() {
        let temp = tempdir().unwrap();
        let config = DatabaseConfig::new(temp.path()).with_probe_mode(ProbeMode::Sparse);
        assert_eq!(resolve(&config).unwrap(), ProbeMode::Sparse);

        let both = DatabaseConfig::new(temp.path())
            .with_probes_filename("p.lst")
            .with_scores_filename("s.lst")
            .with_probe_mode(ProbeMode::Dense);
        assert_eq!(resolve(&both).unwrap(), ProbeMode::Dense);
    }

    #[test]
    fn detects_mode_from_dev_lists_of_a_single_protocol() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("dev/for_probes.lst"));
        let config = DatabaseConfig::new(temp.path());
        assert_eq!(resolve(&config).unwrap(), ProbeMode::Dense);

        touch(&temp.path().join("dev/for_scores.lst"));
        assert!(matches!(
            resolve(&config),
            Err(FileListError::AmbiguousProbeMode(_))
        ));

        fs::remove_file(temp.path().join("dev/for_probes.lst")).unwrap();
        assert_eq!(resolve(&config).unwrap(), ProbeMode::Sparse);
    }

    #[test]
    fn protocol_root_without_probe_lists_is_ambiguous() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("norm/train_world.lst"));
        let err = resolve(&DatabaseConfig::new(temp.path())).unwrap_err();
        assert!(matches!(err, FileListError::AmbiguousProbeMode(_)));
    }

    #[test]
    fn protocol_subdirectories_must_agree() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("p1/dev/for_scores.lst"));
        touch(&temp.path().join("p2/dev/for_scores.lst"));
        let config = DatabaseConfig::new(temp.path());
        assert_eq!(resolve(&config).unwrap(), ProbeMode::Sparse);

        touch(&temp.path().join("p3/dev/for_probes.lst"));
        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, FileListError::AmbiguousProbeMode(_)));
    }

    #[test]
    fn ambiguous_protocol_subdirectory_fails_resolution() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("p1/dev/for_scores.lst"));
        fs::create_dir_all(temp.path().join("p2/dev")).unwrap();
        let err = resolve(&DatabaseConfig::new(temp.path())).unwrap_err();
        match err {
            FileListError::AmbiguousProbeMode(details) => assert!(details.contains("p2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_base_directory_is_ambiguous() {
        let temp = tempdir().unwrap();
        let err = resolve(&DatabaseConfig::new(temp.path())).unwrap_err();
        assert!(matches!(err, FileListError::AmbiguousProbeMode(_)));
    }
}
