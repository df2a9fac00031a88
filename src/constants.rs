use crate::selectors::Group;

/// Default directory and file names of a protocol tree.
pub mod layout {
    /// Subdirectory holding the development lists.
    pub const DEFAULT_DEV_SUBDIR: &str = "dev";
    /// Subdirectory holding the evaluation lists.
    pub const DEFAULT_EVAL_SUBDIR: &str = "eval";
    /// Training list (`sample client`).
    pub const DEFAULT_WORLD_FILENAME: &str = "norm/train_world.lst";
    /// First optional training list (`sample client`).
    pub const DEFAULT_OPTIONAL_WORLD_1_FILENAME: &str = "norm/train_optional_world_1.lst";
    /// Second optional training list (`sample client`).
    pub const DEFAULT_OPTIONAL_WORLD_2_FILENAME: &str = "norm/train_optional_world_2.lst";
    /// Enrollment list (`sample model [client]`).
    pub const DEFAULT_MODELS_FILENAME: &str = "for_models.lst";
    /// Dense probe list (`sample client`).
    pub const DEFAULT_PROBES_FILENAME: &str = "for_probes.lst";
    /// Sparse score list (`sample model claimed [client]`).
    pub const DEFAULT_SCORES_FILENAME: &str = "for_scores.lst";
    /// T-norm enrollment list (`sample model [client]`).
    pub const DEFAULT_TNORM_FILENAME: &str = "for_tnorm.lst";
    /// Z-norm probe list (`sample client`).
    pub const DEFAULT_ZNORM_FILENAME: &str = "for_znorm.lst";
}

/// Defaults handed to annotation collaborators.
pub mod annotations {
    /// Extension appended to a sample id to locate its annotation file.
    pub const DEFAULT_ANNOTATION_EXTENSION: &str = ".pos";
    /// Opaque annotation format selector.
    pub const DEFAULT_ANNOTATION_TYPE: &str = "eyecenter";
}

/// Constants used by the list tokenizer.
pub mod parser {
    /// Word-like token pattern: letters, digits, `_`, `/`, `-`, `.`.
    pub const TOKEN_PATTERN: &str = r"[\w/.\-]+";
    /// Smallest accepted number of tokens per row.
    pub const MIN_COLUMNS: usize = 2;
    /// Largest accepted number of tokens per row.
    pub const MAX_COLUMNS: usize = 4;
}

/// Group sets used when a query leaves its group selector open.
pub mod groups {
    use super::Group;

    /// Every group a protocol may define.
    pub const ALL_GROUPS: [Group; 5] = [
        Group::Dev,
        Group::Eval,
        Group::World,
        Group::OptionalWorld1,
        Group::OptionalWorld2,
    ];
    /// Groups queried when the caller does not narrow the selection.
    pub const DEFAULT_GROUPS: [Group; 3] = [Group::Dev, Group::Eval, Group::World];
    /// Groups that carry enrollment, probe, and normalization lists.
    pub const EVALUATION_GROUPS: [Group; 2] = [Group::Dev, Group::Eval];
    /// Training groups holding plain `sample client` lists.
    pub const WORLD_GROUPS: [Group; 3] =
        [Group::World, Group::OptionalWorld1, Group::OptionalWorld2];
}
