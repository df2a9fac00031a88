#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Which probe lists the generated `dev`/`eval` directories contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeLists {
    Both,
    SparseOnly,
    DenseOnly,
}

pub fn write_list(root: &Path, rel: &str, rows: &[String]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut content = rows.join("\n");
    content.push('\n');
    fs::write(path, content).unwrap();
}

fn two_column(clients: &[u32], session: u32, samples: u32) -> Vec<String> {
    clients
        .iter()
        .flat_map(|client| {
            (1..=samples)
                .map(move |idx| format!("data/model{client}_session{session}_sample{idx} {client}"))
        })
        .collect()
}

fn three_column(models: &[u32], session: u32) -> Vec<String> {
    models
        .iter()
        .flat_map(|model| {
            (1..=4).map(move |idx| {
                format!("data/model{model}_session{session}_sample{idx} {model} {model}")
            })
        })
        .collect()
}

/// Sparse score rows: two genuine and two impostor probes per model.
fn score_rows(models: [u32; 2]) -> Vec<String> {
    let mut rows = Vec::new();
    for model in models {
        for idx in 1..=2 {
            rows.push(format!(
                "data/model{model}_session2_sample{idx} {model} {model} {model}"
            ));
        }
    }
    for (model, other) in [(models[0], models[1]), (models[1], models[0])] {
        for idx in 1..=2 {
            rows.push(format!(
                "data/model{other}_session3_sample{idx} {model} {model} {other}"
            ));
        }
    }
    rows
}

/// Dense probe rows covering the same samples as `score_rows`.
fn probe_rows(models: [u32; 2]) -> Vec<String> {
    let mut rows = Vec::new();
    for model in models {
        for session in [2, 3] {
            for idx in 1..=2 {
                rows.push(format!(
                    "data/model{model}_session{session}_sample{idx} {model}"
                ));
            }
        }
    }
    rows
}

fn write_evaluation_group(root: &Path, subdir: &str, models: [u32; 2], probes: ProbeLists) {
    write_list(root, &format!("{subdir}/for_models.lst"), &three_column(&models, 1));
    if probes != ProbeLists::DenseOnly {
        write_list(root, &format!("{subdir}/for_scores.lst"), &score_rows(models));
    }
    if probes != ProbeLists::SparseOnly {
        write_list(root, &format!("{subdir}/for_probes.lst"), &probe_rows(models));
    }
    write_list(root, &format!("{subdir}/for_tnorm.lst"), &three_column(&[7, 8], 4));
    write_list(root, &format!("{subdir}/for_znorm.lst"), &two_column(&[9, 10], 5, 4));
}

/// Example protocol:
///
/// - `world`: clients 1 and 2, four samples each; optional worlds likewise
/// - `dev`: models 3 and 4; `eval`: models 5 and 6 (four enrollment samples each)
/// - sparse scores: 8 rows per group, 4 genuine and 4 impostor
/// - T-norm models 7 and 8, Z-norm clients 9 and 10 in both groups
pub fn write_example_protocol(root: &Path, probes: ProbeLists) {
    write_list(root, "norm/train_world.lst", &two_column(&[1, 2], 1, 4));
    write_list(
        root,
        "norm/train_optional_world_1.lst",
        &two_column(&[1, 2], 2, 2),
    );
    write_list(
        root,
        "norm/train_optional_world_2.lst",
        &two_column(&[1, 2], 3, 2),
    );
    write_evaluation_group(root, "dev", [3, 4], probes);
    write_evaluation_group(root, "eval", [5, 6], probes);
}
