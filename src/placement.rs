//! Index placement checks for library-prep plates.
//!
//! Two habits cause demultiplexing surprises downstream: leaving empty
//! wells between samples, and placing indexes out of column order. Both
//! are only worth a warning; the messages are appended to the step's
//! Comments UDF so they survive in the GUI.

use log::info;

use crate::errors::Result;
use crate::model::{Snapshot, UdfValue};

const PLATE_ROWS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

/// Normalize a `row:col` well to a sortable `<col two digits><row>` key,
/// so wells order by column first (the order indexes are placed in).
fn well_key(well: &str) -> String {
    let (row, col) = well.split_once(':').unwrap_or((well, ""));
    format!("{col:0>2}{row}")
}

/// Inspect every output container and report placement oddities.
pub fn verify_index_placement(snapshot: &Snapshot) -> Result<Vec<String>> {
    let mut messages = Vec::new();

    for container in snapshot.output_containers(&snapshot.step)? {
        let mut layout: Vec<(String, String)> = Vec::new();
        for (well, art) in snapshot.placements(&snapshot.step, &container.id)? {
            let label = art
                .reagent_labels
                .first()
                .cloned()
                .unwrap_or_default();
            layout.push((well_key(well), label));
        }
        layout.sort();
        if layout.is_empty() {
            continue;
        }
        let last_well = &layout.last().expect("non-empty layout").0;

        // Empty wells in between samples: walk the full plate up to the
        // highest used column and flag gaps before the last used well.
        let max_col: usize = layout
            .iter()
            .filter_map(|(k, _)| k[..2].parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        let mut empty_wells = Vec::new();
        'plate: for col in 1..=max_col {
            for row in PLATE_ROWS {
                let key = format!("{col:02}{row}");
                if &key == last_well {
                    break 'plate;
                }
                if !layout.iter().any(|(k, _)| k == &key) {
                    empty_wells.push(key);
                }
            }
        }
        if !empty_wells.is_empty() {
            messages.push(format!(
                "WARNING! Plate {}: Empty wells in between of samples detected!",
                container.name
            ));
        }

        // Column-order check: index order must follow well order.
        let placed: Vec<&String> = layout.iter().map(|(_, l)| l).collect();
        let mut sorted = placed.clone();
        sorted.sort();
        if placed != sorted {
            messages.push(format!(
                "WARNING! Plate {}: The orders of indexes and wells do NOT match!",
                container.name
            ));
        }
    }
    Ok(messages)
}

/// Append checker warnings to the step Comments UDF, once.
pub fn post_to_comments(snapshot: &mut Snapshot, messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    const HEADER: &str = "**Warnings from Indexes Placement checker EPP: **";
    let block = format!("{HEADER}\n{}", messages.join("\n"));
    let comments = snapshot
        .step
        .udf
        .get("Comments")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if comments.contains(HEADER) {
        info!("Placement warnings already posted to Comments, leaving as-is.");
        return;
    }
    let new = if comments.is_empty() {
        block
    } else {
        format!("{comments}\n\n{block}")
    };
    snapshot.step.udf.set("Comments", UdfValue::Str(new));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Artifact, ArtifactKind, Container, IoPair, Snapshot, Step, UdfStore,
    };
    use std::collections::BTreeMap;

    fn plate_snapshot(placements: &[(&str, &str)]) -> Snapshot {
        let mut artifacts = BTreeMap::new();
        let mut io_pairs = Vec::new();
        for (i, (well, label)) in placements.iter().enumerate() {
            let id = format!("art{i}");
            artifacts.insert(
                id.clone(),
                Artifact {
                    id: id.clone(),
                    name: format!("sample {i}"),
                    kind: ArtifactKind::Analyte,
                    udf: UdfStore::default(),
                    samples: vec![],
                    reagent_labels: vec![label.to_string()],
                    location: Some(("plate1".to_string(), well.to_string())),
                    parent_step: None,
                },
            );
            io_pairs.push(IoPair {
                input: None,
                output: Some(id),
            });
        }
        let mut containers = BTreeMap::new();
        containers.insert(
            "plate1".to_string(),
            Container {
                id: "plate1".to_string(),
                name: "Plate X".to_string(),
            },
        );
        Snapshot {
            step: Step {
                id: "24-400".to_string(),
                type_name: "Library Prep".to_string(),
                technician: String::new(),
                udf: UdfStore::default(),
                io_pairs,
            },
            steps: BTreeMap::new(),
            artifacts,
            samples: BTreeMap::new(),
            projects: BTreeMap::new(),
            containers,
        }
    }

    #[test]
    fn dense_column_ordered_plate_is_clean() {
        let snap = plate_snapshot(&[
            ("A:1", "IDX01"),
            ("B:1", "IDX02"),
            ("C:1", "IDX03"),
        ]);
        assert!(verify_index_placement(&snap).unwrap().is_empty());
    }

    #[test]
    fn gaps_before_the_last_well_warn() {
        let snap = plate_snapshot(&[("A:1", "IDX01"), ("C:1", "IDX02")]);
        let messages = verify_index_placement(&snap).unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Empty wells"));
    }

    #[test]
    fn out_of_order_indexes_warn() {
        let snap = plate_snapshot(&[("A:1", "IDX02"), ("B:1", "IDX01")]);
        let messages = verify_index_placement(&snap).unwrap();
        assert!(messages.iter().any(|m| m.contains("do NOT match")));
    }

    #[test]
    fn warnings_post_to_comments_once() {
        let mut snap = plate_snapshot(&[("A:1", "IDX02"), ("B:1", "IDX01")]);
        let messages = verify_index_placement(&snap).unwrap();
        post_to_comments(&mut snap, &messages);
        let first = snap.step.udf.get("Comments").unwrap().to_string();
        post_to_comments(&mut snap, &messages);
        assert_eq!(snap.step.udf.get("Comments").unwrap().to_string(), first);
    }
}
