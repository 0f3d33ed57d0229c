//! Small per-field EPP operations: the fixed molar-concentration rewrite,
//! analyte-to-sample field copying and the step-configured recursive
//! fetch. Each returns a one-line human-readable abstract for the GUI.

use std::io::Write;
use std::path::Path;

use log::{info, warn};
use regex::Regex;

use crate::errors::{Error, Result};
use crate::model::{ArtifactKind, Snapshot, UdfValue};
use crate::traceback;
use crate::units::ng_ul_to_nm;

/// Persist the snapshot if a backing path is known.
fn persist(snapshot: &Snapshot, path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => snapshot.save(p),
        None => Ok(()),
    }
}

/// Convert `Concentration` from ng/ul to nM on every qualifying artifact.
///
/// Qualifying means: `Concentration` and `Size (bp)` defined and nonzero,
/// and `Conc. Units` equal to `ng/ul`. Artifacts failing any check are
/// skipped with a warning and counted; nothing about them is modified.
///
/// With `aggregate`, the step's analyte inputs are rewritten instead of
/// its measurement outputs.
pub fn molar_concentration(
    snapshot: &mut Snapshot,
    snapshot_path: Option<&Path>,
    aggregate: bool,
) -> Result<String> {
    let step = snapshot.step.clone();
    let artifact_ids: Vec<String> = if aggregate {
        snapshot
            .analyte_inputs(&step)?
            .iter()
            .map(|a| a.id.clone())
            .collect()
    } else {
        // Measurement steps record their values on result-file outputs.
        let mut ids = Vec::new();
        for io in &step.io_pairs {
            if let Some(id) = io.output.as_deref() {
                let art = snapshot.artifact(id)?;
                if art.kind == ArtifactKind::ResultFile && !ids.contains(&art.id) {
                    ids.push(art.id.clone());
                }
            }
        }
        ids.sort();
        ids
    };

    let mut updated = 0usize;
    let mut skipped = 0usize;

    for id in artifact_ids {
        let art = snapshot.artifact(&id)?;
        let name = art.name.clone();

        let defined_nonzero = |udf: &str| {
            art.udf
                .get(udf)
                .and_then(UdfValue::as_f64)
                .filter(|v| *v != 0.0)
        };
        let Some(conc) = defined_nonzero("Concentration") else {
            warn!("Found artifact '{name}' with Concentration undefined/blank, skipping");
            skipped += 1;
            continue;
        };
        let Some(size) = defined_nonzero("Size (bp)") else {
            warn!("Found artifact '{name}' with Size (bp) undefined/blank, skipping");
            skipped += 1;
            continue;
        };
        match art.udf.get("Conc. Units").and_then(|v| v.as_str()) {
            Some("ng/ul") => {}
            Some(_) => {
                warn!("Filtered out artifact '{name}' due to wrong Conc. Units");
                skipped += 1;
                continue;
            }
            None => {
                warn!("Filtered out artifact '{name}' due to undefined/blank Conc. Units");
                skipped += 1;
                continue;
            }
        }

        info!("Updating: Artifact id: {id}, Concentration: {conc}, Size: {size}");
        let nm_val = ng_ul_to_nm(conc, size);
        let art = snapshot.artifact_mut(&id)?;
        art.udf.set("Concentration", UdfValue::Float(nm_val));
        art.udf.set("Conc. Units", UdfValue::Str("nM".to_string()));
        persist(snapshot, snapshot_path)?;
        info!("Updated Concentration to {nm_val}.");
        updated += 1;
    }

    Ok(format!(
        "Updated {updated} artifact(s), skipped {skipped} artifact(s) with wrong and/or blank values for some udfs."
    ))
}

/// Copy UDFs from the step's analytes to their submitted samples.
///
/// Only facility samples (names like `P123_456`) are touched; controls
/// pass through silently. Each change appends a line to the changelog so
/// who/what/when survives outside the LIMS.
pub fn copy_field(
    snapshot: &mut Snapshot,
    snapshot_path: Option<&Path>,
    source_udfs: &[String],
    dest_udfs: &[String],
    changelog: Option<&Path>,
) -> Result<String> {
    let dest_udfs: Vec<String> = if dest_udfs.is_empty() {
        source_udfs.to_vec()
    } else if dest_udfs.len() == source_udfs.len() {
        dest_udfs.to_vec()
    } else {
        return Err(Error::Invalid(
            "source_udf and dest_udf lists of arguments are uneven".to_string(),
        ));
    };

    let sample_pat = Regex::new(r"P[0-9]+_[0-9]+").expect("static pattern");
    let step = snapshot.step.clone();
    let artifact_ids: Vec<String> = {
        let mut arts = snapshot.analyte_outputs(&step)?;
        if arts.is_empty() {
            arts = snapshot.analyte_inputs(&step)?;
        }
        arts.iter().map(|a| a.id.clone()).collect()
    };

    let mut changelog_file = match changelog {
        Some(p) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .map_err(|e| Error::io(p.display(), e))?,
        ),
        None => None,
    };

    let mut copied = 0usize;
    let mut no_source = 0usize;

    for (source_udf, dest_udf) in source_udfs.iter().zip(dest_udfs.iter()) {
        for id in &artifact_ids {
            let art = snapshot.artifact(id)?;
            let Some(value) = art.udf.get(source_udf).cloned() else {
                warn!(
                    "Found artifact '{}' with {source_udf} undefined/blank, skipping",
                    art.name
                );
                no_source += 1;
                continue;
            };
            let Some(sample_id) = art.samples.first().cloned() else {
                continue;
            };
            let sample = snapshot.sample(&sample_id)?;
            if !sample_pat.is_match(&sample.name) {
                continue;
            }
            let sample_name = sample.name.clone();
            let old = sample.udf.get(dest_udf).cloned();

            let sample = snapshot
                .samples
                .get_mut(&sample_id)
                .expect("sample id came from the map");
            sample.udf.set(dest_udf, value.clone());
            persist(snapshot, snapshot_path)?;
            copied += 1;

            let entry = match old {
                Some(old) => format!(
                    "{}: sample '{sample_name}': '{dest_udf}' changed from '{old}' to '{value}'",
                    step.technician
                ),
                None => format!(
                    "{}: sample '{sample_name}': '{dest_udf}' set to '{value}'",
                    step.technician
                ),
            };
            info!("{entry}");
            if let Some(f) = changelog_file.as_mut() {
                writeln!(f, "{entry}").map_err(|e| Error::Invalid(e.to_string()))?;
            }
        }
    }

    Ok(format!(
        "Updated {copied} udf(s), skipped {no_source} artifact(s) with incorrect udf info."
    ))
}

/// Fetch the last known value of an artifact UDF named by a step field,
/// and record it on each of the step's artifacts.
///
/// The UDF to look for is itself configured as a step UDF, so the same
/// script serves any protocol. The value search excludes the current
/// artifact: the point is to pull forward the most recent historic value.
pub fn fetch_last_known_field(
    snapshot: &mut Snapshot,
    snapshot_path: Option<&Path>,
    step_udf: &str,
) -> Result<String> {
    let target_udf = snapshot
        .step
        .udf
        .get(step_udf)
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty() && *v != "None")
        .ok_or_else(|| {
            Error::Invalid(format!("no target UDF supplied from step field '{step_udf}'"))
        })?
        .to_string();

    let step = snapshot.step.clone();
    let no_outputs = snapshot.no_outputs(&step)?;
    if no_outputs {
        info!("Step has no output artifacts. Assigning to input artifact.");
    }

    // Input id -> artifact to write to (the input itself for QC steps).
    let mut targets: Vec<String> = Vec::new();
    if no_outputs {
        targets = snapshot
            .analyte_inputs(&step)?
            .iter()
            .map(|a| a.id.clone())
            .collect();
    } else {
        for pair in snapshot.analyte_io_pairs(&step)? {
            if let Some(out) = pair.output {
                targets.push(out.id.clone());
            }
        }
    }

    let mut found_count = 0usize;
    let mut missed = 0usize;

    for id in targets {
        let art = snapshot.artifact(&id)?;
        info!(
            "Looking for last recorded UDF '{target_udf}' of artifact '{}'...",
            art.name
        );
        match traceback::fetch_last(snapshot, art, &[target_udf.as_str()], false) {
            Ok(found) => {
                info!(
                    "Found target UDF '{target_udf}' with value '{}'",
                    found.value
                );
                let value = found.value.clone();
                let art = snapshot.artifact_mut(&id)?;
                let name = art.name.clone();
                art.udf.set(&target_udf, value.clone());
                persist(snapshot, snapshot_path)?;
                info!("Updated UDF '{target_udf}' for '{name}' to '{value}'");
                found_count += 1;
            }
            Err(e) => {
                warn!(
                    "Could not traceback UDF '{target_udf}' for artifact '{}': {e}",
                    art.name
                );
                missed += 1;
            }
        }
    }

    Ok(format!(
        "Updated '{target_udf}' on {found_count} artifact(s), {missed} could not be traced back."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::snapshot_with_pair;
    use crate::model::{Artifact, ArtifactKind, IoPair, UdfStore};

    #[test]
    fn molar_concentration_converts_and_relabels() {
        let mut snap = snapshot_with_pair();
        // Add a measurement output for the pair.
        snap.artifacts.insert(
            "rf1".to_string(),
            Artifact {
                id: "rf1".to_string(),
                name: "measurement".to_string(),
                kind: ArtifactKind::ResultFile,
                udf: UdfStore::default(),
                samples: vec![],
                reagent_labels: vec![],
                location: None,
                parent_step: None,
            },
        );
        snap.step.io_pairs.push(IoPair {
            input: Some("in1".to_string()),
            output: Some("rf1".to_string()),
        });
        let rf = snap.artifacts.get_mut("rf1").unwrap();
        rf.udf.set("Concentration", UdfValue::Float(10.0));
        rf.udf.set("Size (bp)", UdfValue::Int(300));
        rf.udf.set("Conc. Units", UdfValue::Str("ng/ul".to_string()));

        let abstract_line = molar_concentration(&mut snap, None, false).unwrap();
        assert!(abstract_line.starts_with("Updated 1 artifact(s)"));
        let rf = snap.artifact("rf1").unwrap();
        assert_eq!(
            rf.udf.get("Conc. Units"),
            Some(&UdfValue::Str("nM".to_string()))
        );
        let conc = rf.udf.get("Concentration").unwrap().as_f64().unwrap();
        assert!((conc - 50.50505050505051).abs() < 1e-9);
    }

    #[test]
    fn molar_concentration_skips_wrong_units() {
        let mut snap = snapshot_with_pair();
        snap.artifacts.insert(
            "rf1".to_string(),
            Artifact {
                id: "rf1".to_string(),
                name: "measurement".to_string(),
                kind: ArtifactKind::ResultFile,
                udf: UdfStore::default(),
                samples: vec![],
                reagent_labels: vec![],
                location: None,
                parent_step: None,
            },
        );
        snap.step.io_pairs.push(IoPair {
            input: Some("in1".to_string()),
            output: Some("rf1".to_string()),
        });
        let rf = snap.artifacts.get_mut("rf1").unwrap();
        rf.udf.set("Concentration", UdfValue::Float(10.0));
        rf.udf.set("Size (bp)", UdfValue::Int(300));
        rf.udf.set("Conc. Units", UdfValue::Str("nM".to_string()));

        let abstract_line = molar_concentration(&mut snap, None, false).unwrap();
        assert!(abstract_line.contains("skipped 1"));
        // Unchanged.
        assert_eq!(
            snap.artifact("rf1").unwrap().udf.get("Concentration"),
            Some(&UdfValue::Float(10.0))
        );
    }

    #[test]
    fn copy_field_reaches_the_submitted_sample() {
        let mut snap = snapshot_with_pair();
        snap.artifacts
            .get_mut("out1")
            .unwrap()
            .udf
            .set("Size (bp)", UdfValue::Int(420));
        let summary = copy_field(
            &mut snap,
            None,
            &["Size (bp)".to_string()],
            &[],
            None,
        )
        .unwrap();
        assert!(summary.starts_with("Updated 1"));
        assert_eq!(
            snap.sample("smp1").unwrap().udf.get("Size (bp)"),
            Some(&UdfValue::Int(420))
        );
    }

    #[test]
    fn fetch_last_known_field_pulls_history_forward() {
        let mut snap = snapshot_with_pair();
        // History: in1 carries the value; out1 is the current artifact.
        snap.artifacts
            .get_mut("in1")
            .unwrap()
            .udf
            .set("Size (bp)", UdfValue::Int(350));
        snap.step
            .udf
            .set("Fetch UDF", UdfValue::Str("Size (bp)".to_string()));

        let summary = fetch_last_known_field(&mut snap, None, "Fetch UDF").unwrap();
        assert!(summary.contains("1 artifact(s)"));
        assert_eq!(
            snap.artifact("out1").unwrap().udf.get("Size (bp)"),
            Some(&UdfValue::Int(350))
        );
    }

    #[test]
    fn fetch_last_requires_a_configured_field() {
        let mut snap = snapshot_with_pair();
        assert!(fetch_last_known_field(&mut snap, None, "Fetch UDF").is_err());
        snap.step
            .udf
            .set("Fetch UDF", UdfValue::Str("None".to_string()));
        assert!(fetch_last_known_field(&mut snap, None, "Fetch UDF").is_err());
    }
}
