//! MinKNOW samplesheet generation for starting nanopore runs.
//!
//! Each output analyte of the step is one sequencing library loaded on one
//! flow cell. Pools expand into per-sample rows carrying the native
//! barcode alias; single-sample libraries get one unlabeled row. The
//! sheet-wide constraints (uniform kit and flow cell product code, unique
//! flow cell ids and positions, position rules per flow cell type, barcode
//! presence matching the kit selection) are all enforced before a single
//! byte is written.
//!
//! Per-library problems are collected and skipped so the log shows every
//! offender, then the run fails listing them.

use std::path::Path;

use log::{info, warn};

use crate::data::ont;
use crate::errors::{Error, Result};
use crate::indexes::sanitize_string;
use crate::model::{Artifact, Snapshot};

/// One samplesheet row. `alias`/`barcode` are only present for barcoded
/// pools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinknowRow {
    pub flow_cell_id: String,
    /// `"None"` when the flow cell type has no positions.
    pub position_id: String,
    pub sample_id: String,
    pub experiment_id: String,
    pub flow_cell_product_code: String,
    /// Human-readable type, used for validation only (not a CSV column).
    pub flow_cell_type: String,
    pub kit: String,
    pub alias: Option<String>,
    pub barcode: Option<String>,
}

/// A validated samplesheet.
#[derive(Clone, Debug)]
pub struct MinknowSheet {
    pub rows: Vec<MinknowRow>,
}

fn required_str<'a>(art: &'a Artifact, udf: &str) -> Result<&'a str> {
    art.udf
        .get(udf)
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::SheetConstraint(format!("'{}' is missing UDF '{udf}'", art.name)))
}

/// Sample name + barcode label pairs for one library, sorted by name.
/// Empty for single-sample (non-barcoded) libraries.
fn library_contents(snapshot: &Snapshot, library: &Artifact) -> Result<Vec<(String, String)>> {
    info!(
        "Compiling sample-level information for library '{}'...",
        library.name
    );
    if library.samples.len() <= 1 {
        if let Some(id) = library.samples.first() {
            info!(
                " - '{}': non-labeled sample",
                snapshot.sample(id)?.name
            );
        }
        return Ok(Vec::new());
    }

    let mut contents = Vec::with_capacity(library.samples.len());
    for sample_id in &library.samples {
        let sample = snapshot.sample(sample_id)?;
        let label = snapshot.sample_label(library, sample_id)?;
        info!(
            " - '{}': sample with barcode '{}'",
            sample.name, label
        );
        contents.push((sample.name.clone(), label.to_string()));
    }
    contents.sort();
    contents.dedup();
    Ok(contents)
}

impl MinknowSheet {
    /// Assemble and validate the sheet for the current step.
    pub fn build(snapshot: &Snapshot) -> Result<Self> {
        let step = &snapshot.step;
        let kit = step
            .udf
            .get("ONT prep kit")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::MissingStepField("ONT prep kit".to_string()))?
            .to_string();
        let flow_cell_field = step
            .udf
            .get("ONT flow cell type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::MissingStepField("ONT flow cell type".to_string()))?;
        let (product_code, flow_cell_type) = match flow_cell_field.split_once(' ') {
            Some((code, rest)) => (
                code.to_string(),
                rest.trim_matches(&['(', ')'][..]).to_string(),
            ),
            None => (flow_cell_field.to_string(), String::new()),
        };
        // Barcodes are implied by the kit pack size.
        let barcoded_kit = kit.ends_with("24") || kit.ends_with("96");

        let libraries = snapshot.analyte_outputs(step)?;
        let mut rows: Vec<MinknowRow> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        for library in &libraries {
            match Self::library_rows(
                snapshot,
                library,
                &kit,
                &product_code,
                &flow_cell_type,
                barcoded_kit,
            ) {
                Ok(mut library_rows) => rows.append(&mut library_rows),
                Err(e) => {
                    log::error!("{e}");
                    warn!("Skipping '{}' due to error.", library.name);
                    errors.push(library.name.clone());
                }
            }
        }
        if !errors.is_empty() {
            return Err(Error::SheetConstraint(format!(
                "errors occurred when parsing artifacts [{}]",
                errors.join(", ")
            )));
        }

        let sheet = MinknowSheet { rows };
        sheet.validate(libraries.len())?;
        Ok(sheet)
    }

    fn library_rows(
        snapshot: &Snapshot,
        library: &Artifact,
        kit: &str,
        product_code: &str,
        flow_cell_type: &str,
        barcoded_kit: bool,
    ) -> Result<Vec<MinknowRow>> {
        let contents = library_contents(snapshot, library)?;
        let has_barcodes = !contents.is_empty();
        info!(
            "'{}' parsed as containing {}ONT barcodes",
            library.name,
            if has_barcodes { "" } else { "no " }
        );

        let base = MinknowRow {
            flow_cell_id: required_str(library, "ONT flow cell ID")?.to_string(),
            position_id: required_str(library, "ONT flow cell position")?.to_string(),
            sample_id: sanitize_string(&library.name),
            experiment_id: snapshot.step.id.clone(),
            flow_cell_product_code: product_code.to_string(),
            flow_cell_type: flow_cell_type.to_string(),
            kit: kit.to_string(),
            alias: None,
            barcode: None,
        };

        if flow_cell_type.contains("PromethION") {
            if base.position_id == "None" {
                return Err(Error::SheetConstraint(
                    "positions must be specified for PromethION flow cells".to_string(),
                ));
            }
        } else if base.position_id != "None" {
            return Err(Error::SheetConstraint(
                "positions must be unassigned for non-PromethION flow cells".to_string(),
            ));
        }

        if barcoded_kit {
            if !has_barcodes {
                return Err(Error::SheetConstraint(format!(
                    "ONT barcodes are implied from kit selection, but no ONT barcodes were found within library {}",
                    library.name
                )));
            }
            let mut rows = Vec::with_capacity(contents.len());
            for (sample_name, label) in contents {
                let bc = ont::ont_barcode(&label).ok_or_else(|| {
                    Error::UnknownLabel(label.clone())
                })?;
                let mut row = base.clone();
                row.alias = Some(sanitize_string(&sample_name));
                row.barcode = Some(format!("barcode{:02}", bc.num));
                rows.push(row);
            }
            Ok(rows)
        } else {
            if has_barcodes {
                return Err(Error::SheetConstraint(format!(
                    "library '{}' appears to contain ONT barcodes, but no ONT barcodes are implied from the kit selection",
                    library.name
                )));
            }
            Ok(vec![base])
        }
    }

    /// Sheet-wide constraints, checked after row assembly.
    fn validate(&self, n_libraries: usize) -> Result<()> {
        if self.rows.is_empty() {
            return Err(Error::SheetConstraint("samplesheet has no rows".to_string()));
        }
        fn n_unique<'a>(iter: impl Iterator<Item = &'a str>) -> usize {
            let mut v: Vec<&str> = iter.collect();
            v.sort_unstable();
            v.dedup();
            v.len()
        }

        if n_libraries > 1 {
            if !self
                .rows
                .iter()
                .all(|r| r.flow_cell_type.contains("PromethION"))
            {
                return Err(Error::SheetConstraint(
                    "only PromethION flowcells can be grouped together in the same sample sheet"
                        .to_string(),
                ));
            }
            if n_libraries > 24 {
                return Err(Error::SheetConstraint(
                    "only up to 24 PromethION flowcells may be started at once".to_string(),
                ));
            }
        } else if self.rows[0].flow_cell_type.contains("MinION")
            && self.rows[0].position_id != "None"
        {
            return Err(Error::SheetConstraint(
                "MinION flow cells should not have a position assigned".to_string(),
            ));
        }

        if n_unique(self.rows.iter().map(|r| r.flow_cell_product_code.as_str())) != 1
            || n_unique(self.rows.iter().map(|r| r.kit.as_str())) != 1
        {
            return Err(Error::SheetConstraint(
                "all rows must have the same flow cell type and kits".to_string(),
            ));
        }
        if n_unique(self.rows.iter().map(|r| r.position_id.as_str())) != n_libraries
            || n_unique(self.rows.iter().map(|r| r.flow_cell_id.as_str())) != n_libraries
        {
            return Err(Error::SheetConstraint(
                "all rows must have different flow cell positions and IDs".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the sheet as CSV. The position column is omitted for
    /// position-less flow cells and the alias/barcode columns only appear
    /// for barcoded sheets.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let with_position = self.rows.first().map_or(false, |r| r.position_id != "None");
        let with_barcodes = self.rows.iter().all(|r| r.alias.is_some());

        let mut header = vec!["flow_cell_id"];
        if with_position {
            header.push("position_id");
        }
        header.extend(["sample_id", "experiment_id", "flow_cell_product_code", "kit"]);
        if with_barcodes {
            header.extend(["alias", "barcode"]);
        }

        let mut wtr = csv::Writer::from_path(path)
            .map_err(|e| Error::Invalid(format!("could not open samplesheet: {e}")))?;
        wtr.write_record(&header)
            .map_err(|e| Error::Invalid(format!("could not write samplesheet: {e}")))?;
        for r in &self.rows {
            let mut record = vec![r.flow_cell_id.as_str()];
            if with_position {
                record.push(r.position_id.as_str());
            }
            record.extend([
                r.sample_id.as_str(),
                r.experiment_id.as_str(),
                r.flow_cell_product_code.as_str(),
                r.kit.as_str(),
            ]);
            if with_barcodes {
                record.push(r.alias.as_deref().unwrap_or(""));
                record.push(r.barcode.as_deref().unwrap_or(""));
            }
            wtr.write_record(&record)
                .map_err(|e| Error::Invalid(format!("could not write samplesheet: {e}")))?;
        }
        wtr.flush().map_err(|e| Error::io(path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Artifact, ArtifactKind, IoPair, Sample, Snapshot, Step, UdfStore, UdfValue,
    };
    use std::collections::BTreeMap;

    fn library(id: &str, fc: &str, position: &str, samples: &[(&str, &str)]) -> Artifact {
        let mut udf = UdfStore::default();
        udf.set("ONT flow cell ID", UdfValue::Str(fc.to_string()));
        udf.set("ONT flow cell position", UdfValue::Str(position.to_string()));
        Artifact {
            id: id.to_string(),
            name: format!("Lib {id}"),
            kind: ArtifactKind::Analyte,
            udf,
            samples: samples.iter().map(|(s, _)| s.to_string()).collect(),
            reagent_labels: samples.iter().map(|(_, l)| l.to_string()).collect(),
            location: None,
            parent_step: None,
        }
    }

    fn ont_snapshot(kit: &str, flow_cell: &str, libraries: Vec<Artifact>) -> Snapshot {
        let mut samples = BTreeMap::new();
        for lib in &libraries {
            for sid in &lib.samples {
                samples.insert(
                    sid.clone(),
                    Sample {
                        id: sid.clone(),
                        name: format!("P1_{sid}"),
                        project: None,
                        udf: UdfStore::default(),
                    },
                );
            }
        }
        let io_pairs = libraries
            .iter()
            .map(|l| IoPair {
                input: None,
                output: Some(l.id.clone()),
            })
            .collect();
        let mut artifacts = BTreeMap::new();
        for lib in libraries {
            artifacts.insert(lib.id.clone(), lib);
        }
        let mut udf = UdfStore::default();
        udf.set("ONT prep kit", UdfValue::Str(kit.to_string()));
        udf.set("ONT flow cell type", UdfValue::Str(flow_cell.to_string()));
        Snapshot {
            step: Step {
                id: "24-300".to_string(),
                type_name: "ONT Start Sequencing".to_string(),
                technician: "Kim Lab".to_string(),
                udf,
                io_pairs,
            },
            steps: BTreeMap::new(),
            artifacts,
            samples,
            projects: BTreeMap::new(),
            containers: BTreeMap::new(),
        }
    }

    const NB01: &str = "01_A1_NB01 (CACAAAGACACCGACAACTTTCTT)";
    const NB02: &str = "02_B1_NB02 (ACAGACGACTACAAACGGAATCGA)";

    #[test]
    fn barcoded_pool_expands_with_aliases() {
        let snap = ont_snapshot(
            "SQK-NBD114-24",
            "FLO-MIN114 (MinION R10.4.1)",
            vec![library("lib1", "FAX00001", "None", &[("s1", NB01), ("s2", NB02)])],
        );
        let sheet = MinknowSheet::build(&snap).unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].barcode.as_deref(), Some("barcode01"));
        assert_eq!(sheet.rows[1].barcode.as_deref(), Some("barcode02"));
        assert_eq!(sheet.rows[0].flow_cell_product_code, "FLO-MIN114");
    }

    #[test]
    fn barcoded_kit_without_labels_fails() {
        let snap = ont_snapshot(
            "SQK-NBD114-24",
            "FLO-MIN114 (MinION R10.4.1)",
            vec![library("lib1", "FAX00001", "None", &[("s1", "")])],
        );
        assert!(MinknowSheet::build(&snap).is_err());
    }

    #[test]
    fn promethion_requires_positions() {
        let snap = ont_snapshot(
            "SQK-LSK114",
            "FLO-PRO114M (PromethION R10.4.1)",
            vec![library("lib1", "PAX00001", "None", &[("s1", "")])],
        );
        assert!(MinknowSheet::build(&snap).is_err());

        let snap = ont_snapshot(
            "SQK-LSK114",
            "FLO-PRO114M (PromethION R10.4.1)",
            vec![library("lib1", "PAX00001", "1A", &[("s1", "")])],
        );
        assert!(MinknowSheet::build(&snap).is_ok());
    }

    #[test]
    fn minion_rejects_positions() {
        let snap = ont_snapshot(
            "SQK-LSK114",
            "FLO-MIN114 (MinION R10.4.1)",
            vec![library("lib1", "FAX00001", "1A", &[("s1", "")])],
        );
        assert!(MinknowSheet::build(&snap).is_err());
    }

    #[test]
    fn grouped_flowcells_must_be_promethion_and_distinct() {
        let snap = ont_snapshot(
            "SQK-LSK114",
            "FLO-MIN114 (MinION R10.4.1)",
            vec![
                library("lib1", "FAX00001", "None", &[("s1", "")]),
                library("lib2", "FAX00002", "None", &[("s2", "")]),
            ],
        );
        assert!(MinknowSheet::build(&snap).is_err());

        let snap = ont_snapshot(
            "SQK-LSK114",
            "FLO-PRO114M (PromethION R10.4.1)",
            vec![
                library("lib1", "PAX00001", "1A", &[("s1", "")]),
                library("lib2", "PAX00002", "1B", &[("s2", "")]),
            ],
        );
        assert!(MinknowSheet::build(&snap).is_ok());

        // Duplicate flow cell id.
        let snap = ont_snapshot(
            "SQK-LSK114",
            "FLO-PRO114M (PromethION R10.4.1)",
            vec![
                library("lib1", "PAX00001", "1A", &[("s1", "")]),
                library("lib2", "PAX00001", "1B", &[("s2", "")]),
            ],
        );
        assert!(MinknowSheet::build(&snap).is_err());
    }

    #[test]
    fn csv_omits_positions_when_unset() {
        let snap = ont_snapshot(
            "SQK-NBD114-24",
            "FLO-MIN114 (MinION R10.4.1)",
            vec![library("lib1", "FAX00001", "None", &[("s1", NB01)])],
        );
        let sheet = MinknowSheet::build(&snap).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        sheet.write_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "flow_cell_id,sample_id,experiment_id,flow_cell_product_code,kit,alias,barcode"
        );
        assert!(text.contains("barcode01"));
    }
}
